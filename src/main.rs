//! lrg2bed CLI entry point
//!
//! Converts the exons of LRG transcripts into genomic BED files.

use anyhow::Context;
use clap::{ArgGroup, Parser, ValueEnum};
use lrg2bed::core::{FacadeSink, GenomeBuild, LogSink, LrgDocument, SpanPolicy};
use lrg2bed::formats::BedHeader;
use lrg2bed::pipeline::{
    convert_document, convert_file, parse_transcript_list, write_report, ConvertOptions,
    FailurePolicy,
};
use lrg2bed::web::LrgStatus;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Genome build (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum GenomeBuildArg {
    #[default]
    #[value(name = "GRCh37")]
    Grch37,
    #[value(name = "GRCh38")]
    Grch38,
}

impl From<GenomeBuildArg> for GenomeBuild {
    fn from(arg: GenomeBuildArg) -> Self {
        match arg {
            GenomeBuildArg::Grch37 => GenomeBuild::GRCh37,
            GenomeBuildArg::Grch38 => GenomeBuild::GRCh38,
        }
    }
}

#[derive(Parser)]
#[command(name = "lrg2bed")]
#[command(about = "Takes an LRG xml file and returns a BED file of exon coordinates")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "web"])))]
struct Cli {
    /// Input LRG xml file
    input: Option<PathBuf>,

    /// Fetch the LRG from the registry by LRG id, HGNC symbol or transcript accession
    #[arg(short = 'w', long)]
    web: Option<String>,

    /// Comma-separated transcript names (default: every fixed transcript)
    #[arg(short = 't', long)]
    transcripts: Option<String>,

    /// Genome build
    #[arg(short = 'g', long = "genome-build", value_enum, default_value = "GRCh37")]
    genome_build: GenomeBuildArg,

    /// Output directory for <lrg_id>_<transcript>.bed files
    #[arg(short = 'o', long, default_value = ".")]
    outdir: PathBuf,

    /// Number of threads
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Sort intervals by genomic position instead of exon order
    #[arg(long)]
    sort: bool,

    /// Fail when a genome build has more than one mapping or mapping span
    #[arg(long = "strict-spans")]
    strict_spans: bool,

    /// Stop at the first failing transcript and write nothing
    #[arg(long = "abort-on-error")]
    abort_on_error: bool,

    /// Write log messages to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Registry request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[cfg(feature = "web")]
fn fetch_document(
    query: &str,
    timeout: u64,
    sink: &dyn LogSink,
) -> anyhow::Result<(LrgDocument, Option<LrgStatus>)> {
    use lrg2bed::web::{fetch_lrg, EbiRegistry};

    let registry = EbiRegistry::new(std::time::Duration::from_secs(timeout))?;
    let fetched = fetch_lrg(&registry, query, sink)
        .with_context(|| format!("Failed to fetch LRG for '{}'", query))?;
    let document = LrgDocument::parse_str(&fetched.xml)
        .with_context(|| format!("Downloaded {} is not a valid LRG record", fetched.lrg_id))?;
    Ok((document, Some(fetched.status)))
}

#[cfg(not(feature = "web"))]
fn fetch_document(
    _query: &str,
    _timeout: u64,
    _sink: &dyn LogSink,
) -> anyhow::Result<(LrgDocument, Option<LrgStatus>)> {
    anyhow::bail!("lrg2bed was built without the 'web' feature; pass a local xml file instead")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let sink = FacadeSink;
    let start = Instant::now();

    let build = GenomeBuild::from(cli.genome_build);

    let options = ConvertOptions {
        build: build.to_string(),
        transcripts: cli.transcripts.as_deref().map(parse_transcript_list),
        span_policy: if cli.strict_spans {
            SpanPolicy::Strict
        } else {
            SpanPolicy::LastWins
        },
        failure_policy: if cli.abort_on_error {
            FailurePolicy::AbortOnError
        } else {
            FailurePolicy::Isolate
        },
        threads: cli.threads.max(1),
        sort: cli.sort,
    };

    let (report, status) = match (&cli.input, &cli.web) {
        (Some(path), _) => {
            let report = convert_file(path, &options, &sink)
                .with_context(|| format!("Failed to convert {}", path.display()))?;
            (report, None)
        }
        (None, Some(query)) => {
            let (document, status) = fetch_document(query, cli.timeout, &sink)?;
            let report = convert_document(&document, &options, &sink)
                .with_context(|| format!("Failed to convert {}", document.lrg_id()))?;
            (report, status)
        }
        (None, None) => anyhow::bail!("either an input file or --web is required"),
    };
    eprintln!("Converted {} on {} -> {:?}", report.lrg_id, build, cli.outdir);

    let header = BedHeader::now().with_build(build.as_str()).with_status(status);
    let written = write_report(&report, &cli.outdir, &header, &sink)?;
    let stats = report.stats();

    eprintln!("\n=== Conversion Statistics ===");
    eprintln!("Transcripts:     {}", stats.total);
    eprintln!("Successful:      {}", stats.success);
    eprintln!("Failed:          {}", stats.failed);
    eprintln!("Intervals:       {}", stats.intervals);
    eprintln!("Files written:   {}", written.len());
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    for (transcript, err) in report.failures() {
        eprintln!("  {}: {}", transcript, err);
    }
    if stats.failed > 0 {
        anyhow::bail!("{} of {} transcript(s) failed", stats.failed, stats.total);
    }

    Ok(())
}
