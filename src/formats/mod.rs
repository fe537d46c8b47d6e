//! File format adapters
//!
//! Output adapters for converted intervals (BED).

pub mod bed;

pub use bed::{bed_file_name, render_bed, sort_intervals, write_bed, write_bed_file, BedHeader};
