//! Time-bucketed case and defendant aggregates for dashboard charts,
//! plus case processing times and demographic share comparisons.
//!
//! Records go in, bucket labels and aligned count series come out. The
//! engine does no I/O. Row files are read by the binary's `cli::build`
//! module (`load_rows`), and only `DashboardConfig` touches the filesystem.

pub mod services;
pub mod types;
