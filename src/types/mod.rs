//! Type definitions for caseload

mod bucket;
mod counts;
mod error;
mod record;
mod series;

pub use bucket::*;
pub use counts::*;
pub use error::*;
pub use record::*;
pub use series::*;
