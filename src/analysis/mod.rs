//! League aggregations.
//!
//! Pure functions over fetched records; see [`crate::commands`] for the
//! fetch-and-resolve side of each report.

pub mod aggregator;
pub mod players;
pub mod season;

pub use aggregator::*;
pub use players::*;
pub use season::*;
