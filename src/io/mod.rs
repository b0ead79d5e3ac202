//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - cleaned table export (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
