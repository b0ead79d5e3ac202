//! `borrower-research` library crate.
//!
//! The binary (`borrowers`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - each stage (clean, categorize, aggregate) can be driven on its own
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod categorize;
pub mod clean;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
