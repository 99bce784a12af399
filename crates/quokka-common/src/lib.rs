//! Common utilities for the Quokka HTML toolkit.
//!
//! This crate provides shared infrastructure used by the scanner, the tag
//! balancer and the command-line tool:
//! - **Warning System** - deduplicated colored terminal output
//! - **Diagnostics** - recoverable problem reports and reporter sinks

pub mod diagnostic;
pub mod warning;

pub use diagnostic::{
    CollectingReporter, Diagnostic, ErrorReporter, Severity, SilentReporter, WarnOnceReporter,
};
