//! Core workflows for classfetch.
//!
//! This crate ties together page loading, attachment discovery, and download
//! resolution into the end-to-end `scan` and `plan` workflows.

pub mod page;
pub mod pipeline;
pub mod report;

pub use page::{LoadedPage, PageSource, load_page};
pub use pipeline::{ProgressReporter, SilentProgress, plan, scan};
pub use report::{read_report, write_report};
