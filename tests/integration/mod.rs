//! Integration tests against mock HTTP servers and the filesystem

pub mod fundamentals_client;
pub mod report_writer;
