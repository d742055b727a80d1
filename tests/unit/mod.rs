//! Unit tests over the public library API

pub mod business_days;
pub mod landmarks;
pub mod report_layout;
