//! CLI subcommand implementations for the aqarscan binary.

pub mod crawl_cmd;
pub mod doctor;
