//! CLI subcommand implementations for the fwmirror binary.

pub mod doctor;
pub mod fetch_cmd;
pub mod mirror_cmd;
pub mod output;
pub mod scan_cmd;
