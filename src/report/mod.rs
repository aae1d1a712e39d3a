pub mod formatters;

pub use formatters::{OutputFormat, format_report};
