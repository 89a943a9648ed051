pub mod analyze;
pub mod config;
pub mod prompt;
pub mod validate;
