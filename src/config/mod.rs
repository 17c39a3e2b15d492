pub mod cli;
#[cfg(feature = "cli")]
mod args;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::CliConfig;

pub const VALID_OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];
