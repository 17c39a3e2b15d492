use super::VALID_OUTPUT_FORMATS;
use crate::core::ConfigProvider;
use crate::pricing::PricingRules;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_output_formats, validate_path, validate_required_field,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

fn default_formats() -> &'static [String] {
    static FORMATS: OnceLock<Vec<String>> = OnceLock::new();
    FORMATS.get_or_init(|| VALID_OUTPUT_FORMATS.iter().map(|f| f.to_string()).collect())
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "household-etl")]
#[command(about = "Group people into households by address and price their membership")]
pub struct CliConfig {
    /// Input CSV: first_name,last_name,age,street,house_number,city
    #[arg(long)]
    pub input: Option<String>,

    /// Output directory [default: ./output]
    #[arg(long)]
    pub output_path: Option<String>,

    /// TOML configuration file; command line flags override it
    #[arg(long)]
    pub config: Option<String>,

    /// Comma separated output formats [default: csv,tsv,json]
    #[arg(long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Drop members whose age is at or above this value before pricing
    #[arg(long)]
    pub max_member_age: Option<i32>,

    #[arg(long, help = "Input file has no header row")]
    pub no_headers: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(skip)]
    #[serde(default)]
    pub pricing: PricingRules,
}

impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        self.input.as_deref().unwrap_or_default()
    }

    fn has_headers(&self) -> bool {
        !self.no_headers
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn output_formats(&self) -> &[String] {
        self.formats.as_deref().unwrap_or_else(|| default_formats())
    }

    fn max_member_age(&self) -> Option<i32> {
        self.max_member_age
    }

    fn pricing(&self) -> &PricingRules {
        &self.pricing
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let input = validate_required_field("input", &self.input)?;
        validate_path("input", input)?;
        validate_file_extension("input", input, &["csv"])?;
        validate_path("output_path", self.output_path())?;
        validate_output_formats("formats", self.output_formats(), &VALID_OUTPUT_FORMATS)?;
        self.pricing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["household-etl", "--input", "people.csv"]);

        assert_eq!(config.input_file(), "people.csv");
        assert_eq!(config.output_path(), "./output");
        assert_eq!(config.output_formats(), ["csv", "tsv", "json"]);
        assert!(config.has_headers());
        assert_eq!(config.max_member_age(), None);
        assert_eq!(config.pricing(), &PricingRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_requires_input() {
        let config = CliConfig::parse_from(["household-etl"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let config = CliConfig::parse_from([
            "household-etl",
            "--input",
            "people.csv",
            "--formats",
            "csv,xml",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_explicit_output_flags() {
        let config = CliConfig::parse_from([
            "household-etl",
            "--input",
            "people.csv",
            "--output-path",
            "/tmp/households",
            "--formats",
            "json",
        ]);
        assert_eq!(config.output_path.as_deref(), Some("/tmp/households"));
        assert_eq!(config.output_formats(), ["json"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_member_filter_flag() {
        let config = CliConfig::parse_from([
            "household-etl",
            "--input",
            "people.csv",
            "--max-member-age",
            "30",
            "--no-headers",
        ]);
        assert_eq!(config.max_member_age(), Some(30));
        assert!(!config.has_headers());
    }
}
