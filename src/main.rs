use clap::Parser;
use household_etl::config::toml_config::TomlConfig;
use household_etl::core::ConfigProvider;
use household_etl::utils::{logger, validation::Validate};
use household_etl::{CliConfig, EtlEngine, EtlError, HouseholdPipeline, LocalStorage};

async fn run<C: ConfigProvider + Validate>(config: C) -> household_etl::Result<String> {
    config.validate()?;

    tracing::debug!(
        "Input: {}, output: {}, formats: {:?}, max member age: {:?}",
        config.input_file(),
        config.output_path(),
        config.output_formats(),
        config.max_member_age()
    );

    let storage = LocalStorage::new(".");
    let pipeline = HouseholdPipeline::new(storage, config);
    EtlEngine::new(pipeline).run().await
}

/// 套用命令列覆蓋設定
fn apply_overrides(mut toml: TomlConfig, cli: &CliConfig) -> TomlConfig {
    if let Some(input) = &cli.input {
        toml.source.input_file = input.clone();
    }
    if let Some(output_path) = &cli.output_path {
        toml.load.output_path = output_path.clone();
    }
    if let Some(formats) = &cli.formats {
        toml.load.output_formats = formats.clone();
    }
    if cli.max_member_age.is_some() {
        toml.transform.max_member_age = cli.max_member_age;
    }
    if cli.no_headers {
        toml.source.has_headers = Some(false);
    }
    toml
}

fn report_failure(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Household ETL failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting household-etl");

    let result = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(toml) => run(apply_overrides(toml, &cli)).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli.clone()).await,
    };

    match result {
        Ok(output_path) => {
            println!("✅ Household ETL completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => report_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
[pipeline]
name = "households"

[source]
input_file = "toml_people.csv"

[transform]
max_member_age = 80

[load]
output_path = "./toml_out"
output_formats = ["csv"]
"#;

    #[test]
    fn test_cli_flags_override_toml() {
        let toml = TomlConfig::from_toml_str(TOML).unwrap();
        let cli = CliConfig::parse_from([
            "household-etl",
            "--config",
            "households.toml",
            "--input",
            "cli_people.csv",
            "--output-path",
            "/tmp/cli_out",
            "--formats",
            "json,tsv",
            "--max-member-age",
            "30",
            "--no-headers",
        ]);

        let merged = apply_overrides(toml, &cli);

        assert_eq!(merged.input_file(), "cli_people.csv");
        assert_eq!(merged.output_path(), "/tmp/cli_out");
        assert_eq!(merged.output_formats(), ["json", "tsv"]);
        assert_eq!(merged.max_member_age(), Some(30));
        assert!(!merged.has_headers());
    }

    #[test]
    fn test_toml_values_kept_without_cli_flags() {
        let toml = TomlConfig::from_toml_str(TOML).unwrap();
        let cli = CliConfig::parse_from(["household-etl", "--config", "households.toml"]);

        let merged = apply_overrides(toml, &cli);

        assert_eq!(merged.input_file(), "toml_people.csv");
        assert_eq!(merged.output_path(), "./toml_out");
        assert_eq!(merged.output_formats(), ["csv"]);
        assert_eq!(merged.max_member_age(), Some(80));
        assert!(merged.has_headers());
    }
}
