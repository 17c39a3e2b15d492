use crate::core::{ConfigProvider, FlatRow, Pipeline, Storage, TransformResult};
use crate::domain::model::{Household, PricedHousehold};
use crate::record::{StructuredRecord, StructuredType};
use crate::transform::group_into_households;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "household_output.zip";

const OUTPUT_HEADER: [&str; 7] = [
    "street",
    "house_number",
    "city",
    "member_count",
    "members",
    "in_district",
    "cost",
];

/// Reads flat person/address rows from CSV, groups them into households,
/// prices each household and packs the results into a ZIP archive.
pub struct HouseholdPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

#[derive(Serialize)]
struct HouseholdReport<'a> {
    generated_at: DateTime<Utc>,
    household_count: usize,
    total_cost: f64,
    households: &'a [PricedHousehold],
}

impl<S: Storage, C: ConfigProvider> HouseholdPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// CSV 一列 -> [Person 記錄, Address 記錄]
    fn flat_row_record(cells: &csv::StringRecord) -> StructuredRecord {
        let person = StructuredRecord::from_texts(cells.iter().take(3));
        let address = StructuredRecord::from_texts(cells.iter().skip(3));
        StructuredRecord::new(vec![person.into(), address.into()])
    }

    fn apply_member_filter(&self, households: Vec<Household>) -> (Vec<Household>, usize) {
        let max_age = match self.config.max_member_age() {
            Some(age) => age,
            None => return (households, 0),
        };

        let mut kept = Vec::with_capacity(households.len());
        let mut dropped = 0;

        for household in households {
            let members = household.members_where(|p| p.age < max_age);
            match Household::try_new(members, household.address().clone()) {
                Ok(filtered) => kept.push(filtered),
                Err(e) => {
                    tracing::warn!("Dropping household after member filter: {}", e);
                    dropped += 1;
                }
            }
        }

        (kept, dropped)
    }

    fn render_delimited(priced: &[PricedHousehold], delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(OUTPUT_HEADER)?;
        for row in priced {
            let address = row.household.address();
            let members = row
                .household
                .members()
                .iter()
                .map(|p| format!("{} {} ({})", p.first_name, p.last_name, p.age))
                .collect::<Vec<_>>()
                .join("; ");

            writer.write_record([
                address.street.clone(),
                address.house_number.to_string(),
                address.city.clone(),
                row.household.members().len().to_string(),
                members,
                row.in_district.to_string(),
                format!("{:.2}", row.cost),
            ])?;
        }

        let bytes = writer.into_inner().map_err(|e| {
            EtlError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })?;
        String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
            message: format!("Delimited output is not valid UTF-8: {}", e),
        })
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for HouseholdPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<FlatRow>> {
        let input = self.config.input_file();
        tracing::debug!("Reading input rows from: {}", input);

        let data = self.storage.read_file(input).await?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.config.has_headers())
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        for (index, cells) in reader.records().enumerate() {
            let cells = cells?;
            let record = Self::flat_row_record(&cells);
            match FlatRow::from_structured_record(&record) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::error!("Row {} of {} could not be decoded: {}", index + 1, input, e);
                    return Err(e.into());
                }
            }
        }

        if rows.is_empty() {
            tracing::warn!("No rows found in {}", input);
        }

        Ok(rows)
    }

    async fn transform(&self, rows: Vec<FlatRow>) -> Result<TransformResult> {
        let households = group_into_households(&rows);
        let (households, dropped_households) = self.apply_member_filter(households);

        let rules = self.config.pricing();
        let priced_households: Vec<PricedHousehold> = households
            .into_iter()
            .map(|household| {
                let cost = rules.household_cost(&household);
                let in_district = rules.in_district(household.address());
                tracing::debug!(
                    "Household at {} {}, {}: {} members, cost {}",
                    household.address().street,
                    household.address().house_number,
                    household.address().city,
                    household.members().len(),
                    cost
                );
                PricedHousehold {
                    household,
                    in_district,
                    cost,
                }
            })
            .collect();

        let csv_output = Self::render_delimited(&priced_households, b',')?;
        let tsv_output = Self::render_delimited(&priced_households, b'\t')?;
        let json_output = serde_json::to_string_pretty(&HouseholdReport {
            generated_at: Utc::now(),
            household_count: priced_households.len(),
            total_cost: priced_households.iter().map(|p| p.cost).sum(),
            households: &priced_households,
        })?;

        Ok(TransformResult {
            priced_households,
            csv_output,
            tsv_output,
            json_output,
            dropped_households,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = Path::new(self.config.output_path()).join(ARCHIVE_NAME);
        let output_path = output_path.to_string_lossy().into_owned();

        let entries = [
            ("csv", "households.csv", &result.csv_output),
            ("tsv", "households.tsv", &result.tsv_output),
            ("json", "households.json", &result.json_output),
        ];

        // 建立 ZIP 檔案
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (format, file_name, content) in entries {
                if !self.wants(format) {
                    continue;
                }
                tracing::debug!("Adding {} ({} bytes) to archive", file_name, content.len());
                zip.start_file(file_name, SimpleFileOptions::default())?;
                zip.write_all(content.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}
