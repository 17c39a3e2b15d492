pub use crate::app::pipelines::household_pipeline::{HouseholdPipeline, ARCHIVE_NAME};
