pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod pricing;
pub mod record;
pub mod transform;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::{etl::EtlEngine, pipeline::HouseholdPipeline};
pub use domain::model::{Address, FlatRow, Household, InvalidGroupError, Person, PricedHousehold};
pub use pricing::{household_cost, in_district, individual_cost, PricingRules};
pub use record::{DecodeError, StructuredRecord, StructuredType, Value};
pub use transform::{explode_household, flatten_households, group_into_households};
pub use utils::error::{EtlError, Result};
