pub mod household_pipeline;
