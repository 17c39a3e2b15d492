use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting household ETL process");

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", rows.len());

        // Transform
        let result = self.pipeline.transform(rows).await?;
        tracing::info!(
            "🔄 Priced {} households ({} dropped by member filter)",
            result.priced_households.len(),
            result.dropped_households
        );

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!(
            "📁 Output saved to: {} in {:?}",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
