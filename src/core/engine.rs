use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

/// Runs extract → transform → load in order.
pub struct PlotEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> PlotEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting plot run");

        tracing::info!("📥 Loading coordinates...");
        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} records ({:?})",
            extracted.records.len(),
            extracted.status
        );
        self.monitor.log_phase("Extract");

        tracing::info!("🗺️ Clustering and coloring...");
        let plan = self.pipeline.transform(extracted).await?;
        tracing::info!(
            "Planned {} cluster markers, {} item markers, {} circles",
            plan.cluster_markers.len(),
            plan.item_markers.len(),
            plan.circles.len()
        );
        self.monitor.log_phase("Transform");

        tracing::info!("💾 Writing render plan...");
        let output_path = self.pipeline.load(plan).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("Load");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(output_path)
    }
}
