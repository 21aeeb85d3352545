use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 依序執行 extract → transform → load
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting report run");
        self.monitor.log_stats("Start");

        tracing::info!("📥 Extracting snapshots...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} prescription(s), {} session(s), {} rejected",
            snapshot.prescriptions.len(),
            snapshot.sessions.len(),
            snapshot.rejected.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("🔄 Building reports...");
        let result = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Built {} adherence row(s), {} exercise chart(s) with {} point(s), {} reminder(s)",
            result.adherence.len(),
            result.exercises.len(),
            result.point_count(),
            result.reminders.len()
        );
        self.monitor.log_stats("Transform");

        tracing::info!("📦 Writing archive...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("✅ Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
