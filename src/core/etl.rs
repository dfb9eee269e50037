use crate::core::Pipeline;
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    #[cfg(feature = "cli")]
    monitor: Option<SystemMonitor>,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            #[cfg(feature = "cli")]
            monitor: None,
        }
    }

    #[cfg(feature = "cli")]
    pub fn new_with_monitoring(pipeline: P, enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: Some(SystemMonitor::new(enabled)),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting cleaning process...");

        // Extract
        println!("Extracting data...");
        let sheet = self.pipeline.extract().await?;
        println!("Extracted {} rows", sheet.len());

        // Transform
        println!("Transforming data...");
        let result = self.pipeline.transform(sheet).await?;
        println!("Transformed into {} cleaned rows", result.cleaned.len());

        // Load
        println!("Loading data...");
        let output_path = self.pipeline.load(result).await?;
        println!("Output saved to: {}", output_path);

        #[cfg(feature = "cli")]
        if let Some(stats) = self.monitor.as_ref().and_then(|m| m.get_stats()) {
            tracing::info!(
                "🔍 CPU {:.1}%, memory {} MB ({:.1}%, peak {} MB), elapsed {:.2?}",
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.memory_usage_percent,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }

        Ok(output_path)
    }
}
