use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::features::staging::services::StagingService;

/// Background worker that purges expired staged uploads
pub struct StagingSweeper {
    staging: Arc<StagingService>,
    interval_secs: u64,
}

impl StagingSweeper {
    pub fn new(staging: Arc<StagingService>, interval_secs: u64) -> Self {
        Self {
            staging,
            interval_secs,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting staged-file expiry sweeper (every {}s)",
            self.interval_secs
        );

        let mut interval = interval(Duration::from_secs(self.interval_secs));

        loop {
            interval.tick().await;

            if let Err(e) = self.staging.sweep_expired().await {
                tracing::error!("Error sweeping expired staged uploads: {:?}", e);
            }
        }
    }
}
