use crate::modules::conversion::registry::JobRegistry;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::info;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically drops finished jobs that sat past the retention window.
/// In-flight jobs are never touched.
pub fn spawn_expiry_sweeper(registry: Arc<JobRegistry>, retention: Duration) -> JoinHandle<()> {
    let period = (retention / 4).max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        info!("🧹 Expiry sweeper running every {:?}", period);
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let expired = registry.expire(OffsetDateTime::now_utc());
            if expired > 0 {
                info!("🧹 Expired {} finished conversion jobs", expired);
            }
        }
    })
}
