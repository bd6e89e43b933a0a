use std::time::Duration;

use tokio::time;

use crate::AppState;

use super::alert_evaluator;

/// Background loop that periodically evaluates all armed alerts.
pub fn spawn_alert_monitor(state: AppState) {
    let period = Duration::from_secs(state.settings.alert_check_secs.max(1));

    tokio::spawn(async move {
        let mut interval = time::interval(period);

        loop {
            interval.tick().await;

            match alert_evaluator::evaluate_all(&state).await {
                Ok(summary) => {
                    if summary.triggered > 0 || summary.errors > 0 {
                        tracing::info!(
                            "alert pass: checked={} triggered={} errors={}",
                            summary.checked,
                            summary.triggered,
                            summary.errors
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("alert pass failed: {}", e);
                }
            }
        }
    });
}
