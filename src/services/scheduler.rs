use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::error::AppError;
use crate::repositories::election_repository::ElectionRepository;

const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub activated: u64,
    pub completed: u64,
}

/// One pass of the status sweep: open elections whose start date has passed
/// and close those whose end date has passed. Elections with a manually
/// pinned status are skipped by the underlying queries.
pub async fn run_status_sweep(elections: &ElectionRepository) -> Result<SweepOutcome, AppError> {
    let now = Utc::now();
    let activated = elections.activate_due(now).await?;
    let completed = elections.complete_due(now).await?;
    Ok(SweepOutcome {
        activated,
        completed,
    })
}

/// Background task that runs the sweep every ten minutes for the lifetime of
/// the process. Failures are logged and the loop keeps going.
pub fn spawn_status_sweeper(elections: ElectionRepository) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match run_status_sweep(&elections).await {
                Ok(outcome) if outcome.activated > 0 || outcome.completed > 0 => {
                    info!(
                        activated = outcome.activated,
                        completed = outcome.completed,
                        "Election status sweep applied changes"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    error!("Election status sweep failed: {}", err);
                }
            }
        }
    })
}
