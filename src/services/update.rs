use crate::error::CacheError;
use crate::models::dashboard::DuoStats;
use crate::models::types::DuoRequest;
use crate::services::api::RiotApi;
use crate::services::stats;
use crate::utils::storage::StatsCache;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub cooldown: Duration,
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(DuoStats),
    AlreadyUpToDate(DuoStats),
    OnCooldown {
        remaining: Duration,
        cached: Option<DuoStats>,
    },
    Failed {
        message: String,
        cached: Option<DuoStats>,
    },
}

impl UpdateOutcome {
    pub fn status(&self) -> String {
        match self {
            UpdateOutcome::Updated(_) => "Stats successfully updated!".to_string(),
            UpdateOutcome::AlreadyUpToDate(_) => "Stats are already up to date!".to_string(),
            UpdateOutcome::OnCooldown { remaining, .. } => {
                format!("On cooldown, try again in {}", format_wait(*remaining))
            }
            UpdateOutcome::Failed { message, .. } => message.clone(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateOutcome::Failed { .. })
    }

    /// What the dashboard should show after this refresh.
    pub fn stats(&self) -> Option<&DuoStats> {
        match self {
            UpdateOutcome::Updated(stats) | UpdateOutcome::AlreadyUpToDate(stats) => Some(stats),
            UpdateOutcome::OnCooldown { cached, .. } | UpdateOutcome::Failed { cached, .. } => {
                cached.as_ref()
            }
        }
    }
}

fn format_wait(remaining: Duration) -> String {
    let secs = remaining.as_secs().max(1);
    match (secs / 60, secs % 60) {
        (0, s) => format!("{}s", s),
        (m, 0) => format!("{}m", m),
        (m, s) => format!("{}m {}s", m, s),
    }
}

/// Recomputes stats for a pair unless its cooldown is still running. The
/// cooldown restarts after every attempt that reached the API, successful
/// or not.
pub async fn refresh<A>(
    api: &A,
    cache: &mut StatsCache,
    request: &DuoRequest,
    settings: RefreshSettings,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome, CacheError>
where
    A: RiotApi + ?Sized,
{
    let key = StatsCache::key(request);
    let cached = cache.stats(&key).cloned();

    if let Some(remaining) = cache.cooldown_remaining(&key, now) {
        info!(key = %key, remaining_secs = remaining.as_secs(), "serving cached stats during cooldown");
        return Ok(UpdateOutcome::OnCooldown { remaining, cached });
    }

    info!(
        "Fetching fresh stats for {} and {} on {}",
        request.player1, request.player2, request.server
    );
    let outcome = match stats::get_stats(api, request, settings.concurrency).await {
        Err(e) => {
            warn!("Error fetching stats: {}", e);
            cache.record_failure(&key, now, settings.cooldown);
            UpdateOutcome::Failed {
                message: e.to_string(),
                cached,
            }
        }
        Ok(fresh) => {
            let unchanged = cached.as_ref() == Some(&fresh);
            cache.record(&key, fresh.clone(), now, settings.cooldown);
            if unchanged {
                UpdateOutcome::AlreadyUpToDate(fresh)
            } else {
                UpdateOutcome::Updated(fresh)
            }
        }
    };
    cache.save()?;
    Ok(outcome)
}
