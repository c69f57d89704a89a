//! Per-branch ingestion scheduling.
//!
//! Each branch owns one release source and the cursor that source advances.
//! A branch runs at most one pass at a time with at most one more queued
//! behind it; refreshes arriving while a pass is already queued fold into
//! that pass. Branches are independent of each other.

use crate::core::{Branch, UpdateError, UpdateResult};
use crate::di::traits::ReleaseSource;
use crate::release::{BuildCursor, SourceKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// What `refresh` did with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTicket {
    /// A new pass was queued for the branch
    Scheduled,
    /// A pass was already waiting to start and will cover this request
    Coalesced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    Completed {
        has_new_release: bool,
        cursor: Option<u64>,
    },
    Failed {
        error: String,
    },
}

/// Published after every ingestion pass
#[derive(Debug, Clone, Serialize)]
pub struct IngestEvent {
    pub branch: Branch,
    pub source: SourceKind,
    pub outcome: IngestOutcome,
    pub finished_at: DateTime<Utc>,
}

struct BranchSlot {
    source: Arc<dyn ReleaseSource>,
    /// Doubles as the branch lock: a pass holds it for its whole duration
    cursor: Mutex<BuildCursor>,
    /// Set while a scheduled pass has not yet taken the lock
    queued: AtomicBool,
}

impl BranchSlot {
    /// Run one pass under the branch lock.
    ///
    /// Only a pass spawned by `refresh` owns the queued flag; a foreground
    /// pass must leave it set for the spawned pass still waiting.
    async fn run(
        &self,
        events: &broadcast::Sender<IngestEvent>,
        scheduled: bool,
    ) -> UpdateResult<bool> {
        let mut cursor = self.cursor.lock().await;
        if scheduled {
            self.queued.store(false, Ordering::SeqCst);
        }

        let branch = self.source.branch();
        let kind = self.source.kind();
        tracing::debug!("Refreshing {} from {}", branch, kind);

        let result = self.source.fetch_releases(&mut cursor).await;
        let outcome = match &result {
            Ok(has_new_release) => {
                if *has_new_release {
                    tracing::info!("New release found on {}", branch);
                } else {
                    tracing::debug!("No new release on {}", branch);
                }
                IngestOutcome::Completed {
                    has_new_release: *has_new_release,
                    cursor: cursor.get(),
                }
            }
            Err(e) => {
                tracing::error!("Refreshing {} from {} failed: {}", branch, kind, e);
                IngestOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        drop(cursor);

        // No subscribers is fine
        let _ = events.send(IngestEvent {
            branch,
            source: kind,
            outcome,
            finished_at: Utc::now(),
        });

        result
    }
}

/// Owns the branch -> source mapping and serializes ingestion per branch
#[derive(Clone)]
pub struct ReleaseCoordinator {
    slots: Arc<HashMap<Branch, Arc<BranchSlot>>>,
    events: broadcast::Sender<IngestEvent>,
}

impl ReleaseCoordinator {
    /// Build a coordinator from one source per branch
    pub fn new(sources: Vec<Arc<dyn ReleaseSource>>) -> UpdateResult<Self> {
        let mut slots = HashMap::new();
        for source in sources {
            let branch = source.branch();
            let slot = Arc::new(BranchSlot {
                source,
                cursor: Mutex::new(BuildCursor::new()),
                queued: AtomicBool::new(false),
            });
            if slots.insert(branch, slot).is_some() {
                return Err(UpdateError::Config(format!(
                    "Branch {} has more than one release source",
                    branch
                )));
            }
        }

        let (events, _) = broadcast::channel(64);
        Ok(Self {
            slots: Arc::new(slots),
            events,
        })
    }

    /// Branches with a release source, in a stable order
    pub fn branches(&self) -> Vec<Branch> {
        let mut branches: Vec<Branch> = self.slots.keys().copied().collect();
        branches.sort();
        branches
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.events.subscribe()
    }

    /// Schedule a background ingestion pass for `branch` and return immediately
    pub fn refresh(&self, branch: Branch) -> UpdateResult<RefreshTicket> {
        let slot = self
            .slots
            .get(&branch)
            .cloned()
            .ok_or(UpdateError::UnsupportedBranch(branch))?;

        if slot.queued.swap(true, Ordering::SeqCst) {
            tracing::debug!("Refresh of {} coalesced into the queued pass", branch);
            return Ok(RefreshTicket::Coalesced);
        }

        let events = self.events.clone();
        tokio::spawn(async move {
            // Outcome is logged and published by the slot
            let _ = slot.run(&events, true).await;
        });

        Ok(RefreshTicket::Scheduled)
    }

    /// Refresh every branch fed by `kind`
    pub fn refresh_source(&self, kind: SourceKind) -> Vec<(Branch, RefreshTicket)> {
        self.branches()
            .into_iter()
            .filter(|branch| self.slots[branch].source.kind() == kind)
            .filter_map(|branch| self.refresh(branch).ok().map(|ticket| (branch, ticket)))
            .collect()
    }

    /// Run one pass in the caller's task, under the branch lock
    pub async fn run_now(&self, branch: Branch) -> UpdateResult<bool> {
        let slot = self
            .slots
            .get(&branch)
            .ok_or(UpdateError::UnsupportedBranch(branch))?;
        slot.run(&self.events, false).await
    }

    /// Refresh all branches every `period`, starting immediately
    pub fn spawn_poller(&self, period: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tracing::debug!("Polling upstream sources");
                for branch in coordinator.branches() {
                    if let Err(e) = coordinator.refresh(branch) {
                        tracing::warn!("Scheduled refresh of {} failed: {}", branch, e);
                    }
                }
            }
        })
    }
}
