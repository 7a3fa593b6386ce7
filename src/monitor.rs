use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::diff::{diff_snapshots, total_events, IndexChanges};
use crate::fetch::PageFetcher;
use crate::history::HistoryStore;
use crate::model::Snapshot;
use crate::notify::{render_changes, startup_notification, Notification, NotifySink};
use crate::parser::parse_snapshot;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Nothing extracted from any index; history left untouched so a bad
    /// scrape never reads as a mass removal.
    Skipped,
    /// First observation; stored silently as the comparison baseline.
    Baseline { snapshot: Snapshot },
    Checked {
        snapshot: Snapshot,
        changes: Vec<IndexChanges>,
    },
}

/// Drives the fetch -> parse -> diff -> notify -> persist cycle. One cycle
/// runs to completion before the next is scheduled; nothing overlaps.
pub struct Monitor {
    fetcher: Box<dyn PageFetcher>,
    sinks: Vec<Box<dyn NotifySink>>,
    store: HistoryStore,
    source_url: String,
    top_n: usize,
}

impl Monitor {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        sinks: Vec<Box<dyn NotifySink>>,
        store: HistoryStore,
        source_url: impl Into<String>,
        top_n: usize,
    ) -> Self {
        Self {
            fetcher,
            sinks,
            store,
            source_url: source_url.into(),
            top_n,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        info!("scraping {}", self.source_url);
        let page = self.fetcher.fetch(&self.source_url).await?;
        let snapshot = parse_snapshot(&page);

        if snapshot.total_entries() == 0 {
            warn!("no entries extracted from any index; skipping this cycle");
            return Ok(CycleOutcome::Skipped);
        }

        if self.store.latest().is_none() {
            info!(
                "first run - establishing baseline with {} models",
                snapshot.total_entries()
            );
            self.dispatch(&startup_notification(snapshot.total_entries()))
                .await;
            self.store.append(snapshot.clone())?;
            return Ok(CycleOutcome::Baseline { snapshot });
        }

        let changes = {
            let previous = self.store.latest();
            if previous.is_some_and(|p| p.content_hash == snapshot.content_hash) {
                info!("page content unchanged since last capture");
                Vec::new()
            } else {
                diff_snapshots(previous, &snapshot, self.top_n)
            }
        };

        let total = total_events(&changes);
        if total > 0 {
            info!("{total} ranking changes detected");
            if let Some(notification) = render_changes(&changes) {
                self.dispatch(&notification).await;
            }
        } else {
            info!("no ranking changes");
        }

        self.store.append(snapshot.clone())?;
        Ok(CycleOutcome::Checked { snapshot, changes })
    }

    /// Run cycles forever (or for a bounded number of iterations). A failed
    /// cycle is logged and the schedule keeps ticking.
    pub async fn run_watch(&mut self, interval: Duration, iterations: Option<u32>) {
        let mut completed: u32 = 0;
        loop {
            if let Err(err) = self.run_cycle().await {
                error!("cycle failed: {err:#}");
            }
            completed += 1;
            if iterations.is_some_and(|limit| completed >= limit) {
                break;
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Delivery failure never blocks persistence of the new snapshot.
    async fn dispatch(&self, notification: &Notification) {
        for sink in &self.sinks {
            if let Err(err) = sink.send(notification).await {
                warn!("notification delivery failed: {err:#}");
            }
        }
    }
}
