//! Draft session - routes classified log lines into the derived state
//!
//! One session covers one log run. Entity ids are only unique within a
//! run, so attaching a new file or detecting rotation calls `reset`.

use std::sync::Arc;
use tracing::trace;

use crate::catalog::CardCatalog;
use crate::classifier::{classify, EntityInfo, LineEvent};
use crate::history::TagHistory;
use crate::ledger::StatLedger;
use crate::offering::{OfferingSnapshot, OfferingTracker};

/// State change produced by a processed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Oldest record first
    TagHistoryChanged(Vec<String>),
    OfferingsChanged(OfferingSnapshot),
}

pub struct DraftSession {
    catalog: Arc<CardCatalog>,
    ledger: StatLedger,
    history: TagHistory,
    tracker: OfferingTracker,
    lines_processed: u64,
}

impl DraftSession {
    pub fn new(catalog: Arc<CardCatalog>) -> Self {
        Self {
            catalog,
            ledger: StatLedger::new(),
            history: TagHistory::new(),
            tracker: OfferingTracker::new(),
            lines_processed: 0,
        }
    }

    /// Classify one line and apply it. Returns at most one update of each
    /// kind, tag history first.
    pub fn process_line(&mut self, line: &str) -> Vec<SessionUpdate> {
        self.lines_processed += 1;

        let mut history_changed = false;
        let mut offerings_changed = false;

        for event in classify(line) {
            trace!(line = self.lines_processed, event = ?event, "Classified");
            match event {
                LineEvent::TagChange(change) => {
                    self.history.push(change.format_record());
                    history_changed = true;
                }
                LineEvent::StatChange(change) => {
                    self.ledger.record(change.entity_id, change.kind, change.value);
                    if self.tracker.contains(change.entity_id) {
                        self.tracker.refresh(&self.ledger);
                        offerings_changed = true;
                    }
                }
                LineEvent::EntityInfo(info) => {
                    offerings_changed |= self.consider(&info);
                }
            }
        }

        let mut updates = Vec::new();
        if history_changed {
            updates.push(SessionUpdate::TagHistoryChanged(self.history.snapshot()));
        }
        if offerings_changed {
            updates.push(SessionUpdate::OfferingsChanged(self.tracker.snapshot()));
        }
        updates
    }

    fn consider(&mut self, info: &EntityInfo) -> bool {
        if !self.catalog.is_collectible(&info.card_id) {
            return false;
        }
        self.tracker.consider(
            info.entity_id,
            &info.card_id,
            &info.name,
            &self.catalog,
            &self.ledger,
        );
        true
    }

    /// Drop all per-run state
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.history.clear();
        self.tracker.clear();
        self.lines_processed = 0;
    }

    pub fn offerings(&self) -> OfferingSnapshot {
        self.tracker.snapshot()
    }

    pub fn tag_history(&self) -> Vec<String> {
        self.history.snapshot()
    }

    pub fn ledger(&self) -> &StatLedger {
        &self.ledger
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }
}
