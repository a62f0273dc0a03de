//! Offering tracker - the live two-card draft offering
//!
//! Candidates are keyed by entity id, since both choices can share a
//! card id. The two highest entity ids are the ones currently offered.

use serde::{Deserialize, Serialize};

use crate::catalog::{CardCatalog, ReferenceCard};
use crate::ledger::{StatKind, StatLedger, StatOverride};

pub const MAX_OFFERINGS: usize = 2;

/// Base values from the reference dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub cost: Option<i32>,
    pub attack: Option<i32>,
    pub health: Option<i32>,
}

impl BaseStats {
    pub fn from_card(card: &ReferenceCard) -> Self {
        Self {
            cost: card.cost,
            attack: card.attack,
            health: card.health,
        }
    }

    pub fn get(&self, kind: StatKind) -> Option<i32> {
        match kind {
            StatKind::Cost => self.cost,
            StatKind::Attack => self.attack,
            StatKind::Health => self.health,
        }
    }
}

/// Direction of an effective stat relative to its base value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTrend {
    Unchanged,
    Raised,
    Lowered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOffering {
    pub entity_id: u64,
    pub card_id: String,
    pub name: String,
    /// `None` when the card is missing from the catalog
    pub dbf_id: Option<u32>,
    pub base: BaseStats,
    pub cost: Option<i32>,
    pub attack: Option<i32>,
    pub health: Option<i32>,
}

impl CardOffering {
    /// Offering with reference base values and no overrides applied yet
    pub fn new(entity_id: u64, card_id: &str, name: &str, catalog: &CardCatalog) -> Self {
        let base = catalog
            .get(card_id)
            .map(BaseStats::from_card)
            .unwrap_or_default();

        Self {
            entity_id,
            card_id: card_id.to_string(),
            name: name.to_string(),
            dbf_id: catalog.dbf_id(card_id),
            base,
            cost: base.cost,
            attack: base.attack,
            health: base.health,
        }
    }

    /// Overridden stats win, the rest keep their current value
    pub fn apply(&mut self, stats: &StatOverride) {
        if let Some(cost) = stats.cost {
            self.cost = Some(cost);
        }
        if let Some(attack) = stats.attack {
            self.attack = Some(attack);
        }
        if let Some(health) = stats.health {
            self.health = Some(health);
        }
    }

    pub fn stat(&self, kind: StatKind) -> Option<i32> {
        match kind {
            StatKind::Cost => self.cost,
            StatKind::Attack => self.attack,
            StatKind::Health => self.health,
        }
    }

    pub fn trend(&self, kind: StatKind) -> StatTrend {
        match (self.stat(kind), self.base.get(kind)) {
            (Some(current), Some(base)) if current > base => StatTrend::Raised,
            (Some(current), Some(base)) if current < base => StatTrend::Lowered,
            _ => StatTrend::Unchanged,
        }
    }
}

/// Immutable view handed to consumers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingSnapshot {
    /// Highest entity id first
    pub offerings: Vec<CardOffering>,
    /// Entity id of the lower-dbfId card, only when two are offered
    pub recommended: Option<u64>,
}

impl OfferingSnapshot {
    pub fn new(offerings: Vec<CardOffering>) -> Self {
        let recommended = recommend(&offerings);
        Self {
            offerings,
            recommended,
        }
    }

    pub fn is_recommended(&self, offering: &CardOffering) -> bool {
        self.recommended == Some(offering.entity_id)
    }
}

/// First offering wins only with a strictly lower dbfId; ties go to the second
fn recommend(offerings: &[CardOffering]) -> Option<u64> {
    let [first, second] = offerings else {
        return None;
    };
    let (first_dbf, second_dbf) = (first.dbf_id?, second.dbf_id?);

    if first_dbf < second_dbf {
        Some(first.entity_id)
    } else {
        Some(second.entity_id)
    }
}

#[derive(Debug, Default)]
pub struct OfferingTracker {
    candidates: Vec<CardOffering>,
}

impl OfferingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a collectible entity announcement into the candidate set.
    /// Callers filter out non-collectible card ids beforehand.
    pub fn consider(
        &mut self,
        entity_id: u64,
        card_id: &str,
        name: &str,
        catalog: &CardCatalog,
        ledger: &StatLedger,
    ) {
        let mut offering = CardOffering::new(entity_id, card_id, name, catalog);
        if let Some(stats) = ledger.lookup(entity_id) {
            offering.apply(stats);
        }

        match self.candidates.iter_mut().find(|c| c.entity_id == entity_id) {
            Some(existing) => *existing = offering,
            None => self.candidates.push(offering),
        }

        self.candidates.sort_by(|a, b| b.entity_id.cmp(&a.entity_id));
        self.candidates.truncate(MAX_OFFERINGS);
        self.refresh(ledger);
    }

    /// Re-apply the freshest overrides to every held candidate
    pub fn refresh(&mut self, ledger: &StatLedger) {
        for offering in &mut self.candidates {
            if let Some(stats) = ledger.lookup(offering.entity_id) {
                offering.apply(stats);
            }
        }
    }

    pub fn contains(&self, entity_id: u64) -> bool {
        self.candidates.iter().any(|c| c.entity_id == entity_id)
    }

    pub fn snapshot(&self) -> OfferingSnapshot {
        OfferingSnapshot::new(self.candidates.clone())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}
