//! Stat ledger - latest known cost/attack/health corrections per entity

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Stats that the log can correct with a `DEF CHANGE` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Cost,
    Attack,
    Health,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::Cost, StatKind::Attack, StatKind::Health];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Cost => "cost",
            StatKind::Attack => "attack",
            StatKind::Health => "health",
        }
    }
}

impl FromStr for StatKind {
    type Err = Error;

    /// Parses the log's tag names, not the display names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COST" => Ok(StatKind::Cost),
            "ATK" => Ok(StatKind::Attack),
            "HEALTH" => Ok(StatKind::Health),
            other => Err(anyhow!("unknown stat tag: {}", other)),
        }
    }
}

/// Sparse set of overrides for one entity. `None` means never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatOverride {
    pub cost: Option<i32>,
    pub attack: Option<i32>,
    pub health: Option<i32>,
}

impl StatOverride {
    pub fn get(&self, kind: StatKind) -> Option<i32> {
        match kind {
            StatKind::Cost => self.cost,
            StatKind::Attack => self.attack,
            StatKind::Health => self.health,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: i32) {
        let slot = match kind {
            StatKind::Cost => &mut self.cost,
            StatKind::Attack => &mut self.attack,
            StatKind::Health => &mut self.health,
        };
        *slot = Some(value);
    }

    pub fn is_overridden(&self, kind: StatKind) -> bool {
        self.get(kind).is_some()
    }

    /// Kinds that have been corrected at least once
    pub fn overridden(&self) -> Vec<StatKind> {
        StatKind::ALL
            .into_iter()
            .filter(|kind| self.is_overridden(*kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cost.is_none() && self.attack.is_none() && self.health.is_none()
    }
}

/// Entity id -> overrides. Keys are never pruned within a session.
#[derive(Debug, Default)]
pub struct StatLedger {
    overrides: HashMap<u64, StatOverride>,
}

impl StatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a single stat, leaving the entity's other stats untouched
    pub fn record(&mut self, entity_id: u64, kind: StatKind, value: i32) {
        self.overrides.entry(entity_id).or_default().set(kind, value);
    }

    pub fn lookup(&self, entity_id: u64) -> Option<&StatOverride> {
        self.overrides.get(&entity_id)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn clear(&mut self) {
        self.overrides.clear();
    }
}
