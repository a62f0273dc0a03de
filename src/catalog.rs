//! Reference card catalog - static card data loaded once at startup
//!
//! The dataset is a JSON object mapping a set name to an array of card
//! records. Only `cardId` and `dbfId` are required per record.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One card template from the reference dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCard {
    #[serde(rename = "cardId")]
    pub card_id: String,
    #[serde(rename = "dbfId")]
    pub dbf_id: u32,
    #[serde(default)]
    pub collectible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
}

/// Immutable lookup table keyed by `cardId`
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: HashMap<String, ReferenceCard>,
    collectible: HashSet<String>,
}

impl CardCatalog {
    /// Load the catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read card dataset {}", path.display()))?;
        let catalog = Self::from_json_str(&content)
            .with_context(|| format!("malformed card dataset {}", path.display()))?;

        info!(
            path = %path.display(),
            cards = catalog.len(),
            collectible = catalog.collectible_count(),
            "Card catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse the `{ "<set>": [card, ...], ... }` layout
    pub fn from_json_str(content: &str) -> Result<Self> {
        // BTreeMap keeps set iteration deterministic for duplicate resolution
        let sets: BTreeMap<String, Vec<ReferenceCard>> = serde_json::from_str(content)?;
        Ok(Self::from_cards(sets.into_values().flatten()))
    }

    /// Build from already-parsed cards. The first record for a `cardId` wins.
    pub fn from_cards(cards: impl IntoIterator<Item = ReferenceCard>) -> Self {
        let mut catalog = Self::default();

        for card in cards {
            if catalog.cards.contains_key(&card.card_id) {
                warn!(card_id = %card.card_id, "Duplicate cardId in dataset, keeping first entry");
                continue;
            }
            if card.collectible {
                catalog.collectible.insert(card.card_id.clone());
            }
            catalog.cards.insert(card.card_id.clone(), card);
        }

        catalog
    }

    pub fn get(&self, card_id: &str) -> Option<&ReferenceCard> {
        self.cards.get(card_id)
    }

    pub fn dbf_id(&self, card_id: &str) -> Option<u32> {
        self.get(card_id).map(|c| c.dbf_id)
    }

    /// Allow-list check used to decide whether an entity can be an offering
    pub fn is_collectible(&self, card_id: &str) -> bool {
        self.collectible.contains(card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn collectible_count(&self) -> usize {
        self.collectible.len()
    }
}
