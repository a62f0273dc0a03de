//! Line classifier - extracts typed events from one zone log line
//!
//! Three independent patterns are tried against every line. A line can
//! produce none, one, or several events.

use regex::Regex;
use std::sync::LazyLock;

use crate::ledger::StatKind;

static TAG_CHANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"name=([^\]]+).*?tag=(\S+) value=(\S+)").expect("valid regex"));

static STAT_CHANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"id=(\d+).*?tag=(COST|HEALTH|ATK) value=(\d+) DEF CHANGE").expect("valid regex")
});

static ENTITY_INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=(\d+) cardId=(\S+) name=([^\]]+)").expect("valid regex"));

/// An actor's tag was set to a new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChange {
    pub name: String,
    pub tag: String,
    pub value: String,
}

impl TagChange {
    /// `"<name> | <tag> (<value>)"`
    pub fn format_record(&self) -> String {
        format!("{} | {} ({})", self.name, self.tag, self.value)
    }
}

/// A cost/attack/health correction for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    pub entity_id: u64,
    pub kind: StatKind,
    pub value: i32,
}

/// An entity announced together with its card template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    pub entity_id: u64,
    pub card_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    TagChange(TagChange),
    StatChange(StatChange),
    EntityInfo(EntityInfo),
}

/// Run every extractor over `line`, in tag / stat / entity order
pub fn classify(line: &str) -> Vec<LineEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut events = Vec::new();

    if let Some(change) = parse_tag_change(line) {
        events.push(LineEvent::TagChange(change));
    }
    if let Some(change) = parse_stat_change(line) {
        events.push(LineEvent::StatChange(change));
    }
    if let Some(info) = parse_entity_info(line) {
        events.push(LineEvent::EntityInfo(info));
    }

    events
}

pub fn parse_tag_change(line: &str) -> Option<TagChange> {
    let caps = TAG_CHANGE_RE.captures(line)?;
    Some(TagChange {
        name: caps[1].to_string(),
        tag: caps[2].to_string(),
        value: caps[3].to_string(),
    })
}

pub fn parse_stat_change(line: &str) -> Option<StatChange> {
    let caps = STAT_CHANGE_RE.captures(line)?;
    Some(StatChange {
        entity_id: caps[1].parse().ok()?,
        kind: caps[2].parse().ok()?,
        value: caps[3].parse().ok()?,
    })
}

pub fn parse_entity_info(line: &str) -> Option<EntityInfo> {
    let caps = ENTITY_INFO_RE.captures(line)?;
    Some(EntityInfo {
        entity_id: caps[1].parse().ok()?,
        card_id: caps[2].to_string(),
        name: caps[3].trim().to_string(),
    })
}
