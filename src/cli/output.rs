//! Output formatting for CLI commands

use serde::Serialize;

use crate::ledger::StatKind;
use crate::offering::{CardOffering, OfferingSnapshot, StatTrend};
use crate::tailer::TailerEvent;

/// Format output as pretty JSON or plain text based on --json flag
pub fn format_output<T: Serialize + std::fmt::Debug>(data: &T, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
    } else {
        format!("{:#?}", data)
    }
}

fn format_stat(offering: &CardOffering, kind: StatKind) -> String {
    let Some(value) = offering.stat(kind) else {
        return "?".to_string();
    };
    match offering.trend(kind) {
        StatTrend::Raised => format!("{}+", value),
        StatTrend::Lowered => format!("{}-", value),
        StatTrend::Unchanged => value.to_string(),
    }
}

/// `(64) * Chillwind Yeti ID: CS2_182, (4, 4, 5)`; `*` marks the recommended pick
pub fn format_offering(offering: &CardOffering, recommended: bool) -> String {
    let marker = if recommended { "* " } else { "" };
    format!(
        "({}) {}{} ID: {}, ({}, {}, {})",
        offering.entity_id,
        marker,
        offering.name,
        offering.card_id,
        format_stat(offering, StatKind::Cost),
        format_stat(offering, StatKind::Attack),
        format_stat(offering, StatKind::Health),
    )
}

pub fn format_offerings(snapshot: &OfferingSnapshot) -> String {
    if snapshot.offerings.is_empty() {
        return "Waiting for card offerings...".to_string();
    }
    snapshot
        .offerings
        .iter()
        .map(|o| format_offering(o, snapshot.is_recommended(o)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_history(history: &[String]) -> String {
    if history.is_empty() {
        return "No tag changes yet".to_string();
    }
    history.join("\n")
}

/// One event as a JSON line or as human-readable text
pub fn format_event(event: &TailerEvent, json: bool) -> String {
    if json {
        return serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    }

    match event {
        TailerEvent::Attached { path, at } => format!(
            "Following {} since {}",
            path.display(),
            at.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        TailerEvent::OfferingsChanged { snapshot } => {
            format!("== Offerings ==\n{}", format_offerings(snapshot))
        }
        TailerEvent::TagHistoryChanged { history } => {
            format!("== Tag changes ==\n{}", format_history(history))
        }
        TailerEvent::Rotated { reason } => format!("Log file {}, session reset", reason),
        TailerEvent::Failed { error } => format!("Stopped following: {}", error),
        TailerEvent::Stopped => "Stopped".to_string(),
    }
}
