//! ToT Solver - follows a game client's zone log and tracks the live
//! two-card draft offering, its corrected stats, and recent tag changes.

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod history;
pub mod ledger;
pub mod offering;
pub mod session;
pub mod tailer;

pub use catalog::{CardCatalog, ReferenceCard};
pub use classifier::{classify, EntityInfo, LineEvent, StatChange, TagChange};
pub use config::TrackerConfig;
pub use history::{TagHistory, HISTORY_CAPACITY};
pub use ledger::{StatKind, StatLedger, StatOverride};
pub use offering::{CardOffering, OfferingSnapshot, OfferingTracker, StatTrend, MAX_OFFERINGS};
pub use session::{DraftSession, SessionUpdate};
pub use tailer::{LogFollower, PollWait, Tailer, TailerEvent, TailerEvents, TailerOptions, WaitStrategy};
