//! CLI command handling

pub mod card;
pub mod output;
pub mod replay;
pub mod watch;

pub use card::*;
pub use output::*;
pub use replay::*;
pub use watch::*;
