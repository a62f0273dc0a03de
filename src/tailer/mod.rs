//! Log tailing subsystem - follows the zone log and emits snapshots

mod fingerprint;
mod follower;
mod wait;
mod worker;

pub use follower::{FollowRead, LogFollower, Rotation};
pub use wait::{PollWait, WaitStrategy, DEFAULT_POLL_INTERVAL};
pub use worker::{Tailer, TailerEvent, TailerEvents, TailerOptions, DEFAULT_MAX_READ_FAILURES};
