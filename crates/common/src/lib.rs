// # -----------------------------
// # crates/common/src/lib.rs
// # -----------------------------
pub mod actor;
pub mod clock;
pub mod config;
pub mod fs;

pub use actor::{Actor, Principal};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ActlogConfig, ConfigSource, ResolvedConfig};
