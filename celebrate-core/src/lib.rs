//! Core of the celebrate toolkit.
//!
//! - `date`: recurring-date arithmetic for yearly celebrations
//! - `store`: the celebration list, its reducer and the effect queue
//! - `scheduler`: one yearly reminder per celebration, through a `Notifier`
//! - `storage` / `notifier`: the persistence and notification collaborators

pub mod celebration;
pub mod clock;
pub mod config;
pub mod custom_types;
pub mod date;
pub mod error;
pub mod language;
pub mod notifier;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use celebration::*;
pub use error::{CelebrateError, CelebrateResult};
