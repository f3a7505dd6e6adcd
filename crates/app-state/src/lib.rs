//! Application state for Okul Koçu
//!
//! This crate holds the process-wide session and theme stores. Both persist
//! through the shared token store and notify registered observers on every
//! change.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod observer;
pub mod session;
pub mod theme;

pub use observer::{Observers, SubscriptionId};
pub use session::{
    SessionPayload, SessionPhase, SessionSnapshot, SessionStateError, SessionStore,
};
pub use theme::{ThemeMode, ThemeStore};
