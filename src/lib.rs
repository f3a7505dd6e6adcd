//! Okul Koçu client core
//!
//! Re-exports the workspace crates under one name for hosts that embed the
//! whole stack.

pub use app_core;
pub use app_state;
pub use app_ui;
pub use okul_client;
pub use storage;
