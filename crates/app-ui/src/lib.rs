//! User interface layer for Okul Koçu
//!
//! Rendering is left to the host shell. This crate provides what every
//! screen shares: the per-role route table, the slide-out menu, root view
//! selection and the color palettes.
//!
//! # Modules
//!
//! - [`theme`] - Dark and light color palettes
//! - [`navigation`] - Screens, route gating, menu and navigation stack
//!
//! # Example
//!
//! ```rust
//! use app_ui::navigation::{can_access, initial_screen, Screen};
//! use okul_client::Role;
//!
//! assert_eq!(initial_screen(Role::Parent), Screen::ParentDashboard);
//! assert!(!can_access(Role::Parent, Screen::TeachersList));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod theme;

pub use navigation::{
    can_access, initial_screen, menu_items, role_title, routes_for_role, AuthScreen, MenuItem,
    NavigationStack, RootView, Screen, StackEntry,
};
pub use theme::{palette_for, Color, ThemePalette};
