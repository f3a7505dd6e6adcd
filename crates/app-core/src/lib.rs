//! Core application logic for Okul Koçu
//!
//! This crate contains the screen-level logic for login, dashboards,
//! directories, attendance, schedules, homework and absences.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod absences;
pub mod attendance;
pub mod auth;
pub mod context;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod homework;
pub mod load;
pub mod logging;
pub mod schedule;

pub use absences::{AbsenceHistory, StudentRef};
pub use attendance::{AttendanceSheet, AttendanceStart};
pub use auth::AuthService;
pub use context::AppContext;
pub use dashboard::{DashboardService, ProfileCard};
pub use directory::{StudentDirectory, TeacherDirectory};
pub use error::{Error, Result};
pub use homework::{HomeworkForm, HomeworkService, StudentHomework};
pub use load::LoadState;
pub use logging::init_logging;
pub use schedule::{DaySchedule, ScheduleService};
