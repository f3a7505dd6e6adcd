//! Role dashboards
//!
//! Admin and teacher dashboards show the logged-in user's profile; the parent
//! dashboard shows the first student record visible to the account.

use crate::error::Error;
use crate::load::LoadState;
use app_state::SessionStore;
use chrono::{DateTime, NaiveDate};
use okul_client::models::{parse_date_prefix, Gender, Student, UserInfo};
use okul_client::{PhotoResolver, SchoolApi};
use std::sync::Arc;

/// Shown when the logged-in user's profile cannot be loaded
pub const PROFILE_ERROR: &str = "Kullanıcı bilgileri alınamadı. Lütfen tekrar giriş yapın.";

/// Format a backend date as `dd.MM.yyyy`
pub fn format_date_tr(raw: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| parse_date_prefix(raw))?;
    Some(date.format("%d.%m.%Y").to_string())
}

/// Whether the person is shown as an adult or a student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Staff
    Adult,
    /// Student
    Child,
}

/// Gender label; missing values read as female like `false`
pub fn gender_label(gender: Option<Gender>, audience: Audience) -> &'static str {
    let gender = gender.unwrap_or(Gender::Female);
    match audience {
        Audience::Adult => gender.adult_label(),
        Audience::Child => gender.child_label(),
    }
}

/// Display-ready profile header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    /// Full name
    pub name: String,
    /// Photo URL
    pub photo_url: Option<String>,
    /// Gender label
    pub gender: &'static str,
    /// Birth date as `dd.MM.yyyy`
    pub birth_date: Option<String>,
}

impl ProfileCard {
    /// Card for a staff profile
    pub fn for_user(info: &UserInfo, photos: &PhotoResolver) -> Self {
        Self {
            name: info.full_name.clone().unwrap_or_default(),
            photo_url: photos.resolve(info.photo.as_deref()),
            gender: gender_label(info.gender, Audience::Adult),
            birth_date: info.birth_date.as_deref().and_then(format_date_tr),
        }
    }

    /// Card for a student
    pub fn for_student(student: &Student, photos: &PhotoResolver) -> Self {
        Self {
            name: student.full_name.clone(),
            photo_url: photos.resolve(student.photo.as_deref()),
            gender: gender_label(student.gender, Audience::Child),
            birth_date: student.birth_date.as_deref().and_then(format_date_tr),
        }
    }
}

/// Loads dashboard data for each role
#[derive(Debug, Clone)]
pub struct DashboardService {
    api: SchoolApi,
    session: Arc<SessionStore>,
}

impl DashboardService {
    /// Create a new dashboard service
    pub fn new(api: SchoolApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Photo resolver for the configured hosts
    pub fn photos(&self) -> PhotoResolver {
        self.api.photos()
    }

    /// Admin profile
    pub async fn load_admin(&self) -> LoadState<UserInfo> {
        match self.api.user_info().await {
            Ok(info) => LoadState::Loaded(info),
            Err(e) => LoadState::failed("admin dashboard", &Error::from(e)),
        }
    }

    /// Teacher profile; the session is cleared when it cannot be loaded
    pub async fn load_teacher(&self) -> LoadState<UserInfo> {
        match self.api.user_info().await {
            Ok(info) => LoadState::Loaded(info),
            Err(e) => {
                tracing::warn!("teacher dashboard failed, ending session: {}", e);
                self.session.clear_session().await;
                LoadState::Failed(PROFILE_ERROR.to_string())
            }
        }
    }

    /// First student visible to the parent account
    pub async fn load_parent(&self) -> LoadState<Student> {
        match self.api.all_students().await {
            Ok(students) => match students.into_iter().next() {
                Some(student) => LoadState::Loaded(student),
                None => LoadState::Empty,
            },
            Err(e) => LoadState::failed("parent dashboard", &Error::from(e)),
        }
    }
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
