//! Navigation for Okul Koçu
//!
//! This module provides:
//! - The screen set and the per-role route table
//! - Slide-out menu entries per role
//! - Root view selection from the session
//! - A navigation stack that refuses screens the role cannot reach

use app_state::{SessionPhase, SessionSnapshot};
use okul_client::Role;
use serde::{Deserialize, Serialize};

// =============================================================================
// Screens
// =============================================================================

/// Screens shown before login
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthScreen {
    /// School code entry
    #[default]
    SchoolSelect,
    /// Username and password
    Login,
}

impl AuthScreen {
    /// Screen after this one, if any
    pub fn next(&self) -> Option<AuthScreen> {
        match self {
            AuthScreen::SchoolSelect => Some(AuthScreen::Login),
            AuthScreen::Login => None,
        }
    }
}

/// Screens shown after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    // Admin
    /// Admin profile and overview
    AdminDashboard,

    // Teacher
    /// Teacher profile
    TeacherDashboard,
    /// Weekly schedule
    TeacherSchedule,
    /// Roster of one lesson
    AttendanceResults,
    /// Homework assignment form
    HomeworkAssignment,
    /// Homework the teacher has assigned
    HomeworksGivenList,
    /// One assigned homework
    HomeworkGivenDetail,

    // Parent
    /// Student profile
    ParentDashboard,
    /// Student's homework
    StudentHomeworkList,
    /// One homework item
    StudentHomeworkDetail,
    /// Student's attendance history
    StudentAbsences,

    // Shared
    /// Teacher directory
    TeachersList,
    /// Student directory
    StudentsList,
    /// Class and date selection before attendance
    AttendanceStart,
}

impl Screen {
    /// Route name
    pub fn name(&self) -> &'static str {
        match self {
            Screen::AdminDashboard => "AdminDashboard",
            Screen::TeacherDashboard => "TeacherDashboard",
            Screen::TeacherSchedule => "TeacherSchedule",
            Screen::AttendanceResults => "AttendanceResults",
            Screen::HomeworkAssignment => "HomeworkAssignment",
            Screen::HomeworksGivenList => "HomeworksGivenList",
            Screen::HomeworkGivenDetail => "HomeworkGivenDetail",
            Screen::ParentDashboard => "ParentDashboard",
            Screen::StudentHomeworkList => "StudentHomeworkList",
            Screen::StudentHomeworkDetail => "StudentHomeworkDetail",
            Screen::StudentAbsences => "StudentAbsences",
            Screen::TeachersList => "TeachersList",
            Screen::StudentsList => "StudentsList",
            Screen::AttendanceStart => "AttendanceStart",
        }
    }
}

// =============================================================================
// Route Table
// =============================================================================

const ADMIN_ROUTES: &[Screen] = &[
    Screen::AdminDashboard,
    Screen::TeachersList,
    Screen::StudentsList,
    Screen::AttendanceStart,
];

const TEACHER_ROUTES: &[Screen] = &[
    Screen::TeacherDashboard,
    Screen::TeacherSchedule,
    Screen::TeachersList,
    Screen::StudentsList,
    Screen::AttendanceStart,
    Screen::AttendanceResults,
    Screen::HomeworkAssignment,
    Screen::HomeworksGivenList,
    Screen::HomeworkGivenDetail,
];

const PARENT_ROUTES: &[Screen] = &[
    Screen::ParentDashboard,
    Screen::StudentHomeworkList,
    Screen::StudentHomeworkDetail,
    Screen::StudentAbsences,
];

/// Screens reachable by a role; the first one is its landing screen
pub fn routes_for_role(role: Role) -> &'static [Screen] {
    match role {
        Role::Admin => ADMIN_ROUTES,
        Role::Teacher => TEACHER_ROUTES,
        Role::Parent => PARENT_ROUTES,
    }
}

/// Landing screen after login
pub fn initial_screen(role: Role) -> Screen {
    match role {
        Role::Admin => Screen::AdminDashboard,
        Role::Teacher => Screen::TeacherDashboard,
        Role::Parent => Screen::ParentDashboard,
    }
}

/// Whether `role` may open `screen`
pub fn can_access(role: Role, screen: Screen) -> bool {
    routes_for_role(role).contains(&screen)
}

// =============================================================================
// Slide-out Menu
// =============================================================================

/// Entry of the slide-out menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Stable item name
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Screen opened by the item
    pub target: Screen,
}

const fn item(name: &'static str, label: &'static str, target: Screen) -> MenuItem {
    MenuItem { name, label, target }
}

const ADMIN_MENU: &[MenuItem] = &[
    item("Dashboard", "🏠 Ana Sayfa", Screen::AdminDashboard),
    item("TeachersList", "👩‍🏫 Öğretmenler", Screen::TeachersList),
    item("StudentsList", "👨‍🎓 Öğrenciler", Screen::StudentsList),
    item("Users", "👥 Kullanıcı Yönetimi", Screen::AdminDashboard),
    item("Schools", "🏫 Okul Yönetimi", Screen::AdminDashboard),
    item("Attendance", "✅ Yoklama", Screen::AttendanceStart),
    item("Reports", "📊 Raporlar", Screen::AdminDashboard),
];

const TEACHER_MENU: &[MenuItem] = &[
    item("Profile", "🏠 Profil", Screen::TeacherDashboard),
    item("Schedule", "📅 Ders Programı", Screen::TeacherSchedule),
    item("TeachersList", "👩‍🏫 Öğretmenler", Screen::TeachersList),
    item("StudentsList", "👨‍🎓 Öğrenciler", Screen::StudentsList),
    item("Classes", "📚 Derslerim", Screen::TeacherDashboard),
    item("Attendance", "✅ Yoklama", Screen::AttendanceStart),
    item("HomeworksGiven", "📚 Verdiğim Ödevler", Screen::HomeworksGivenList),
    item("Messages", "💬 Mesajlar", Screen::TeacherDashboard),
];

const PARENT_MENU: &[MenuItem] = &[
    item("Student", "🏠 Öğrenci Bilgileri", Screen::ParentDashboard),
    item("Homework", "📚 Ödevlerim", Screen::StudentHomeworkList),
    item("Absences", "📊 Devamsızlık Geçmişi", Screen::StudentAbsences),
    item("Messages", "💬 Mesajlar", Screen::ParentDashboard),
];

/// Slide-out menu entries for a role
pub fn menu_items(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Teacher => TEACHER_MENU,
        Role::Parent => PARENT_MENU,
    }
}

/// Menu header for a role
pub fn role_title(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin Paneli",
        Role::Teacher => "Öğretmen Paneli",
        Role::Parent => "Veli Paneli",
    }
}

// =============================================================================
// Root View
// =============================================================================

/// Top-level view chosen from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootView {
    /// Session restore still running
    Splash,
    /// Login flow
    Auth,
    /// Screens of a role
    App(Role),
}

impl RootView {
    /// Pick the view for `session`
    pub fn resolve(session: &SessionSnapshot, loading: bool) -> Self {
        if loading {
            return RootView::Splash;
        }
        match (session.phase, session.role) {
            (SessionPhase::Authenticated, Some(role)) if session.is_authenticated() => {
                RootView::App(role)
            }
            _ => RootView::Auth,
        }
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The screen
    pub screen: Screen,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(screen: Screen) -> Self {
        Self { screen, key: uuid::Uuid::new_v4().to_string() }
    }
}

/// Screen history of a logged-in role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationStack {
    role: Role,
    /// Stack entries (bottom to top), never empty
    entries: Vec<StackEntry>,
}

impl NavigationStack {
    /// Stack rooted at the role's landing screen
    pub fn new(role: Role) -> Self {
        Self { role, entries: vec![StackEntry::new(initial_screen(role))] }
    }

    /// Role the stack belongs to
    pub fn role(&self) -> Role {
        self.role
    }

    /// Push a screen; returns false if the role cannot reach it
    pub fn push(&mut self, screen: Screen) -> bool {
        if !can_access(self.role, screen) {
            tracing::warn!(role = %self.role, screen = screen.name(), "navigation refused");
            return false;
        }
        self.entries.push(StackEntry::new(screen));
        true
    }

    /// Go to a screen, returning to it if it is already on the stack
    pub fn navigate(&mut self, screen: Screen) -> bool {
        match self.entries.iter().rposition(|e| e.screen == screen) {
            Some(index) => {
                self.entries.truncate(index + 1);
                true
            }
            None => self.push(screen),
        }
    }

    /// Pop the top screen (returns true if popped, false if at root)
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Current (top) screen
    pub fn current(&self) -> Screen {
        self.entries.last().map(|e| e.screen).unwrap_or_else(|| initial_screen(self.role))
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    /// Reset to a single screen; returns false if the role cannot reach it
    pub fn reset(&mut self, screen: Screen) -> bool {
        if !can_access(self.role, screen) {
            return false;
        }
        self.entries = vec![StackEntry::new(screen)];
        true
    }
}
