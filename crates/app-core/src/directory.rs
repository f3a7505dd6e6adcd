//! Student and teacher directories

use crate::error::Error;
use crate::load::LoadState;
use okul_client::models::{Student, Teacher};
use okul_client::SchoolApi;

/// Teachers fetched per page
pub const TEACHER_PAGE_SIZE: u32 = 20;

/// All students with a name filter
#[derive(Debug, Clone)]
pub struct StudentDirectory {
    api: SchoolApi,
    state: LoadState<Vec<Student>>,
    query: String,
}

impl StudentDirectory {
    /// Create an empty directory
    pub fn new(api: SchoolApi) -> Self {
        Self { api, state: LoadState::Idle, query: String::new() }
    }

    /// Fetch every student
    pub async fn load(&mut self) -> &LoadState<Vec<Student>> {
        self.state = match self.api.all_students().await {
            Ok(students) => LoadState::from_list(students),
            Err(e) => LoadState::failed("student directory", &Error::from(e)),
        };
        &self.state
    }

    /// Current load state
    pub fn state(&self) -> &LoadState<Vec<Student>> {
        &self.state
    }

    /// Set the search text
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Students whose name contains the search text, ignoring case
    pub fn visible(&self) -> Vec<&Student> {
        let Some(students) = self.state.data() else {
            return Vec::new();
        };
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return students.iter().collect();
        }
        students
            .iter()
            .filter(|s| s.full_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Message for an empty result
    pub fn empty_message(&self) -> &'static str {
        if self.query.trim().is_empty() {
            "Öğrenci bulunamadı."
        } else {
            "Arama kriterine uygun öğrenci bulunamadı."
        }
    }
}

/// Paged teacher list
#[derive(Debug, Clone)]
pub struct TeacherDirectory {
    api: SchoolApi,
    teachers: Vec<Teacher>,
    page: u32,
    has_more: bool,
    error: Option<String>,
}

impl TeacherDirectory {
    /// Create an empty directory
    pub fn new(api: SchoolApi) -> Self {
        Self { api, teachers: Vec::new(), page: 0, has_more: true, error: None }
    }

    /// Reload from the first page, replacing the list
    pub async fn refresh(&mut self) -> LoadState<&[Teacher]> {
        match self.fetch(1).await {
            Ok(batch) => {
                self.teachers = batch;
                self.page = 1;
            }
            Err(message) => {
                self.teachers.clear();
                self.page = 0;
                self.error = Some(message);
            }
        }
        self.state()
    }

    /// Append the next page if there is one
    pub async fn load_more(&mut self) -> LoadState<&[Teacher]> {
        if self.has_more {
            let next = self.page + 1;
            if let Ok(batch) = self.fetch(next).await {
                self.teachers.extend(batch);
                self.page = next;
            }
        }
        self.state()
    }

    async fn fetch(&mut self, page: u32) -> std::result::Result<Vec<Teacher>, String> {
        match self.api.teachers(page, TEACHER_PAGE_SIZE).await {
            Ok(batch) => {
                self.has_more = batch.len() == TEACHER_PAGE_SIZE as usize;
                self.error = None;
                tracing::debug!(page, count = batch.len(), "loaded teachers");
                Ok(batch)
            }
            Err(e) => {
                let err = Error::from(e);
                tracing::warn!(page, "teacher directory failed: {}", err);
                let message = err.user_message();
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }

    /// Current view of the list
    pub fn state(&self) -> LoadState<&[Teacher]> {
        if let Some(message) = &self.error {
            if self.teachers.is_empty() {
                return LoadState::Failed(message.clone());
            }
        }
        if self.page == 0 && self.error.is_none() {
            return LoadState::Idle;
        }
        if self.teachers.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded(&self.teachers)
        }
    }

    /// Whether another page may exist
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Last page loaded (0 before the first load)
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Error from the last fetch, kept while earlier pages stay visible
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
