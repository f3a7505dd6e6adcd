//! Typed endpoint wrappers
//!
//! [`SchoolApi`] is the surface screens call. Each method builds an
//! [`ApiRequest`], sends it through the shared [`ApiClient`] and decodes the
//! response into the matching DTO.

use crate::http::{ApiClient, ApiRequest, FormField};
use crate::models::{
    AbsenceRecord, AttendanceQuery, AttendanceRecord, ClassInfo, Extra, HomeworkItem, IdBody,
    Lesson, LessonsBody, LoginRequest, LoginResponse, PageBody, RosterEntry, Role,
    StudentHomeworkBody, StudentIdBody, Student, Teacher, UserInfo,
};
use crate::photo::PhotoResolver;
use crate::{ApiError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted
    Success {
        /// Access token
        token: String,
        /// Refresh token, if issued
        refresh_token: Option<String>,
        /// Role derived from the `rol` code
        role: Role,
    },
    /// The backend answered `false`
    InvalidCredentials,
}

/// Endpoint wrappers over a shared [`ApiClient`]
#[derive(Debug, Clone)]
pub struct SchoolApi {
    client: Arc<ApiClient>,
}

impl SchoolApi {
    /// Wrap a client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Underlying client
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Photo resolver using this client's hosts
    pub fn photos(&self) -> PhotoResolver {
        PhotoResolver::from_config(self.client.config())
    }

    /// Log in with a user name and password
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let request = ApiRequest::post("/user/login")
            .json_body(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })?
            .public();

        let body = match self.client.execute(&request).await {
            Ok(response) => response.data,
            Err(ApiError::Http { message, .. }) if message.trim() == "false" => {
                return Ok(LoginOutcome::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("/user/login: {e}")))?;
        if value == serde_json::Value::Bool(false) {
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let login: LoginResponse = serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("/user/login: {e}")))?;
        Ok(LoginOutcome::Success {
            token: login.token,
            refresh_token: login.refresh_token,
            role: Role::from_code(&login.rol),
        })
    }

    /// Profile of the logged-in user
    pub async fn user_info(&self) -> Result<UserInfo> {
        let info: UserInfo = self.post("/user/info", None::<&()>).await?;
        log_extra("/user/info", &info.extra);
        Ok(info)
    }

    /// All students visible to the user
    pub async fn all_students(&self) -> Result<Vec<Student>> {
        let students: Vec<Student> = self.post("/student/all", None::<&()>).await?;
        for s in &students {
            log_extra("/student/all", &s.extra);
        }
        Ok(students)
    }

    /// All classes
    pub async fn all_classes(&self) -> Result<Vec<ClassInfo>> {
        self.post("/student/classall", None::<&()>).await
    }

    /// Attendance history of a student
    pub async fn student_attendance(&self, student_id: i64) -> Result<Vec<AbsenceRecord>> {
        let records: Vec<AbsenceRecord> =
            self.post("/student/attendance", Some(&StudentIdBody { student_id })).await?;
        for r in &records {
            log_extra("/student/attendance", &r.extra);
        }
        Ok(records)
    }

    /// Homework assigned to a student
    pub async fn student_homework(
        &self,
        student_id: i64,
        class_name: Option<&str>,
    ) -> Result<Vec<HomeworkItem>> {
        let body = StudentHomeworkBody { student_id, class_name: class_name.map(str::to_string) };
        let items: Vec<HomeworkItem> = self.post("/student/homework", Some(&body)).await?;
        for item in &items {
            log_extra("/student/homework", &item.extra);
        }
        Ok(items)
    }

    /// One page of teachers (1-based)
    pub async fn teachers(&self, page: u32, limit: u32) -> Result<Vec<Teacher>> {
        let teachers: Vec<Teacher> =
            self.post("/teacher/allteacher", Some(&PageBody { page, limit })).await?;
        for t in &teachers {
            log_extra("/teacher/allteacher", &t.extra);
        }
        Ok(teachers)
    }

    /// Lessons of a class on a date
    pub async fn lessons_for_date(&self, class_name: &str, date: NaiveDate) -> Result<Vec<Lesson>> {
        let body = LessonsBody {
            class_name: class_name.to_string(),
            tarih: date.format("%Y-%m-%d").to_string(),
        };
        self.post("/teacher/dersler", Some(&body)).await
    }

    /// Roster for one lesson
    pub async fn attendance_roster(&self, query: &AttendanceQuery) -> Result<Vec<RosterEntry>> {
        self.post("/teacher/attendance", Some(query)).await
    }

    /// Record one student's attendance status
    pub async fn add_attendance(&self, record: &AttendanceRecord) -> Result<()> {
        let request = ApiRequest::post("/teacher/attendanceadd").json_body(record)?;
        self.client.send_empty(&request).await?;
        Ok(())
    }

    /// Assign homework from multipart form fields
    pub async fn assign_homework(&self, fields: Vec<FormField>) -> Result<()> {
        if fields.is_empty() {
            return Err(ApiError::InvalidInput("homework form has no fields".into()));
        }
        let request = ApiRequest::post("/teacher/homework").multipart(fields);
        self.client.send_empty(&request).await?;
        Ok(())
    }

    /// Weekly schedule of a teacher
    pub async fn teacher_schedule(&self, teacher_id: i64) -> Result<Vec<Lesson>> {
        self.post("/schedule/getteacher", Some(&IdBody { id: teacher_id })).await
    }

    async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = match body {
            Some(body) => ApiRequest::post(path).json_body(body)?,
            None => ApiRequest::post(path).json_body(&serde_json::json!({}))?,
        };
        Ok(self.client.send_json::<T>(&request).await?.data)
    }
}

fn log_extra(path: &str, extra: &Extra) {
    if !extra.is_empty() {
        let keys: Vec<&str> = extra.keys().map(String::as_str).collect();
        tracing::debug!(path, ?keys, "response carried unrecognized fields");
    }
}
