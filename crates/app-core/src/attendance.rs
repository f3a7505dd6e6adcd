//! Attendance taking
//!
//! [`AttendanceStart`] picks a class and date and lists that day's lessons.
//! [`AttendanceSheet`] holds one lesson's roster and records a status per
//! student, one request per tap.

use crate::error::{Error, Result};
use crate::load::LoadState;
use crate::schedule;
use chrono::NaiveDate;
use okul_client::models::{
    AttendanceQuery, AttendanceRecord, ClassInfo, Lesson, RosterEntry,
};
use okul_client::{AttendanceStatus, SchoolApi};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Class and date selection before attendance
#[derive(Debug, Clone)]
pub struct AttendanceStart {
    api: SchoolApi,
    classes: LoadState<Vec<ClassInfo>>,
    selected: Option<ClassInfo>,
    date: NaiveDate,
    lessons: LoadState<Vec<Lesson>>,
}

impl AttendanceStart {
    /// Create with `date` preselected
    pub fn new(api: SchoolApi, date: NaiveDate) -> Self {
        Self {
            api,
            classes: LoadState::Idle,
            selected: None,
            date,
            lessons: LoadState::Idle,
        }
    }

    /// Fetch classes and preselect the first one
    pub async fn load_classes(&mut self) -> &LoadState<Vec<ClassInfo>> {
        self.classes = match self.api.all_classes().await {
            Ok(classes) => {
                self.selected = classes.first().cloned();
                if let Some(first) = &self.selected {
                    tracing::debug!(class = %first.name, "preselected first class");
                }
                LoadState::from_list(classes)
            }
            Err(e) => {
                self.selected = None;
                LoadState::failed("class list", &Error::from(e))
            }
        };
        &self.classes
    }

    /// Loaded classes
    pub fn classes(&self) -> &LoadState<Vec<ClassInfo>> {
        &self.classes
    }

    /// Select a class by code; unknown codes clear the selection
    pub fn select_class(&mut self, code: &str) -> bool {
        self.selected = self
            .classes
            .data()
            .and_then(|classes| classes.iter().find(|c| c.code == code))
            .cloned();
        if self.selected.is_none() {
            tracing::warn!(code, "selected class not found");
        }
        self.lessons = LoadState::Idle;
        self.selected.is_some()
    }

    /// Currently selected class
    pub fn selected_class(&self) -> Option<&ClassInfo> {
        self.selected.as_ref()
    }

    /// Change the date
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.lessons = LoadState::Idle;
    }

    /// Selected date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Fetch the selected class's lessons on the selected date
    pub async fn load_lessons(&mut self) -> Result<&LoadState<Vec<Lesson>>> {
        let class = self
            .selected
            .as_ref()
            .ok_or_else(|| Error::Validation("Sınıf seçilmedi".into()))?;

        self.lessons = match self.api.lessons_for_date(&class.name, self.date).await {
            Ok(lessons) => LoadState::from_list(lessons),
            Err(e) if e.is_auth_error() => return Err(e.into()),
            Err(e) => LoadState::failed("lesson list", &Error::from(e)),
        };
        Ok(&self.lessons)
    }

    /// Loaded lessons
    pub fn lessons(&self) -> &LoadState<Vec<Lesson>> {
        &self.lessons
    }

    /// Roster query for one of the listed lessons
    pub fn attendance_query(&self, lesson: &Lesson) -> Result<AttendanceQuery> {
        schedule::attendance_query(lesson, self.selected.as_ref().map(|c| c.name.as_str()), self.date)
    }
}

/// Roster of one lesson with per-row submission
#[derive(Debug)]
pub struct AttendanceSheet {
    api: SchoolApi,
    query: AttendanceQuery,
    roster: Mutex<Vec<RosterEntry>>,
    busy: Mutex<HashSet<i64>>,
}

/// Clears a row's busy flag when the submission ends
struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<i64>>,
    student_id: i64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.student_id);
    }
}

impl AttendanceSheet {
    /// Check the user is a teacher and load the roster
    pub async fn open(api: SchoolApi, query: AttendanceQuery) -> Result<Self> {
        let info = api.user_info().await?;
        if info.teacher_id.is_none() {
            return Err(Error::NotATeacher);
        }

        let roster = api.attendance_roster(&query).await?;
        tracing::info!(
            class = %query.class_name,
            program_id = query.program_id,
            students = roster.len(),
            "attendance roster loaded"
        );

        Ok(Self {
            api,
            query,
            roster: Mutex::new(roster),
            busy: Mutex::new(HashSet::new()),
        })
    }

    /// Lesson this sheet belongs to
    pub fn query(&self) -> &AttendanceQuery {
        &self.query
    }

    /// Current roster
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.roster.lock().clone()
    }

    /// Whether a submission for the student is in flight
    pub fn is_busy(&self, student_id: i64) -> bool {
        self.busy.lock().contains(&student_id)
    }

    /// Record a status for one student
    ///
    /// Sends a single request and, on success, updates only that student's
    /// row. A second call for the same student while the first is in flight
    /// fails with [`Error::AlreadySubmitting`].
    pub async fn submit_status(&self, student_id: i64, status: AttendanceStatus) -> Result<()> {
        if !self.roster.lock().iter().any(|e| e.student_id == student_id) {
            return Err(Error::Validation(format!("Öğrenci listede yok: {student_id}")));
        }
        if !self.busy.lock().insert(student_id) {
            return Err(Error::AlreadySubmitting(student_id));
        }
        let _guard = BusyGuard { busy: &self.busy, student_id };

        let record = AttendanceRecord {
            date: self.query.date.clone(),
            student_id,
            program_id: self.query.program_id,
            status,
        };
        if let Err(e) = self.api.add_attendance(&record).await {
            tracing::warn!(student_id, "attendance submission failed: {}", e);
            return Err(e.into());
        }

        let mut roster = self.roster.lock();
        for entry in roster.iter_mut().filter(|e| e.student_id == student_id) {
            entry.status = Some(status);
        }
        tracing::debug!(student_id, status = status.label(), "attendance recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okul_client::{ApiClient, ApiClientConfig, NoopAuthFailureHandler};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use storage::TokenStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> SchoolApi {
        let client = ApiClient::new(
            ApiClientConfig::new(server.uri()),
            Arc::new(TokenStore::in_memory()),
            Arc::new(NoopAuthFailureHandler),
        )
        .unwrap();
        SchoolApi::new(Arc::new(client))
    }

    fn query() -> AttendanceQuery {
        AttendanceQuery {
            class_name: "5-A".into(),
            date: "2025-09-02".into(),
            lesson_time: "08:30-09:10".into(),
            program_id: 5,
        }
    }

    async fn mount_teacher(server: &MockServer, info: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/user/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(info))
            .mount(server)
            .await;
    }

    async fn mount_roster(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/teacher/attendance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"OgrenciId": 34, "AdSoyad": "Ali Yılmaz"},
                {"OgrenciId": 35, "AdSoyad": "Ayşe Demir"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_start_preselects_first_class() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/student/classall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"SinifKodu": "5A", "SinifAdi": "5-A"},
                {"SinifKodu": "6B", "SinifAdi": "6-B"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/teacher/dersler"))
            .and(body_json(json!({"Sinif": "6-B", "tarih": "2025-09-03"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"ProgramID": 9, "DersSaati": "10:00-10:40"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
        let mut start = AttendanceStart::new(api(&server), date);
        start.load_classes().await;
        assert_eq!(start.selected_class().map(|c| c.name.as_str()), Some("5-A"));

        assert!(start.select_class("6B"));
        start.set_date(date.succ_opt().unwrap());
        let lessons = start.load_lessons().await.unwrap().data().cloned().unwrap();

        let q = start.attendance_query(&lessons[0]).unwrap();
        assert_eq!(q.class_name, "6-B");
        assert_eq!(q.date, "2025-09-03");
        assert_eq!(q.program_id, 9);
    }

    #[tokio::test]
    async fn test_unknown_class_clears_selection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/student/classall"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"SinifKodu": "5A", "SinifAdi": "5-A"}])),
            )
            .mount(&server)
            .await;

        let mut start = AttendanceStart::new(api(&server), NaiveDate::from_ymd_opt(2025, 9, 2).unwrap());
        start.load_classes().await;

        assert!(!start.select_class("9Z"));
        assert!(start.selected_class().is_none());
        assert!(matches!(start.load_lessons().await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_open_requires_teacher() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"AdSoyad": "Yönetici"})).await;

        let err = AttendanceSheet::open(api(&server), query()).await.unwrap_err();
        assert_eq!(err, Error::NotATeacher);
    }

    #[tokio::test]
    async fn test_submit_updates_only_that_row() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"OgretmenID": 7})).await;
        mount_roster(&server).await;
        Mock::given(method("POST"))
            .and(path("/teacher/attendanceadd"))
            .and(body_json(json!({"tarih": "2025-09-02", "OgrenciID": 34, "ProgramID": 5, "durum": 2})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sheet = AttendanceSheet::open(api(&server), query()).await.unwrap();
        sheet.submit_status(34, AttendanceStatus::Late).await.unwrap();

        let roster = sheet.roster();
        assert_eq!(roster[0].status, Some(AttendanceStatus::Late));
        assert_eq!(roster[1].status, None);
        assert!(!sheet.is_busy(34));
    }

    #[tokio::test]
    async fn test_submit_sends_query_date_unchanged() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"OgretmenID": 7})).await;
        mount_roster(&server).await;
        Mock::given(method("POST"))
            .and(path("/teacher/attendanceadd"))
            .and(body_json(json!({"tarih": "02.09.2025", "OgrenciID": 35, "ProgramID": 5, "durum": 0})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut q = query();
        q.date = "02.09.2025".into();
        let sheet = AttendanceSheet::open(api(&server), q).await.unwrap();
        sheet.submit_status(35, AttendanceStatus::Absent).await.unwrap();

        assert_eq!(sheet.roster()[1].status, Some(AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn test_duplicate_tap_is_rejected() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"OgretmenID": 7})).await;
        mount_roster(&server).await;
        Mock::given(method("POST"))
            .and(path("/teacher/attendanceadd"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let sheet = AttendanceSheet::open(api(&server), query()).await.unwrap();
        let (first, second) = tokio::join!(
            sheet.submit_status(35, AttendanceStatus::Present),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                sheet.submit_status(35, AttendanceStatus::Absent).await
            }
        );

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), Error::AlreadySubmitting(35));
        assert_eq!(sheet.roster()[1].status, Some(AttendanceStatus::Present));
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_row_and_releases_flag() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"OgretmenID": 7})).await;
        mount_roster(&server).await;
        Mock::given(method("POST"))
            .and(path("/teacher/attendanceadd"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sheet = AttendanceSheet::open(api(&server), query()).await.unwrap();
        assert!(sheet.submit_status(34, AttendanceStatus::Absent).await.is_err());
        assert_eq!(sheet.roster()[0].status, None);
        assert!(!sheet.is_busy(34));
    }

    #[tokio::test]
    async fn test_unknown_student_is_rejected() {
        let server = MockServer::start().await;
        mount_teacher(&server, json!({"OgretmenID": 7})).await;
        mount_roster(&server).await;

        let sheet = AttendanceSheet::open(api(&server), query()).await.unwrap();
        let err = sheet.submit_status(99, AttendanceStatus::Present).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
