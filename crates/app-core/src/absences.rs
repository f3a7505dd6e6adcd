//! Parent view of a student's attendance history

use crate::dashboard::PROFILE_ERROR;
use crate::error::Error;
use crate::load::LoadState;
use app_state::SessionStore;
use chrono::NaiveDate;
use okul_client::models::{AbsenceRecord, UserInfo};
use okul_client::SchoolApi;
use std::cmp::Reverse;
use std::sync::Arc;

/// Student a parent screen is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRef {
    /// Student id (`OgrenciId`)
    pub id: i64,
    /// Class name, when known
    pub class_name: Option<String>,
}

impl StudentRef {
    /// Student reference from the logged-in user's profile
    pub fn from_user(info: &UserInfo) -> Option<Self> {
        Some(Self { id: info.student_id?, class_name: info.class_name.clone() })
    }
}

/// Use `given`, or fall back to the logged-in user's profile
///
/// A profile without a student id ends the session.
pub(crate) async fn resolve_student(
    api: &SchoolApi,
    session: &SessionStore,
    given: Option<StudentRef>,
) -> Result<StudentRef, String> {
    if let Some(student) = given {
        return Ok(student);
    }

    let info = api.user_info().await.map_err(|e| {
        tracing::warn!("could not load profile for student lookup: {}", e);
        PROFILE_ERROR.to_string()
    })?;

    match StudentRef::from_user(&info) {
        Some(student) => Ok(student),
        None => {
            tracing::warn!("profile has no student id, ending session");
            session.clear_session().await;
            Err(Error::MissingStudentId.user_message())
        }
    }
}

/// Sort key placing the newest dates first and undated entries last
pub(crate) fn newest_first(date: Option<NaiveDate>) -> (bool, Reverse<Option<NaiveDate>>) {
    (date.is_none(), Reverse(date))
}

/// Loads a student's attendance history
#[derive(Debug, Clone)]
pub struct AbsenceHistory {
    api: SchoolApi,
    session: Arc<SessionStore>,
}

impl AbsenceHistory {
    /// Create a new history loader
    pub fn new(api: SchoolApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Records for `student` (or the logged-in student), newest first
    pub async fn load(&self, student: Option<StudentRef>) -> LoadState<Vec<AbsenceRecord>> {
        let student = match resolve_student(&self.api, &self.session, student).await {
            Ok(student) => student,
            Err(message) => return LoadState::Failed(message),
        };

        match self.api.student_attendance(student.id).await {
            Ok(mut records) => {
                records.sort_by_key(|r| newest_first(r.date()));
                tracing::debug!(student_id = student.id, count = records.len(), "absences loaded");
                LoadState::from_list(records)
            }
            Err(e) => LoadState::failed("absence history", &Error::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okul_client::{ApiClient, ApiClientConfig, AttendanceStatus};
    use serde_json::json;
    use storage::TokenStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn history(server: &MockServer) -> (AbsenceHistory, Arc<SessionStore>) {
        let tokens = Arc::new(TokenStore::in_memory());
        tokens.set_token(Some("t")).await;
        tokens.set_role(Some("parent")).await;
        let session = Arc::new(SessionStore::new(Arc::clone(&tokens)));
        session.restore().await;
        let client =
            ApiClient::new(ApiClientConfig::new(server.uri()), tokens, session.clone()).unwrap();
        (AbsenceHistory::new(SchoolApi::new(Arc::new(client)), Arc::clone(&session)), session)
    }

    #[test]
    fn test_newest_first_order() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 9, day);
        let mut dates = vec![d(1), None, d(5), d(3)];
        dates.sort_by_key(|date| newest_first(*date));
        assert_eq!(dates, vec![d(5), d(3), d(1), None]);
    }

    #[tokio::test]
    async fn test_load_given_student_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/student/attendance"))
            .and(body_json(json!({"OgrenciID": 63})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"tarih": "2025-09-01T00:00:00.000Z", "durum": 0},
                {"tarih": "2025-09-08T00:00:00.000Z", "durum": 2},
                {"tarih": "2025-09-04", "durum": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (history, _) = history(&server).await;
        let state = history.load(Some(StudentRef { id: 63, class_name: None })).await;
        let records = state.data().unwrap();

        let days: Vec<String> =
            records.iter().filter_map(|r| r.date()).map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2025-09-08", "2025-09-04", "2025-09-01"]);
        assert_eq!(records[0].status, Some(AttendanceStatus::Late));
    }

    #[tokio::test]
    async fn test_student_id_from_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/info"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"OgrenciId": "63", "Sinif": "5-A"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/student/attendance"))
            .and(body_json(json!({"OgrenciID": 63})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (history, _) = history(&server).await;
        assert_eq!(history.load(None).await, LoadState::Empty);
    }

    #[tokio::test]
    async fn test_missing_student_id_ends_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"AdSoyad": "Veli"})))
            .mount(&server)
            .await;

        let (history, session) = history(&server).await;
        let state = history.load(None).await;

        assert_eq!(state.error(), Some(Error::MissingStudentId.user_message().as_str()));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_profile_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/info"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (history, _) = history(&server).await;
        assert_eq!(history.load(None).await.error(), Some(PROFILE_ERROR));
    }
}
