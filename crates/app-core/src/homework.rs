//! Homework assignment and the parent's homework list

use crate::absences::{newest_first, resolve_student, StudentRef};
use crate::error::{Error, Result};
use crate::load::LoadState;
use app_state::SessionStore;
use okul_client::http::FormField;
use okul_client::models::{parse_date_prefix, ClassInfo, HomeworkItem, HomeworkScope};
use okul_client::SchoolApi;
use std::sync::Arc;

/// Multipart name of the attached photo
pub const PHOTO_FIELD: &str = "photo";
/// File name sent with the attached photo
pub const PHOTO_FILE_NAME: &str = "homework_photo.jpg";
/// Content type of the attached photo
pub const PHOTO_MIME: &str = "image/jpeg";

/// Homework assignment form
///
/// Text fields are kept as typed; only emptiness is checked, after trimming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeworkForm {
    /// Subject (`DersAdi`)
    pub subject: String,
    /// Topic (`Konu`)
    pub topic: String,
    /// Description (`Aciklama`)
    pub description: String,
    /// Due date (`TeslimTarihi`)
    pub due_date: String,
    /// Points (`puan`)
    pub points: String,
    /// Status (`durum`)
    pub status: String,
    /// Student number for individual homework (`OgrenciNumara`)
    pub student_number: String,
    /// Class name (`Sinif`)
    pub class_name: String,
    /// Assigning teacher (`OgretmenID`)
    pub teacher_id: Option<i64>,
    /// JPEG bytes of an attached photo
    pub photo: Option<Vec<u8>>,
}

impl HomeworkForm {
    /// Class-wide when a class is set, otherwise for one student
    pub fn scope(&self) -> HomeworkScope {
        if self.class_name.trim().is_empty() {
            HomeworkScope::Individual
        } else {
            HomeworkScope::Class
        }
    }

    /// Check required fields, reporting the first one missing
    pub fn validate(&self) -> Result<()> {
        let required = [
            (&self.subject, "Ders adı gereklidir."),
            (&self.topic, "Konu gereklidir."),
            (&self.description, "Açıklama gereklidir."),
            (&self.due_date, "Teslim tarihi gereklidir."),
        ];
        match required.iter().find(|(value, _)| value.trim().is_empty()) {
            Some((_, message)) => Err(Error::Validation((*message).to_string())),
            None => Ok(()),
        }
    }

    /// Multipart fields in submission order
    pub fn to_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("DersAdi", self.subject.as_str()),
            FormField::text("Konu", self.topic.as_str()),
            FormField::text("Aciklama", self.description.as_str()),
            FormField::text("TeslimTarihi", self.due_date.as_str()),
            FormField::text("puan", self.points.as_str()),
            FormField::text("durum", self.status.as_str()),
            FormField::text("OgrenciNumara", self.student_number.as_str()),
            FormField::text("KayitTuru", self.scope().code().to_string()),
            FormField::text("Sinif", self.class_name.as_str()),
        ];
        if let Some(id) = self.teacher_id {
            fields.push(FormField::text("OgretmenID", id.to_string()));
        }
        if let Some(bytes) = &self.photo {
            fields.push(FormField::file(PHOTO_FIELD, PHOTO_FILE_NAME, PHOTO_MIME, bytes.clone()));
        }
        fields
    }
}

/// Prepares and submits homework assignments
#[derive(Debug, Clone)]
pub struct HomeworkService {
    api: SchoolApi,
}

impl HomeworkService {
    /// Create a new homework service
    pub fn new(api: SchoolApi) -> Self {
        Self { api }
    }

    /// Empty form with the teacher id and first class filled in, plus the class list
    ///
    /// Lookup failures are logged and leave the field empty.
    pub async fn prepare(&self) -> (HomeworkForm, Vec<ClassInfo>) {
        let mut form = HomeworkForm::default();

        match self.api.user_info().await {
            Ok(info) => form.teacher_id = info.teacher_id,
            Err(e) => tracing::warn!("teacher id lookup failed: {}", e),
        }

        let classes = match self.api.all_classes().await {
            Ok(classes) => classes,
            Err(e) => {
                tracing::warn!("class list failed: {}", e);
                Vec::new()
            }
        };
        if let Some(first) = classes.first() {
            form.class_name = first.name.clone();
        }

        (form, classes)
    }

    /// Validate and send the form
    pub async fn submit(&self, form: &HomeworkForm) -> Result<()> {
        form.validate()?;
        self.api.assign_homework(form.to_fields()).await?;
        tracing::info!(
            scope = form.scope().label(),
            photo = form.photo.is_some(),
            "homework assigned"
        );
        Ok(())
    }
}

/// Loads the homework assigned to a student
#[derive(Debug, Clone)]
pub struct StudentHomework {
    api: SchoolApi,
    session: Arc<SessionStore>,
}

impl StudentHomework {
    /// Create a new homework loader
    pub fn new(api: SchoolApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Homework for `student` (or the logged-in student), newest assignment first
    pub async fn load(&self, student: Option<StudentRef>) -> LoadState<Vec<HomeworkItem>> {
        let student = match resolve_student(&self.api, &self.session, student).await {
            Ok(student) => student,
            Err(message) => return LoadState::Failed(message),
        };

        let class_name = student.class_name.as_deref().unwrap_or("");
        match self.api.student_homework(student.id, Some(class_name)).await {
            Ok(mut items) => {
                items.sort_by_key(|item| {
                    newest_first(item.assigned_at.as_deref().and_then(parse_date_prefix))
                });
                LoadState::from_list(items)
            }
            Err(e) => LoadState::failed("student homework", &Error::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okul_client::{ApiClient, ApiClientConfig, NoopAuthFailureHandler};
    use serde_json::json;
    use storage::TokenStore;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
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

    fn filled_form() -> HomeworkForm {
        HomeworkForm {
            subject: "Matematik".into(),
            topic: "Kesirler".into(),
            description: "Sayfa 42".into(),
            due_date: "2025-09-10".into(),
            class_name: "5-A".into(),
            teacher_id: Some(7),
            ..Default::default()
        }
    }

    fn text_value<'a>(fields: &'a [FormField], field: &str) -> Option<&'a str> {
        fields.iter().find_map(|f| match f {
            FormField::Text { name, value } if name == field => Some(value.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_scope_follows_class() {
        let mut form = filled_form();
        assert_eq!(form.scope(), HomeworkScope::Class);
        form.class_name = "   ".into();
        assert_eq!(form.scope(), HomeworkScope::Individual);
        assert_eq!(text_value(&form.to_fields(), "KayitTuru"), Some("1"));
    }

    #[test]
    fn test_validation_reports_first_missing_field() {
        let mut form = filled_form();
        assert!(form.validate().is_ok());

        form.description = " ".into();
        form.due_date.clear();
        assert_eq!(form.validate(), Err(Error::Validation("Açıklama gereklidir.".into())));

        let empty = HomeworkForm::default();
        assert_eq!(empty.validate(), Err(Error::Validation("Ders adı gereklidir.".into())));
    }

    #[test]
    fn test_fields() {
        let mut form = filled_form();
        let fields = form.to_fields();
        assert_eq!(text_value(&fields, "DersAdi"), Some("Matematik"));
        assert_eq!(text_value(&fields, "KayitTuru"), Some("0"));
        assert_eq!(text_value(&fields, "OgretmenID"), Some("7"));
        assert!(fields.iter().all(|f| f.name() != PHOTO_FIELD));

        form.teacher_id = None;
        form.photo = Some(vec![0xFF, 0xD8]);
        let fields = form.to_fields();
        assert_eq!(text_value(&fields, "OgretmenID"), None);
        assert_eq!(
            fields.last(),
            Some(&FormField::file(PHOTO_FIELD, PHOTO_FILE_NAME, PHOTO_MIME, vec![0xFF, 0xD8]))
        );
    }

    #[tokio::test]
    async fn test_prepare_fills_teacher_and_class() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"OgretmenID": 7})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/student/classall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"SinifKodu": "6B", "SinifAdi": "6-B"},
                {"SinifKodu": "5A", "SinifAdi": "5-A"}
            ])))
            .mount(&server)
            .await;

        let (form, classes) = HomeworkService::new(api(&server)).prepare().await;
        assert_eq!(form.teacher_id, Some(7));
        assert_eq!(form.class_name, "6-B");
        assert_eq!(classes.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/teacher/homework"))
            .and(body_string_contains("Kesirler"))
            .and(body_string_contains("homework_photo.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut form = filled_form();
        form.photo = Some(b"jpeg".to_vec());
        HomeworkService::new(api(&server)).submit(&form).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let server = MockServer::start().await;
        let form = HomeworkForm { subject: "Fen".into(), ..Default::default() };

        let err = HomeworkService::new(api(&server)).submit(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Konu gereklidir.");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_student_homework_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/student/homework"))
            .and(body_json(json!({"OgrenciID": 63, "Sinif": "5-A"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "tarih": "2025-09-01T08:00:00.000Z", "durum": 1},
                {"id": 2},
                {"id": 3, "tarih": "2025-09-05T08:00:00.000Z", "durum": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(TokenStore::in_memory());
        let session = Arc::new(SessionStore::new(Arc::clone(&tokens)));
        let loader = StudentHomework::new(api(&server), session);
        let student = StudentRef { id: 63, class_name: Some("5-A".into()) };

        let state = loader.load(Some(student)).await;
        let ids: Vec<Option<i64>> = state.data().unwrap().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }
}
