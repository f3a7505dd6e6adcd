//! Screen-level errors

use app_state::SessionStateError;
use okul_client::ApiError;
use thiserror::Error;

/// Errors surfaced by screen logic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Request failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store rejected an update
    #[error("Session error: {0}")]
    Session(#[from] SessionStateError),

    /// User name or password missing
    #[error("Username and password are required")]
    MissingFields,

    /// Backend rejected the credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The logged-in user has no teacher id
    #[error("This screen is only available to teachers")]
    NotATeacher,

    /// No student id could be resolved for a parent screen
    #[error("No student id available")]
    MissingStudentId,

    /// A submission for this student is already in flight
    #[error("Attendance for student {0} is already being submitted")]
    AlreadySubmitting(i64),

    /// Form input failed validation; carries the user-facing message
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Result type for screen operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingFields => "Lütfen tüm alanları doldurun".into(),
            Error::InvalidCredentials => "Kullanıcı adı veya şifre yanlış".into(),
            Error::NotATeacher => "Bu sayfa yalnız öğretmenler içindir.".into(),
            Error::MissingStudentId => {
                "Öğrenci ID bilgisi bulunamadı. Lütfen tekrar giriş yapın.".into()
            }
            Error::AlreadySubmitting(_) => "Yoklama kaydediliyor, lütfen bekleyin.".into(),
            Error::Validation(message) => message.clone(),
            Error::Session(_) => "Oturum bilgileri kaydedilemedi.".into(),
            Error::Api(ApiError::Unauthorized | ApiError::SessionEnded) => {
                "Oturumunuz sona erdi. Lütfen tekrar giriş yapın.".into()
            }
            Error::Api(e) if e.is_network_error() => "Bağlantı hatası oluştu".into(),
            Error::Api(ApiError::Http { status: 400, .. }) => {
                "Bilgiler boş veya yanlış gönderilmiştir".into()
            }
            Error::Api(ApiError::Http { message, .. }) if !message.trim().is_empty() => {
                message.clone()
            }
            Error::Api(ApiError::Http { status, .. }) => format!("API Hatası: {status}"),
            Error::Api(_) => "Bilinmeyen hata".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(Error::NotATeacher.user_message(), "Bu sayfa yalnız öğretmenler içindir.");
        assert_eq!(
            Error::Api(ApiError::Http { status: 503, message: String::new() }).user_message(),
            "Bağlantı hatası oluştu"
        );
        assert_eq!(
            Error::Api(ApiError::Http { status: 500, message: String::new() }).user_message(),
            "API Hatası: 500"
        );
        assert_eq!(
            Error::Api(ApiError::Http { status: 409, message: "Kayıt mevcut".into() })
                .user_message(),
            "Kayıt mevcut"
        );
    }

    #[test]
    fn test_from_api_error() {
        let err: Error = ApiError::Unauthorized.into();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
    }
}
