//! Wire types for the school backend
//!
//! Field names follow the backend's Turkish PascalCase keys. Records that the
//! backend extends freely keep unknown keys in `extra` instead of failing.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unknown keys preserved from a backend record
pub type Extra = BTreeMap<String, serde_json::Value>;

// =============================================================================
// Roles
// =============================================================================

/// User role; gates which screens are reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// School administrator
    Admin,
    /// Teacher
    Teacher,
    /// Parent of a student
    Parent,
}

impl Role {
    /// Map the login response's `rol` code; unknown codes are parents
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Role::Admin,
            "2" => Role::Teacher,
            "3" => Role::Parent,
            other => {
                tracing::warn!(code = other, "unknown role code, treating as parent");
                Role::Parent
            }
        }
    }

    /// Persisted name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(crate::ApiError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

// =============================================================================
// Lenient scalar decoding
// =============================================================================

/// Deserializers for fields the backend sends as either strings or numbers
pub mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};
    use serde_json::Value;

    fn value_to_string(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn value_to_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String from a string or number
    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        value_to_string(value.clone())
            .ok_or_else(|| D::Error::custom(format!("expected string or number, got {value}")))
    }

    /// Optional string from a string, number or null
    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(value_to_string(Value::deserialize(d)?))
    }

    /// Integer from a number or numeric string
    pub fn i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(d)?;
        value_to_i64(&value)
            .ok_or_else(|| D::Error::custom(format!("expected integer, got {value}")))
    }

    /// Optional integer from a number, numeric string or null
    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(value_to_i64(&Value::deserialize(d)?))
    }
}

// =============================================================================
// People
// =============================================================================

/// Gender as sent by the backend (`true`/`"1"` is male)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Label for adults
    pub fn adult_label(&self) -> &'static str {
        match self {
            Gender::Male => "Erkek",
            Gender::Female => "Kadın",
        }
    }

    /// Label for students
    pub fn child_label(&self) -> &'static str {
        match self {
            Gender::Male => "Erkek",
            Gender::Female => "Kız",
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        let male = match &value {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s == "1",
            serde_json::Value::Number(n) => n.as_i64() == Some(1),
            _ => false,
        };
        Ok(if male { Gender::Male } else { Gender::Female })
    }
}

/// Profile of the logged-in user (`/user/info`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Full name
    #[serde(rename = "AdSoyad", default, deserialize_with = "lenient::opt_string")]
    pub full_name: Option<String>,
    /// Teacher id, present only for teachers
    #[serde(rename = "OgretmenID", default, deserialize_with = "lenient::opt_i64")]
    pub teacher_id: Option<i64>,
    /// Student id, present for parent accounts
    #[serde(rename = "OgrenciId", default, deserialize_with = "lenient::opt_i64")]
    pub student_id: Option<i64>,
    /// Class name
    #[serde(rename = "Sinif", default, deserialize_with = "lenient::opt_string")]
    pub class_name: Option<String>,
    /// Department
    #[serde(rename = "Bolum", default, deserialize_with = "lenient::opt_string")]
    pub department: Option<String>,
    /// National id number
    #[serde(rename = "TCKimlikNo", default, deserialize_with = "lenient::opt_string")]
    pub national_id: Option<String>,
    /// Phone
    #[serde(rename = "Telefon", default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    /// Email
    #[serde(rename = "Eposta", default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    /// Gender
    #[serde(rename = "Cinsiyet", default)]
    pub gender: Option<Gender>,
    /// Birth date as sent (ISO timestamp)
    #[serde(rename = "DogumTarihi", default, deserialize_with = "lenient::opt_string")]
    pub birth_date: Option<String>,
    /// Photo file name
    #[serde(rename = "Fotograf", default, deserialize_with = "lenient::opt_string")]
    pub photo: Option<String>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// Student record (`/student/all`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Student id
    #[serde(rename = "OgrenciId", deserialize_with = "lenient::i64")]
    pub id: i64,
    /// Full name
    #[serde(rename = "AdSoyad", default, deserialize_with = "lenient::string")]
    pub full_name: String,
    /// School number
    #[serde(rename = "OgrenciNumara", default, deserialize_with = "lenient::opt_string")]
    pub number: Option<String>,
    /// Class name
    #[serde(rename = "Sinif", default, deserialize_with = "lenient::opt_string")]
    pub class_name: Option<String>,
    /// National id number
    #[serde(rename = "TCKimlikNo", default, deserialize_with = "lenient::opt_string")]
    pub national_id: Option<String>,
    /// Gender
    #[serde(rename = "Cinsiyet", default)]
    pub gender: Option<Gender>,
    /// Birth date as sent
    #[serde(rename = "DogumTarihi", default, deserialize_with = "lenient::opt_string")]
    pub birth_date: Option<String>,
    /// Mother's name
    #[serde(rename = "AnneAdSoyad", default, deserialize_with = "lenient::opt_string")]
    pub mother_name: Option<String>,
    /// Father's name
    #[serde(rename = "BabaAdSoyad", default, deserialize_with = "lenient::opt_string")]
    pub father_name: Option<String>,
    /// Mother's phone
    #[serde(rename = "AnneTel", default, deserialize_with = "lenient::opt_string")]
    pub mother_phone: Option<String>,
    /// Father's phone
    #[serde(rename = "BabaTel", default, deserialize_with = "lenient::opt_string")]
    pub father_phone: Option<String>,
    /// Photo file name
    #[serde(rename = "Fotograf", default, deserialize_with = "lenient::opt_string")]
    pub photo: Option<String>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// Teacher record (`/teacher/allteacher`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Teacher id
    #[serde(rename = "OgretmenID", default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    /// Full name
    #[serde(rename = "AdSoyad", default, deserialize_with = "lenient::string")]
    pub full_name: String,
    /// Department
    #[serde(rename = "Bolum", default, deserialize_with = "lenient::opt_string")]
    pub department: Option<String>,
    /// Email
    #[serde(rename = "Eposta", default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    /// Phone
    #[serde(rename = "Telefon", default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    /// National id number
    #[serde(rename = "TCKimlikNo", default, deserialize_with = "lenient::opt_string")]
    pub national_id: Option<String>,
    /// Gender
    #[serde(rename = "Cinsiyet", default)]
    pub gender: Option<Gender>,
    /// Birth date as sent
    #[serde(rename = "DogumTarihi", default, deserialize_with = "lenient::opt_string")]
    pub birth_date: Option<String>,
    /// Photo file name
    #[serde(rename = "Fotograf", default, deserialize_with = "lenient::opt_string")]
    pub photo: Option<String>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Extra,
}

// =============================================================================
// Classes and lessons
// =============================================================================

/// Class (`/student/classall`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class code
    #[serde(rename = "SinifKodu", deserialize_with = "lenient::string")]
    pub code: String,
    /// Display name, also used as the `Sinif` key in other requests
    #[serde(rename = "SinifAdi", deserialize_with = "lenient::string")]
    pub name: String,
}

/// Scheduled lesson (`/schedule/getteacher`, `/teacher/dersler`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Schedule slot id
    #[serde(rename = "ProgramID", alias = "id", default, deserialize_with = "lenient::opt_i64")]
    pub program_id: Option<i64>,
    /// Weekday name (Pazartesi..Cuma)
    #[serde(rename = "Gun", default, deserialize_with = "lenient::opt_string")]
    pub day: Option<String>,
    /// Subject
    #[serde(
        rename = "Ders",
        alias = "ders",
        alias = "dersAdi",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub subject: Option<String>,
    /// Time range such as `08:30-09:10`
    #[serde(rename = "DersSaati", alias = "saat", default, deserialize_with = "lenient::opt_string")]
    pub time: Option<String>,
    /// Class name
    #[serde(rename = "Sinif", alias = "sinif", default, deserialize_with = "lenient::opt_string")]
    pub class_name: Option<String>,
    /// Classroom
    #[serde(rename = "Derslik", default, deserialize_with = "lenient::opt_string")]
    pub room: Option<String>,
}

impl Lesson {
    /// Start of the time range, the part before `-`
    pub fn start_time(&self) -> &str {
        self.time
            .as_deref()
            .and_then(|t| t.split('-').next())
            .map(str::trim)
            .unwrap_or("")
    }
}

// =============================================================================
// Attendance
// =============================================================================

/// Attendance status; serialized as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AttendanceStatus {
    /// Absent (0)
    Absent,
    /// Present (1)
    Present,
    /// Late (2)
    Late,
}

impl AttendanceStatus {
    /// Integer code
    pub fn code(&self) -> u8 {
        match self {
            AttendanceStatus::Absent => 0,
            AttendanceStatus::Present => 1,
            AttendanceStatus::Late => 2,
        }
    }

    /// Roster label
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Absent => "Yok",
            AttendanceStatus::Present => "Burada",
            AttendanceStatus::Late => "Geç",
        }
    }

    /// Label in the parent's absence history
    pub fn history_label(&self) -> &'static str {
        match self {
            AttendanceStatus::Absent => "Devamsız",
            AttendanceStatus::Present => "Mevcut",
            AttendanceStatus::Late => "Geç Geldi",
        }
    }
}

impl TryFrom<u8> for AttendanceStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AttendanceStatus::Absent),
            1 => Ok(AttendanceStatus::Present),
            2 => Ok(AttendanceStatus::Late),
            other => Err(format!("unknown attendance status {other}")),
        }
    }
}

impl From<AttendanceStatus> for u8 {
    fn from(status: AttendanceStatus) -> Self {
        status.code()
    }
}

/// Unknown or missing codes decode to `None`
fn lenient_status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AttendanceStatus>, D::Error> {
    let code = lenient::opt_i64(d)?;
    Ok(code
        .and_then(|c| u8::try_from(c).ok())
        .and_then(|c| AttendanceStatus::try_from(c).ok()))
}

/// Roster request body (`/teacher/attendance`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceQuery {
    /// Class name
    #[serde(rename = "Sinif")]
    pub class_name: String,
    /// Date as `YYYY-MM-DD`
    #[serde(rename = "Tarih")]
    pub date: String,
    /// Lesson time range
    #[serde(rename = "DersSaati")]
    pub lesson_time: String,
    /// Schedule slot id
    #[serde(rename = "ProgramID")]
    pub program_id: i64,
}

/// Student row in an attendance roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Student id
    #[serde(rename = "OgrenciId", deserialize_with = "lenient::i64")]
    pub student_id: i64,
    /// School number
    #[serde(rename = "OgrenciNumara", default, deserialize_with = "lenient::opt_string")]
    pub number: Option<String>,
    /// Full name
    #[serde(rename = "AdSoyad", default, deserialize_with = "lenient::opt_string")]
    pub full_name: Option<String>,
    /// Status already recorded for this lesson
    #[serde(rename = "durum", default, deserialize_with = "lenient_status")]
    pub status: Option<AttendanceStatus>,
}

impl RosterEntry {
    /// Status label, `—` when nothing is recorded
    pub fn status_label(&self) -> &'static str {
        self.status.map(|s| s.label()).unwrap_or("—")
    }
}

/// Attendance submission (`/teacher/attendanceadd`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Lesson date, as carried by the roster query
    #[serde(rename = "tarih")]
    pub date: String,
    /// Student id
    #[serde(rename = "OgrenciID")]
    pub student_id: i64,
    /// Schedule slot id
    #[serde(rename = "ProgramID")]
    pub program_id: i64,
    /// Recorded status
    #[serde(rename = "durum")]
    pub status: AttendanceStatus,
}

/// Entry in a student's attendance history (`/student/attendance`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// Date as sent (date or ISO timestamp)
    #[serde(rename = "tarih", default, deserialize_with = "lenient::opt_string")]
    pub date_raw: Option<String>,
    /// Status
    #[serde(rename = "durum", default, deserialize_with = "lenient_status")]
    pub status: Option<AttendanceStatus>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl AbsenceRecord {
    /// Parsed date, if the raw value starts with `YYYY-MM-DD`
    pub fn date(&self) -> Option<NaiveDate> {
        parse_date_prefix(self.date_raw.as_deref()?)
    }
}

/// Parse the leading `YYYY-MM-DD` of a date or ISO timestamp
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

// =============================================================================
// Homework
// =============================================================================

/// Whether homework targets a class or one student (`KayitTuru`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeworkScope {
    /// Whole class (0)
    Class,
    /// Single student (1)
    Individual,
}

impl HomeworkScope {
    /// Wire code
    pub fn code(&self) -> u8 {
        match self {
            HomeworkScope::Class => 0,
            HomeworkScope::Individual => 1,
        }
    }

    /// Decode a wire code; anything but 1 is class-wide
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            HomeworkScope::Individual
        } else {
            HomeworkScope::Class
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            HomeworkScope::Class => "Sınıfa Genel",
            HomeworkScope::Individual => "Öğrenciye Özel",
        }
    }
}

/// Homework assigned to a student (`/student/homework`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkItem {
    /// Homework id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    /// Subject
    #[serde(rename = "DersAdi", default, deserialize_with = "lenient::opt_string")]
    pub subject: Option<String>,
    /// Topic
    #[serde(rename = "Konu", default, deserialize_with = "lenient::opt_string")]
    pub topic: Option<String>,
    /// Description
    #[serde(rename = "Aciklama", default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    /// Due date as sent
    #[serde(rename = "TeslimTarihi", default, deserialize_with = "lenient::opt_string")]
    pub due_date: Option<String>,
    /// Assignment date as sent
    #[serde(rename = "tarih", default, deserialize_with = "lenient::opt_string")]
    pub assigned_at: Option<String>,
    /// Completion code (0 pending, 1 done, 2 late)
    #[serde(rename = "durum", default, deserialize_with = "lenient::opt_i64")]
    pub status: Option<i64>,
    /// Scope code
    #[serde(rename = "KayitTuru", default, deserialize_with = "lenient::opt_i64")]
    pub scope: Option<i64>,
    /// Attached photo file name
    #[serde(rename = "Fotograf", default, deserialize_with = "lenient::opt_string")]
    pub photo: Option<String>,
    /// Unrecognized fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl HomeworkItem {
    /// Status label
    pub fn status_label(&self) -> &'static str {
        match self.status {
            Some(0) => "Bekliyor",
            Some(1) => "Tamamlandı",
            Some(2) => "Gecikti",
            _ => "Bilinmiyor",
        }
    }

    /// Scope, defaulting to class-wide
    pub fn scope(&self) -> HomeworkScope {
        HomeworkScope::from_code(self.scope.unwrap_or(0))
    }

    /// Past its due date and not completed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        let Some(due) = self.due_date.as_deref().and_then(parse_date_prefix) else {
            return false;
        };
        due < today && self.status != Some(1)
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Login request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Access token
    pub token: String,
    /// Refresh token, when the backend issues one
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    /// Role code (`"1"`, `"2"`, `"3"` or the same as numbers)
    #[serde(deserialize_with = "lenient::string")]
    pub rol: String,
}

/// Refresh request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshRequest {
    /// Stored refresh token
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Refresh response body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Rotated refresh token
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body keyed by student id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentIdBody {
    /// Student id
    #[serde(rename = "OgrenciID")]
    pub student_id: i64,
}

/// Parent homework request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentHomeworkBody {
    /// Student id
    #[serde(rename = "OgrenciID")]
    pub student_id: i64,
    /// Class name
    #[serde(rename = "Sinif", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Teacher paging body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageBody {
    /// 1-based page
    pub page: u32,
    /// Page size
    pub limit: u32,
}

/// Lessons-for-date body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonsBody {
    /// Class name
    #[serde(rename = "Sinif")]
    pub class_name: String,
    /// Date as `YYYY-MM-DD`
    pub tarih: String,
}

/// Schedule body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdBody {
    /// Teacher id
    pub id: i64,
}
