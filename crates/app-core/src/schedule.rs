//! Teacher weekly schedule
//!
//! Lessons are ordered by weekday (Monday to Friday) and then by start time.
//! Lessons with an unrecognized day come first.

use crate::error::{Error, Result};
use crate::load::LoadState;
use chrono::NaiveDate;
use okul_client::models::{AttendanceQuery, Lesson};
use okul_client::SchoolApi;

/// School days in order
pub const WEEKDAYS: [&str; 5] = ["Pazartesi", "Salı", "Çarşamba", "Perşembe", "Cuma"];

/// Placeholder time for lessons without one
pub const UNKNOWN_TIME: &str = "--:--";

/// Sort rank of a day name; unknown days rank before Monday
pub fn day_rank(day: Option<&str>) -> i32 {
    day.and_then(|d| WEEKDAYS.iter().position(|w| *w == d.trim()))
        .map(|i| i as i32)
        .unwrap_or(-1)
}

/// Sort lessons by day, then start time
pub fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| {
        day_rank(a.day.as_deref())
            .cmp(&day_rank(b.day.as_deref()))
            .then_with(|| a.start_time().cmp(b.start_time()))
    });
}

/// Lessons of one day
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    /// Day name as sent
    pub day: String,
    /// Lessons in start-time order
    pub lessons: Vec<Lesson>,
}

/// Sort and group lessons by day, keeping day order
pub fn group_by_day(mut lessons: Vec<Lesson>) -> Vec<DaySchedule> {
    sort_lessons(&mut lessons);

    let mut days: Vec<DaySchedule> = Vec::new();
    for lesson in lessons {
        let day = lesson.day.clone().unwrap_or_default();
        match days.last_mut() {
            Some(current) if current.day == day => current.lessons.push(lesson),
            _ => days.push(DaySchedule { day, lessons: vec![lesson] }),
        }
    }
    days
}

/// Roster query for taking attendance in `lesson` on `date`
///
/// The lesson's own class wins over `fallback_class`.
pub fn attendance_query(
    lesson: &Lesson,
    fallback_class: Option<&str>,
    date: NaiveDate,
) -> Result<AttendanceQuery> {
    let program_id = lesson
        .program_id
        .ok_or_else(|| Error::Validation("Ders programı kimliği bulunamadı".into()))?;
    let class_name = lesson
        .class_name
        .as_deref()
        .or(fallback_class)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::Validation("Sınıf seçilmedi".into()))?;

    Ok(AttendanceQuery {
        class_name: class_name.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        lesson_time: lesson.time.clone().unwrap_or_else(|| UNKNOWN_TIME.to_string()),
        program_id,
    })
}

/// Loads the logged-in teacher's schedule
#[derive(Debug, Clone)]
pub struct ScheduleService {
    api: SchoolApi,
}

impl ScheduleService {
    /// Create a new schedule service
    pub fn new(api: SchoolApi) -> Self {
        Self { api }
    }

    /// Fetch, sort and group the schedule
    pub async fn load(&self) -> LoadState<Vec<DaySchedule>> {
        let teacher_id = match self.api.user_info().await {
            Ok(info) => info.teacher_id,
            Err(e) => return LoadState::failed("schedule", &Error::from(e)),
        };
        let Some(teacher_id) = teacher_id else {
            tracing::warn!("schedule requested by a user without a teacher id");
            return LoadState::Failed("Öğretmen kimliği bulunamadı".into());
        };

        match self.api.teacher_schedule(teacher_id).await {
            Ok(lessons) => LoadState::from_list(group_by_day(lessons)),
            Err(e) => {
                tracing::warn!(teacher_id, "schedule failed: {}", e);
                LoadState::Failed("Ders programı yüklenirken bir hata oluştu".into())
            }
        }
    }
}
