use crate::config::SchedulerConfig;
use crate::error::ConfigurationError;
use crate::solver::SolveStatus;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// Type aliases for clarity
pub type ClassId = String;
pub type TeacherId = String;
pub type SubjectId = String;

/// A class (group of students) whose slots need a teacher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassSection {
    pub class_id: ClassId,
    #[serde(default)]
    pub label: Option<String>,
    pub section: String,
    pub level: i32,
    #[serde(default)]
    pub field_of_study: Option<String>,
}

impl ClassSection {
    /// The label shown in timetables, falling back to the class id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.class_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Teacher {
    pub user_id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Descriptive only; never read by the scheduler.
    #[serde(default)]
    pub contract_status: Option<String>,
}

/// A subject taught at one (level, section[, field of study]) by any of its teachers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subject {
    pub subject_id: SubjectId,
    pub name: String,
    pub level: i32,
    pub section: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub teacher_ids: Vec<TeacherId>,
    /// Descriptive only; never read by the scheduler.
    #[serde(default)]
    pub priority: Option<String>,
}

/// When a teacher can teach: one period vector per listed day.
///
/// Days missing from `entries` are unavailable, as are teachers with no record at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Availability {
    pub user_id: TeacherId,
    #[serde(default, alias = "availabilities")]
    pub entries: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvailabilityEntry {
    #[serde(alias = "dayOfWeek")]
    pub day: String,
    /// Aligned to the configured period enumeration.
    pub periods: Vec<bool>,
}

/// Blackout rule for every class at a (level, section[, field of study]).
///
/// Periods not listed, and days not listed, stay allowed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeriodControl {
    pub level: i32,
    pub section: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, alias = "days")]
    pub entries: Vec<PeriodControlEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeriodControlEntry {
    pub day: String,
    #[serde(default)]
    pub periods: BTreeMap<String, bool>,
}

/// The complete input for one scheduling run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchedulingInput {
    pub classes: Vec<ClassSection>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub availabilities: Vec<Availability>,
    #[serde(default)]
    pub period_controls: Vec<PeriodControl>,
}

/// An input plus an optional per-request configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingRequest {
    #[serde(flatten)]
    pub input: SchedulingInput,
    #[serde(default)]
    pub config: Option<SchedulerConfig>,
}

impl SchedulingRequest {
    /// Parses a request body. Syntax errors, missing required fields and
    /// wrongly typed values are all configuration errors.
    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(raw).map_err(|e| ConfigurationError::MalformedInput(e.to_string()))
    }
}

/// One filled slot of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub class_id: ClassId,
    pub class_label: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSchedule {
    pub period: String,
    pub entries: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub day: String,
    pub periods: Vec<PeriodSchedule>,
}

/// Day → period → entries, kept in enumeration order.
///
/// Serialized as nested JSON objects; only days and periods with at least
/// one entry are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    pub days: Vec<DaySchedule>,
}

impl Timetable {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, day: &str, period: &str) -> &[TimetableEntry] {
        self.days
            .iter()
            .find(|d| d.day == day)
            .and_then(|d| d.periods.iter().find(|p| p.period == period))
            .map(|p| p.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Every entry with its day and period.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &TimetableEntry)> {
        self.days.iter().flat_map(|d| {
            d.periods.iter().flat_map(move |p| {
                p.entries
                    .iter()
                    .map(move |e| (d.day.as_str(), p.period.as_str(), e))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }
}

impl Serialize for Timetable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for day in &self.days {
            map.serialize_entry(&day.day, &PeriodMap(&day.periods))?;
        }
        map.end()
    }
}

struct PeriodMap<'a>(&'a [PeriodSchedule]);

impl Serialize for PeriodMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for period in self.0 {
            map.serialize_entry(&period.period, &period.entries)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Ok,
    NoSolution,
}

/// Run statistics attached to a successful timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    /// The objective value: number of filled slots.
    pub filled_slots: usize,
    pub total_slots: usize,
    pub solver_status: SolveStatus,
    pub elapsed_ms: u64,
}

/// The final output of the scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulingOutput {
    pub status: ScheduleStatus,
    pub timetable: Timetable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScheduleSummary>,
}

impl SchedulingOutput {
    pub fn no_solution() -> Self {
        Self {
            status: ScheduleStatus::NoSolution,
            timetable: Timetable::default(),
            summary: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ScheduleStatus::Ok
    }

    pub fn filled_slots(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.filled_slots)
    }
}

impl fmt::Display for SchedulingOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(summary) => write!(
                f,
                "ok: {}/{} slots filled ({:?}, {} ms)",
                summary.filled_slots, summary.total_slots, summary.solver_status, summary.elapsed_ms
            ),
            None => f.write_str("no_solution"),
        }
    }
}
