use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow status of a task. The declaration order is the Kanban column
/// order; nothing else relies on it being ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "Backlog",
            TaskStatus::Todo => "À faire",
            TaskStatus::InProgress => "En cours",
            TaskStatus::Review => "Relecture",
            TaskStatus::Done => "Terminé",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Job role a task can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProductOwner,
    ProductManager,
    ProductDesigner,
    ProductMarketingManager,
    Direction,
    ELearning,
    Developer,
}

impl Role {
    /// Display order used when grouping by role.
    pub const ORDER: [Role; 7] = [
        Role::ProductOwner,
        Role::ProductManager,
        Role::ProductDesigner,
        Role::ProductMarketingManager,
        Role::Direction,
        Role::ELearning,
        Role::Developer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Role::ProductOwner => "Product Owner",
            Role::ProductManager => "Product Manager",
            Role::ProductDesigner => "Product Designer",
            Role::ProductMarketingManager => "PMM",
            Role::Direction => "Direction",
            Role::ELearning => "E-learning",
            Role::Developer => "Développeur",
        }
    }
}

/// A dated annotation attached to a task, shown on the timeline as a small
/// marker with a label. The icon is stored as a free string; unknown names
/// fall back to a default glyph at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStep {
    pub id: Uuid,
    pub icon: String,
    pub text: String,
    pub date: NaiveDate,
}

impl TaskStep {
    pub fn new(icon: impl Into<String>, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            icon: icon.into(),
            text: text.into(),
            date,
        }
    }
}

/// Icon names a step can carry.
pub const STEP_ICONS: &[&str] = &["Flag", "Star", "AlertCircle", "Info", "Target", "Zap", "Clock"];

/// Resolve a step icon name to a phosphor glyph. Unknown names get the
/// question-mark glyph rather than failing.
pub fn step_icon_glyph(name: &str) -> &'static str {
    match name {
        "Flag" => egui_phosphor::regular::FLAG,
        "Star" => egui_phosphor::regular::STAR,
        "AlertCircle" => egui_phosphor::regular::WARNING_CIRCLE,
        "Info" => egui_phosphor::regular::INFO,
        "Target" => egui_phosphor::regular::TARGET,
        "Zap" => egui_phosphor::regular::LIGHTNING,
        "Clock" => egui_phosphor::regular::CLOCK,
        _ => egui_phosphor::regular::QUESTION,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

/// A dependency link between two tasks. Carried in the persisted document;
/// the timeline does not render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub source_task_id: Uuid,
    pub target_task_id: Uuid,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
}

/// A single roadmap task.
///
/// `start_date..=end_date` is an inclusive range; `start_date > end_date` is
/// degenerate but tolerated everywhere (the timeline clamps it to the minimum
/// bar width). Progress is derived from the dates and today, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub team_id: Uuid,
    #[serde(default)]
    pub sprint_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub parent_task_id: Option<Uuid>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub topic_ids: Vec<Uuid>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub steps: Vec<TaskStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, team_id: Uuid, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            team_id,
            sprint_id: None,
            start_date: start,
            end_date: end,
            parent_task_id: None,
            order: 0,
            topic_ids: Vec::new(),
            roles: Vec::new(),
            steps: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Shift both dates by a whole number of days, preserving duration.
    pub fn shift_days(&mut self, days: i64) {
        self.start_date += chrono::Duration::days(days);
        self.end_date += chrono::Duration::days(days);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Try parsing a date string with several common formats. Used for manual
/// text entry; typed dates elsewhere never go through this.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn shift_preserves_duration() {
        let team = Uuid::new_v4();
        let mut task = Task::new("t", team, day("2025-02-03"), day("2025-02-10"));
        task.shift_days(3);
        assert_eq!(task.start_date, day("2025-02-06"));
        assert_eq!(task.end_date, day("2025-02-13"));
    }

    #[test]
    fn unknown_icon_falls_back() {
        assert_eq!(step_icon_glyph("Flag"), egui_phosphor::regular::FLAG);
        assert_eq!(step_icon_glyph("NoSuchIcon"), egui_phosphor::regular::QUESTION);
        assert_eq!(step_icon_glyph(""), egui_phosphor::regular::QUESTION);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        assert_eq!(parse_date("2025-03-01"), Some(day("2025-03-01")));
        assert_eq!(parse_date("01/03/2025"), Some(day("2025-03-01")));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn task_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "4a2d5a1e-74a4-4d3e-9f8a-0db1b1a2c3d4",
            "title": "Refonte onboarding",
            "teamId": "4a2d5a1e-74a4-4d3e-9f8a-0db1b1a2c3d5",
            "startDate": "2025-01-05",
            "endDate": "2025-01-20",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.steps.is_empty());
        assert!(task.sprint_id.is_none());
    }
}
