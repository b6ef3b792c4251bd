use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sprint window, rendered as a header chip and a background band.
/// Never mutated by the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: Uuid,
    pub name: String,
    pub number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Human label for the covered weeks, e.g. "S36-S37".
    #[serde(default)]
    pub week_range: String,
}

impl Sprint {
    pub fn new(
        name: impl Into<String>,
        number: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let week_range = format!(
            "S{}-S{}",
            start.format("%V"),
            end.format("%V")
        );
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number,
            start_date: start,
            end_date: end,
            week_range,
        }
    }
}

/// A single-date milestone, rendered as a diamond marker in the header and a
/// dotted vertical guide line spanning the full content height.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub sprint_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
}

impl Milestone {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            sprint_id: None,
            description: String::new(),
        }
    }
}
