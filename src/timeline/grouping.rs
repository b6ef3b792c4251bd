use chrono::Datelike;
use egui::Color32;

use crate::model::{org::parse_hex_color, Role, Task, Topic};

/// One grouping criterion. Levels compose: the active list is applied in
/// order, nesting groups inside groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Topic,
    Role,
    Month,
}

impl GroupBy {
    pub const ALL: [GroupBy; 3] = [GroupBy::Topic, GroupBy::Role, GroupBy::Month];

    pub fn label(&self) -> &'static str {
        match self {
            GroupBy::Topic => "Par thème",
            GroupBy::Role => "Par métier",
            GroupBy::Month => "Par mois",
        }
    }
}

/// A flattened group header row.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    pub depth: usize,
    pub key: String,
    pub label: String,
    pub color: Option<Color32>,
    pub count: usize,
}

/// A row of the timeline: either a group header or a task, with its nesting
/// depth. Produced by flattening the grouping tree depth-first, groups before
/// their members.
#[derive(Debug, Clone)]
pub enum GroupedRow<'a> {
    Header(GroupHeader),
    Task { depth: usize, task: &'a Task },
}

impl<'a> GroupedRow<'a> {
    pub fn is_header(&self) -> bool {
        matches!(self, GroupedRow::Header(_))
    }
}

struct Bucket<'a> {
    key: String,
    label: String,
    color: Option<Color32>,
    tasks: Vec<&'a Task>,
}

const NONE_TOPIC_KEY: &str = "__none_topic__";
const NONE_ROLE_KEY: &str = "__none_role__";

fn group_by_topic<'a>(tasks: Vec<&'a Task>, topics: &[Topic]) -> Vec<Bucket<'a>> {
    let mut buckets: Vec<Bucket<'a>> = Vec::new();
    for task in tasks {
        let topic = task
            .topic_ids
            .first()
            .and_then(|id| topics.iter().find(|t| t.id == *id));
        let key = topic
            .map(|t| t.id.to_string())
            .unwrap_or_else(|| NONE_TOPIC_KEY.to_string());
        push_into(&mut buckets, key, task, |key| match topic {
            Some(t) => Bucket {
                key,
                label: t.name.clone(),
                color: Some(parse_hex_color(&t.color)),
                tasks: Vec::new(),
            },
            None => Bucket {
                key,
                label: "Sans thème".to_string(),
                color: None,
                tasks: Vec::new(),
            },
        });
    }
    buckets.sort_by(|a, b| {
        let a_none = a.key == NONE_TOPIC_KEY;
        let b_none = b.key == NONE_TOPIC_KEY;
        a_none
            .cmp(&b_none)
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
    });
    buckets
}

fn group_by_role(tasks: Vec<&Task>) -> Vec<Bucket<'_>> {
    let mut buckets: Vec<Bucket<'_>> = Vec::new();
    for task in tasks {
        let role = task.roles.first().copied();
        let key = role
            .map(|r| format!("{:?}", r))
            .unwrap_or_else(|| NONE_ROLE_KEY.to_string());
        push_into(&mut buckets, key, task, |key| Bucket {
            key,
            label: role
                .map(|r| r.label().to_string())
                .unwrap_or_else(|| "Sans métier".to_string()),
            color: None,
            tasks: Vec::new(),
        });
    }
    let order_of = |bucket: &Bucket<'_>| -> usize {
        if bucket.key == NONE_ROLE_KEY {
            return usize::MAX;
        }
        Role::ORDER
            .iter()
            .position(|r| format!("{:?}", r) == bucket.key)
            .unwrap_or(usize::MAX - 1)
    };
    buckets.sort_by_key(order_of);
    buckets
}

/// "Janvier 2025"-style label, shared by the month grouping and the header.
pub fn french_month_label(date: chrono::NaiveDate) -> String {
    capitalize(
        &date
            .format_localized("%B %Y", chrono::Locale::fr_FR)
            .to_string(),
    )
}

fn group_by_month(tasks: Vec<&Task>) -> Vec<Bucket<'_>> {
    let mut buckets: Vec<Bucket<'_>> = Vec::new();
    for task in tasks {
        let key = format!("{:04}-{:02}", task.start_date.year(), task.start_date.month());
        let label = french_month_label(task.start_date);
        push_into(&mut buckets, key.clone(), task, |key| Bucket {
            key,
            label: label.clone(),
            color: None,
            tasks: Vec::new(),
        });
    }
    buckets.sort_by(|a, b| a.key.cmp(&b.key));
    buckets
}

fn push_into<'a>(
    buckets: &mut Vec<Bucket<'a>>,
    key: String,
    task: &'a Task,
    make: impl FnOnce(String) -> Bucket<'a>,
) {
    match buckets.iter_mut().find(|b| b.key == key) {
        Some(bucket) => bucket.tasks.push(task),
        None => {
            let mut bucket = make(key);
            bucket.tasks.push(task);
            buckets.push(bucket);
        }
    }
}

fn apply_level<'a>(tasks: Vec<&'a Task>, level: GroupBy, topics: &[Topic]) -> Vec<Bucket<'a>> {
    match level {
        GroupBy::Topic => group_by_topic(tasks, topics),
        GroupBy::Role => group_by_role(tasks),
        GroupBy::Month => group_by_month(tasks),
    }
}

fn flatten<'a>(
    tasks: Vec<&'a Task>,
    levels: &[GroupBy],
    topics: &[Topic],
    depth: usize,
    out: &mut Vec<GroupedRow<'a>>,
) {
    let Some((level, remaining)) = levels.split_first() else {
        out.extend(tasks.into_iter().map(|task| GroupedRow::Task { depth, task }));
        return;
    };

    for bucket in apply_level(tasks, *level, topics) {
        out.push(GroupedRow::Header(GroupHeader {
            depth,
            key: bucket.key,
            label: bucket.label,
            color: bucket.color,
            count: bucket.tasks.len(),
        }));
        flatten(bucket.tasks, remaining, topics, depth + 1, out);
    }
}

/// Partition `tasks` by the active grouping levels and flatten the resulting
/// tree into an ordered row sequence. With no levels, every task is a
/// depth-0 row.
pub fn group_tasks<'a>(
    tasks: &[&'a Task],
    levels: &[GroupBy],
    topics: &[Topic],
) -> Vec<GroupedRow<'a>> {
    let mut out = Vec::with_capacity(tasks.len());
    flatten(tasks.to_vec(), levels, topics, 0, &mut out);
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(start: &str) -> Task {
        Task::new("t", Uuid::new_v4(), day(start), day(start))
    }

    fn topics() -> Vec<Topic> {
        vec![
            Topic::new("Backend", "#3B82F6"),
            Topic::new("Analytics", "#8B5CF6"),
            Topic::new("Design", "#EC4899"),
        ]
    }

    fn headers<'a>(rows: &'a [GroupedRow<'_>]) -> Vec<&'a GroupHeader> {
        rows.iter()
            .filter_map(|r| match r {
                GroupedRow::Header(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_levels_yields_flat_rows_at_depth_zero() {
        let a = task("2025-01-01");
        let b = task("2025-01-02");
        let rows = group_tasks(&[&a, &b], &[], &[]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| matches!(r, GroupedRow::Task { depth: 0, .. })));
    }

    #[test]
    fn topic_groups_sort_alphabetically_with_none_last() {
        let topics = topics();
        let mut a = task("2025-01-01");
        a.topic_ids = vec![topics[2].id]; // Design
        let mut b = task("2025-01-01");
        b.topic_ids = vec![topics[0].id]; // Backend
        let mut c = task("2025-01-01");
        c.topic_ids = vec![topics[1].id]; // Analytics
        let d = task("2025-01-01"); // no topic

        let rows = group_tasks(&[&a, &b, &c, &d], &[GroupBy::Topic], &topics);
        let hdrs = headers(&rows);
        let labels: Vec<&str> = hdrs.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Analytics", "Backend", "Design", "Sans thème"]);
        assert!(hdrs.iter().all(|h| h.depth == 0));
        assert_eq!(hdrs[0].color, Some(parse_hex_color("#8B5CF6")));
        assert_eq!(hdrs[3].color, None);

        let task_rows = rows.iter().filter(|r| !r.is_header()).count();
        assert_eq!(task_rows, 4);
    }

    #[test]
    fn role_groups_follow_fixed_order_with_none_last() {
        let mut a = task("2025-01-01");
        a.roles = vec![Role::Developer];
        let mut b = task("2025-01-01");
        b.roles = vec![Role::ProductOwner];
        let mut c = task("2025-01-01");
        c.roles = vec![Role::ProductDesigner];
        let d = task("2025-01-01");

        let rows = group_tasks(&[&a, &b, &c, &d], &[GroupBy::Role], &[]);
        let labels: Vec<&str> = headers(&rows).iter().map(|h| h.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Product Owner", "Product Designer", "Développeur", "Sans métier"]
        );
    }

    #[test]
    fn month_groups_are_chronological_with_french_labels() {
        // Input deliberately out of order.
        let a = task("2025-03-01");
        let b = task("2025-01-05");
        let c = task("2025-02-10");

        let rows = group_tasks(&[&a, &b, &c], &[GroupBy::Month], &[]);
        let labels: Vec<&str> = headers(&rows).iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Janvier 2025", "Février 2025", "Mars 2025"]);
    }

    #[test]
    fn multi_level_nests_headers_with_increasing_depth() {
        let topics = topics();
        let mut a = task("2025-01-01");
        a.topic_ids = vec![topics[0].id];
        a.roles = vec![Role::Developer];

        let rows = group_tasks(&[&a], &[GroupBy::Topic, GroupBy::Role], &topics);
        assert_eq!(rows.len(), 3);
        assert!(matches!(&rows[0], GroupedRow::Header(h) if h.depth == 0));
        assert!(matches!(&rows[1], GroupedRow::Header(h) if h.depth == 1));
        assert!(matches!(&rows[2], GroupedRow::Task { depth: 2, .. }));
    }

    #[test]
    fn flattening_preserves_task_count_and_pair_headers() {
        let topics = topics();
        let mut tasks = Vec::new();
        for (topic_idx, role) in [(0, Role::Developer), (0, Role::ProductOwner), (1, Role::Developer)] {
            let mut t = task("2025-01-01");
            t.topic_ids = vec![topics[topic_idx].id];
            t.roles = vec![role];
            tasks.push(t);
        }
        let refs: Vec<&Task> = tasks.iter().collect();
        let rows = group_tasks(&refs, &[GroupBy::Topic, GroupBy::Role], &topics);

        let task_rows = rows.iter().filter(|r| !r.is_header()).count();
        assert_eq!(task_rows, tasks.len());

        // 2 distinct topics + 3 distinct (topic, role) pairs.
        let hdrs = headers(&rows);
        assert_eq!(hdrs.iter().filter(|h| h.depth == 0).count(), 2);
        assert_eq!(hdrs.iter().filter(|h| h.depth == 1).count(), 3);
        assert!(rows.iter().filter(|r| !r.is_header()).all(
            |r| matches!(r, GroupedRow::Task { depth: 2, .. })
        ));
    }

    #[test]
    fn header_count_field_matches_members() {
        let mut a = task("2025-01-05");
        a.title = "a".into();
        let b = task("2025-01-20");
        let rows = group_tasks(&[&a, &b], &[GroupBy::Month], &[]);
        let hdrs = headers(&rows);
        assert_eq!(hdrs.len(), 1);
        assert_eq!(hdrs[0].count, 2);
    }
}
