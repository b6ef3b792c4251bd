use uuid::Uuid;

use super::task::{Role, Task, TaskStatus};

/// Active filters over the task list. All criteria are conjunctive; an empty
/// criterion is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub team_ids: Vec<Uuid>,
    pub sprint_ids: Vec<Uuid>,
    pub statuses: Vec<TaskStatus>,
    pub search_query: String,
    pub roles: Vec<Role>,
    pub topic_ids: Vec<Uuid>,
}

impl Filters {
    pub fn is_active(&self) -> bool {
        *self != Filters::default()
    }

    /// Does this task pass every active criterion?
    ///
    /// The role filter deliberately lets untagged tasks through (a task with
    /// no role belongs to every role slice); the topic filter does not.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.team_ids.is_empty() && !self.team_ids.contains(&task.team_id) {
            return false;
        }
        if !self.sprint_ids.is_empty() {
            match task.sprint_id {
                Some(sprint_id) if self.sprint_ids.contains(&sprint_id) => {}
                _ => return false,
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        if !self.search_query.is_empty() {
            let needle = self.search_query.to_lowercase();
            if !task.title.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if !self.roles.is_empty() {
            let has_matching = task.roles.iter().any(|r| self.roles.contains(r));
            if !has_matching && !task.roles.is_empty() {
                return false;
            }
        }
        if !self.topic_ids.is_empty() {
            let has_matching = task.topic_ids.iter().any(|t| self.topic_ids.contains(t));
            if !has_matching {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }

    pub fn reset(&mut self) {
        *self = Filters::default();
    }

    pub fn toggle_team(&mut self, id: Uuid) {
        toggle(&mut self.team_ids, id);
    }

    pub fn toggle_sprint(&mut self, id: Uuid) {
        toggle(&mut self.sprint_ids, id);
    }

    pub fn toggle_status(&mut self, status: TaskStatus) {
        toggle(&mut self.statuses, status);
    }

    pub fn toggle_role(&mut self, role: Role) {
        toggle(&mut self.roles, role);
    }

    pub fn toggle_topic(&mut self, id: Uuid) {
        toggle(&mut self.topic_ids, id);
    }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if let Some(pos) = list.iter().position(|v| *v == value) {
        list.remove(pos);
    } else {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task() -> Task {
        Task::new(
            "Recherche utilisateurs",
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
        )
    }

    #[test]
    fn empty_filters_match_everything() {
        let filters = Filters::default();
        assert!(filters.matches(&task()));
        assert!(!filters.is_active());
    }

    #[test]
    fn team_filter_excludes_other_teams() {
        let t = task();
        let mut filters = Filters::default();
        filters.team_ids = vec![Uuid::new_v4()];
        assert!(!filters.matches(&t));
        filters.team_ids.push(t.team_id);
        assert!(filters.matches(&t));
    }

    #[test]
    fn sprint_filter_excludes_tasks_without_sprint() {
        let mut t = task();
        let mut filters = Filters::default();
        let sprint = Uuid::new_v4();
        filters.sprint_ids = vec![sprint];
        assert!(!filters.matches(&t));
        t.sprint_id = Some(sprint);
        assert!(filters.matches(&t));
    }

    #[test]
    fn search_matches_title_and_description() {
        let mut t = task();
        t.description = "entretiens qualitatifs".into();
        let mut filters = Filters::default();
        filters.search_query = "UTILISATEURS".into();
        assert!(filters.matches(&t));
        filters.search_query = "qualitatifs".into();
        assert!(filters.matches(&t));
        filters.search_query = "kanban".into();
        assert!(!filters.matches(&t));
    }

    #[test]
    fn role_filter_passes_untagged_tasks() {
        let mut filters = Filters::default();
        filters.roles = vec![Role::Developer];

        let untagged = task();
        assert!(filters.matches(&untagged));

        let mut tagged_other = task();
        tagged_other.roles = vec![Role::Direction];
        assert!(!filters.matches(&tagged_other));

        let mut tagged_match = task();
        tagged_match.roles = vec![Role::Developer, Role::Direction];
        assert!(filters.matches(&tagged_match));
    }

    #[test]
    fn topic_filter_excludes_untagged_tasks() {
        let topic = Uuid::new_v4();
        let mut filters = Filters::default();
        filters.topic_ids = vec![topic];

        let untagged = task();
        assert!(!filters.matches(&untagged));

        let mut tagged = task();
        tagged.topic_ids = vec![topic];
        assert!(filters.matches(&tagged));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut filters = Filters::default();
        filters.toggle_status(TaskStatus::Done);
        assert_eq!(filters.statuses, vec![TaskStatus::Done]);
        filters.toggle_status(TaskStatus::Done);
        assert!(filters.statuses.is_empty());
    }
}
