use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{Milestone, Sprint};
use super::org::{Team, Topic};
use super::task::{Role, Task, TaskStatus, TaskStep};

/// The whole application document, persisted as one opaque JSON blob via
/// `GET`/`POST /api/state` and via local file save/load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub dependencies: Vec<super::task::Dependency>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    /// Opaque document version; carried as-is, never compared.
    #[serde(default)]
    pub version: u32,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            teams: Vec::new(),
            sprints: Vec::new(),
            dependencies: Vec::new(),
            milestones: Vec::new(),
            topics: Vec::new(),
            version: 1,
        }
    }
}

impl AppState {
    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn team(&self, id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn topic(&self, id: Uuid) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn milestone_mut(&mut self, id: Uuid) -> Option<&mut Milestone> {
        self.milestones.iter_mut().find(|m| m.id == id)
    }

    /// Delete a task together with its subtasks, and any dependency touching
    /// either. Dangling references elsewhere are tolerated by the views.
    pub fn delete_task(&mut self, id: Uuid) {
        let removed: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.id == id || t.parent_task_id == Some(id))
            .map(|t| t.id)
            .collect();
        self.tasks
            .retain(|t| t.id != id && t.parent_task_id != Some(id));
        self.dependencies.retain(|d| {
            !removed.contains(&d.source_task_id) && !removed.contains(&d.target_task_id)
        });
    }

}

/// Bundled seed dataset, used when the backend has no document or is
/// unreachable at startup.
pub fn seed_state() -> AppState {
    let today = chrono::Local::now().date_naive();

    let produit = Team::new("Produit", "#3B82F6");
    let design = Team::new("Design", "#EC4899");
    let tech = Team::new("Tech", "#10B981");

    let activation = Topic::new("Activation", "#8B5CF6");
    let retention = Topic::new("Rétention", "#F59E0B");
    let plateforme = Topic::new("Plateforme", "#0EA5E9");

    let sprint1 = Sprint::new("Sprint 1", 1, today - Duration::days(14), today - Duration::days(1));
    let sprint2 = Sprint::new("Sprint 2", 2, today, today + Duration::days(13));
    let sprint3 = Sprint::new("Sprint 3", 3, today + Duration::days(14), today + Duration::days(27));

    let mut onboarding = Task::new(
        "Refonte du parcours d'onboarding",
        produit.id,
        today - Duration::days(10),
        today + Duration::days(4),
    );
    onboarding.status = TaskStatus::InProgress;
    onboarding.sprint_id = Some(sprint1.id);
    onboarding.topic_ids = vec![activation.id];
    onboarding.roles = vec![Role::ProductManager, Role::ProductDesigner];
    onboarding.order = 0;
    onboarding.steps = vec![
        TaskStep::new("Flag", "Kickoff atelier", today - Duration::days(9)),
        TaskStep::new("Target", "Maquettes validées", today - Duration::days(3)),
        TaskStep::new("Zap", "Mise en prod", today + Duration::days(3)),
    ];

    let mut emails = Task::new(
        "Campagne emails de réactivation",
        produit.id,
        today + Duration::days(2),
        today + Duration::days(12),
    );
    emails.status = TaskStatus::Todo;
    emails.sprint_id = Some(sprint2.id);
    emails.topic_ids = vec![retention.id];
    emails.roles = vec![Role::ProductMarketingManager];
    emails.order = 1;
    emails.steps = vec![TaskStep::new("Info", "Brief rédactionnel", today + Duration::days(4))];

    let mut design_system = Task::new(
        "Design system v2",
        design.id,
        today - Duration::days(4),
        today + Duration::days(18),
    );
    design_system.status = TaskStatus::InProgress;
    design_system.sprint_id = Some(sprint2.id);
    design_system.topic_ids = vec![plateforme.id];
    design_system.roles = vec![Role::ProductDesigner];
    design_system.order = 2;

    let mut migration = Task::new(
        "Migration base de données",
        tech.id,
        today + Duration::days(10),
        today + Duration::days(24),
    );
    migration.status = TaskStatus::Backlog;
    migration.sprint_id = Some(sprint3.id);
    migration.topic_ids = vec![plateforme.id];
    migration.roles = vec![Role::Developer];
    migration.order = 3;
    migration.steps = vec![
        TaskStep::new("AlertCircle", "Gel des écritures", today + Duration::days(20)),
        TaskStep::new("Clock", "Fenêtre de bascule", today + Duration::days(22)),
    ];

    let mut formation = Task::new(
        "Module e-learning partenaires",
        produit.id,
        today + Duration::days(6),
        today + Duration::days(16),
    );
    formation.status = TaskStatus::Todo;
    formation.topic_ids = vec![];
    formation.roles = vec![Role::ELearning];
    formation.order = 4;

    let jalon_beta = Milestone::new("Bêta publique", today + Duration::days(13));
    let mut jalon_ga = Milestone::new("Lancement GA", today + Duration::days(26));
    jalon_ga.sprint_id = Some(sprint3.id);

    AppState {
        tasks: vec![onboarding, emails, design_system, migration, formation],
        teams: vec![produit, design, tech],
        sprints: vec![sprint1, sprint2, sprint3],
        dependencies: Vec::new(),
        milestones: vec![jalon_beta, jalon_ga],
        topics: vec![activation, retention, plateforme],
        version: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_references_are_consistent() {
        let state = seed_state();
        for task in &state.tasks {
            assert!(state.team(task.team_id).is_some());
            for topic_id in &task.topic_ids {
                assert!(state.topic(*topic_id).is_some());
            }
            if let Some(sprint_id) = task.sprint_id {
                assert!(state.sprints.iter().any(|s| s.id == sprint_id));
            }
        }
    }

    #[test]
    fn document_round_trips_through_json() {
        let state = seed_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tasks.len(), state.tasks.len());
        assert_eq!(back.version, state.version);
        // camelCase field names on the wire, matching the stored document
        assert!(json.contains("\"startDate\""));
        assert!(json.contains("\"teamId\""));
    }

    #[test]
    fn empty_document_deserializes() {
        let state: AppState = serde_json::from_str("{}").unwrap();
        assert!(state.tasks.is_empty());
        assert_eq!(state.version, 0);
    }

    #[test]
    fn delete_task_removes_children_and_dependencies() {
        let mut state = seed_state();
        let parent = state.tasks[0].id;
        let mut child = Task::new(
            "sous-tâche",
            state.teams[0].id,
            state.tasks[0].start_date,
            state.tasks[0].end_date,
        );
        child.parent_task_id = Some(parent);
        let child_id = child.id;
        state.tasks.push(child);
        state.dependencies.push(crate::model::task::Dependency {
            source_task_id: child_id,
            target_task_id: state.tasks[1].id,
            kind: crate::model::task::DependencyKind::FinishToStart,
        });

        state.delete_task(parent);
        assert!(state.task(parent).is_none());
        assert!(state.task(child_id).is_none());
        assert!(state.dependencies.is_empty());
    }
}
