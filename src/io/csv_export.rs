use std::path::Path;

use anyhow::{Context, Result};

use crate::model::AppState;
use crate::timeline::derived_progress;

/// Export the visible tasks to a semicolon-delimited CSV document.
///
/// Columns: Titre ; Statut ; Équipe ; Sprint ; Début ; Fin ; Avancement ;
/// Métiers ; Thèmes. Dates are formatted as DD/MM/YYYY. Returns the number
/// of rows written.
pub fn export_csv(state: &AppState, path: &Path) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record([
        "Titre",
        "Statut",
        "Équipe",
        "Sprint",
        "Début",
        "Fin",
        "Avancement",
        "Métiers",
        "Thèmes",
    ])
    .context("Failed to write header")?;

    let today = chrono::Local::now().date_naive();
    let mut count = 0usize;
    for task in &state.tasks {
        let team = state
            .team(task.team_id)
            .map(|t| t.name.as_str())
            .unwrap_or("");
        let sprint = task
            .sprint_id
            .and_then(|id| state.sprints.iter().find(|s| s.id == id))
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let roles = task
            .roles
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ");
        let topics = task
            .topic_ids
            .iter()
            .filter_map(|id| state.topic(*id))
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let progress = derived_progress(task.start_date, task.end_date, today);

        wtr.write_record([
            task.title.as_str(),
            task.status.label(),
            team,
            sprint.as_str(),
            &task.start_date.format("%d/%m/%Y").to_string(),
            &task.end_date.format("%d/%m/%Y").to_string(),
            &format!("{}%", progress),
            roles.as_str(),
            topics.as_str(),
        ])
        .with_context(|| format!("Failed to write task '{}'", task.title))?;
        count += 1;
    }

    wtr.flush().context("Failed to flush CSV")?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::seed_state;

    #[test]
    fn exports_one_row_per_task() {
        let path = std::env::temp_dir().join(format!("roadmap-{}.csv", uuid::Uuid::new_v4()));
        let state = seed_state();
        let count = export_csv(&state, &path).unwrap();
        assert_eq!(count, state.tasks.len());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Titre;Statut;Équipe"));
        assert_eq!(content.lines().count(), state.tasks.len() + 1);
        let _ = std::fs::remove_file(&path);
    }
}
