use std::path::Path;

use anyhow::{Context, Result};

use crate::model::AppState;

/// Save the state document to a JSON file.
pub fn save_document(state: &AppState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("Failed to serialize document")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load a state document from a JSON file.
pub fn load_document(path: &Path) -> Result<AppState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::seed_state;

    #[test]
    fn document_survives_a_file_round_trip() {
        let path = std::env::temp_dir().join(format!("roadmap-doc-{}.json", uuid::Uuid::new_v4()));
        let state = seed_state();
        save_document(&state, &path).unwrap();
        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.tasks.len(), state.tasks.len());
        assert_eq!(loaded.teams.len(), state.teams.len());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_document(Path::new("/nonexistent/roadmap.json")).is_err());
    }
}
