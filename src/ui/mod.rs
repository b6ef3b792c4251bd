pub mod detail;
pub mod export_dialog;
pub mod kanban;
pub mod theme;
pub mod timeline;
pub mod toolbar;
