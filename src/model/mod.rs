pub mod filter;
pub mod org;
pub mod schedule;
pub mod state;
pub mod task;

pub use filter::Filters;
pub use org::{Team, Topic};
pub use schedule::{Milestone, Sprint};
pub use state::AppState;
pub use task::{Role, Task, TaskStatus, TaskStep};
