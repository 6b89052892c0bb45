//! Sequential agent task runner.
//!
//! | State       | Entered when                                   |
//! |-------------|------------------------------------------------|
//! | `idle`      | initially, after `stop()` or `clear()`         |
//! | `planning`  | `start(goal)` with a non-blank goal            |
//! | `running`   | the plan parsed into at least one task         |
//! | `completed` | every task completed                           |
//! | `failed`    | the plan failed to parse, or any task failed   |

pub mod events;
pub mod plan;
pub mod runner;
pub mod types;

pub use events::RunEvent;
pub use runner::{AgentRunner, DEFAULT_THINK_DELAY, StepOutcome};
pub use types::{AgentRun, AgentTask, RunStatus, TaskStatus};
