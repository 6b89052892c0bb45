use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::{RunEvent, broadcast_event};
use super::plan::{execution_prompt, parse_plan, planning_prompt};
use super::types::{AgentRun, AgentTask, RunStatus, TaskStatus, is_valid_transition};
use crate::errors::AgentError;
use crate::gateway::TextGenerator;
use crate::util::preview;

pub const DEFAULT_THINK_DELAY: Duration = Duration::from_millis(1500);

/// Result of one controller step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A task finished; call `step` again.
    Advanced,
    /// Nothing more to do for this run.
    Halted(RunStatus),
}

/// Turns a goal into a plan and executes its tasks one at a time.
///
/// Cloning shares the run, so one clone can drive `start` while another
/// calls `stop` or reads a snapshot.
#[derive(Clone)]
pub struct AgentRunner {
    generator: Arc<dyn TextGenerator>,
    run: Arc<Mutex<AgentRun>>,
    // Bumped by start/stop/clear; results from an older epoch are dropped.
    epoch: Arc<AtomicU64>,
    think_delay: Duration,
    events: broadcast::Sender<RunEvent>,
}

impl AgentRunner {
    pub fn new(generator: Arc<dyn TextGenerator>, think_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            generator,
            run: Arc::new(Mutex::new(AgentRun::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            think_delay,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> AgentRun {
        self.lock().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.lock().status
    }

    fn lock(&self) -> MutexGuard<'_, AgentRun> {
        self.run.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn log(&self, run: &mut AgentRun, line: String) {
        info!(target: "flowboard::agent", "{}", line);
        run.logs.push(line.clone());
        broadcast_event(&self.events, RunEvent::Log { line });
    }

    fn set_status(&self, run: &mut AgentRun, status: RunStatus) {
        if !is_valid_transition(run.status, status) {
            warn!(from = %run.status, to = %status, "unexpected run transition");
        }
        run.status = status;
        broadcast_event(&self.events, RunEvent::StatusChanged { status });
    }

    fn publish_task(&self, task: &AgentTask) {
        broadcast_event(&self.events, RunEvent::TaskUpdated { task: task.clone() });
    }

    /// Plan `goal` and run every task to completion, failure or stop.
    ///
    /// Blank goals, and calls while a run is planning or running, change
    /// nothing. Returns the status the run ended in.
    pub async fn start(&self, goal: &str) -> RunStatus {
        let goal = goal.trim();
        let epoch = {
            let mut run = self.lock();
            if goal.is_empty() || run.status.is_active() {
                return run.status;
            }
            if run.status.is_finished() {
                *run = AgentRun::default();
                broadcast_event(&self.events, RunEvent::Cleared);
            }
            run.goal = goal.to_string();
            self.set_status(&mut run, RunStatus::Planning);
            self.log(&mut run, format!("Starting agent with goal: \"{goal}\""));
            self.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        let response = self.generator.generate(&planning_prompt(goal)).await;

        {
            let mut run = self.lock();
            if !self.is_current(epoch) || run.status != RunStatus::Planning {
                debug!("discarding stale plan");
                return run.status;
            }
            let plan = response.map_err(AgentError::from).and_then(|text| {
                debug!(response = %preview(&text, 500), "planner replied");
                parse_plan(&text)
            });
            match plan {
                Ok(steps) => {
                    run.tasks = steps.into_iter().map(AgentTask::new).collect();
                    for task in &run.tasks {
                        self.publish_task(task);
                    }
                    self.set_status(&mut run, RunStatus::Running);
                    let count = run.tasks.len();
                    self.log(&mut run, format!("Plan generated: {count} tasks."));
                }
                Err(e) => {
                    self.set_status(&mut run, RunStatus::Failed);
                    self.log(&mut run, format!("Planning error: {e}"));
                    return RunStatus::Failed;
                }
            }
        }

        self.drive(epoch).await
    }

    async fn drive(&self, epoch: u64) -> RunStatus {
        loop {
            if let StepOutcome::Halted(status) = self.step(epoch).await {
                return status;
            }
        }
    }

    /// Execute the first pending task of run `epoch`.
    ///
    /// Does nothing while another task of the run is still running.
    /// With nothing pending, a run whose tasks all completed moves to
    /// `Completed`. A task failure fails the run and leaves later tasks
    /// pending.
    pub async fn step(&self, epoch: u64) -> StepOutcome {
        let (task_id, description, goal, context) = {
            let mut run = self.lock();
            if !self.is_current(epoch) || run.status != RunStatus::Running {
                return StepOutcome::Halted(run.status);
            }
            // Another caller owns the in-flight task.
            if run.running_count() > 0 {
                return StepOutcome::Halted(run.status);
            }
            let Some(index) = run.next_pending() else {
                if run.all_completed() {
                    self.set_status(&mut run, RunStatus::Completed);
                    self.log(&mut run, "All tasks completed successfully.".to_string());
                }
                return StepOutcome::Halted(run.status);
            };
            let context = run.accumulated_context();
            let task = &mut run.tasks[index];
            task.status = TaskStatus::Running;
            let task = task.clone();
            self.publish_task(&task);
            self.log(&mut run, format!("Executing: {}", task.description));
            (task.id, task.description, run.goal.clone(), context)
        };

        tokio::time::sleep(self.think_delay).await;
        if !self.is_current(epoch) {
            return StepOutcome::Halted(self.status());
        }

        let result = self
            .generator
            .generate(&execution_prompt(&goal, &description, &context))
            .await;

        let mut run = self.lock();
        if !self.is_current(epoch) || run.status != RunStatus::Running {
            debug!(task = %description, "discarding stale task result");
            return StepOutcome::Halted(run.status);
        }
        let Some(index) = run.tasks.iter().position(|t| t.id == task_id) else {
            return StepOutcome::Halted(run.status);
        };
        match result {
            Ok(text) => {
                let task = &mut run.tasks[index];
                task.status = TaskStatus::Completed;
                task.result = Some(text);
                let task = task.clone();
                self.publish_task(&task);
                self.log(&mut run, format!("Completed: {}", task.description));
                StepOutcome::Advanced
            }
            Err(e) => {
                let message = e.to_string();
                let task = &mut run.tasks[index];
                task.status = TaskStatus::Failed;
                task.result = Some(message.clone());
                let task = task.clone();
                self.publish_task(&task);
                self.set_status(&mut run, RunStatus::Failed);
                self.log(&mut run, format!("Task failed: {message}"));
                StepOutcome::Halted(RunStatus::Failed)
            }
        }
    }

    /// Current epoch, for hosts that drive `step` themselves.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Return the run to idle. In-flight calls finish but their results are
    /// dropped.
    pub fn stop(&self) {
        let mut run = self.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.set_status(&mut run, RunStatus::Idle);
        self.log(&mut run, "Agent stopped by user.".to_string());
    }

    pub fn clear(&self) {
        let mut run = self.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *run = AgentRun::default();
        broadcast_event(&self.events, RunEvent::Cleared);
    }
}
