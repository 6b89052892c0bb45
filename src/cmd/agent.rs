//! Agent task runner command: `flowboard agent <goal>`.

use std::sync::Arc;

use anyhow::{Result, bail};
use flowboard::agent::{AgentRunner, RunEvent, RunStatus};
use flowboard::gateway::Gateway;
use tokio::sync::broadcast::error::RecvError;

use super::super::Cli;
use super::load_config;

pub async fn cmd_agent(
    project_dir: &std::path::Path,
    cli: &Cli,
    goal: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let gateway = Gateway::from_config(&config);
    let runner = AgentRunner::new(Arc::new(gateway), config.think_delay());

    let mut events = runner.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RunEvent::Log { line }) if !json => println!("{}", line),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "agent log output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let status = tokio::select! {
        status = runner.start(goal) => status,
        _ = tokio::signal::ctrl_c() => {
            runner.stop();
            RunStatus::Idle
        }
    };
    let run = runner.snapshot();
    drop(runner);
    let _ = printer.await;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else if !run.tasks.is_empty() {
        println!();
        for task in &run.tasks {
            println!("{} {}", task.status.marker(), task.description);
            if let Some(result) = &task.result {
                println!("    {}", console::style(result).dim());
            }
        }
    }

    match status {
        RunStatus::Failed => bail!("Agent run failed"),
        RunStatus::Idle if goal.trim().is_empty() => println!("Goal is empty; nothing to run."),
        RunStatus::Idle => println!("{}", console::style("Agent stopped.").yellow()),
        _ => {}
    }
    Ok(())
}
