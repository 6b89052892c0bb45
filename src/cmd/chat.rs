//! Assistant chat command: `flowboard chat <message>`.

use anyhow::{Result, bail};
use flowboard::collections::chat::{ERROR_MARKER, ask};
use flowboard::gateway::Gateway;

use super::super::Cli;
use super::{load_config, open_state};

pub async fn cmd_chat(project_dir: &std::path::Path, cli: &Cli, message: &str) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let gateway = Gateway::from_config(&config);
    let mut state = open_state(&config)?;

    let Some(reply) = ask(&mut state, &gateway, message).await else {
        println!("Message is empty; nothing sent.");
        return Ok(());
    };

    if reply.content.starts_with(ERROR_MARKER) {
        bail!("{}", reply.content.trim_start_matches(ERROR_MARKER));
    }
    println!("{}", reply.content);
    Ok(())
}
