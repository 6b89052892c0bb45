//! Radar commands: `flowboard leads` and `flowboard sources`.

use anyhow::{Context, Result, bail};
use flowboard::collections::models::{Source, SourceKind};
use flowboard::collections::remote::{delete_source, source_row};
use flowboard::collections::{fetch_leads, fetch_sources, generate_id};
use flowboard::store::{Table, open_store};

use super::super::{Cli, LeadsCommands, SourcesCommands};
use super::{load_config, open_state};

pub async fn cmd_leads(
    project_dir: &std::path::Path,
    cli: &Cli,
    command: LeadsCommands,
) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let mut state = open_state(&config)?;

    match command {
        LeadsCommands::Sync => {
            let store = open_store(&config)?;
            match fetch_leads(store.as_ref()).await {
                Ok(sync) => {
                    let (leads, signals) = (sync.leads.len(), sync.signals.len());
                    state.mutate(|s| s.apply_lead_sync(sync));
                    println!("Synced {} leads ({} signals derived)", leads, signals);
                }
                Err(e) => {
                    tracing::error!(error = %e, "lead sync failed");
                    bail!("Lead sync failed, local leads unchanged: {}", e);
                }
            }
        }
        LeadsCommands::List => {
            let radar = &state.state().radar;
            if radar.leads.is_empty() {
                println!("No leads yet. Run `flowboard leads sync` or convert a signal.");
            }
            for lead in radar.leads.iter() {
                println!(
                    "{:>3}  {:<6} {}  {}",
                    lead.score,
                    lead.automation_readiness.as_str(),
                    lead.company_name,
                    console::style(format!("[{}] {}", lead.status, lead.id)).dim()
                );
            }
            if !radar.signals.is_empty() {
                println!();
                println!("{}", console::style("Signals").bold().cyan());
                for signal in radar.signals.iter() {
                    let linked = if signal.lead_id.is_some() { "linked" } else { "open" };
                    println!(
                        "  {}  {:>3}  {}  {}",
                        console::style(&signal.id).dim(),
                        signal.relevance_score,
                        signal.content,
                        console::style(format!("({})", linked)).dim()
                    );
                }
            }
        }
        LeadsCommands::Convert { signal_id } => {
            match state.mutate(|s| s.convert_signal_to_lead(&signal_id)) {
                Some(lead_id) => println!("Created lead {} from signal {}", lead_id, signal_id),
                None => bail!("Signal {} not found", signal_id),
            }
        }
    }

    Ok(())
}

pub async fn cmd_sources(
    project_dir: &std::path::Path,
    cli: &Cli,
    command: SourcesCommands,
) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let mut state = open_state(&config)?;

    match command {
        SourcesCommands::List => {
            for source in state.state().assist.sources.iter() {
                let active = if source.is_active { "" } else { " (inactive)" };
                println!(
                    "{:<8} {}{}  {}",
                    source.kind.as_str(),
                    source.name,
                    active,
                    console::style(&source.url).dim()
                );
            }
        }
        SourcesCommands::Sync => {
            let store = open_store(&config)?;
            let sources = fetch_sources(store.as_ref()).await?;
            let count = sources.len();
            state.mutate(|s| s.assist.sources.replace_all(sources));
            println!("Synced {} sources", count);
        }
        SourcesCommands::Add { name, url, kind } => {
            let kind: SourceKind = kind.parse().map_err(anyhow::Error::msg)?;
            let source = Source {
                id: generate_id(),
                ..Source::new(name, url, kind)
            };
            let store = open_store(&config)?;
            store.insert(Table::Sources, source_row(&source)).await?;
            println!("Added source {} ({})", source.name, source.id);
            state.mutate(|s| s.assist.sources.push(source));
        }
        SourcesCommands::Remove { id } => {
            let store = open_store(&config)?;
            delete_source(store.as_ref(), &id)
                .await
                .with_context(|| format!("Failed to delete source {}", id))?;
            if state.mutate(|s| s.assist.sources.delete(&id)) {
                println!("Removed source {}", id);
            } else {
                println!("Removed source {} (it was not in the local snapshot)", id);
            }
        }
    }

    Ok(())
}
