//! Kanban board commands: `flowboard board`.

use anyhow::{Context, Result, bail};
use flowboard::board::{
    BoardManager, ItemPatch, NewItem, NewItemKind, PendingWrite, SourceFilter,
};
use flowboard::store::open_store;

use super::super::{BoardCommands, Cli};
use super::load_config;

/// Block until the detached remote write lands.
async fn confirm(write: PendingWrite) -> Result<()> {
    write.wait().await.context("Remote write failed")
}

pub async fn cmd_board(
    project_dir: &std::path::Path,
    cli: &Cli,
    command: BoardCommands,
) -> Result<()> {
    let config = load_config(project_dir, cli)?;
    let store = open_store(&config)?;
    let board = BoardManager::with_policy(store, config.sync_policy());
    board.load().await?;

    match command {
        BoardCommands::List { filter, search } => {
            let filter: SourceFilter = filter.parse().map_err(anyhow::Error::msg)?;
            let stats = board.stats();
            println!(
                "{} inbox · {} done · {} hot",
                console::style(stats.inbox).bold(),
                console::style(stats.done).green(),
                console::style(stats.hot).red()
            );
            if let Some(latest) = stats.most_recent {
                println!("Latest: {}", latest.format("%Y-%m-%d %H:%M"));
            }

            for lane in board.lanes(filter, &search) {
                println!();
                println!(
                    "{} {}",
                    console::style(&lane.title).bold().cyan(),
                    console::style(format!("({}) [{}]", lane.items.len(), lane.id)).dim()
                );
                for item in &lane.items {
                    println!(
                        "  {}  {} {}",
                        console::style(&item.id).dim(),
                        item.title,
                        console::style(format!("[{}]", item.status.label())).dim()
                    );
                }
            }
        }
        BoardCommands::Move { id, zone } => match board.move_item(&id, &zone) {
            Some(write) => {
                confirm(write).await?;
                let status = board.item(&id).map(|i| i.status.as_str()).unwrap_or_default();
                println!("Moved {} to {}", id, status);
            }
            None => {
                println!(
                    "{} nothing moved (unknown item '{}' or zone '{}')",
                    console::style("⚠").yellow(),
                    id,
                    zone
                );
            }
        },
        BoardCommands::Add {
            kind,
            content,
            title,
        } => {
            let kind: NewItemKind = kind.parse().map_err(anyhow::Error::msg)?;
            let (item, write) = board.add_item(NewItem::manual(kind, &content, title.as_deref()));
            confirm(write).await?;
            println!("Added item {}", item.id);
        }
        BoardCommands::Edit {
            id,
            title,
            summary,
            notes,
            category,
            url,
        } => {
            let patch = ItemPatch {
                title,
                summary_points: if summary.is_empty() { None } else { Some(summary) },
                notes,
                category,
                url,
            };
            if patch.is_empty() {
                bail!("Nothing to edit: pass at least one of --title, --summary, --notes, --category, --url");
            }
            confirm(board.update_item(&id, &patch)?).await?;
            println!("Updated item {}", id);
        }
        BoardCommands::Delete { id } => {
            confirm(board.delete_item(&id)?).await?;
            println!("Deleted item {}", id);
        }
    }

    Ok(())
}
