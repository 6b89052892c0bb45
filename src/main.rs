use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowboard::store::StoreBackend;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "flowboard")]
#[command(version, about = "FlowAssist dashboard: kanban board, agent runner and assistant")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Row store backend (rest, sqlite or memory). Overrides flowboard.toml.
    #[arg(long, global = true)]
    pub store: Option<StoreBackend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .flowboard/ with a default config and seeded snapshot
    Init,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show and edit the kanban board
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Plan a goal and run its tasks
    Agent {
        goal: String,

        /// Print the finished run as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the assistant a question
    Chat { message: String },
    /// Radar leads and signals
    Leads {
        #[command(subcommand)]
        command: LeadsCommands,
    },
    /// Content sources the scrapers watch
    Sources {
        #[command(subcommand)]
        command: SourcesCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    Show,
    Validate,
    Init,
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    /// Print lanes and counters
    List {
        /// all, youtube or reddit
        #[arg(short, long, default_value = "all")]
        filter: String,

        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Move an item to a drop zone (done, trash, inbox, or any source lane)
    Move { id: String, zone: String },
    /// Add a manual link, note or prompt
    Add {
        /// link, note or prompt
        kind: String,
        content: String,

        #[arg(short, long)]
        title: Option<String>,
    },
    /// Edit an item's fields
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// Replaces all summary points (repeat for several)
        #[arg(long)]
        summary: Vec<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        url: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Clone)]
pub enum LeadsCommands {
    /// Pull leads from the row store into the local snapshot
    Sync,
    List,
    /// Turn a signal into a new lead
    Convert { signal_id: String },
}

#[derive(Subcommand, Clone)]
pub enum SourcesCommands {
    List,
    /// Pull sources from the row store into the local snapshot
    Sync,
    /// Register a source in the row store
    Add {
        name: String,
        url: String,

        /// youtube, reddit, github, rss or custom
        #[arg(long, default_value = "custom")]
        kind: String,
    },
    /// Delete a source from the row store and the local snapshot
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    flowboard::logging::init(cli.verbose, cli.log_json);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, &cli, command.clone())?,
        Commands::Board { command } => cmd::cmd_board(&project_dir, &cli, command.clone()).await?,
        Commands::Agent { goal, json } => cmd::cmd_agent(&project_dir, &cli, goal, *json).await?,
        Commands::Chat { message } => cmd::cmd_chat(&project_dir, &cli, message).await?,
        Commands::Leads { command } => cmd::cmd_leads(&project_dir, &cli, command.clone()).await?,
        Commands::Sources { command } => {
            cmd::cmd_sources(&project_dir, &cli, command.clone()).await?
        }
    }

    Ok(())
}
