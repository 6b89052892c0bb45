//! Configuration view and validation commands: `flowboard config`.

use anyhow::Result;

use super::super::{Cli, ConfigCommands};
use super::load_config;

fn show_key(key: Option<String>) -> &'static str {
    if key.is_some() { "set" } else { "not set" }
}

pub fn cmd_config(
    project_dir: &std::path::Path,
    cli: &Cli,
    command: Option<ConfigCommands>,
) -> Result<()> {
    use flowboard::config::{CONFIG_FILE, FlowToml};
    use flowboard::init::get_config_dir;

    let config_dir = get_config_dir(project_dir);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("flowboard Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = FlowToml::load_or_default(&config_dir)?;
            println!("[store]");
            println!("  backend = \"{}\"", toml.store.backend.as_str());
            if let Some(url) = &toml.store.url {
                println!("  url = \"{}\"", url);
            }
            println!("  sqlite_path = \"{}\"", toml.store.sqlite_path);
            println!();
            println!("[gateway]");
            println!("  primary = \"{}\"", toml.gateway.primary.as_str());
            println!("  gemini_model = \"{}\"", toml.gateway.gemini_model);
            println!("  openai_model = \"{}\"", toml.gateway.openai_model);
            println!();
            println!("[agent]");
            println!("  think_delay_ms = {}", toml.agent.think_delay_ms);
            println!();
            println!("[board]");
            println!("  sync_policy = \"{}\"", toml.board.sync_policy.as_str());
            println!();

            println!("Effective values (with env/CLI overrides):");
            let config = load_config(project_dir, cli)?;
            println!("  store backend = \"{}\"", config.store_backend().as_str());
            println!(
                "  store url = \"{}\"",
                config.store_url().unwrap_or_else(|| "(none)".to_string())
            );
            println!("  store key = {}", show_key(config.store_key()));
            println!("  primary provider = \"{}\"", config.primary_provider().as_str());
            println!("  GEMINI_API_KEY = {}", show_key(config.gemini_api_key()));
            println!("  OPENAI_API_KEY = {}", show_key(config.openai_api_key()));
            println!("  snapshot = {}", config.snapshot_path().display());
            println!();
            if !config_path.exists() {
                println!("Run 'flowboard config init' to create a {} file.", CONFIG_FILE);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = load_config(project_dir, cli)?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(&config_dir)?;
            FlowToml::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [store] backend, url, sqlite_path");
            println!("  - [gateway] primary, gemini_model, openai_model, system_prompt");
            println!("  - [agent] think_delay_ms");
            println!("  - [board] sync_policy");
            println!();
        }
    }

    Ok(())
}
