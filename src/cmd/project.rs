//! Project initialization: `flowboard init`.

use anyhow::Result;

pub fn cmd_init(project_dir: &std::path::Path) -> Result<()> {
    use flowboard::init::{init_project, is_initialized};

    let was_initialized = is_initialized(project_dir);
    let result = init_project(project_dir)?;

    if result.created {
        println!(
            "Initialized flowboard project at {}",
            result.config_dir.display()
        );
        println!();
        println!("Created:");
        println!("  .flowboard/");
        println!("  ├── flowboard.toml            # Store, gateway, agent and board settings");
        println!("  └── flowassist-storage.json   # Local snapshot of sources, ideas and leads");
        println!();
        println!("Next steps:");
        println!("  1. Put FLOWBOARD_STORE_URL / FLOWBOARD_STORE_KEY in .env (or use --store sqlite)");
        println!("  2. Put GEMINI_API_KEY or OPENAI_API_KEY in .env");
        println!("  3. Run `flowboard board list`");
    } else if was_initialized {
        println!(
            "flowboard project already initialized at {}",
            result.config_dir.display()
        );
        println!("Missing files recreated, existing files kept.");
    }

    Ok(())
}
