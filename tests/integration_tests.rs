//! Integration tests for flowboard
//!
//! These drive the binary end to end against temporary project directories.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a flowboard Command with no ambient secrets
fn flowboard() -> Command {
    let mut cmd = cargo_bin_cmd!("flowboard");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("FLOWBOARD_STORE_URL")
        .env_remove("FLOWBOARD_STORE_KEY")
        .env_remove("FLOWBOARD_PROVIDER")
        .env_remove("RUST_LOG");
    cmd
}

fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn init_project(dir: &TempDir) {
    flowboard()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
}

/// Run a board command against the project's SQLite store.
fn board(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    flowboard()
        .current_dir(dir.path())
        .args(["--store", "sqlite", "board"])
        .args(args)
        .assert()
}

fn added_id(output: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(output);
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("Added item "))
        .map(|id| id.trim().to_string())
        .unwrap()
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_flowboard_help() {
        flowboard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("board"))
            .stdout(predicate::str::contains("agent"));
    }

    #[test]
    fn test_flowboard_version() {
        flowboard().arg("--version").assert().success();
    }

    #[test]
    fn test_init_creates_structure() {
        let dir = create_temp_project();

        flowboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized flowboard project"));

        assert!(dir.path().join(".flowboard/flowboard.toml").is_file());
        assert!(dir.path().join(".flowboard/flowassist-storage.json").is_file());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = create_temp_project();
        init_project(&dir);
        flowboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("already initialized"));
    }

    #[test]
    fn test_unknown_store_backend_is_rejected() {
        flowboard()
            .args(["--store", "postgres", "board", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid store backend"));
    }
}

// =============================================================================
// Config
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("gemini_model = \"gemini-2.0-flash\""))
            .stdout(predicate::str::contains("GEMINI_API_KEY = not set"));
    }

    #[test]
    fn test_config_validate_warns_about_missing_secrets() {
        let dir = create_temp_project();
        init_project(&dir);
        flowboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no AI provider key set"))
            .stdout(predicate::str::contains("no URL is set"));
    }

    #[test]
    fn test_config_reads_dotenv() {
        let dir = create_temp_project();
        fs::write(dir.path().join(".env"), "OPENAI_API_KEY=sk-test\n").unwrap();
        flowboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("OPENAI_API_KEY = set"));
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created flowboard.toml"));
        flowboard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".flowboard")).unwrap();
        fs::write(dir.path().join(".flowboard/flowboard.toml"), "[store\n").unwrap();
        flowboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse flowboard.toml"));
    }
}

// =============================================================================
// Board (SQLite backend)
// =============================================================================

mod board_sqlite {
    use super::*;

    #[test]
    fn test_add_then_list_shows_item_in_inbox() {
        let dir = create_temp_project();
        let out = board(&dir, &["add", "note", "Remember the milk", "--title", "Groceries"])
            .success()
            .stdout(predicate::str::contains("Added item "))
            .get_output()
            .stdout
            .clone();
        let id = added_id(&out);

        board(&dir, &["list"])
            .success()
            .stdout(predicate::str::contains("1 inbox"))
            .stdout(predicate::str::contains("Groceries"))
            .stdout(predicate::str::contains(id));
    }

    #[test]
    fn test_move_to_done_persists() {
        let dir = create_temp_project();
        let out = board(&dir, &["add", "link", "https://example.com/post"])
            .success()
            .get_output()
            .stdout
            .clone();
        let id = added_id(&out);

        board(&dir, &["move", &id, "done"])
            .success()
            .stdout(predicate::str::contains(format!("Moved {} to done", id)));

        board(&dir, &["list"])
            .success()
            .stdout(predicate::str::contains("0 inbox · 1 done"))
            .stdout(predicate::str::contains("[Done]"));
    }

    #[test]
    fn test_move_to_unknown_zone_is_a_no_op() {
        let dir = create_temp_project();
        let out = board(&dir, &["add", "prompt", "Summarize this"])
            .success()
            .get_output()
            .stdout
            .clone();
        let id = added_id(&out);

        board(&dir, &["move", &id, "nowhere"])
            .success()
            .stdout(predicate::str::contains("nothing moved"));
        board(&dir, &["list"])
            .success()
            .stdout(predicate::str::contains("1 inbox"));
    }

    #[test]
    fn test_edit_and_delete() {
        let dir = create_temp_project();
        let out = board(&dir, &["add", "note", "draft"]).success().get_output().stdout.clone();
        let id = added_id(&out);

        board(&dir, &["edit", &id, "--title", "Renamed", "--summary", "first", "--summary", "second"])
            .success()
            .stdout(predicate::str::contains("Updated item"));
        board(&dir, &["list", "--search", "second"])
            .success()
            .stdout(predicate::str::contains("Renamed"));

        board(&dir, &["delete", &id]).success();
        board(&dir, &["list"])
            .success()
            .stdout(predicate::str::contains("Renamed").not());
    }

    #[test]
    fn test_edit_without_fields_fails() {
        let dir = create_temp_project();
        board(&dir, &["edit", "n1"])
            .failure()
            .stderr(predicate::str::contains("Nothing to edit"));
    }

    #[test]
    fn test_edit_unknown_item_fails() {
        let dir = create_temp_project();
        board(&dir, &["edit", "missing", "--title", "x"])
            .failure()
            .stderr(predicate::str::contains("Item missing not found"));
    }

    #[test]
    fn test_rest_backend_without_url_fails() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["board", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No row store URL configured"));
    }
}

// =============================================================================
// Agent, chat and radar
// =============================================================================

mod assistant {
    use super::*;

    #[test]
    fn test_agent_without_provider_keys_fails_in_planning() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["agent", "Research competitors"])
            .assert()
            .failure()
            .stdout(predicate::str::contains(
                "Starting agent with goal: \"Research competitors\"",
            ))
            .stdout(predicate::str::contains("Planning error"))
            .stderr(predicate::str::contains("Agent run failed"));
    }

    #[test]
    fn test_agent_blank_goal_does_nothing() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["agent", "   "])
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to run"));
    }

    #[test]
    fn test_chat_without_provider_keys_reports_exhaustion() {
        let dir = create_temp_project();
        flowboard()
            .current_dir(dir.path())
            .args(["chat", "hello"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Could not get a response from any AI provider",
            ));
    }

    #[test]
    fn test_sources_list_shows_seed_sources() {
        let dir = create_temp_project();
        init_project(&dir);
        flowboard()
            .current_dir(dir.path())
            .args(["sources", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("r/LocalLLaMA"))
            .stdout(predicate::str::contains("Hugging Face"));
    }

    #[test]
    fn test_sources_remove_deletes_locally() {
        let dir = create_temp_project();
        init_project(&dir);
        flowboard()
            .current_dir(dir.path())
            .args(["--store", "sqlite", "sources", "remove", "3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed source 3"));

        flowboard()
            .current_dir(dir.path())
            .args(["sources", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("r/LocalLLaMA").not())
            .stdout(predicate::str::contains("Hugging Face"));
    }

    #[test]
    fn test_convert_unknown_signal_fails() {
        let dir = create_temp_project();
        init_project(&dir);
        flowboard()
            .current_dir(dir.path())
            .args(["leads", "convert", "missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Signal missing not found"));
    }

    #[test]
    fn test_convert_signal_from_snapshot() {
        let dir = create_temp_project();
        init_project(&dir);

        let snapshot_path = dir.path().join(".flowboard/flowassist-storage.json");
        let mut snapshot: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&snapshot_path).unwrap()).unwrap();
        snapshot["radar"]["signals"] = serde_json::json!([{
            "id": "sig-1",
            "source": "reddit_post",
            "source_url": "https://reddit.com/r/smallbusiness/x",
            "content": "We copy invoices by hand every week",
            "pain_points": ["manual invoicing"],
            "sentiment": "negative",
            "automation_opportunity": "Invoice OCR",
            "detected_at": "2026-03-01T10:00:00Z",
            "relevance_score": 91
        }]);
        fs::write(&snapshot_path, snapshot.to_string()).unwrap();

        flowboard()
            .current_dir(dir.path())
            .args(["leads", "convert", "sig-1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created lead"));

        flowboard()
            .current_dir(dir.path())
            .args(["leads", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("New company from signal"))
            .stdout(predicate::str::contains("hot"))
            .stdout(predicate::str::contains("(linked)"));
    }
}

// =============================================================================
// REST backend against a local mock
// =============================================================================

mod rest_backend {
    use super::*;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    /// Serve `leads` and `sources` on a background runtime; returns the base URL.
    fn spawn_mock() -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                let app = Router::new()
                    .route(
                        "/rest/v1/leads",
                        get(|| async {
                            Json(json!([
                                {"id": "l1", "company_name": "Acme", "score": 72,
                                 "tags": [], "signals": ["Orders typed by hand"]},
                                {"id": "l2", "company_name": "Globex", "score": 15}
                            ]))
                        }),
                    )
                    .route(
                        "/rest/v1/sources",
                        get(|| async {
                            Json(json!([
                                {"id": "s9", "name": "r/rust", "identifier": "https://reddit.com/r/rust",
                                 "platform": "reddit", "created_at": "2026-01-01T00:00:00Z"}
                            ]))
                        }),
                    );
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        format!("http://{}", rx.recv().unwrap())
    }

    #[test]
    fn test_leads_sync_then_list() {
        let url = spawn_mock();
        let dir = create_temp_project();
        init_project(&dir);

        flowboard()
            .current_dir(dir.path())
            .env("FLOWBOARD_STORE_URL", &url)
            .args(["leads", "sync"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Synced 2 leads (2 signals derived)"));

        flowboard()
            .current_dir(dir.path())
            .args(["leads", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Acme"))
            .stdout(predicate::str::contains("Orders typed by hand"))
            .stdout(predicate::str::contains("syn-l2"));
    }

    #[test]
    fn test_sources_sync_replaces_seed_sources() {
        let url = spawn_mock();
        let dir = create_temp_project();
        init_project(&dir);

        flowboard()
            .current_dir(dir.path())
            .env("FLOWBOARD_STORE_URL", &url)
            .args(["sources", "sync"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Synced 1 sources"));

        flowboard()
            .current_dir(dir.path())
            .args(["sources", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("r/rust"))
            .stdout(predicate::str::contains("Hugging Face").not());
    }
}
