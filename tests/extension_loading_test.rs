use std::sync::Arc;

use queuebot::application::errors::ExtensionError;
use queuebot::application::services::{Queuebot, Runtime};
use queuebot::extensions::{builtin_catalog, discover};
use queuebot::infrastructure::adapters::MemoryChat;
use queuebot::infrastructure::config::Config;
use queuebot::infrastructure::storage::MemoryStore;

fn bot() -> Queuebot {
    let runtime = Runtime::new(
        Config::default(),
        Arc::new(MemoryChat::new()),
        Arc::new(MemoryStore::new()),
    );
    Queuebot::new(runtime, builtin_catalog())
}

fn extension_dir(entries: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in entries {
        let path = dir.path().join(entry);
        if entry.contains('.') && !entry.starts_with('.') {
            std::fs::write(path, "").unwrap();
        } else {
            std::fs::create_dir(path).unwrap();
        }
    }
    dir
}

#[tokio::test]
async fn test_discover_skips_ignored_entries() {
    let dir = extension_dir(&["queue", "meta.rs", "mod.rs", "target", ".git"]);

    let mut names = discover(dir.path()).await.unwrap();
    names.sort();
    assert_eq!(names, vec!["meta".to_string(), "queue".to_string()]);
}

#[tokio::test]
async fn test_discover_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(discover(&missing).await, Err(ExtensionError::Discovery { .. })));
}

#[tokio::test]
async fn test_missing_directory_fails_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let bot = bot();

    let result = bot.load_extensions_from(dir.path().join("nope")).await;
    assert!(matches!(result, Err(ExtensionError::Discovery { .. })));
    assert!(bot.loaded_extensions().await.is_empty());
    bot.load("meta").await.unwrap();
}

#[tokio::test]
async fn test_load_directory_continues_past_failures() {
    let dir = extension_dir(&["queue", "meta", "weather", "target"]);
    let bot = bot();

    let report = bot.load_extensions_from(dir.path()).await.unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(&report.failed[0], ExtensionError::Load { name, .. } if name == "weather"));

    let mut loaded = report.to_load.to_vec();
    loaded.sort();
    assert_eq!(loaded, vec!["meta".to_string(), "queue".to_string()]);
    assert_eq!(bot.to_load().await, report.to_load);

    let commands = bot.command_names().await;
    for name in ["echo", "ping", "preview", "show", "uptime"] {
        assert!(commands.contains(&name.to_string()), "missing {}", name);
    }
}

#[tokio::test]
async fn test_reload_keeps_command_table() {
    let dir = extension_dir(&["queue", "meta"]);
    let bot = bot();
    bot.load_extensions_from(dir.path()).await.unwrap();
    let before = bot.command_names().await;

    bot.reload("queue").await.unwrap();
    assert_eq!(bot.command_names().await, before);

    assert!(matches!(bot.reload("weather").await, Err(ExtensionError::NotLoaded(_))));
    assert_eq!(bot.command_names().await, before);
}

#[tokio::test]
async fn test_load_twice_is_rejected() {
    let bot = bot();
    bot.load("meta").await.unwrap();
    assert!(matches!(bot.load("meta").await, Err(ExtensionError::Load { .. })));
    assert_eq!(bot.loaded_extensions().await, vec!["meta".to_string()]);
}
