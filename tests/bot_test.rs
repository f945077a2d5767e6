use std::sync::Arc;

use queuebot::application::messaging::dispatcher::PERMISSION_DENIED_REPLY;
use queuebot::application::messaging::RouterOutcome;
use queuebot::application::services::{Queuebot, Runtime};
use queuebot::domain::entities::{Embed, Emoji, Message, Suggestion, User};
use queuebot::extensions::builtin_catalog;
use queuebot::infrastructure::adapters::MemoryChat;
use queuebot::infrastructure::config::Config;
use queuebot::infrastructure::storage::MemoryStore;

const CHANNEL: u64 = 10;

struct Harness {
    bot: Queuebot,
    chat: Arc<MemoryChat>,
    store: Arc<MemoryStore>,
}

async fn harness() -> Harness {
    let mut config = Config::default();
    config.bot.prefix = "!".to_string();
    config.converters.preview_poll_interval_ms = 1;

    let chat = Arc::new(MemoryChat::new());
    let store = Arc::new(MemoryStore::new());
    let runtime = Runtime::new(config, chat.clone(), store.clone());
    let bot = Queuebot::new(runtime, builtin_catalog());

    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("queue")).unwrap();
    std::fs::write(dir.path().join("meta.yaml"), "").unwrap();
    let report = bot.load_extensions_from(dir.path()).await.unwrap();
    assert!(report.failed.is_empty());

    bot.ready().await.unwrap();
    Harness { bot, chat, store }
}

fn from(user: User, id: u64, content: &str) -> Message {
    Message::new(id, CHANNEL, user, content)
}

fn alice(id: u64, content: &str) -> Message {
    from(User::new(300, "alice"), id, content)
}

#[tokio::test]
async fn test_show_public_suggestion_and_emoji() {
    let h = harness().await;
    h.store
        .insert(Suggestion::new(12, 3, "blobcat", "https://cdn.example/s12.png").public())
        .await;
    h.chat.add_emoji(
        Emoji::new(396521772691881987, "blobdance", "https://cdn.example/blobdance.gif")
            .animated(),
    );

    let outcome = h.bot.on_message(alice(1, "!show 12")).await.unwrap();
    assert_eq!(outcome.reply(), Some("Suggestion #3 :blobcat: https://cdn.example/s12.png"));

    let outcome = h.bot.on_message(alice(2, "!show blobdance")).await.unwrap();
    assert_eq!(
        outcome.reply(),
        Some(":blobdance: (396521772691881987) https://cdn.example/blobdance.gif")
    );

    assert_eq!(h.chat.sent().len(), 2);
    assert!(h.chat.sent().iter().all(|(channel, _)| *channel == CHANNEL));
}

#[tokio::test]
async fn test_show_rejects_private_suggestion() {
    let h = harness().await;
    h.store.insert(Suggestion::new(13, 4, "blobfox", "https://cdn.example/s13.png")).await;

    let outcome = h.bot.on_message(alice(1, "!show 13")).await.unwrap();
    assert_eq!(outcome.reply(), Some("Suggestion #4 is not in the public queue."));
    // The emoji fallback is never consulted
    assert_eq!(h.chat.emoji_lookups(), 0);
}

#[tokio::test]
async fn test_preview_waits_for_link_preview() {
    let h = harness().await;
    h.chat.reveal_embeds_after(
        7,
        2,
        vec![Embed::with_thumbnail("https://proxy.example/cat.png")],
    );

    let outcome = h.bot.on_message(alice(7, "!preview https://example.com/cat.png")).await.unwrap();
    assert_eq!(outcome.reply(), Some("https://proxy.example/cat.png"));
    assert_eq!(h.chat.fetch_embeds_calls(), 3);
    assert_eq!(h.chat.typing_calls(), 1);
}

#[tokio::test]
async fn test_preview_of_unresolvable_token() {
    let h = harness().await;

    let outcome = h.bot.on_message(alice(1, "!preview nothing")).await.unwrap();
    assert_eq!(outcome.reply(), Some("Couldn't resolve to suggestion or image."));

    let outcome = h.bot.on_message(alice(2, "!preview")).await.unwrap();
    assert_eq!(outcome.reply(), Some("Missing required argument: suggestion."));
    assert_eq!(h.chat.fetch_embeds_calls(), 0);
}

#[tokio::test]
async fn test_owner_only_command() {
    let h = harness().await;

    let outcome = h.bot.on_message(alice(1, "!uptime")).await.unwrap();
    assert_eq!(outcome.reply(), Some(PERMISSION_DENIED_REPLY));

    let owner = h.bot.runtime().owner().await.unwrap();
    let outcome = h.bot.on_message(from(owner, 2, "!uptime")).await.unwrap();
    assert!(matches!(outcome, RouterOutcome::Invoked { .. }));
    assert!(outcome.reply().unwrap().starts_with("Up for 0h"));
}

#[tokio::test]
async fn test_unknown_command_sends_nothing() {
    let h = harness().await;

    assert_eq!(h.bot.on_message(alice(1, "!nope")).await.unwrap(), RouterOutcome::Unhandled);
    assert_eq!(h.bot.on_message(alice(2, "hello there")).await.unwrap(), RouterOutcome::Unhandled);
    assert!(h.chat.sent().is_empty());
}

#[tokio::test]
async fn test_unloaded_extension_stops_answering() {
    let h = harness().await;
    let outcome = h.bot.on_message(alice(1, "!echo hi there")).await.unwrap();
    assert_eq!(outcome.reply(), Some("hi there"));

    h.bot.unload("meta").await.unwrap();
    assert_eq!(h.bot.on_message(alice(2, "!echo hi")).await.unwrap(), RouterOutcome::Unhandled);
    assert_eq!(h.bot.to_load().await.len(), 2);

    assert!(h.bot.reload_all().await.is_empty());
    assert_eq!(h.bot.on_message(alice(3, "!ping")).await.unwrap().reply(), Some("Pong!"));
}
