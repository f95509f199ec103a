//! User-visible texts sent to the channel while a check runs.

use chrono::{DateTime, Local};

pub const NO_BATCH_CONNECTED: &str = "❌ No batch connected to this channel.";
pub const BATCH_NOT_FOUND: &str = "❌ Batch not found.";
pub const NOTHING_NEW: &str = "✅ No new completed classes today.";
pub const DOWNLOADING: &str = "⬇️ Downloading video...";
pub const UPLOADING: &str = "⬆️ Uploading video...";
pub const UPLOADED: &str = "✅ Video uploaded!";
pub const DOWNLOAD_FAILED: &str = "❌ Download failed!";
pub const REGISTRY_UNAVAILABLE: &str = "❌ Registry unavailable, try again later.";

pub const WELCOME: &str = "👋 Welcome to Rarestudy Bot!\n\n\
Commands:\n\
/check - Check for new classes\n\n\
Admin Panel: Access via your deployment URL";

/// Markdown; shows the chat id so an admin can register it.
pub fn channel_not_registered(chat_id: &str) -> String {
    format!(
        "❌ Channel not registered!\n\nYour Chat ID: `{}`\n\nAdd this ID in admin panel.",
        chat_id
    )
}

pub fn checking(batch_name: &str) -> String {
    format!("🔍 Checking batch: {}...", batch_name)
}

pub fn found(count: usize) -> String {
    format!("📚 Found {} completed class(es). Processing...", count)
}

pub fn error(message: &str, max_chars: usize) -> String {
    format!("❌ Error: {}", excerpt(message, max_chars))
}

pub fn caption(at: DateTime<Local>) -> String {
    format!("📹 Class Video\n⏰ {}", at.format("%d/%m/%Y %H:%M"))
}

/// First `max_chars` characters, never splitting a code point.
pub fn excerpt(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_is_truncated() {
        let long = "x".repeat(250);
        let text = error(&long, 100);
        assert_eq!(text, format!("❌ Error: {}", "x".repeat(100)));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn test_caption_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        assert_eq!(caption(at), "📹 Class Video\n⏰ 05/03/2024 09:07");
    }

    #[test]
    fn test_progress_texts() {
        assert_eq!(checking("Physics"), "🔍 Checking batch: Physics...");
        assert_eq!(found(3), "📚 Found 3 completed class(es). Processing...");
        assert!(channel_not_registered("-100123").contains("`-100123`"));
    }
}
