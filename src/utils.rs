use std::path::{Path, PathBuf};
use std::time::Instant;

use strum::{Display, EnumString};
use tokio::fs;

use crate::errors::BotResult;

/// Directory with one saved thumbnail per user
pub const THUMBNAILS_DIR: &str = "thumbnails";
/// Scratch directory for downloaded and re-encoded videos
pub const COVERS_DIR: &str = "covers";

/// Inline-button identifiers carried in callback data
#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum MenuAction {
    Verify,
    Dismiss,
    SetThumbnail,
    ApplyCover,
    ViewThumbnail,
    RemoveThumbnail,
    Settings,
    Help,
    Home,
    AdminPanel,
}

/// Process start marker for the /status uptime readout
#[derive(Clone, Copy)]
pub struct StartedAt(pub Instant);

impl StartedAt {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn uptime_text(&self) -> String {
        let secs = self.0.elapsed().as_secs();
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Where a user's thumbnail lives on disk
pub fn thumbnail_path(user_id: i64) -> PathBuf {
    Path::new(THUMBNAILS_DIR).join(format!("{}.jpg", user_id))
}

/// Cut a string down to `max` characters for display, char-boundary safe
pub fn truncate_for_display(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

pub async fn ensure_dir(dir: &str) -> BotResult<()> {
    fs::create_dir_all(dir).await?;
    Ok(())
}

/// Remove every file inside `dir`, keeping the directory itself
pub async fn clear_dir(dir: &str) -> BotResult<()> {
    if !Path::new(dir).exists() {
        return Ok(());
    }
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            fs::remove_file(entry.path()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn menu_action_tokens_round_trip() {
        assert_eq!(MenuAction::SetThumbnail.to_string(), "set_thumbnail");
        assert_eq!("apply_cover".parse::<MenuAction>(), Ok(MenuAction::ApplyCover));
        assert_eq!("verify".parse::<MenuAction>(), Ok(MenuAction::Verify));
        assert!("no_such_button".parse::<MenuAction>().is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_display("short", 100), "short");
        assert_eq!(truncate_for_display("abcdef", 3), "abc");
        // Multi-byte characters must not be split
        assert_eq!(truncate_for_display("héllö wörld", 4), "héll");
    }

    #[test]
    fn thumbnail_path_is_per_user() {
        assert_eq!(
            thumbnail_path(42),
            Path::new("thumbnails").join("42.jpg")
        );
    }
}
