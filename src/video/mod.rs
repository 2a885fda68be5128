mod info;

pub use info::VideoInfo;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process;

use crate::errors::{BotResult, ConversionError};

/// Re-encode `input` so it fits within 1280x720 (aspect preserved) and can
/// start playing before the download completes. The result lands next to the
/// input with a `_ready.mp4` name.
pub async fn reencode_to_fit(input: &Path) -> BotResult<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(ConversionError::NonUtf8Path)?;
    let output = input.with_file_name(format!("{}_ready.mp4", stem));

    let child = process::Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args([
            "-vf",
            "scale=iw*min(1280/iw\\,720/ih):ih*min(1280/iw\\,720/ih)",
            "-movflags",
            "+faststart",
        ])
        .arg(&output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let result = child.wait_with_output().await?;

    if !result.status.success() {
        return Err(ConversionError::FfmpegFailed(
            result.status,
            String::from_utf8_lossy(&result.stderr).into_owned(),
        )
        .into());
    }

    Ok(output)
}
