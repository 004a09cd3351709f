//! Audio file placement under the output directory.
//!
//! Remote audio gets a random 16-hex-digit suffix so concurrent callers never
//! collide; the offline fallback always writes the same fixed file.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Fixed file name used by the offline synthesizer
pub const OFFLINE_FALLBACK_FILE: &str = "offline_fallback.wav";

/// Create the output directory if it does not exist yet.
pub async fn ensure_output_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}

/// `<dir>/<prefix>_<hex16>.<extension>`
pub fn unique_audio_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let id = Uuid::new_v4().simple().to_string();
    dir.join(format!("{prefix}_{}.{extension}", &id[..16]))
}

/// `<dir>/offline_fallback.wav`
pub fn offline_audio_path(dir: &Path) -> PathBuf {
    dir.join(OFFLINE_FALLBACK_FILE)
}

/// Write a complete audio buffer to a fresh unique path and return it.
pub async fn write_audio(
    dir: &Path,
    prefix: &str,
    extension: &str,
    audio: &[u8],
) -> std::io::Result<PathBuf> {
    ensure_output_dir(dir).await?;
    let path = unique_audio_path(dir, prefix, extension);
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(audio).await?;
    file.flush().await?;
    Ok(path)
}

/// Path as it is reported in result records.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
