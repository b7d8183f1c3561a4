//! JSON copy of each digest for downstream consumers.
//!
//! ```text
//! output_dir/
//! └── 20250506/
//!     └── news_summary.json
//! ```

use crate::error::Result;
use crate::models::NewsDigest;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`NewsDigest`] to `{output_dir}/{date}/news_summary.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_digest(digest: &NewsDigest, output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(digest)?;

    let full_json_dir = output_dir.join(&digest.date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join("news_summary.json");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON digest");
    Ok(path)
}
