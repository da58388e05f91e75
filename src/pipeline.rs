use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use indicatif::ProgressBar;

use crate::aggregate;
use crate::common::*;
use crate::{persist, present};

/// One full run from a loaded config: fetch, print the table to `out`, list
/// failed fetches on `err`, then save. Returns the saved file.
///
/// A run where only some fetches failed still succeeds. When every fetch
/// failed nothing is saved and the run is an error.
pub async fn run<W: Write, E: Write>(
    config: &Config,
    clients: &[Box<dyn SourceClient>],
    progress: Option<&ProgressBar>,
    started_at: &DateTime<Utc>,
    out: &mut W,
    err: &mut E,
) -> Result<PathBuf> {
    let agg = aggregate::run_with_progress(config, clients, progress).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    present::render(&agg.posts, out).context("Failed to print posts")?;
    present::render_failures(&agg.failures, agg.attempts, err)
        .context("Failed to print fetch warnings")?;
    if agg.all_failed() {
        anyhow::bail!("all {} fetches failed, nothing to save", agg.attempts);
    }

    let path = persist::save(&agg.posts, &config.save_directory, started_at)
        .context("Failed to save posts")?;
    writeln!(
        out,
        "{}",
        style(format!("Saved {} posts to {}", agg.posts.len(), path.display()))
            .cyan()
            .bold()
    )
    .map_err(OutputError::from)
    .context("Failed to print save location")?;

    Ok(path)
}
