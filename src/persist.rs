use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::common::*;

pub static LATEST_FILE_NAME: &str = "latest.json";

/// `posts_YYYYMMDD_HHMMSS.json`, so that names sort in run order.
pub fn file_name(started_at: &DateTime<Utc>) -> String {
    format!("posts_{}.json", started_at.format("%Y%m%d_%H%M%S"))
}

/// Writes the run's posts under `directory` and returns the path of the
/// timestamped file. `latest.json` next to it is overwritten with the same
/// document.
pub fn save<P: AsRef<Path>>(
    posts: &[Post],
    directory: P,
    started_at: &DateTime<Utc>,
) -> Result<PathBuf, PersistError> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory).map_err(|source| PersistError::CreateDir {
        path: directory.to_owned(),
        source,
    })?;

    let json = serde_json::to_vec_pretty(posts)?;
    let path = directory.join(file_name(started_at));
    write(&path, &json)?;
    write(&directory.join(LATEST_FILE_NAME), &json)?;

    info!(path = %path.display(), count = posts.len(), "Saved posts");
    Ok(path)
}

fn write(path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    fs::write(path, contents).map_err(|source| PersistError::Write {
        path: path.to_owned(),
        source,
    })
}
