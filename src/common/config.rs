use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::ConfigError;
use super::normalize_tag;
use super::post::Post;

pub static DEFAULT_CONFIG_PATH: &str = "config.toml";

// Fields missing from the file fall back to their default one by one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub tags: Vec<String>,
    pub max_posts_per_source: usize,
    pub save_directory: PathBuf,
    pub request_timeout_secs: u64,
    pub blocked_authors: Vec<String>,
    pub blocked_tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags: ["python", "javascript", "webdev", "programming"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_posts_per_source: 10,
            save_directory: PathBuf::from("saved_posts"),
            request_timeout_secs: 10,
            blocked_authors: Vec::new(),
            blocked_tags: Vec::new(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when the post's author or any of its tags is on a block list.
    /// Authors match case-insensitively.
    pub fn is_blocked(&self, post: &Post) -> bool {
        self.blocked_authors
            .iter()
            .any(|a| a.eq_ignore_ascii_case(post.author.trim()))
            || post.tags.iter().any(|t| self.blocked_tags.contains(t))
    }
}

/// Loads the config at `path`, writing the defaults there first if the file
/// does not exist yet. A file that exists but can't be parsed is an error.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        info!(path = %path.display(), "Loading config");
    } else {
        info!(path = %path.display(), "Config file not found, creating default config");
    }

    let config: Config = confy::load_path(path).map_err(|source| ConfigError::Load {
        path: path.to_owned(),
        source,
    })?;
    debug!(?config, "Loaded config");

    validate(path, config)
}

fn validate(path: &Path, mut config: Config) -> Result<Config, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        path: path.to_owned(),
        reason: reason.to_string(),
    };

    config.tags = std::mem::take(&mut config.tags)
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    config.blocked_authors = std::mem::take(&mut config.blocked_authors)
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    config.blocked_tags = std::mem::take(&mut config.blocked_tags)
        .iter()
        .filter_map(|t| normalize_tag(t))
        .collect();
    if config.tags.is_empty() {
        return Err(invalid("`tags` must list at least one tag"));
    }
    if config.max_posts_per_source == 0 {
        return Err(invalid("`max_posts_per_source` must be greater than zero"));
    }
    if config.request_timeout_secs == 0 {
        return Err(invalid("`request_timeout_secs` must be greater than zero"));
    }

    Ok(config)
}
