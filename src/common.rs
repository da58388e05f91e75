use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, Response};

pub mod config;
pub mod error;
pub mod post;
pub mod source;

pub use config::Config;
pub use error::{ConfigError, FetchError, OutputError, PersistError};
pub use post::{Post, Source};
pub use source::SourceClient;

pub static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
        .or_else(|| parse_assuming_utc(s))
}

pub fn parse_assuming_utc(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d))
}

/// Drops markup from a platform-provided excerpt and collapses whitespace.
pub fn strip_html(s: &str) -> String {
    lazy_static! {
        static ref TAG: Regex = Regex::new(r"<[^<]+?>").unwrap();
        static ref SPACE: Regex = Regex::new(r"\s+").unwrap();
    };
    let text = TAG.replace_all(s, " ");
    SPACE.replace_all(&text, " ").trim().to_string()
}

pub fn check_status(resp: &Response) -> Result<(), FetchError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: resp.url().to_string(),
            status: resp.status(),
        })
    }
}

/// Prefers a display name, then the handle.
pub fn author_name(name: Option<&str>, username: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| username.map(str::trim).filter(|u| !u.is_empty()))
        .unwrap_or("unknown")
        .to_string()
}

pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

pub fn build_client(config: &Config) -> reqwest::Result<Client> {
    reqwest::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
}

pub fn init_progress_bar(len: u64) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(len);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template(
                "{spinner:.blue} [{bar:.blue}] ({pos}/{len}) {msg} \
            [elapsed: {elapsed_precise}]",
            )
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    pb.enable_steady_tick(100);
    pb
}
