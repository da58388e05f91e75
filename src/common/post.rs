use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    DevTo,
    Hashnode,
}

impl Source {
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::DevTo => "Dev.to",
            Source::Hashnode => "Hashnode",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One blog post, normalized from whichever platform it came from.
///
/// The serialized field names are the on-disk format of saved runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub source: Source,
    pub title: String,
    pub url: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub summary: String,
}
