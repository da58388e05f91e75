use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::common::*;

/// A (tag, source) request that failed during a run.
#[derive(Debug)]
pub struct FetchFailure {
    pub tag: String,
    pub source: Source,
    pub error: FetchError,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub posts: Vec<Post>,
    pub failures: Vec<FetchFailure>,
    pub attempts: usize,
}

impl Aggregation {
    pub fn all_failed(&self) -> bool {
        self.attempts > 0 && self.failures.len() == self.attempts
    }

    pub fn count_for(&self, source: Source) -> usize {
        self.posts.iter().filter(|p| p.source == source).count()
    }
}

pub async fn run(config: &Config, clients: &[Box<dyn SourceClient>]) -> Aggregation {
    run_with_progress(config, clients, None).await
}

/// Asks every client for every configured tag and merges the answers.
///
/// Tags are visited in config order and, within a tag, clients in slice
/// order; the clients for one tag are queried concurrently but their results
/// are merged in slice order. Posts on the config's block lists are dropped,
/// then the first post seen for a URL wins.
pub async fn run_with_progress(
    config: &Config,
    clients: &[Box<dyn SourceClient>],
    progress: Option<&ProgressBar>,
) -> Aggregation {
    let limit = config.max_posts_per_source;
    let mut agg = Aggregation::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut found: Vec<Post> = Vec::new();

    for tag in &config.tags {
        if let Some(pb) = progress {
            pb.set_message(format!("#{}", tag));
        }
        let results = join_all(clients.iter().map(|c| c.fetch(tag, limit))).await;

        for (client, result) in clients.iter().zip(results) {
            agg.attempts += 1;
            if let Some(pb) = progress {
                pb.inc(1);
            }

            let source = client.source();
            match result {
                Ok(posts) => {
                    info!(tag = %tag, %source, count = posts.len(), "Fetched posts");
                    for post in posts {
                        if config.is_blocked(&post) {
                            debug!(url = %post.url, author = %post.author, "Skipping blocked post");
                            continue;
                        }
                        if seen.insert(post.url.clone()) {
                            found.push(post);
                        }
                    }
                }
                Err(error) => {
                    warn!(tag = %tag, %source, %error, "Fetch failed");
                    agg.failures.push(FetchFailure {
                        tag: tag.clone(),
                        source,
                        error,
                    });
                }
            }
        }
    }

    agg.posts = rank(found, limit);
    agg
}

/// Orders posts by source, then newest first, and keeps at most `cap` per
/// source. Undated posts sort after dated ones; ties keep discovery order.
pub fn rank(mut posts: Vec<Post>, cap: usize) -> Vec<Post> {
    posts.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then_with(|| b.published_at.cmp(&a.published_at))
    });

    let mut kept: HashMap<Source, usize> = HashMap::new();
    posts.retain(|p| {
        let count = kept.entry(p.source).or_insert(0);
        *count += 1;
        *count <= cap
    });
    posts
}
