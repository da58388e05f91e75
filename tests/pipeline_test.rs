use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use devfeed::aggregate;
use devfeed::common::{config, Config, FetchError, Post, Source, SourceClient};
use devfeed::{persist, pipeline, present};

struct StubClient {
    source: Source,
    posts: HashMap<&'static str, Vec<Post>>,
    failing: Vec<&'static str>,
}

#[async_trait]
impl SourceClient for StubClient {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self, tag: &str, limit: usize) -> Result<Vec<Post>, FetchError> {
        if self.failing.iter().any(|f| *f == tag) {
            return Err(FetchError::Api(format!("{} unavailable", tag)));
        }
        Ok(self
            .posts
            .get(tag)
            .map(|p| p.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

fn post(source: Source, url: &str, day: u32) -> Post {
    Post {
        source,
        title: format!("Title for {}", url),
        url: url.to_string(),
        author: "author".to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 8, day, 12, 0, 0).single(),
        tags: ["python".to_string()].into_iter().collect(),
        summary: format!("Summary for {}", url),
    }
}

fn write_config(dir: &std::path::Path, tags: &[&str], max: usize) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let config = Config {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        max_posts_per_source: max,
        save_directory: dir.join("saved_posts"),
        request_timeout_secs: 5,
        ..Config::default()
    };
    fs::write(&path, toml_for(&config)).unwrap();
    path
}

fn toml_for(config: &Config) -> String {
    let tags: Vec<String> = config.tags.iter().map(|t| format!("{:?}", t)).collect();
    format!(
        "tags = [{}]\nmax_posts_per_source = {}\nsave_directory = {:?}\nrequest_timeout_secs = {}\n",
        tags.join(", "),
        config.max_posts_per_source,
        config.save_directory.display().to_string(),
        config.request_timeout_secs
    )
}

#[tokio::test]
async fn partial_failure_still_renders_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let config = config::load(write_config(dir.path(), &["python", "rust"], 5)).unwrap();

    let devto = StubClient {
        source: Source::DevTo,
        posts: HashMap::from([
            ("python", vec![post(Source::DevTo, "https://dev.to/p1", 1)]),
            ("rust", vec![post(Source::DevTo, "https://dev.to/r1", 3)]),
        ]),
        failing: vec![],
    };
    let hashnode = StubClient {
        source: Source::Hashnode,
        posts: HashMap::from([(
            "rust",
            vec![post(Source::Hashnode, "https://h.hashnode.dev/r1", 2)],
        )]),
        failing: vec!["python"],
    };
    let clients: Vec<Box<dyn SourceClient>> = vec![Box::new(devto), Box::new(hashnode)];

    let agg = aggregate::run(&config, &clients).await;
    assert!(!agg.all_failed());
    assert_eq!(agg.failures.len(), 1);
    assert_eq!(agg.failures[0].source, Source::Hashnode);
    assert_eq!(agg.failures[0].tag, "python");

    let mut out = Vec::new();
    present::render(&agg.posts, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("https://dev.to/p1"));
    assert!(out.contains("https://dev.to/r1"));
    assert!(out.contains("https://h.hashnode.dev/r1"));

    let started = Utc.with_ymd_and_hms(2024, 8, 10, 6, 0, 0).unwrap();
    let path = persist::save(&agg.posts, &config.save_directory, &started).unwrap();
    let saved: Vec<Post> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved, agg.posts);
    let urls: Vec<&str> = saved.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://dev.to/r1",
            "https://dev.to/p1",
            "https://h.hashnode.dev/r1"
        ]
    );
}

#[tokio::test]
async fn per_source_cap_holds_across_tags() {
    let dir = tempfile::tempdir().unwrap();
    let config = config::load(write_config(dir.path(), &["python", "webdev"], 2)).unwrap();

    let devto = StubClient {
        source: Source::DevTo,
        posts: HashMap::from([
            (
                "python",
                vec![
                    post(Source::DevTo, "https://dev.to/a", 1),
                    post(Source::DevTo, "https://dev.to/b", 4),
                    post(Source::DevTo, "https://dev.to/c", 2),
                ],
            ),
            (
                "webdev",
                vec![
                    post(Source::DevTo, "https://dev.to/d", 5),
                    post(Source::DevTo, "https://dev.to/e", 3),
                ],
            ),
        ]),
        failing: vec![],
    };
    let clients: Vec<Box<dyn SourceClient>> = vec![Box::new(devto)];

    let agg = aggregate::run(&config, &clients).await;
    let urls: Vec<&str> = agg.posts.iter().map(|p| p.url.as_str()).collect();
    // "c" is never returned: the client itself is limited to two per tag.
    assert_eq!(urls, vec!["https://dev.to/d", "https://dev.to/b"]);
    assert!(agg.count_for(Source::DevTo) <= config.max_posts_per_source);
}

#[test]
fn absent_config_is_created_and_reloads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    assert!(!path.exists());

    let created = config::load(&path).unwrap();
    let reloaded = config::load(&path).unwrap();
    assert_eq!(created, Config::default());
    assert_eq!(reloaded, Config::default());
    assert_eq!(
        reloaded.tags,
        vec!["python", "javascript", "webdev", "programming"]
    );
    assert_eq!(reloaded.max_posts_per_source, 10);
}

fn saved_files(dir: &std::path::Path) -> Vec<String> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn run_succeeds_and_saves_when_only_some_fetches_fail() {
    let dir = tempfile::tempdir().unwrap();
    let config = config::load(write_config(dir.path(), &["python"], 5)).unwrap();
    let devto = StubClient {
        source: Source::DevTo,
        posts: HashMap::from([("python", vec![post(Source::DevTo, "https://dev.to/p1", 1)])]),
        failing: vec![],
    };
    let hashnode = StubClient {
        source: Source::Hashnode,
        posts: HashMap::new(),
        failing: vec!["python"],
    };
    let clients: Vec<Box<dyn SourceClient>> = vec![Box::new(devto), Box::new(hashnode)];
    let started = Utc.with_ymd_and_hms(2024, 8, 10, 6, 0, 0).unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let path = pipeline::run(&config, &clients, None, &started, &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(path, config.save_directory.join("posts_20240810_060000.json"));
    let saved: Vec<Post> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].url, "https://dev.to/p1");

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("https://dev.to/p1"));
    assert!(out.contains("Saved 1 posts to"));
    let err = String::from_utf8(err).unwrap();
    assert!(err.contains("1 of 2 fetches failed"));
    assert!(err.contains("python"));
}

#[tokio::test]
async fn run_fails_and_saves_nothing_when_every_fetch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config::load(write_config(dir.path(), &["python", "rust"], 5)).unwrap();
    let clients: Vec<Box<dyn SourceClient>> = vec![
        Box::new(StubClient {
            source: Source::DevTo,
            posts: HashMap::new(),
            failing: vec!["python", "rust"],
        }),
        Box::new(StubClient {
            source: Source::Hashnode,
            posts: HashMap::new(),
            failing: vec!["python", "rust"],
        }),
    ];
    let started = Utc.with_ymd_and_hms(2024, 8, 10, 6, 0, 0).unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = pipeline::run(&config, &clients, None, &started, &mut out, &mut err).await;

    assert!(result.is_err());
    assert!(saved_files(&config.save_directory).is_empty());
    assert!(String::from_utf8(out).unwrap().contains("No posts found"));
    assert!(String::from_utf8(err).unwrap().contains("4 of 4 fetches failed"));
}

#[tokio::test]
async fn run_with_no_matches_still_saves_an_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config::load(write_config(dir.path(), &["python"], 5)).unwrap();
    let clients: Vec<Box<dyn SourceClient>> = vec![Box::new(StubClient {
        source: Source::DevTo,
        posts: HashMap::new(),
        failing: vec![],
    })];
    let started = Utc.with_ymd_and_hms(2024, 8, 10, 6, 0, 0).unwrap();

    let path = pipeline::run(&config, &clients, None, &started, &mut Vec::<u8>::new(), &mut Vec::<u8>::new())
        .await
        .unwrap();
    let saved: Vec<Post> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert!(saved.is_empty());
    assert_eq!(
        saved_files(&config.save_directory),
        vec!["latest.json", "posts_20240810_060000.json"]
    );
}
