use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::common::*;

pub static DEFAULT_BASE_URL: &str = "https://dev.to";

pub struct DevToClient {
    client: Client,
    articles_url: String,
}

impl DevToClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            articles_url: format!("{}/api/articles", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl SourceClient for DevToClient {
    fn source(&self) -> Source {
        Source::DevTo
    }

    async fn fetch(&self, tag: &str, limit: usize) -> Result<Vec<Post>, FetchError> {
        let resp = self
            .client
            .get(&self.articles_url)
            .query(&[("tag", tag.to_string()), ("per_page", limit.to_string())])
            .send()
            .await?;
        check_status(&resp)?;

        let body = resp.text().await?;
        let mut posts = parse_articles(&body)?;
        posts.truncate(limit);
        debug!(tag, count = posts.len(), "Fetched Dev.to articles");
        Ok(posts)
    }
}

/// Maps the body of a Dev.to `/api/articles` listing into posts.
pub fn parse_articles(body: &str) -> Result<Vec<Post>, FetchError> {
    let articles: Vec<Article> = serde_json::from_str(body)?;
    Ok(articles.into_iter().filter_map(article_to_post).collect())
}

fn article_to_post(article: Article) -> Option<Post> {
    if article.url.trim().is_empty() {
        debug!(title = %article.title, "Skipping Dev.to article without a URL");
        return None;
    }

    let tags = match article.tag_list {
        TagList::List(tags) => tags.iter().filter_map(|t| normalize_tag(t)).collect(),
        TagList::Joined(tags) => tags.split(',').filter_map(normalize_tag).collect(),
    };

    Some(Post {
        source: Source::DevTo,
        title: article.title,
        url: article.url,
        author: author_name(
            article.user.name.as_deref(),
            article.user.username.as_deref(),
        ),
        published_at: article.published_at.as_deref().and_then(parse_datetime),
        tags,
        summary: article
            .description
            .as_deref()
            .map(strip_html)
            .unwrap_or_default(),
    })
}

// The listing endpoint returns tags as an array, single-article responses as
// a comma separated string.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl Default for TagList {
    fn default() -> Self {
        TagList::List(Vec::new())
    }
}

#[derive(Deserialize, Debug, Default)]
struct User {
    name: Option<String>,
    username: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Article {
    title: String,
    url: String,
    description: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    tag_list: TagList,
    #[serde(default)]
    user: User,
}
