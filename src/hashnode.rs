use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::common::*;

pub static DEFAULT_ENDPOINT: &str = "https://gql.hashnode.com";

// Hashnode rejects connection pages larger than this.
const MAX_PAGE_SIZE: usize = 20;

static TAG_POSTS_QUERY: &str = r#"
query TagPosts($slug: String!, $first: Int!) {
  tag(slug: $slug) {
    posts(first: $first, filter: { sortBy: recent }) {
      edges {
        node {
          title
          url
          brief
          publishedAt
          author { name username }
          tags { slug }
        }
      }
    }
  }
}"#;

pub struct HashnodeClient {
    client: Client,
    endpoint: String,
}

impl HashnodeClient {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
        }
    }
}

#[async_trait]
impl SourceClient for HashnodeClient {
    fn source(&self) -> Source {
        Source::Hashnode
    }

    async fn fetch(&self, tag: &str, limit: usize) -> Result<Vec<Post>, FetchError> {
        let body = json!({
            "query": TAG_POSTS_QUERY,
            "variables": {
                "slug": tag.to_lowercase(),
                "first": page_size(tag, limit),
            },
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;
        check_status(&resp)?;

        let text = resp.text().await?;
        let mut posts = parse_tag_posts(&text)?;
        posts.truncate(limit);
        debug!(tag, count = posts.len(), "Fetched Hashnode posts");
        Ok(posts)
    }
}

fn page_size(tag: &str, limit: usize) -> usize {
    if limit > MAX_PAGE_SIZE {
        warn!(
            tag,
            limit,
            max = MAX_PAGE_SIZE,
            "Hashnode returns at most {} posts per request, asking for fewer",
            MAX_PAGE_SIZE
        );
        MAX_PAGE_SIZE
    } else {
        limit
    }
}

/// Maps the GraphQL response for a tag's post feed into posts. An unknown
/// tag comes back as `null` and yields no posts.
pub fn parse_tag_posts(body: &str) -> Result<Vec<Post>, FetchError> {
    let resp: GraphQlResponse = serde_json::from_str(body)?;
    if !resp.errors.is_empty() {
        let messages: Vec<String> = resp.errors.into_iter().map(|e| e.message).collect();
        return Err(FetchError::Api(messages.join("; ")));
    }

    let tag = match resp.data.and_then(|d| d.tag) {
        Some(tag) => tag,
        None => return Ok(Vec::new()),
    };

    Ok(tag
        .posts
        .edges
        .into_iter()
        .filter_map(|edge| node_to_post(edge.node))
        .collect())
}

fn node_to_post(node: Node) -> Option<Post> {
    if node.url.trim().is_empty() {
        debug!(title = %node.title, "Skipping Hashnode post without a URL");
        return None;
    }

    let (name, username) = match &node.author {
        Some(a) => (a.name.as_deref(), a.username.as_deref()),
        None => (None, None),
    };

    Some(Post {
        source: Source::Hashnode,
        author: author_name(name, username),
        published_at: node.published_at.as_deref().and_then(parse_datetime),
        tags: node
            .tags
            .unwrap_or_default()
            .iter()
            .filter_map(|t| normalize_tag(&t.slug))
            .collect(),
        summary: node.brief.as_deref().map(strip_html).unwrap_or_default(),
        title: node.title,
        url: node.url,
    })
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse {
    data: Option<TagData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct TagData {
    tag: Option<Tag>,
}

#[derive(Deserialize, Debug)]
struct Tag {
    posts: Connection,
}

#[derive(Deserialize, Debug)]
struct Connection {
    edges: Vec<Edge>,
}

#[derive(Deserialize, Debug)]
struct Edge {
    node: Node,
}

#[derive(Deserialize, Debug)]
struct Author {
    name: Option<String>,
    username: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TagRef {
    slug: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Node {
    title: String,
    url: String,
    brief: Option<String>,
    published_at: Option<String>,
    author: Option<Author>,
    tags: Option<Vec<TagRef>>,
}
