//! Channel name to chat identifier resolution over a paginated directory.

use crate::cache::{get_or_fetch, CacheKey, CacheStore, Fetched};
use crate::config::{Config, Endpoints};
use crate::error::{DispatchError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const LARK_CHATS_PATH: &str = "/im/v1/chats";

/// Envelope of a directory listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingShape {
    /// `{code, msg, data: {items, page_token, has_more}}`
    Paged,
    /// `{items}`, always a single page.
    Flat,
}

/// Where and how to list a platform's chat directory.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub url: String,
    pub page_size: u32,
    pub shape: ListingShape,
}

impl DirectoryListing {
    pub fn lark_chats(endpoints: &Endpoints) -> Self {
        Self {
            url: format!(
                "{}{}",
                endpoints.lark_api_base.trim_end_matches('/'),
                LARK_CHATS_PATH
            ),
            page_size: endpoints.directory_page_size,
            shape: ListingShape::Paged,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(default, alias = "chat_id")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl DirectoryEntry {
    /// The entry's identifier when it is named `channel`. Entries with a
    /// missing or empty identifier never match.
    fn id_for(self, channel: &str) -> Option<String> {
        if self.name.as_deref() != Some(channel) {
            return None;
        }
        self.id.filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageData {
    #[serde(default)]
    items: Vec<DirectoryEntry>,
    #[serde(default)]
    page_token: String,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct PagedListing {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: PageData,
}

#[derive(Debug, Deserialize)]
struct FlatListing {
    #[serde(default)]
    items: Vec<DirectoryEntry>,
}

/// Resolves `channel` to the platform's chat identifier.
///
/// Matching is exact and the first match in page order wins. A found
/// identifier is cached without expiry under `chat-id:<environment>:<channel>`.
#[instrument(skip(http, cache, config, listing, token))]
pub async fn resolve_chat_id(
    http: &reqwest::Client,
    cache: &dyn CacheStore,
    config: &Config,
    listing: &DirectoryListing,
    token: &str,
    channel: &str,
) -> Result<String> {
    let key = CacheKey::ChatId {
        environment: &config.environment,
        channel,
    };
    get_or_fetch(cache, &key, config.cache.write_failure, || {
        search_directory(http, listing, token, channel)
    })
    .await
}

async fn search_directory(
    http: &reqwest::Client,
    listing: &DirectoryListing,
    token: &str,
    channel: &str,
) -> Result<Fetched> {
    let mut page_token = String::new();
    let mut pages = 0usize;

    loop {
        let page = fetch_page(http, listing, token, &page_token).await?;
        pages += 1;
        metrics::counter!("directory_pages_fetched_total").increment(1);

        if let Some(id) = page.items.into_iter().find_map(|entry| entry.id_for(channel)) {
            info!(pages, "Resolved chat identifier");
            return Ok(Fetched::forever(id));
        }

        // A page claiming more results without a cursor cannot be followed.
        if !page.has_more || page.page_token.is_empty() {
            break;
        }
        page_token = page.page_token;
    }

    error!(pages, "Channel not present in directory");
    Err(DispatchError::NotFound {
        channel: channel.to_string(),
    })
}

async fn fetch_page(
    http: &reqwest::Client,
    listing: &DirectoryListing,
    token: &str,
    page_token: &str,
) -> Result<PageData> {
    let mut request = http
        .get(&listing.url)
        .bearer_auth(token)
        .query(&[("page_size", listing.page_size.to_string())]);
    if !page_token.is_empty() {
        request = request.query(&[("page_token", page_token)]);
    }

    debug!(page_token, "Fetching directory page");
    let response = request.send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(DispatchError::RemoteApi(format!(
            "directory listing response: {}",
            status
        )));
    }

    match listing.shape {
        ListingShape::Paged => {
            let body: PagedListing = response.json().await?;
            if body.code != 0 {
                return Err(DispatchError::RemoteApi(format!(
                    "directory listing error {}: {}",
                    body.code, body.msg
                )));
            }
            Ok(body.data)
        }
        ListingShape::Flat => {
            let body: FlatListing = response.json().await?;
            Ok(PageData {
                items: body.items,
                ..Default::default()
            })
        }
    }
}
