use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::cache::{FetchCache, Pending};
use crate::format::format_code;

pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// The one failure mode of a catalog retrieval. Transport errors, non-success
/// statuses and undecodable bodies all collapse into it.
///
/// Cloneable so a single cached failure can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("retrieval failed: {0}")]
    RetrievalFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RetrievalFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Image {
    pub medium: Option<String>,
    pub original: Option<String>,
}

impl Image {
    /// Prefer the medium rendition, fall back to the original
    pub fn url(&self) -> Option<&str> {
        self.medium.as_deref().or(self.original.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rating {
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Show {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub rating: Option<Rating>,
    pub runtime: Option<u32>,
    /// HTML fragment as delivered by the catalog
    pub summary: Option<String>,
    pub image: Option<Image>,
}

impl Show {
    pub fn rating(&self) -> Option<f64> {
        self.rating.as_ref().and_then(|r| r.average)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::url)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub season: u32,
    /// Specials carry no number
    pub number: Option<u32>,
    pub name: String,
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    pub summary: Option<String>,
    pub image: Option<Image>,
}

impl Episode {
    pub fn code(&self) -> String {
        format_code(self.season, self.number.unwrap_or(0))
    }

    /// Format as "S01E02 - Episode Name"
    pub fn display_title(&self) -> String {
        format!("{} - {}", self.code(), self.name)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::url)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    pub fn episodes_url(&self, show_id: u64) -> String {
        format!("{}/shows/{}/episodes", self.base_url, show_id)
    }

    /// GET a JSON array and decode it
    pub async fn fetch_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, FetchError> {
        debug!(url, "fetching catalog resource");

        let items: Vec<T> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(url, count = items.len(), "catalog resource decoded");
        Ok(items)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-owned catalog access: one client plus a request cache per
/// entity kind. Cloning shares the caches.
#[derive(Clone)]
pub struct Catalog {
    client: CatalogClient,
    shows: Arc<FetchCache<Show>>,
    episodes: Arc<FetchCache<Episode>>,
}

impl Catalog {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            client,
            shows: Arc::new(FetchCache::new()),
            episodes: Arc::new(FetchCache::new()),
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(CatalogClient::with_base_url(base_url))
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    /// The full show list, retrieved at most once per session
    pub fn shows(&self) -> Pending<Show> {
        let client = self.client.clone();
        self.shows
            .get_or_insert_with(&self.client.shows_url(), move |url| async move {
                client.fetch_list::<Show>(&url).await
            })
    }

    /// Episodes of one show, retrieved at most once per show per session
    pub fn episodes(&self, show_id: u64) -> Pending<Episode> {
        let client = self.client.clone();
        self.episodes
            .get_or_insert_with(&self.client.episodes_url(show_id), move |url| async move {
                client.fetch_list::<Episode>(&url).await
            })
    }

    /// Drop a cached show list so the next lookup retrieves again
    pub fn invalidate_shows(&self) -> bool {
        self.shows.invalidate(&self.client.shows_url())
    }

    pub fn invalidate_episodes(&self, show_id: u64) -> bool {
        self.episodes.invalidate(&self.client.episodes_url(show_id))
    }
}
