//! TMDB (The Movie Database) enrichment backend.
//!
//! Implements [`Enricher`] by querying the TMDB v3 movie search endpoint and
//! mapping its best result onto [`PartialMetadata`].
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 30-second request timeout.
//! - Genre IDs resolved to TMDB's English genre names.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use vidiform_common::{LookupError, PartialMetadata};

use crate::config::TmdbConfig;
use crate::metadata::enricher::Enricher;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(4) {
    Some(n) => n,
    None => panic!("rate must be non-zero"),
};

/// TMDB's fixed movie genre list.
const MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct TmdbSearchResponse<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Enricher implementation
// ---------------------------------------------------------------------------

/// TMDB enrichment backend.
///
/// # Examples
///
/// ```no_run
/// use vidiform::metadata::providers::TmdbEnricher;
///
/// let enricher = TmdbEnricher::new("your-api-key".into(), "en-US".into()).unwrap();
/// ```
pub struct TmdbEnricher {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbEnricher {
    /// Create a new TMDB enricher with the given API key and language.
    ///
    /// The `language` parameter should be a tag such as `"en-US"`.
    pub fn new(api_key: String, language: String) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            language,
            base_url: TMDB_BASE_URL.to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        })
    }

    /// Create an enricher from the `[tmdb]` configuration section.
    pub fn from_config(config: &TmdbConfig) -> Result<Self, LookupError> {
        Ok(Self::new(config.api_key.clone(), config.language.clone())?
            .with_base_url(config.base_url.clone()))
    }

    /// Point the enricher at a different API root (used for mirrors and tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: &str, path: &str) -> Result<reqwest::Response, LookupError> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| LookupError::Request(format!("TMDB request to {path} failed: {e}")))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !resp.status().is_success() {
                return Err(LookupError::Status {
                    status: resp.status().as_u16(),
                });
            }

            return Ok(resp);
        }
    }

    /// Build a full API URL with the API key and language query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{path}?api_key={}&language={}",
            self.base_url,
            urlencoded(&self.api_key),
            urlencoded(&self.language)
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Extract a four-digit year from a date string like `"2023-04-15"`.
fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse::<i32>().ok())
}

/// Name of a TMDB movie genre ID.
fn genre_name(id: u32) -> Option<&'static str> {
    MOVIE_GENRES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<TmdbMovieSearchResult> for PartialMetadata {
    fn from(movie: TmdbMovieSearchResult) -> Self {
        PartialMetadata {
            title: non_blank(movie.title),
            year: parse_year(movie.release_date.as_deref()),
            genre: movie
                .genre_ids
                .first()
                .and_then(|id| genre_name(*id))
                .map(str::to_string),
            description: non_blank(movie.overview),
        }
    }
}

#[async_trait]
impl Enricher for TmdbEnricher {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn lookup(&self, title: &str) -> Result<Option<PartialMetadata>, LookupError> {
        if !self.is_available() {
            return Err(LookupError::Unavailable("no TMDB API key configured".into()));
        }

        let path = "/search/movie";
        let url = self.url(path, &[("query", title)]);
        debug!(path, query = title, "TMDB search movie");

        let body: TmdbSearchResponse<TmdbMovieSearchResult> = self
            .get(&url, path)
            .await?
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("TMDB movie search response: {e}")))?;

        let partial = body
            .results
            .into_iter()
            .next()
            .map(PartialMetadata::from)
            .filter(|p| !p.is_empty());

        debug!(query = title, matched = partial.is_some(), "TMDB search complete");
        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enricher(key: &str) -> TmdbEnricher {
        TmdbEnricher::new(key.into(), "en-US".into()).unwrap()
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year(Some("2023-04-15")), Some(2023));
        assert_eq!(parse_year(Some("1999")), Some(1999));
        assert_eq!(parse_year(None), None);
        assert_eq!(parse_year(Some("")), None);
    }

    #[test]
    fn genre_lookup() {
        assert_eq!(genre_name(878), Some("Science Fiction"));
        assert_eq!(genre_name(18), Some("Drama"));
        assert_eq!(genre_name(1), None);
    }

    #[test]
    fn search_result_mapping() {
        let movie = TmdbMovieSearchResult {
            title: Some("Inception".into()),
            release_date: Some("2010-07-15".into()),
            overview: Some("   ".into()),
            genre_ids: vec![28, 878],
        };
        let partial = PartialMetadata::from(movie);
        assert_eq!(partial.title.as_deref(), Some("Inception"));
        assert_eq!(partial.year, Some(2010));
        assert_eq!(partial.genre.as_deref(), Some("Action"));
        assert_eq!(partial.description, None);
    }

    #[test]
    fn search_response_without_results() {
        let body: TmdbSearchResponse<TmdbMovieSearchResult> =
            serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(body.results.is_empty());

        let body: TmdbSearchResponse<TmdbMovieSearchResult> =
            serde_json::from_str(r#"{"results": [{"title": "Heat"}]}"#).unwrap();
        assert_eq!(body.results[0].title.as_deref(), Some("Heat"));
    }

    #[test]
    fn url_encoding() {
        assert_eq!(urlencoded("hello world"), "hello+world");
        assert_eq!(urlencoded("foo&bar"), "foo%26bar");
        assert_eq!(urlencoded("simple"), "simple");
    }

    #[test]
    fn url_construction() {
        let e = enricher("k").with_base_url("http://localhost:1234/");
        assert_eq!(
            e.url("/search/movie", &[("query", "Blade Runner")]),
            "http://localhost:1234/search/movie?api_key=k&language=en-US&query=Blade+Runner"
        );
    }

    #[test]
    fn enricher_is_available() {
        assert!(enricher("test-key").is_available());
        assert!(!enricher("").is_available());
        assert_eq!(enricher("key").name(), "tmdb");
    }

    #[tokio::test]
    async fn lookup_without_key_is_unavailable() {
        let err = enricher("").lookup("Anything").await.unwrap_err();
        assert!(matches!(err, LookupError::Unavailable(_)));
    }
}
