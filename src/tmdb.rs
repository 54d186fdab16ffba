use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::media::{Item, ItemDetail, ListingPage, MediaId, MediaKind, Season};
use crate::settings::AppSettings;

const CACHE_TTL_SECONDS: u64 = 300;
pub const RECOMMENDATION_LIMIT: usize = 10;

pub type Params = Vec<(String, String)>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error during request: {0}")]
    Network(#[from] reqwest::Error),
    #[error("tmdb responded with status {0}")]
    Status(u16),
    #[error("unexpected json from tmdb: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRequest {
    pub path: &'static str,
    pub params: &'static [(&'static str, &'static str)],
}

impl CatalogRequest {
    const fn new(path: &'static str) -> Self {
        Self { path, params: &[] }
    }

    const fn with(path: &'static str, params: &'static [(&'static str, &'static str)]) -> Self {
        Self { path, params }
    }

    pub fn params(&self) -> Params {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cache_key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{}?{}", self.path, params.join("&"))
    }
}

pub mod requests {
    use super::CatalogRequest;

    pub const TRENDING: CatalogRequest = CatalogRequest::new("/trending/all/week");
    pub const SEARCH: CatalogRequest = CatalogRequest::new("/search/movie");
    pub const NETFLIX_ORIGINALS: CatalogRequest =
        CatalogRequest::with("/discover/tv", &[("with_networks", "213")]);
    pub const ACTION: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "28")]);
    pub const COMEDY: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "35")]);
    pub const HORROR: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "27")]);
    pub const ROMANCE: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "10749")]);
    pub const DOCUMENTARIES: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "99")]);
    pub const ANIMATION: CatalogRequest =
        CatalogRequest::with("/discover/movie", &[("with_genres", "16")]);
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn listing(&self, request: CatalogRequest) -> ListingPage;

    async fn search(&self, query: &str, page: u32) -> ListingPage;

    async fn detail(&self, id: MediaId, kind: MediaKind) -> Option<ItemDetail>;

    async fn season(&self, tv_id: MediaId, season_number: u32) -> Option<Season>;

    async fn recommendations(&self, id: MediaId, kind: MediaKind) -> Vec<Item>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub language: String,
    pub base_url: String,
    pub image_base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: language.into(),
            base_url: String::from("https://api.themoviedb.org/3"),
            image_base_url: String::from("https://image.tmdb.org/t/p"),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.language.clone())
    }

    fn fixed_params(&self) -> Params {
        vec![
            (String::from("api_key"), self.api_key.clone()),
            (String::from("language"), self.language.clone()),
        ]
    }
}

/// Appends `caller` to `fixed`; a repeated key takes the last value but keeps its
/// original position.
pub fn merge_params(fixed: &[(String, String)], caller: &[(String, String)]) -> Params {
    let mut merged: Params = Vec::with_capacity(fixed.len() + caller.len());
    for (key, value) in fixed.iter().chain(caller) {
        match merged.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.clone(),
            None => merged.push((key.clone(), value.clone())),
        }
    }
    merged
}

pub fn empty_results() -> Value {
    json!({ "results": [] })
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Parse(format!("{}: {}", what, err)))
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Value, what: &str) -> T {
    decode(value, what).unwrap_or_else(|err| {
        error!("{}", err);
        T::default()
    })
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

#[derive(Clone, Copy)]
pub enum ImageSize {
    Poster,
    Original,
}

struct CacheEntry<T> {
    data: T,
    created_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            created_at: Instant::now(),
        }
    }

    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < Duration::from_secs(CACHE_TTL_SECONDS)
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    config: ClientConfig,
    http_client: Arc<reqwest::Client>,
    list_cache: Arc<RwLock<HashMap<String, CacheEntry<ListingPage>>>>,
}

impl TmdbClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: Arc::new(reqwest::Client::new()),
            list_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn image_url(&self, path: &str, size: ImageSize) -> String {
        let size_path = match size {
            ImageSize::Poster => "w500",
            ImageSize::Original => "original",
        };
        format!("{}/{}{}", self.config.image_base_url, size_path, path)
    }

    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Value {
        match self.try_get(path, params).await {
            Ok(value) => value,
            Err(err @ ApiError::Status(_)) => {
                warn!(path, "tmdb request failed: {}", err);
                empty_results()
            }
            Err(err) => {
                error!(path, "tmdb request failed: {}", err);
                empty_results()
            }
        }
    }

    async fn try_get(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);
        let query = merge_params(&self.config.fixed_params(), params);
        debug!(path, ?params, "tmdb request");

        let response = self.http_client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), body = %body, "tmdb error response");
            return Err(ApiError::Status(status.as_u16()));
        }
        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::Parse(err.to_string()))
    }

    fn get_cached_list(&self, key: &str) -> Option<ListingPage> {
        self.list_cache
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_valid())
            .map(|e| e.data.clone())
    }

    fn set_cached_list(&self, key: String, data: ListingPage) {
        if let Ok(mut cache) = self.list_cache.write() {
            cache.insert(key, CacheEntry::new(data));
        }
    }

    pub async fn fetch_listing(&self, request: CatalogRequest) -> ListingPage {
        let cache_key = request.cache_key();
        if let Some(cached) = self.get_cached_list(&cache_key) {
            return cached;
        }
        let value = self.get(request.path, &request.params()).await;
        let page: ListingPage = decode_or_default(value, request.path);
        if !page.results.is_empty() {
            self.set_cached_list(cache_key, page.clone());
        }
        page
    }

    pub async fn search(&self, query: &str, page: u32) -> ListingPage {
        let params = vec![
            (String::from("query"), query.to_string()),
            (String::from("page"), page.to_string()),
        ];
        let value = self.get(requests::SEARCH.path, &params).await;
        decode_or_default(value, requests::SEARCH.path)
    }

    pub async fn fetch_detail(&self, id: MediaId, kind: MediaKind) -> Option<ItemDetail> {
        let path = format!("/{}/{}", kind.path(), id);
        let value = self.get(&path, &[]).await;
        decode(value, &path)
            .map_err(|err| error!("{}", err))
            .ok()
    }

    pub async fn fetch_season(&self, tv_id: MediaId, season_number: u32) -> Option<Season> {
        let path = format!("/tv/{}/season/{}", tv_id, season_number);
        let value = self.get(&path, &[]).await;
        decode(value, &path)
            .map_err(|err| error!("{}", err))
            .ok()
    }

    pub async fn fetch_recommendations(&self, id: MediaId, kind: MediaKind) -> Vec<Item> {
        let path = format!("/{}/{}/recommendations", kind.path(), id);
        let value = self.get(&path, &[]).await;
        let page: ListingPage = decode_or_default(value, &path);
        page.results.into_iter().take(RECOMMENDATION_LIMIT).collect()
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn listing(&self, request: CatalogRequest) -> ListingPage {
        self.fetch_listing(request).await
    }

    async fn search(&self, query: &str, page: u32) -> ListingPage {
        TmdbClient::search(self, query, page).await
    }

    async fn detail(&self, id: MediaId, kind: MediaKind) -> Option<ItemDetail> {
        self.fetch_detail(id, kind).await
    }

    async fn season(&self, tv_id: MediaId, season_number: u32) -> Option<Season> {
        self.fetch_season(tv_id, season_number).await
    }

    async fn recommendations(&self, id: MediaId, kind: MediaKind) -> Vec<Item> {
        self.fetch_recommendations(id, kind).await
    }
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{CatalogRequest, CatalogSource};
    use crate::media::{Item, ItemDetail, ListingPage, MediaId, MediaKind, Season};

    #[derive(Default)]
    pub struct FakeCatalog {
        pub listings: HashMap<&'static str, ListingPage>,
        pub search_pages: HashMap<(String, u32), ListingPage>,
        pub details: HashMap<MediaId, ItemDetail>,
        pub seasons: HashMap<(MediaId, u32), Season>,
        pub recommendations: HashMap<MediaId, Vec<Item>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn record(&self, call: String) {
            self.calls.lock().expect("calls lock").push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn listing(&self, request: CatalogRequest) -> ListingPage {
            self.record(format!("listing {}", request.path));
            self.listings.get(request.path).cloned().unwrap_or_default()
        }

        async fn search(&self, query: &str, page: u32) -> ListingPage {
            self.record(format!("search {} {}", query, page));
            self.search_pages
                .get(&(query.to_string(), page))
                .cloned()
                .unwrap_or_default()
        }

        async fn detail(&self, id: MediaId, kind: MediaKind) -> Option<ItemDetail> {
            self.record(format!("detail {} {}", kind.path(), id));
            self.details.get(&id).cloned()
        }

        async fn season(&self, tv_id: MediaId, season_number: u32) -> Option<Season> {
            self.record(format!("season {} {}", tv_id, season_number));
            self.seasons.get(&(tv_id, season_number)).cloned()
        }

        async fn recommendations(&self, id: MediaId, kind: MediaKind) -> Vec<Item> {
            self.record(format!("recommendations {} {}", kind.path(), id));
            self.recommendations.get(&id).cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    fn serve_canned(status: &str, content_type: &str, body: &str) -> ClientConfig {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().expect("listener address");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        std::thread::spawn(move || {
            for mut stream in listener.incoming().flatten() {
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });

        let mut config = ClientConfig::new("k", "ko-KR");
        config.base_url = format!("http://{addr}");
        config
    }

    fn pairs(raw: &[(&str, &str)]) -> Params {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fixed_params_come_first() {
        let config = ClientConfig::new("secret", "ko-KR");
        let merged = merge_params(&config.fixed_params(), &pairs(&[("query", "batman")]));
        assert_eq!(
            merged,
            pairs(&[("api_key", "secret"), ("language", "ko-KR"), ("query", "batman")])
        );
    }

    #[test]
    fn colliding_key_takes_last_value() {
        let merged = merge_params(
            &pairs(&[("api_key", "secret"), ("language", "ko-KR")]),
            &pairs(&[("language", "en-US"), ("page", "2")]),
        );
        assert_eq!(
            merged,
            pairs(&[("api_key", "secret"), ("language", "en-US"), ("page", "2")])
        );
    }

    #[test]
    fn catalog_request_params_and_cache_key() {
        assert_eq!(
            requests::NETFLIX_ORIGINALS.params(),
            pairs(&[("with_networks", "213")])
        );
        assert_eq!(requests::TRENDING.cache_key(), "/trending/all/week?");
        assert_ne!(requests::ACTION.cache_key(), requests::COMEDY.cache_key());
    }

    #[test]
    fn collapsed_body_decodes_to_defaults() {
        let page: ListingPage = decode_or_default(empty_results(), "test");
        assert_eq!(page, ListingPage::default());

        let detail: Result<ItemDetail, ApiError> = decode(empty_results(), "detail");
        assert!(matches!(detail, Err(ApiError::Parse(_))));
    }

    #[test]
    fn malformed_listing_collapses_to_empty() {
        let page: ListingPage = decode_or_default(json!({ "results": "nope" }), "test");
        assert!(page.results.is_empty());
    }

    #[test]
    fn image_url_uses_size_segment() {
        let client = TmdbClient::new(ClientConfig::new("k", "ko-KR"));
        assert_eq!(
            client.image_url("/abc.jpg", ImageSize::Poster),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            client.image_url("/abc.jpg", ImageSize::Original),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[tokio::test]
    async fn unreachable_host_yields_empty_results() {
        let mut config = ClientConfig::new("k", "ko-KR");
        config.base_url = String::from("http://127.0.0.1:9");
        let client = TmdbClient::new(config);

        let value = client.get("/movie/top_rated", &[]).await;
        assert_eq!(value, empty_results());

        let page = client.search("batman", 1).await;
        assert!(page.is_last());
        assert_eq!(client.fetch_detail(1, MediaKind::Movie).await, None);
    }

    #[tokio::test]
    async fn error_status_collapses_to_empty_results() {
        let config = serve_canned("401 Unauthorized", "application/json", r#"{"status_code":7}"#);
        let client = TmdbClient::new(config);

        assert_eq!(client.get("/movie/1", &[]).await, empty_results());
        assert!(client.search("batman", 1).await.is_last());
    }

    #[tokio::test]
    async fn non_json_body_collapses_to_empty_results() {
        let config = serve_canned("200 OK", "text/html", "<html><body>maintenance</body></html>");
        let client = TmdbClient::new(config);

        assert_eq!(client.get("/movie/1", &[]).await, empty_results());
        assert!(client.search("batman", 1).await.is_last());
    }

    #[tokio::test]
    async fn json_without_results_decodes_to_last_page() {
        let config = serve_canned("200 OK", "application/json", "[]");
        let client = TmdbClient::new(config);

        let page = client.search("batman", 1).await;
        assert_eq!(page, ListingPage::default());
        assert!(page.is_last());
    }
}
