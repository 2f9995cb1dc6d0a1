//! Node.js API documentation service.
//!
//! Fetches the corpus through the [`HttpFetcher`], keeps only modules that
//! document classes or methods, and memoizes that working set for the life of
//! the service. The memoized snapshot is not refreshed when the underlying
//! HTTP cache entry expires; restart the process to pick up a new corpus.

use itertools::Itertools;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::Config;
use crate::fetcher::{DocsFetchError, FetchOptions, HttpFetcher, ResponseType};
use crate::formatter::{DocsFormatter, FormattingOptions};
use crate::model::{ApiDocs, ApiModule};
use crate::normalize::normalize_module_name;

#[derive(Debug)]
pub struct ApiDocsService {
    fetcher: HttpFetcher,
    formatter: DocsFormatter,
    url: Url,
    releases_chart_url: Url,
    ttl_days: u64,
    modules: OnceCell<Arc<Vec<ApiModule>>>,
}

impl ApiDocsService {
    pub fn new(config: &Config) -> Result<Self, DocsFetchError> {
        Self::with_fetcher(config, HttpFetcher::new())
    }

    /// Creates a service that fetches through an existing `HttpFetcher`,
    /// sharing its cache.
    ///
    /// # Arguments
    /// * `config` - Corpus and releases chart URLs plus the cache TTL
    /// * `fetcher` - Fetcher used for every corpus and chart request
    ///
    /// # Returns
    /// * `Ok(ApiDocsService)` - A service with an empty module memo
    /// * `Err(DocsFetchError::Url)` - If either configured URL is invalid
    pub fn with_fetcher(config: &Config, fetcher: HttpFetcher) -> Result<Self, DocsFetchError> {
        Ok(Self {
            fetcher,
            formatter: DocsFormatter::new(),
            url: Url::parse(&config.corpus_url)?,
            releases_chart_url: Url::parse(&config.releases_chart_url)?,
            ttl_days: config.ttl_days,
            modules: OnceCell::new(),
        })
    }

    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    /// Fetches and decodes the full `all.json` corpus.
    ///
    /// # Returns
    /// * `Ok(ApiDocs)` - Every module of the corpus, unfiltered
    /// * `Err(DocsFetchError)` - If the request fails, the status is not a
    ///   success, or the body does not decode as the corpus shape
    pub async fn fetch_node_api_docs(&self) -> Result<ApiDocs, DocsFetchError> {
        let options = FetchOptions {
            response_type: ResponseType::Json,
            ttl_days: self.ttl_days,
        };
        let body = self
            .fetcher
            .fetch_http_with_cache(self.url.as_str(), options)
            .await?;
        Ok(serde_json::from_value(body.into_json()?)?)
    }

    /// Fetches the releases schedule chart as SVG text.
    pub async fn fetch_releases_chart(&self) -> Result<String, DocsFetchError> {
        let options = FetchOptions {
            response_type: ResponseType::Text,
            ttl_days: self.ttl_days,
        };
        self.fetcher
            .fetch_http_with_cache(self.releases_chart_url.as_str(), options)
            .await?
            .into_text()
    }

    /// Returns the filtered module list, loading it on first use.
    ///
    /// Callers racing on a cold service share a single load. A failed load
    /// is not memoized.
    pub async fn get_modules(&self) -> Result<Arc<Vec<ApiModule>>, DocsFetchError> {
        self.modules
            .get_or_try_init(|| self.load_modules())
            .await
            .cloned()
    }

    async fn load_modules(&self) -> Result<Arc<Vec<ApiModule>>, DocsFetchError> {
        let docs = self.fetch_node_api_docs().await?;
        let original_count = docs.modules.len();

        let modules: Vec<ApiModule> = docs
            .modules
            .into_iter()
            .filter(ApiModule::has_api_items)
            .collect();
        tracing::info!(
            "Modules count: {} ({} with classes or methods)",
            original_count,
            modules.len()
        );

        for key in modules.iter().map(|m| normalize_module_name(&m.name)).duplicates() {
            tracing::warn!(
                "Module name collision on '{}'; lookups resolve to the first match",
                key
            );
        }

        Ok(Arc::new(modules))
    }

    /// Finds a module whose normalized name equals the normalized `name`.
    pub async fn find_module(&self, name: &str) -> Result<Option<ApiModule>, DocsFetchError> {
        let wanted = normalize_module_name(name);
        let modules = self.get_modules().await?;
        Ok(modules
            .iter()
            .find(|module| normalize_module_name(&module.name) == wanted)
            .cloned())
    }

    /// Renders the search listing entry of a module.
    ///
    /// # Arguments
    /// * `module` - The module to summarize; `None` renders an empty string
    pub fn get_module_summary(&self, module: Option<&ApiModule>) -> String {
        module
            .map(|m| self.formatter.format_module_summary(m))
            .unwrap_or_default()
    }

    /// Renders the full Markdown document of a module.
    ///
    /// # Arguments
    /// * `module` - The module to render; `None` renders an empty string
    /// * `options` - Substring filters for classes and methods
    ///
    /// # Returns
    /// The document, starting with `# {textRaw}`
    pub fn get_module_document(&self, module: Option<&ApiModule>, options: &FormattingOptions) -> String {
        module
            .map(|m| self.formatter.create_module_documentation(m, options))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, Server, ServerGuard};
    use serde_json::json;

    async fn corpus_server(body: serde_json::Value, hits: usize) -> (ServerGuard, Mock) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/all.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await;
        (server, mock)
    }

    fn service_for(server: &ServerGuard) -> ApiDocsService {
        let config = Config {
            corpus_url: format!("{}/all.json", server.url()),
            ..Config::default()
        };
        ApiDocsService::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_modules_without_classes_or_methods_are_dropped() {
        let (server, _m) = corpus_server(
            json!({"modules": [
                {"textRaw": "A", "name": "a", "methods": []},
                {"textRaw": "B", "name": "b", "methods": [{"textRaw": "`b.run()`"}]},
                {"textRaw": "C", "name": "c", "classes": [{"textRaw": "Class: C"}]},
                {"textRaw": "Intro", "name": "intro", "desc": "prose only"}
            ]}),
            1,
        )
        .await;
        let service = service_for(&server);

        let modules = service.get_modules().await.unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();

        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_modules_are_memoized() {
        let (server, m) = corpus_server(
            json!({"modules": [{"textRaw": "B", "name": "b", "methods": [{"textRaw": "`b()`"}]}]}),
            1,
        )
        .await;
        let service = service_for(&server);

        let first = service.get_modules().await.unwrap();
        service.fetcher().cache().clear_cache(service.url.as_str()).await;
        let second = service.get_modules().await.unwrap();
        m.assert_async().await;

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", "/all.json")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let service = service_for(&server);

        let result = service.get_modules().await;
        assert!(matches!(result, Err(DocsFetchError::HttpStatus { status: 500, .. })));
        failing.assert_async().await;
        failing.remove_async().await;

        let _ok = server
            .mock("GET", "/all.json")
            .with_status(200)
            .with_body(r#"{"modules": [{"name": "b", "methods": [{"textRaw": "x"}]}]}"#)
            .create_async()
            .await;

        assert_eq!(service.get_modules().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corpus_with_wrong_shape_fails_to_decode() {
        let (server, _m) = corpus_server(json!({"modules": "nope"}), 1).await;
        let service = service_for(&server);

        assert!(matches!(
            service.get_modules().await,
            Err(DocsFetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_corpus_with_null_fields_loads() {
        let (server, _m) = corpus_server(
            json!({"modules": [
                {"textRaw": null, "name": "events", "classes": [{"textRaw": "Class: `EventEmitter`"}],
                 "methods": null, "modules": null},
                {"textRaw": "Intro", "name": "intro", "classes": null, "methods": null}
            ]}),
            1,
        )
        .await;
        let service = service_for(&server);

        let modules = service.get_modules().await.unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "events");
        assert!(service.find_module("events").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_module_by_normalized_name() {
        let (server, _m) = corpus_server(
            json!({"modules": [
                {"textRaw": "Test runner", "name": "Node:Test", "methods": [{"textRaw": "`test()`"}]},
                {"textRaw": "Util", "name": "util", "methods": [{"textRaw": "`util.styleText()`"}]}
            ]}),
            1,
        )
        .await;
        let service = service_for(&server);

        let test_module = service.find_module("node:test").await.unwrap().unwrap();
        assert_eq!(test_module.text_raw, "Test runner");
        assert!(service.find_module("UTIL").await.unwrap().is_some());
        assert!(service.find_module("doesNotExist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_collision_resolves_to_first_module() {
        let (server, _m) = corpus_server(
            json!({"modules": [
                {"textRaw": "First", "name": "child_process", "methods": [{"textRaw": "a"}]},
                {"textRaw": "Second", "name": "Child_Process!", "methods": [{"textRaw": "b"}]}
            ]}),
            1,
        )
        .await;
        let service = service_for(&server);

        let module = service.find_module("child_process").await.unwrap().unwrap();
        assert_eq!(module.text_raw, "First");
    }

    #[test]
    fn test_absent_module_renders_empty() {
        let service = ApiDocsService::new(&Config::default()).unwrap();

        assert_eq!(service.get_module_summary(None), "");
        assert_eq!(service.get_module_document(None, &FormattingOptions::default()), "");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = Config {
            corpus_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            ApiDocsService::new(&config),
            Err(DocsFetchError::Url(_))
        ));
    }
}
