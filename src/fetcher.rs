use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect;
use tracing::{debug, warn};
use url::Url;

use crate::config::MarketplaceConfig;
use crate::error::{ConfigError, FetchError};

/// Anything that can hand back the raw HTML of a search-results page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_search_page(&self, keyword: &str) -> Result<String, FetchError>;
}

/// Fetches the first result page from the configured storefront.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    user_agent: String,
    language: String,
}

impl HttpFetcher {
    pub fn new(config: &MarketplaceConfig) -> Result<Self, ConfigError> {
        let origin = config.origin()?;
        Self::with_base_url(config, origin)
    }

    /// Same as [`HttpFetcher::new`] but aimed at an arbitrary host, e.g. a
    /// local mock.
    pub fn with_base_url(config: &MarketplaceConfig, base_url: Url) -> Result<Self, ConfigError> {
        let max_redirects = config.max_redirects;
        let home_host = base_url.host_str().unwrap_or_default().to_string();
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("Too many redirects (>{max_redirects})"))
            } else if attempt.url().host_str() != Some(home_host.as_str()) {
                // leaving the storefront means a sign-in or captcha wall
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .redirect(redirect_policy)
            .timeout(config.timeout())
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            base_url,
            user_agent: config.user_agent.clone(),
            language: config.language_preference.clone(),
        })
    }

    pub fn search_url(&self, keyword: &str) -> String {
        MarketplaceConfig::search_url(&self.base_url, keyword)
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_search_page(&self, keyword: &str) -> Result<String, FetchError> {
        let url = self.search_url(keyword);
        debug!("Fetching {}", url);

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT_LANGUAGE, &self.language)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Marketplace returned {} for {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> HttpFetcher {
        let base = Url::parse(&server.uri()).unwrap();
        HttpFetcher::with_base_url(&MarketplaceConfig::amazon_br(), base).unwrap()
    }

    #[test]
    fn test_search_url_uses_storefront() {
        let fetcher = HttpFetcher::new(&MarketplaceConfig::amazon_us()).unwrap();
        assert_eq!(
            fetcher.search_url("usb c hub"),
            "https://www.amazon.com/s?k=usb%20c%20hub"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start().await;
        let config = MarketplaceConfig::amazon_br();

        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "fone de ouvido"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let html = fetcher_for(&server)
            .fetch_search_page("fone de ouvido")
            .await
            .unwrap();
        assert_eq!(html, "<html>ok</html>");

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        assert_eq!(
            headers.get("user-agent").unwrap().to_str().unwrap(),
            config.user_agent
        );
        assert_eq!(
            headers.get("accept-language").unwrap().to_str().unwrap(),
            "pt-BR,pt;q=0.9"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch_search_page("kindle").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_redirect_off_storefront_is_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "https://signin.example.net/ap"),
            )
            .mount(&server)
            .await;

        let err = fetcher_for(&server).fetch_search_page("kindle").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 302, .. }));
    }

    #[tokio::test]
    async fn test_same_host_redirect_loop_is_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/s?k=kindle"))
            .mount(&server)
            .await;

        let config = MarketplaceConfig {
            max_redirects: 3,
            ..MarketplaceConfig::amazon_br()
        };
        let base = Url::parse(&server.uri()).unwrap();
        let fetcher = HttpFetcher::with_base_url(&config, base).unwrap();

        let err = fetcher.fetch_search_page("kindle").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let base = Url::parse("http://127.0.0.1:1/").unwrap();
        let fetcher = HttpFetcher::with_base_url(&MarketplaceConfig::amazon_br(), base).unwrap();

        let err = fetcher.fetch_search_page("kindle").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
