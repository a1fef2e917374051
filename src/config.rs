//! Marketplace targeting and request settings.
//!
//! A single [`MarketplaceConfig`] decides which storefront is queried, which
//! language the page is requested in, and whether prices are extracted.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Storefront host without the `www.` prefix, e.g. `amazon.com.br`.
    pub target_domain: String,
    /// Value sent as `Accept-Language`.
    pub language_preference: String,
    /// Whether cards are searched for a price node.
    #[serde(default = "default_true")]
    pub extract_price: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    10
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self::amazon_br()
    }
}

impl MarketplaceConfig {
    /// Brazilian storefront, prices in reais.
    #[must_use]
    pub fn amazon_br() -> Self {
        Self {
            target_domain: "amazon.com.br".to_string(),
            language_preference: "pt-BR,pt;q=0.9".to_string(),
            extract_price: true,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
        }
    }

    /// US storefront; cards are read without prices.
    #[must_use]
    pub fn amazon_us() -> Self {
        Self {
            target_domain: "amazon.com".to_string(),
            language_preference: "en-US,en;q=0.9".to_string(),
            extract_price: false,
            ..Self::amazon_br()
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.target_domain = domain.into();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language_preference = language.into();
        self
    }

    #[must_use]
    pub fn with_price(mut self, extract_price: bool) -> Self {
        self.extract_price = extract_price;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Root of the storefront, used both for requests and for resolving
    /// relative image paths.
    pub fn origin(&self) -> Result<Url, ConfigError> {
        let domain = self.target_domain.trim();
        if domain.is_empty() || domain.contains('/') {
            return Err(ConfigError::InvalidDomain(self.target_domain.clone()));
        }
        Url::parse(&format!("https://www.{domain}/"))
            .map_err(|_| ConfigError::InvalidDomain(self.target_domain.clone()))
    }

    /// Search-results URL for `keyword` relative to `origin`.
    #[must_use]
    pub fn search_url(origin: &Url, keyword: &str) -> String {
        let base = origin.as_str().trim_end_matches('/');
        format!("{base}/s?k={}", urlencoding::encode(keyword))
    }

    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let br = MarketplaceConfig::amazon_br();
        assert_eq!(br.target_domain, "amazon.com.br");
        assert!(br.extract_price);
        assert!(br.language_preference.starts_with("pt-BR"));

        let us = MarketplaceConfig::amazon_us();
        assert_eq!(us.target_domain, "amazon.com");
        assert!(!us.extract_price);
        assert_eq!(us.user_agent, br.user_agent);
    }

    #[test]
    fn test_search_url_encodes_keyword() {
        let origin = MarketplaceConfig::amazon_br().origin().unwrap();
        assert_eq!(
            MarketplaceConfig::search_url(&origin, "fone bluetooth ação"),
            "https://www.amazon.com.br/s?k=fone%20bluetooth%20a%C3%A7%C3%A3o"
        );
        assert_eq!(
            MarketplaceConfig::search_url(&origin, "a&b=c"),
            "https://www.amazon.com.br/s?k=a%26b%3Dc"
        );
    }

    #[test]
    fn test_invalid_domain() {
        let config = MarketplaceConfig::default().with_domain("");
        assert!(matches!(config.origin(), Err(ConfigError::InvalidDomain(_))));

        let config = MarketplaceConfig::default().with_domain("amazon.com/evil");
        assert!(config.origin().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: MarketplaceConfig = serde_json::from_str(
            r#"{"target_domain": "amazon.de", "language_preference": "de-DE"}"#,
        )
        .unwrap();
        assert!(config.extract_price);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_redirects, 10);
    }
}
