use std::sync::Arc;

use tracing::info;

use crate::error::SearchError;
use crate::fetcher::PageSource;
use crate::models::ProductRecord;
use crate::parser::Extractor;

/// Keyword in, product records out.
#[derive(Clone)]
pub struct Searcher {
    source: Arc<dyn PageSource>,
    extractor: Extractor,
}

impl Searcher {
    pub fn new(source: Arc<dyn PageSource>, extractor: Extractor) -> Self {
        Self { source, extractor }
    }

    /// Fetch the first result page for `keyword` and extract its cards.
    ///
    /// Neither step is retried. An empty list means the page had no titled
    /// cards.
    pub async fn search(&self, keyword: &str) -> Result<Vec<ProductRecord>, SearchError> {
        let html = self.source.fetch_search_page(keyword).await?;
        let products = self.extractor.extract(&html)?;
        info!("Search for '{}' returned {} products", keyword, products.len());
        Ok(products)
    }
}
