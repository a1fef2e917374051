use serde::{Deserialize, Serialize};

/// One product card lifted from a search-results page.
///
/// `title` is always non-empty; the other fields are `None` when the page did
/// not carry a usable value, and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: Option<String>,
    pub rating: Option<String>,
    #[serde(rename = "reviews")]
    pub review_count: Option<String>,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
}
