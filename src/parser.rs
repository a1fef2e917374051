use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::MarketplaceConfig;
use crate::error::{ConfigError, ParseError};
use crate::models::ProductRecord;
use crate::strategy::{FieldRule, Normalize, Strategy, compile};

const CARD_SELECTOR: &str = r#"div[role="listitem"][data-component-type="s-search-result"]"#;

/// Turns a rendered search-results page into product records.
///
/// Holds only compiled selectors, so one instance can serve any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct Extractor {
    card: Selector,
    title: FieldRule,
    price: Option<FieldRule>,
    rating: FieldRule,
    review_count: FieldRule,
    image: FieldRule,
    origin: Url,
}

impl Extractor {
    pub fn new(config: &MarketplaceConfig) -> Result<Self, ConfigError> {
        let price = if config.extract_price {
            Some(
                FieldRule::new(Normalize::Trim)
                    .then(Strategy::descendant_text(".a-price span.a-offscreen")?),
            )
        } else {
            None
        };

        Ok(Self {
            card: compile(CARD_SELECTOR)?,
            title: FieldRule::new(Normalize::Trim)
                .scoped("h2")?
                .then(Strategy::descendant_text("span")?)
                .then(Strategy::self_attribute("aria-label")),
            price,
            rating: FieldRule::new(Normalize::FirstToken)
                .then(Strategy::descendant_text(".a-icon-alt")?),
            review_count: FieldRule::new(Normalize::StripGrouping)
                .then(Strategy::descendant_text("span.a-size-base.s-underline-text")?),
            image: FieldRule::new(Normalize::Trim)
                .then(Strategy::descendant_attribute("img.s-image", "src")?),
            origin: config.origin()?,
        })
    }

    /// Extract every titled card, in document order.
    ///
    /// Cards without a title are dropped; a page without cards yields an
    /// empty list.
    pub fn extract(&self, html: &str) -> Result<Vec<ProductRecord>, ParseError> {
        check_markup(html)?;
        let doc = Html::parse_document(html);

        let mut cards = 0usize;
        let products: Vec<ProductRecord> = doc
            .select(&self.card)
            .inspect(|_| cards += 1)
            .enumerate()
            .filter_map(|(index, card)| {
                let record = self.extract_card(card);
                if record.is_none() {
                    debug!("Skipping card {} without a title", index);
                }
                record
            })
            .collect();

        debug!("Extracted {} products from {} cards", products.len(), cards);
        Ok(products)
    }

    fn extract_card(&self, card: ElementRef<'_>) -> Option<ProductRecord> {
        let title = self.title.resolve(card)?;

        Some(ProductRecord {
            title,
            price: self.price.as_ref().and_then(|rule| rule.resolve(card)),
            rating: self.rating.resolve(card),
            review_count: self.review_count.resolve(card),
            image_url: self.image.resolve(card).map(|src| self.absolutize(src)),
        })
    }

    fn absolutize(&self, src: String) -> String {
        if Url::parse(&src).is_ok() {
            return src;
        }
        match self.origin.join(&src) {
            Ok(url) => url.to_string(),
            Err(_) => src,
        }
    }
}

/// html5ever recovers from nearly anything, so "unparsable" means there is
/// no markup to recover: a blank body or one without a single tag, opening,
/// closing or declaration.
fn check_markup(html: &str) -> Result<(), ParseError> {
    let trimmed = html.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let has_tag = trimmed.as_bytes().windows(2).any(|pair| {
        pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || matches!(pair[1], b'!' | b'/'))
    });
    if !has_tag {
        return Err(ParseError::NotMarkup);
    }
    Ok(())
}
