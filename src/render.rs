//! Plain-text product cards for the terminal.

use std::fmt;

use crate::models::ProductRecord;

const NO_RATING: &str = "—";
const NO_PRICE: &str = "Indisponível";
const NO_IMAGE: &str = "N/A";

/// Display-ready view of a record with placeholders for absent fields.
#[derive(Debug, PartialEq, Eq)]
pub struct Card<'a> {
    pub title: &'a str,
    pub price: &'a str,
    pub rating: &'a str,
    pub reviews: String,
    pub image: &'a str,
}

impl<'a> From<&'a ProductRecord> for Card<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            title: &record.title,
            price: record.price.as_deref().unwrap_or(NO_PRICE),
            rating: record.rating.as_deref().unwrap_or(NO_RATING),
            reviews: group_thousands(record.review_count.as_deref()),
            image: record.image_url.as_deref().unwrap_or(NO_IMAGE),
        }
    }
}

impl fmt::Display for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Preço: {}", self.price)?;
        writeln!(f, "  Avaliação: {}  Reviews: {}", self.rating, self.reviews)?;
        write!(f, "  Imagem: {}", self.image)
    }
}

/// `"12530"` -> `"12.530"`; anything that is not a positive count shows as `"0"`.
fn group_thousands(count: Option<&str>) -> String {
    let Some(digits) = count.filter(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
    else {
        return "0".to_string();
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return "0".to_string();
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn render_cards(records: &[ProductRecord]) -> String {
    records
        .iter()
        .map(|record| Card::from(record).to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(Some("12530")), "12.530");
        assert_eq!(group_thousands(Some("1234567")), "1.234.567");
        assert_eq!(group_thousands(Some("999")), "999");
        assert_eq!(group_thousands(Some("0")), "0");
        assert_eq!(group_thousands(Some("abc")), "0");
        assert_eq!(group_thousands(None), "0");
    }

    #[test]
    fn test_placeholders_for_absent_fields() {
        let record = ProductRecord {
            title: "Cabo USB-C".into(),
            price: None,
            rating: None,
            review_count: None,
            image_url: None,
        };
        let card = Card::from(&record);

        assert_eq!(card.price, "Indisponível");
        assert_eq!(card.rating, "—");
        assert_eq!(card.reviews, "0");
        assert_eq!(card.image, "N/A");
    }

    #[test]
    fn test_render_card() {
        let record = ProductRecord {
            title: "Echo Dot".into(),
            price: Some("R$ 379,05".into()),
            rating: Some("4,8".into()),
            review_count: Some("12530".into()),
            image_url: Some("https://m.media-amazon.com/images/I/echo.jpg".into()),
        };

        assert_eq!(
            render_cards(&[record]),
            "Echo Dot\n  Preço: R$ 379,05\n  Avaliação: 4,8  Reviews: 12.530\n  Imagem: https://m.media-amazon.com/images/I/echo.jpg"
        );
    }
}
