// src/services/extractor.rs

//! Listing extraction from board markup.
//!
//! Each row is parsed into `Result<Listing, NodeError>`; failures are logged
//! and skipped so one malformed row never sinks the batch.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::error::{AppError, Result};
use crate::models::{Batch, Listing, SelectorConfig};
use crate::utils::normalize_whitespace;
use crate::utils::url::{extract_listing_id, normalize_thumbnail, resolve};

/// Why a single row was left out of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("no title link")]
    MissingTitleLink,

    #[error("title link has no href")]
    MissingHref,

    #[error("href '{0}' cannot be resolved")]
    InvalidUrl(String),

    #[error("no listing id in '{0}'")]
    MissingId(String),

    #[error("empty title for listing {0}")]
    EmptyTitle(u64),

    #[error("listing {id} is downvoted ({score})")]
    Downvoted { id: u64, score: i64 },
}

/// Compiled selectors for one board layout.
struct Selectors {
    row: Selector,
    title_link: Selector,
    display_title: Selector,
    vote_count: Selector,
    author: Selector,
    date: Selector,
    info_block: Selector,
    info_item: Selector,
    info_value: Selector,
    category: Selector,
    thumbnail: Selector,
}

impl Selectors {
    fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            row: parse_selector(&config.row)?,
            title_link: parse_selector(&config.title_link)?,
            display_title: parse_selector(&config.display_title)?,
            vote_count: parse_selector(&config.vote_count)?,
            author: parse_selector(&config.author)?,
            date: parse_selector(&config.date)?,
            info_block: parse_selector(&config.info_block)?,
            info_item: parse_selector(&config.info_item)?,
            info_value: parse_selector(&config.info_value)?,
            category: parse_selector(&config.category)?,
            thumbnail: parse_selector(&config.thumbnail)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn score_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+").ok()).as_ref()
}

fn leading_separator() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*/\s*").ok()).as_ref()
}

fn trailing_separator() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*/\s*$").ok()).as_ref()
}

/// Shop, price and shipping read from the info block.
#[derive(Debug, Default)]
struct DealInfo {
    shop: String,
    price: String,
    shipping: String,
}

/// Turns board markup into a [`Batch`].
pub struct ListingExtractor {
    selectors: Selectors,
    config: SelectorConfig,
    origin: String,
}

impl ListingExtractor {
    /// Compile the configured selectors. Fails on an invalid selector.
    pub fn new(config: &SelectorConfig, origin: impl Into<String>) -> Result<Self> {
        Ok(Self {
            selectors: Selectors::compile(config)?,
            config: config.clone(),
            origin: origin.into(),
        })
    }

    /// Extract all acceptable listings, newest first.
    ///
    /// Only fails when there is no document to parse.
    pub fn extract(&self, markup: &str) -> Result<Batch> {
        if markup.trim().is_empty() {
            return Err(AppError::parse("board markup is empty"));
        }
        let document = Html::parse_document(markup);

        let mut rows = 0usize;
        let listings: Vec<Listing> = document
            .select(&self.selectors.row)
            .inspect(|_| rows += 1)
            .filter_map(|row| match self.parse_row(row) {
                Ok(listing) => Some(listing),
                Err(NodeError::Downvoted { id, score }) => {
                    log::debug!("Skipping downvoted listing {id} (score {score})");
                    None
                }
                Err(error) => {
                    log::warn!("Skipping listing row: {error}");
                    None
                }
            })
            .collect();

        let batch = Batch::from_listings(listings);
        log::info!("Extracted {} of {} listing rows", batch.len(), rows);
        Ok(batch)
    }

    /// Parse one listing row.
    pub fn parse_row(&self, row: ElementRef<'_>) -> std::result::Result<Listing, NodeError> {
        let link = row
            .select(&self.selectors.title_link)
            .next()
            .ok_or(NodeError::MissingTitleLink)?;

        let href = link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(NodeError::MissingHref)?;
        let url =
            resolve(&self.origin, href).ok_or_else(|| NodeError::InvalidUrl(href.to_string()))?;
        let id = extract_listing_id(&url).ok_or_else(|| NodeError::MissingId(url.clone()))?;

        let score = self.score(row);
        if score <= self.config.downvote_threshold {
            return Err(NodeError::Downvoted { id, score });
        }

        let title = link
            .select(&self.selectors.display_title)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| text_of(link));
        if title.is_empty() {
            return Err(NodeError::EmptyTitle(id));
        }

        let author = self.first_text(row, &self.selectors.author);
        let author = match leading_separator() {
            Some(re) => re.replace(&author, "").trim().to_string(),
            None => author,
        };

        let info = self.deal_info(row);
        let category = self.category(row);
        let thumbnail_url = row
            .select(&self.selectors.thumbnail)
            .next()
            .and_then(|img| img.value().attr(&self.config.thumbnail_attr))
            .and_then(|src| normalize_thumbnail(&self.origin, src));

        Ok(Listing {
            id,
            title,
            author,
            posted_at: self.first_text(row, &self.selectors.date),
            url,
            shop: self.or_unknown(info.shop),
            price: self.or_unknown(info.price),
            shipping: self.or_unknown(info.shipping),
            category: self.or_unknown(category),
            thumbnail_url,
        })
    }

    /// Vote count, 0 when missing or unreadable.
    fn score(&self, row: ElementRef<'_>) -> i64 {
        let text = self.first_text(row, &self.selectors.vote_count);
        score_pattern()
            .and_then(|re| re.find(&text))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    fn deal_info(&self, row: ElementRef<'_>) -> DealInfo {
        let mut info = DealInfo::default();
        let Some(block) = row.select(&self.selectors.info_block).next() else {
            return info;
        };

        for item in block.select(&self.selectors.info_item) {
            let label = text_of(item);
            let value = || {
                item.select(&self.selectors.info_value)
                    .next()
                    .map(trimmed_text)
                    .unwrap_or_default()
            };
            if label.contains(&self.config.shop_label) {
                info.shop = value();
            } else if label.contains(&self.config.price_label) {
                info.price = value();
            } else if label.contains(&self.config.shipping_label) {
                info.shipping = value();
            }
        }
        info
    }

    fn category(&self, row: ElementRef<'_>) -> String {
        let text: String = row
            .select(&self.selectors.category)
            .map(|el| el.text().collect::<String>())
            .collect();
        let text = text.trim();
        match trailing_separator() {
            Some(re) => re.replace(text, "").trim().to_string(),
            None => text.to_string(),
        }
    }

    fn first_text(&self, row: ElementRef<'_>, selector: &Selector) -> String {
        row.select(selector)
            .next()
            .map(trimmed_text)
            .unwrap_or_default()
    }

    fn or_unknown(&self, value: String) -> String {
        if value.is_empty() {
            self.config.unknown.clone()
        } else {
            value
        }
    }
}

/// Titles wrap across lines in the markup; collapse their whitespace.
fn text_of(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

/// Field text as shown, trimmed only.
fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.fmkorea.com";

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&SelectorConfig::default(), ORIGIN).unwrap()
    }

    fn row(id: u64, vote: &str) -> String {
        format!(
            r#"<li class="li">
                <h3 class="title">
                  <a href="/{id}"><span class="ellipsis-target">Deal {id}</span> <span class="comment_count">[3]</span></a>
                </h3>
                <span class="count">{vote}</span>
                <div class="hotdeal_info">
                  <span>쇼핑몰: <a class="strong">쿠팡</a></span>
                  <span>가격: <a class="strong">12,900원</a></span>
                  <span>배송: <a class="strong">무료</a></span>
                </div>
                <span class="category"><a>먹거리 /</a></span>
                <span class="author"> / 딜헌터</span>
                <span class="regdate"> 12:34 </span>
                <img class="thumb" src="//image.fmkorea.com/thumb/{id}.jpg">
              </li>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><ul>{}</ul></body></html>",
            rows.concat()
        )
    }

    fn ids(batch: &Batch) -> Vec<u64> {
        batch.iter().map(|l| l.id).collect()
    }

    #[test]
    fn extracts_full_listing() {
        let batch = extractor().extract(&page(&[row(101, "5")])).unwrap();
        assert_eq!(batch.len(), 1);

        let listing = &batch.as_slice()[0];
        assert_eq!(listing.id, 101);
        assert_eq!(listing.title, "Deal 101");
        assert_eq!(listing.url, "https://www.fmkorea.com/101");
        assert_eq!(listing.author, "딜헌터");
        assert_eq!(listing.posted_at, "12:34");
        assert_eq!(listing.shop, "쿠팡");
        assert_eq!(listing.price, "12,900원");
        assert_eq!(listing.shipping, "무료");
        assert_eq!(listing.category, "먹거리");
        assert_eq!(
            listing.thumbnail_url.as_deref(),
            Some("https://image.fmkorea.com/thumb/101.jpg")
        );
    }

    #[test]
    fn field_text_is_trimmed_not_collapsed() {
        let markup = page(&[row(102, "1")
            .replace(" 12:34 ", "  2025.01.02    12:34 ")
            .replace("12,900원", " 12,900원  (카드할인) ")]);
        let batch = extractor().extract(&markup).unwrap();
        let listing = &batch.as_slice()[0];

        assert_eq!(listing.posted_at, "2025.01.02    12:34");
        assert_eq!(listing.price, "12,900원  (카드할인)");
        assert_eq!(listing.title, "Deal 102");
    }

    #[test]
    fn batch_is_sorted_descending() {
        let markup = page(&[row(101, "0"), row(105, "1"), row(103, "2")]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(ids(&batch), vec![105, 103, 101]);
    }

    #[test]
    fn downvoted_listing_is_excluded() {
        let markup = page(&[row(101, "-2"), row(102, "-1"), row(103, "0")]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(ids(&batch), vec![103]);
    }

    #[test]
    fn unreadable_score_counts_as_zero() {
        let markup = page(&[row(101, "추천")]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(ids(&batch), vec![101]);
    }

    #[test]
    fn title_falls_back_to_link_text() {
        let markup = page(&[r#"<li class="li"><h3 class="title"><a href="/200">  Plain   title </a></h3></li>"#
            .to_string()]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(batch.as_slice()[0].title, "Plain title");
    }

    #[test]
    fn missing_fields_default_to_unknown() {
        let markup = page(&[r#"<li class="li"><h3 class="title"><a href="/300">Bare</a></h3></li>"#
            .to_string()]);
        let batch = extractor().extract(&markup).unwrap();
        let listing = &batch.as_slice()[0];

        assert_eq!(listing.shop, "알 수 없음");
        assert_eq!(listing.price, "알 수 없음");
        assert_eq!(listing.shipping, "알 수 없음");
        assert_eq!(listing.category, "알 수 없음");
        assert_eq!(listing.author, "");
        assert_eq!(listing.thumbnail_url, None);
    }

    #[test]
    fn rows_without_link_or_id_are_skipped() {
        let markup = page(&[
            r#"<li class="li"><h3 class="title">no link</h3></li>"#.to_string(),
            r#"<li class="li"><h3 class="title"><a>no href</a></h3></li>"#.to_string(),
            r#"<li class="li"><h3 class="title"><a href="/hotdeal">no id</a></h3></li>"#
                .to_string(),
            r#"<li class="li"><h3 class="title"><a href="/401"> </a></h3></li>"#.to_string(),
            row(400, "3"),
        ]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(ids(&batch), vec![400]);
    }

    #[test]
    fn every_accepted_listing_is_complete() {
        let markup = page(&[
            row(10, "1"),
            r#"<li class="li"><h3 class="title"><a href="/11"></a></h3></li>"#.to_string(),
            row(12, "-5"),
            row(13, "2"),
        ]);
        let batch = extractor().extract(&markup).unwrap();
        assert!(!batch.is_empty());
        for listing in batch.iter() {
            assert!(listing.id > 0);
            assert!(!listing.title.is_empty());
            assert!(!listing.url.is_empty());
        }
        let ids = ids(&batch);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn root_relative_thumbnail_uses_origin() {
        let markup = page(&[row(500, "0").replace(
            "//image.fmkorea.com/thumb/500.jpg",
            "/files/thumb/500.jpg",
        )]);
        let batch = extractor().extract(&markup).unwrap();
        assert_eq!(
            batch.as_slice()[0].thumbnail_url.as_deref(),
            Some("https://www.fmkorea.com/files/thumb/500.jpg")
        );
    }

    #[test]
    fn page_without_rows_is_empty_batch() {
        let batch = extractor()
            .extract("<html><body><p>maintenance</p></body></html>")
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn empty_markup_is_an_error() {
        assert!(matches!(extractor().extract("  \n"), Err(AppError::Parse(_))));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let config = SelectorConfig {
            row: "[[invalid".to_string(),
            ..SelectorConfig::default()
        };
        assert!(ListingExtractor::new(&config, ORIGIN).is_err());
    }

    #[test]
    fn parse_row_reports_downvote() {
        let markup = page(&[row(700, "-3")]);
        let document = Html::parse_document(&markup);
        let extractor = extractor();
        let node = document.select(&extractor.selectors.row).next().unwrap();
        assert_eq!(
            extractor.parse_row(node),
            Err(NodeError::Downvoted { id: 700, score: -3 })
        );
    }
}
