//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP, browser and retry settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Upstream board location
    #[serde(default)]
    pub board: BoardConfig,

    /// Markup selectors and labels
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Webhook delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Watermark location
    #[serde(default)]
    pub state: StateConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or fall back to defaults.
    ///
    /// The load error is handed back so the caller can report it once
    /// logging is installed.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<AppError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Apply environment overrides for secrets and deployment paths.
    ///
    /// - `SLACK_WEBHOOK_URL`: webhook destination
    /// - `STATE_FILE_PATH`: watermark file
    /// - `FETCH_STRATEGY`: `browser` or `http`
    /// - `CHROME_PATH`: browser executable
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SLACK_WEBHOOK_URL") {
            self.notifier.webhook_url = Some(url);
        }
        if let Some(path) = non_empty("STATE_FILE_PATH") {
            self.state.path = path;
        }
        if let Some(strategy) = non_empty("FETCH_STRATEGY") {
            self.crawler.strategy = strategy.parse()?;
        }
        if let Some(path) = non_empty("CHROME_PATH") {
            self.crawler.chrome_path = Some(path);
        }
        Ok(self)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::validation("crawler.max_retries must be > 0"));
        }
        if self.crawler.viewport_width == 0 || self.crawler.viewport_height == 0 {
            return Err(AppError::validation("crawler viewport must be non-zero"));
        }
        url::Url::parse(&self.board.origin)
            .map_err(|e| AppError::validation(format!("board.origin is invalid: {e}")))?;
        self.board.board_url()?;

        for selector in self.selectors.css_selectors() {
            scraper::Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        if self.selectors.shop_label.is_empty()
            || self.selectors.price_label.is_empty()
            || self.selectors.shipping_label.is_empty()
        {
            return Err(AppError::validation("info labels must not be empty"));
        }

        if let Some(url) = &self.notifier.webhook_url {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("notifier.webhook_url is invalid: {e}")))?;
        }
        if self.state.path.trim().is_empty() {
            return Err(AppError::validation("state.path is empty"));
        }
        Ok(())
    }
}

/// How the board page is retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Render in a headless browser
    #[default]
    Browser,
    /// Plain HTTP with a cookie bootstrap
    Http,
}

impl FromStr for FetchStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            other => Err(AppError::config(format!(
                "unknown fetch strategy '{other}' (expected 'browser' or 'http')"
            ))),
        }
    }
}

/// HTTP client, browser and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent for both strategies
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header value
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Page load / request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts for fetch + extract
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub strategy: FetchStrategy,

    /// Wait after navigation for client-side rendering
    #[serde(default = "defaults::render_settle")]
    pub render_settle_ms: u64,

    /// Wait between the cookie bootstrap and the board request
    #[serde(default = "defaults::cookie_settle")]
    pub cookie_settle_ms: u64,

    #[serde(default = "defaults::viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "defaults::viewport_height")]
    pub viewport_height: u32,

    /// Browser executable (auto-detected when unset)
    #[serde(default)]
    pub chrome_path: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
            strategy: FetchStrategy::default(),
            render_settle_ms: defaults::render_settle(),
            cookie_settle_ms: defaults::cookie_settle(),
            viewport_width: defaults::viewport_width(),
            viewport_height: defaults::viewport_height(),
            chrome_path: None,
        }
    }
}

/// Upstream board location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Site root, also used to resolve relative links
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Path of the deal board below the origin
    #[serde(default = "defaults::board_path")]
    pub board_path: String,

    /// Referer sent with the cookie bootstrap request
    #[serde(default = "defaults::referer")]
    pub referer: String,
}

impl BoardConfig {
    /// Root page URL used for the cookie bootstrap.
    pub fn main_url(&self) -> Result<String> {
        Ok(url::Url::parse(&self.origin)?.join("/")?.to_string())
    }

    /// Absolute board URL.
    pub fn board_url(&self) -> Result<String> {
        Ok(url::Url::parse(&self.origin)?
            .join(&self.board_path)?
            .to_string())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            board_path: defaults::board_path(),
            referer: defaults::referer(),
        }
    }
}

/// CSS selectors and labels describing the board markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One element per listing
    #[serde(default = "defaults::row")]
    pub row: String,

    #[serde(default = "defaults::title_link")]
    pub title_link: String,

    /// Display title nested inside the title link
    #[serde(default = "defaults::display_title")]
    pub display_title: String,

    #[serde(default = "defaults::vote_count")]
    pub vote_count: String,

    #[serde(default = "defaults::author")]
    pub author: String,

    #[serde(default = "defaults::date")]
    pub date: String,

    #[serde(default = "defaults::info_block")]
    pub info_block: String,

    /// Labeled span inside the info block
    #[serde(default = "defaults::info_item")]
    pub info_item: String,

    /// Emphasized value inside a labeled span
    #[serde(default = "defaults::info_value")]
    pub info_value: String,

    #[serde(default = "defaults::category")]
    pub category: String,

    #[serde(default = "defaults::thumbnail")]
    pub thumbnail: String,

    #[serde(default = "defaults::thumbnail_attr")]
    pub thumbnail_attr: String,

    #[serde(default = "defaults::shop_label")]
    pub shop_label: String,

    #[serde(default = "defaults::price_label")]
    pub price_label: String,

    #[serde(default = "defaults::shipping_label")]
    pub shipping_label: String,

    /// Placeholder for missing shop/price/shipping/category
    #[serde(default = "defaults::unknown")]
    pub unknown: String,

    /// Listings scoring at or below this are dropped
    #[serde(default = "defaults::downvote_threshold")]
    pub downvote_threshold: i64,
}

impl SelectorConfig {
    /// All CSS selector strings, for validation.
    pub fn css_selectors(&self) -> [&str; 11] {
        [
            self.row.as_str(),
            self.title_link.as_str(),
            self.display_title.as_str(),
            self.vote_count.as_str(),
            self.author.as_str(),
            self.date.as_str(),
            self.info_block.as_str(),
            self.info_item.as_str(),
            self.info_value.as_str(),
            self.category.as_str(),
            self.thumbnail.as_str(),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            row: defaults::row(),
            title_link: defaults::title_link(),
            display_title: defaults::display_title(),
            vote_count: defaults::vote_count(),
            author: defaults::author(),
            date: defaults::date(),
            info_block: defaults::info_block(),
            info_item: defaults::info_item(),
            info_value: defaults::info_value(),
            category: defaults::category(),
            thumbnail: defaults::thumbnail(),
            thumbnail_attr: defaults::thumbnail_attr(),
            shop_label: defaults::shop_label(),
            price_label: defaults::price_label(),
            shipping_label: defaults::shipping_label(),
            unknown: defaults::unknown(),
            downvote_threshold: defaults::downvote_threshold(),
        }
    }
}

/// Webhook message and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Destination; delivery is skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Pause between webhook calls in milliseconds
    #[serde(default = "defaults::notify_delay")]
    pub delay_ms: u64,

    /// Attachment side bar color
    #[serde(default = "defaults::color")]
    pub color: String,

    #[serde(default = "defaults::footer")]
    pub footer: String,

    #[serde(default = "defaults::button_text")]
    pub button_text: String,

    /// Glyph for categories missing from `glyphs`
    #[serde(default = "defaults::default_glyph")]
    pub default_glyph: String,

    /// Category text to glyph
    #[serde(default = "defaults::glyphs")]
    pub glyphs: BTreeMap<String, String>,
}

impl NotifierConfig {
    /// Glyph for a category, falling back to the default.
    pub fn glyph_for(&self, category: &str) -> &str {
        self.glyphs
            .get(category.trim())
            .map_or(self.default_glyph.as_str(), String::as_str)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            delay_ms: defaults::notify_delay(),
            color: defaults::color(),
            footer: defaults::footer(),
            button_text: defaults::button_text(),
            default_glyph: defaults::default_glyph(),
            glyphs: defaults::glyphs(),
        }
    }
}

/// Watermark location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "defaults::state_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: defaults::state_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        2000
    }
    pub fn render_settle() -> u64 {
        3000
    }
    pub fn cookie_settle() -> u64 {
        2000
    }
    pub fn viewport_width() -> u32 {
        1920
    }
    pub fn viewport_height() -> u32 {
        1080
    }

    // Board defaults
    pub fn origin() -> String {
        "https://www.fmkorea.com".into()
    }
    pub fn board_path() -> String {
        "/hotdeal".into()
    }
    pub fn referer() -> String {
        "https://www.google.com/".into()
    }

    // Selector defaults
    pub fn row() -> String {
        "li.li".into()
    }
    pub fn title_link() -> String {
        "h3.title a".into()
    }
    pub fn display_title() -> String {
        ".ellipsis-target".into()
    }
    pub fn vote_count() -> String {
        ".count".into()
    }
    pub fn author() -> String {
        ".author".into()
    }
    pub fn date() -> String {
        ".regdate".into()
    }
    pub fn info_block() -> String {
        ".hotdeal_info".into()
    }
    pub fn info_item() -> String {
        "span".into()
    }
    pub fn info_value() -> String {
        "a.strong".into()
    }
    pub fn category() -> String {
        ".category a".into()
    }
    pub fn thumbnail() -> String {
        "img.thumb".into()
    }
    pub fn thumbnail_attr() -> String {
        "src".into()
    }
    pub fn shop_label() -> String {
        "쇼핑몰:".into()
    }
    pub fn price_label() -> String {
        "가격:".into()
    }
    pub fn shipping_label() -> String {
        "배송:".into()
    }
    pub fn unknown() -> String {
        "알 수 없음".into()
    }
    pub fn downvote_threshold() -> i64 {
        -1
    }

    // Notifier defaults
    pub fn notify_delay() -> u64 {
        500
    }
    pub fn color() -> String {
        "#36a64f".into()
    }
    pub fn footer() -> String {
        "핫딜 알림".into()
    }
    pub fn button_text() -> String {
        "게시글 보기".into()
    }
    pub fn default_glyph() -> String {
        "🔥".into()
    }
    pub fn glyphs() -> BTreeMap<String, String> {
        [
            ("먹거리", "🍔"),
            ("SW/게임", "🎮"),
            ("PC제품", "💻"),
            ("가전제품", "📺"),
            ("생활용품", "🧴"),
            ("의류", "👕"),
            ("세일정보", "🏷️"),
            ("화장품", "💄"),
            ("모바일/상품권", "📱"),
            ("패키지/이용권", "🎫"),
            ("기타", "📦"),
        ]
        .into_iter()
        .map(|(category, glyph)| (category.to_string(), glyph.to_string()))
        .collect()
    }

    // State defaults
    pub fn state_path() -> String {
        "./state.json".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
