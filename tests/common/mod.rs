//! Shared fixtures for integration tests.

#![allow(dead_code)]

use hotdeal_watcher::models::{Config, FetchStrategy};

/// One board row in the markup the extractor expects.
pub fn row(id: u64, title: &str) -> String {
    format!(
        r#"<li class="li">
            <h3 class="title"><a href="/{id}"><span class="ellipsis-target">{title}</span></a></h3>
            <span class="count">5</span>
            <div class="hotdeal_info">
                <span>쇼핑몰: <a class="strong">쿠팡</a></span>
                <span>가격: <a class="strong">9,900원</a></span>
                <span>배송: <a class="strong">무료</a></span>
            </div>
            <span class="category"><a>먹거리 /</a></span>
            <span class="author"> / 딜헌터</span>
            <span class="regdate">12:34</span>
            <img class="thumb" src="//image.example.com/{id}.jpg">
        </li>"#
    )
}

/// Board page with one row per id.
pub fn board_page(ids: &[u64]) -> String {
    let rows: String = ids.iter().map(|id| row(*id, &format!("Deal {id}"))).collect();
    format!("<html><body><ul class=\"fm_best_widget\">{rows}</ul></body></html>")
}

/// Config pointed at a mock server with every delay disabled.
pub fn test_config(origin: &str) -> Config {
    let mut config = Config::default();
    config.crawler.strategy = FetchStrategy::Http;
    config.crawler.cookie_settle_ms = 0;
    config.crawler.retry_delay_ms = 0;
    config.crawler.max_retries = 1;
    config.board.origin = origin.to_string();
    config.notifier.delay_ms = 0;
    config
}
