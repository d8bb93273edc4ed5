//! Outbound webhook message.
//!
//! Mirrors the chat service's legacy attachment schema. Built from a
//! [`Listing`] and validated before it is serialized.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Listing, NotifierConfig};

const SHOP_LABEL: &str = "쇼핑몰";
const PRICE_LABEL: &str = "가격";
const SHIPPING_LABEL: &str = "배송";
const CATEGORY_LABEL: &str = "카테고리";
const TIME_LABEL: &str = "시간";

/// Webhook payload for one listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DealMessage {
    /// Preview text shown in notifications
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Attachment {
    pub color: String,
    pub title: String,
    pub title_link: String,
    pub fields: Vec<Field>,
    pub actions: Vec<Action>,
    pub footer: String,
    /// Unix seconds
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn short(title: &str, value: &str) -> Self {
        Self {
            title: title.to_string(),
            value: value.to_string(),
            short: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Button,
}

impl DealMessage {
    /// Build the message for a listing, stamped with `ts`.
    pub fn for_listing(listing: &Listing, config: &NotifierConfig, ts: i64) -> Result<Self> {
        let glyph = config.glyph_for(&listing.category);
        let message = Self {
            text: format!("{glyph} {}", listing.title),
            attachments: vec![Attachment {
                color: config.color.clone(),
                title: listing.title.clone(),
                title_link: listing.url.clone(),
                fields: vec![
                    Field::short(SHOP_LABEL, &listing.shop),
                    Field::short(PRICE_LABEL, &listing.price),
                    Field::short(SHIPPING_LABEL, &listing.shipping),
                    Field::short(CATEGORY_LABEL, &listing.category),
                    Field::short(TIME_LABEL, &listing.posted_at),
                ],
                actions: vec![Action {
                    kind: ActionKind::Button,
                    text: config.button_text.clone(),
                    url: listing.url.clone(),
                }],
                footer: config.footer.clone(),
                ts,
                thumb_url: listing.thumbnail_url.clone(),
            }],
        };
        message.validate(listing.id)?;
        Ok(message)
    }

    /// Reject messages the chat service would render without a title or link.
    pub fn validate(&self, listing_id: u64) -> Result<()> {
        let attachment = self
            .attachments
            .first()
            .ok_or_else(|| AppError::notify(listing_id, "message has no attachment"))?;
        if attachment.title.trim().is_empty() {
            return Err(AppError::notify(listing_id, "message title is empty"));
        }
        if url::Url::parse(&attachment.title_link).is_err() {
            return Err(AppError::notify(
                listing_id,
                format!("message link '{}' is not a URL", attachment.title_link),
            ));
        }
        Ok(())
    }
}
