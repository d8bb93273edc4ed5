//! Listing and batch data structures.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A deal post extracted from the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Post number taken from the URL path
    pub id: u64,

    /// Post title
    pub title: String,

    /// Author nickname
    pub author: String,

    /// Posting time as shown on the board
    pub posted_at: String,

    /// Absolute URL to the post
    pub url: String,

    /// Shop name
    pub shop: String,

    /// Price text
    pub price: String,

    /// Shipping text
    pub shipping: String,

    /// Board category
    pub category: String,

    /// Absolute thumbnail URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Listings from one fetch, newest first.
///
/// Ids are strictly descending; duplicates keep their first occurrence.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Batch {
    listings: Vec<Listing>,
}

impl Batch {
    /// Build a batch from listings in any order.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut seen = HashSet::new();
        let mut listings: Vec<Listing> = listings
            .into_iter()
            .filter(|listing| seen.insert(listing.id))
            .collect();
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        Self { listings }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Highest id in the batch.
    pub fn max_id(&self) -> Option<u64> {
        self.listings.first().map(|listing| listing.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.listings.iter()
    }

    pub fn as_slice(&self) -> &[Listing] {
        &self.listings
    }

    /// Listings with an id above `last_seen_id`, oldest first.
    pub fn newer_than(&self, last_seen_id: u64) -> Vec<Listing> {
        self.listings
            .iter()
            .rev()
            .filter(|listing| listing.id > last_seen_id)
            .cloned()
            .collect()
    }
}

impl IntoIterator for Batch {
    type Item = Listing;
    type IntoIter = std::vec::IntoIter<Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.into_iter()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Listing;

    /// Listing with the given id and placeholder fields.
    pub fn listing(id: u64) -> Listing {
        Listing {
            id,
            title: format!("Deal {id}"),
            author: "tester".to_string(),
            posted_at: "12:34".to_string(),
            url: format!("https://www.fmkorea.com/{id}"),
            shop: "Shop".to_string(),
            price: "10,000원".to_string(),
            shipping: "무료".to_string(),
            category: "먹거리".to_string(),
            thumbnail_url: None,
        }
    }
}
