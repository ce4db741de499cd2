//! Home catalog: cached collections and topics.
//!
//! # Invariants
//! - Fetches happen only before the first successful load or when forced.
//! - A failed fetch leaves cached data and the loaded flag untouched.
//! - Topic sections skip collection ids the API did not return.

use crate::model::collection::{Collection, Topic};
use crate::remote::{RemoteResult, RemoteSource};
use crate::service::engagement_service::EngagementService;
use crate::store::PreferenceStore;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Number of collections shown as hot topics on the home screen.
pub const HOT_TOPIC_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from cache; no request was made.
    Cached,
    Refreshed { collections: usize, topics: usize },
}

/// A topic with the loaded collections it groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSection<'a> {
    pub topic: &'a Topic,
    pub collections: Vec<&'a Collection>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: Vec<Collection>,
    topics: Vec<Topic>,
    has_loaded_initial_data: bool,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_loaded_initial_data(&self) -> bool {
        self.has_loaded_initial_data
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Fetches collections and topics unless already loaded.
    pub fn load<R: RemoteSource + ?Sized>(
        &mut self,
        remote: &R,
        force_refresh: bool,
    ) -> RemoteResult<LoadOutcome> {
        if self.has_loaded_initial_data && !force_refresh {
            return Ok(LoadOutcome::Cached);
        }

        let collections = remote.fetch_collections()?;
        let topics = remote.fetch_topics()?;
        self.collections = collections;
        self.topics = topics;
        self.has_loaded_initial_data = true;

        info!(
            "event=catalog_load module=catalog status=ok collections={} topics={} forced={}",
            self.collections.len(),
            self.topics.len(),
            force_refresh
        );
        Ok(LoadOutcome::Refreshed {
            collections: self.collections.len(),
            topics: self.topics.len(),
        })
    }

    pub fn collection(&self, collection_id: &str) -> Option<&Collection> {
        self.collections
            .iter()
            .find(|collection| collection.id == collection_id)
    }

    /// Leading collections for the hot topics strip.
    pub fn hot(&self, limit: usize) -> &[Collection] {
        &self.collections[..limit.min(self.collections.len())]
    }

    /// Case-insensitive name match; a blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Collection> {
        let needle = normalize_search_text(query);
        self.collections
            .iter()
            .filter(|collection| {
                needle.is_empty() || normalize_search_text(&collection.name).contains(&needle)
            })
            .collect()
    }

    pub fn topic_sections(&self) -> Vec<TopicSection<'_>> {
        self.topics
            .iter()
            .map(|topic| TopicSection {
                topic,
                collections: topic
                    .collection_ids
                    .iter()
                    .filter_map(|id| self.collection(id))
                    .collect(),
            })
            .collect()
    }

    /// Loaded collections the reader marked as favorite.
    pub fn favorites<S: PreferenceStore>(
        &self,
        engagement: &EngagementService<S>,
    ) -> Vec<&Collection> {
        self.collections
            .iter()
            .filter(|collection| engagement.is_favorite(&collection.id))
            .collect()
    }
}

fn normalize_search_text(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_lowercase()
}
