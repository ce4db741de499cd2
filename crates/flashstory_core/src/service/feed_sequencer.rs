//! Explore feed: append-only buffer of random posts with prefetch.
//!
//! # Responsibility
//! - Track the post in view and decide when to request another batch.
//! - Append batches in arrival order without moving the current index.
//!
//! # Invariants
//! - At most one fetch is in flight.
//! - `current_index <= len - 1` whenever the buffer is non-empty.
//! - A fetch started before `reset()` never appends to the new feed.
//! - Failed fetches append nothing and are not retried; the next forward
//!   move re-checks the threshold.

use crate::config::CoreConfig;
use crate::model::post::Post;
use crate::model::reaction::ReactionTally;
use crate::remote::{RemoteError, RemoteResult, RemoteSource};
use log::{info, warn};

/// Permission to run one fetch; hand it back to `complete_fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    count: usize,
}

impl FetchTicket {
    /// Number of posts to request.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCompletion {
    Appended(usize),
    Failed(RemoteError),
    /// The feed was reset while the fetch was in flight; result dropped.
    Stale,
}

pub struct FeedSequencer {
    buffer: Vec<Post>,
    current_index: usize,
    is_fetching: bool,
    batch_size: usize,
    threshold_percent: usize,
    generation: u64,
}

impl FeedSequencer {
    pub fn new(batch_size: usize, threshold_percent: u8) -> Self {
        Self {
            buffer: Vec::new(),
            current_index: 0,
            is_fetching: false,
            batch_size: batch_size.max(1),
            threshold_percent: usize::from(threshold_percent.clamp(1, 100)),
            generation: 0,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.random_batch_size, config.prefetch_threshold_percent)
    }

    pub fn posts(&self) -> &[Post] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_post(&self) -> Option<&Post> {
        self.buffer.get(self.current_index)
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Index at which the next batch is requested: `floor(len * percent / 100)`.
    pub fn prefetch_threshold(&self) -> usize {
        self.buffer.len() * self.threshold_percent / 100
    }

    /// Starts the first fetch of an empty feed.
    pub fn request_initial_load(&mut self) -> Option<FetchTicket> {
        if self.buffer.is_empty() && !self.is_fetching {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Moves the view to `index` and returns a ticket when a prefetch is due.
    ///
    /// `index` is capped at the last buffered post. Only forward moves can
    /// trigger a fetch.
    pub fn advance_to(&mut self, index: usize) -> Option<FetchTicket> {
        let capped = index.min(self.buffer.len().saturating_sub(1));
        let advanced = capped > self.current_index;
        self.current_index = capped;

        if advanced && !self.is_fetching && capped >= self.prefetch_threshold() {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Applies the result of the fetch identified by `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: RemoteResult<Vec<Post>>,
    ) -> FetchCompletion {
        if ticket.generation != self.generation {
            info!(
                "event=explore_fetch module=explore status=stale ticket_generation={} generation={}",
                ticket.generation, self.generation
            );
            return FetchCompletion::Stale;
        }

        self.is_fetching = false;
        match result {
            Ok(posts) => {
                let appended = posts.len();
                self.buffer.extend(posts);
                info!(
                    "event=explore_fetch module=explore status=ok appended={} buffered={}",
                    appended,
                    self.buffer.len()
                );
                FetchCompletion::Appended(appended)
            }
            Err(err) => {
                warn!(
                    "event=explore_fetch module=explore status=error error_code={} buffered={}",
                    err.code(),
                    self.buffer.len()
                );
                FetchCompletion::Failed(err)
            }
        }
    }

    /// Loads the first batch synchronously if the feed is empty.
    pub fn load_initial<R: RemoteSource + ?Sized>(&mut self, remote: &R) -> RemoteResult<usize> {
        match self.request_initial_load() {
            Some(ticket) => self.run(remote, ticket),
            None => Ok(0),
        }
    }

    /// Moves to `index` and runs a due prefetch synchronously.
    ///
    /// Returns the number of posts appended.
    pub fn advance<R: RemoteSource + ?Sized>(
        &mut self,
        remote: &R,
        index: usize,
    ) -> RemoteResult<usize> {
        match self.advance_to(index) {
            Some(ticket) => self.run(remote, ticket),
            None => Ok(0),
        }
    }

    /// Starts a new session: empties the buffer and orphans in-flight fetches.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.current_index = 0;
        self.is_fetching = false;
        self.generation += 1;
    }

    /// Overwrites counts of a buffered post with a server tally.
    pub fn apply_tally(&mut self, post_id: &str, tally: ReactionTally) -> bool {
        let mut found = false;
        for post in self.buffer.iter_mut().filter(|post| post.id == post_id) {
            post.apply_tally(tally);
            found = true;
        }
        found
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.is_fetching = true;
        FetchTicket {
            generation: self.generation,
            count: self.batch_size,
        }
    }

    fn run<R: RemoteSource + ?Sized>(
        &mut self,
        remote: &R,
        ticket: FetchTicket,
    ) -> RemoteResult<usize> {
        let result = remote.fetch_random_posts(ticket.count());
        match self.complete_fetch(ticket, result) {
            FetchCompletion::Appended(count) => Ok(count),
            FetchCompletion::Failed(err) => Err(err),
            FetchCompletion::Stale => Ok(0),
        }
    }
}
