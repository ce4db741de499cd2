#![allow(dead_code)]

use flashstory_core::{
    Collection, Post, ReactionDelta, ReactionKind, ReactionTally, RemoteError, RemoteResult,
    RemoteSource, Topic,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Collections,
    Topics,
    PostsByCollection(String),
    Post(String),
    Random(usize),
    React(String, ReactionKind, i32),
}

/// Scripted in-memory content API that records every call.
#[derive(Default)]
pub struct FakeRemote {
    pub calls: RefCell<Vec<Call>>,
    pub collections: Vec<Collection>,
    pub topics: Vec<Topic>,
    pub posts: HashMap<String, Post>,
    pub tallies: RefCell<HashMap<String, ReactionTally>>,
    pub random_batches: RefCell<VecDeque<RemoteResult<Vec<Post>>>>,
    pub failing_reacts: RefCell<Vec<(ReactionKind, ReactionDelta)>>,
    pub fail_collections: bool,
    pub fail_topics: bool,
    pub fail_post_ids: Vec<String>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        let mut remote = Self::new();
        for post in posts {
            remote
                .tallies
                .borrow_mut()
                .insert(post.id.clone(), post.reaction_counts);
            remote.posts.insert(post.id.clone(), post);
        }
        remote
    }

    pub fn fail_react(&self, kind: ReactionKind, delta: ReactionDelta) {
        self.failing_reacts.borrow_mut().push((kind, delta));
    }

    pub fn push_random(&self, result: RemoteResult<Vec<Post>>) {
        self.random_batches.borrow_mut().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn react_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::React(..)))
            .collect()
    }

    pub fn server_tally(&self, post_id: &str) -> ReactionTally {
        self.tallies
            .borrow()
            .get(post_id)
            .copied()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl RemoteSource for FakeRemote {
    fn fetch_collections(&self) -> RemoteResult<Vec<Collection>> {
        self.record(Call::Collections);
        if self.fail_collections {
            return Err(RemoteError::Transport("offline".to_string()));
        }
        Ok(self.collections.clone())
    }

    fn fetch_topics(&self) -> RemoteResult<Vec<Topic>> {
        self.record(Call::Topics);
        if self.fail_topics {
            return Err(RemoteError::Decode("bad topics".to_string()));
        }
        Ok(self.topics.clone())
    }

    fn fetch_posts_by_collection(&self, collection_id: &str) -> RemoteResult<Vec<Post>> {
        self.record(Call::PostsByCollection(collection_id.to_string()));
        if self.fail_collections {
            return Err(RemoteError::Transport("offline".to_string()));
        }
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|post| post.collection_id == collection_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(posts)
    }

    fn fetch_post(&self, post_id: &str) -> RemoteResult<Post> {
        self.record(Call::Post(post_id.to_string()));
        if self.fail_post_ids.iter().any(|id| id == post_id) {
            return Err(RemoteError::Transport("offline".to_string()));
        }
        self.posts
            .get(post_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("post {post_id}")))
    }

    fn fetch_random_posts(&self, count: usize) -> RemoteResult<Vec<Post>> {
        self.record(Call::Random(count));
        self.random_batches
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn react(
        &self,
        post_id: &str,
        kind: ReactionKind,
        delta: ReactionDelta,
    ) -> RemoteResult<ReactionTally> {
        self.record(Call::React(post_id.to_string(), kind, delta.amount()));
        if self.failing_reacts.borrow().contains(&(kind, delta)) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }

        let mut tallies = self.tallies.borrow_mut();
        let tally = tallies.entry(post_id.to_string()).or_default();
        let count = match kind {
            ReactionKind::Like => &mut tally.like,
            ReactionKind::MindBlowing => &mut tally.mind_blowing,
            ReactionKind::AlreadyKnew => &mut tally.already_knew,
            ReactionKind::HardToBelieve => &mut tally.hard_to_believe,
            ReactionKind::Interesting => &mut tally.interesting,
        };
        *count = match delta {
            ReactionDelta::Increment => count.saturating_add(1),
            ReactionDelta::Decrement => count.saturating_sub(1),
        };
        Ok(*tally)
    }
}

pub fn post(id: &str, collection_id: &str) -> Post {
    Post {
        id: id.to_string(),
        content: vec![format!("{id} page 1"), format!("{id} page 2")],
        collection_id: collection_id.to_string(),
        collection_name: format!("{collection_id} name"),
        reaction_counts: ReactionTally::default(),
    }
}

pub fn posts(prefix: &str, count: usize) -> Vec<Post> {
    (0..count)
        .map(|index| post(&format!("{prefix}-{index:02}"), "random"))
        .collect()
}

pub fn collection(id: &str, name: &str, post_count: usize) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: format!("https://cdn.example.com/{id}.png"),
        post_ids: (0..post_count).map(|index| format!("{id}-p{index}")).collect(),
    }
}

pub fn topic(id: &str, name: &str, collection_ids: &[&str]) -> Topic {
    Topic {
        id: id.to_string(),
        name: name.to_string(),
        collection_ids: collection_ids.iter().map(|id| id.to_string()).collect(),
    }
}
