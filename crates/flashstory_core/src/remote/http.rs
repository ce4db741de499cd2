//! Blocking HTTP implementation of `RemoteSource`.
//!
//! Every request emits `remote_request` start/ok/error events carrying the
//! endpoint and duration; response bodies are never logged.

use super::{validate_remote_id, RemoteError, RemoteResult, RemoteSource};
use crate::config::CoreConfig;
use crate::model::collection::{Collection, Topic};
use crate::model::post::Post;
use crate::model::reaction::{ReactionDelta, ReactionKind, ReactionTally};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

const USER_AGENT: &str = concat!("flashstory-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ReactBody<'a> {
    reaction: &'a str,
    amount: i32,
}

/// Not-found handling for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusPolicy {
    /// Any non-success status is an error with its code.
    Strict,
    /// Any non-success status means the resource does not exist.
    NotFoundOnFailure,
}

pub struct HttpRemoteSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpRemoteSource {
    pub fn new(config: &CoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: ureq::Request,
        policy: StatusPolicy,
    ) -> RemoteResult<T> {
        self.send(endpoint, policy, || request.call())
    }

    fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        policy: StatusPolicy,
        call: impl FnOnce() -> Result<ureq::Response, ureq::Error>,
    ) -> RemoteResult<T> {
        let started_at = Instant::now();
        info!("event=remote_request module=remote status=start endpoint={endpoint}");

        let result = call()
            .map_err(|err| classify_error(err, policy))
            .and_then(|response| {
                response
                    .into_json::<T>()
                    .map_err(|err| RemoteError::Decode(err.to_string()))
            });

        match &result {
            Ok(_) => info!(
                "event=remote_request module=remote status=ok endpoint={} duration_ms={}",
                endpoint,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=remote_request module=remote status=error endpoint={} duration_ms={} error_code={} error={}",
                endpoint,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }
}

impl RemoteSource for HttpRemoteSource {
    fn fetch_collections(&self) -> RemoteResult<Vec<Collection>> {
        let request = self.agent.get(&self.url("/collections"));
        self.get_json("collections", request, StatusPolicy::Strict)
    }

    fn fetch_topics(&self) -> RemoteResult<Vec<Topic>> {
        let request = self.agent.get(&self.url("/collections/topics"));
        self.get_json("topics", request, StatusPolicy::Strict)
    }

    fn fetch_posts_by_collection(&self, collection_id: &str) -> RemoteResult<Vec<Post>> {
        let collection_id = validate_remote_id(collection_id)?;
        let request = self
            .agent
            .get(&self.url(&format!("/posts/collection/{collection_id}")));
        self.get_json("posts_by_collection", request, StatusPolicy::Strict)
    }

    fn fetch_post(&self, post_id: &str) -> RemoteResult<Post> {
        let post_id = validate_remote_id(post_id)?;
        let request = self.agent.get(&self.url(&format!("/posts/{post_id}")));
        self.get_json("post", request, StatusPolicy::NotFoundOnFailure)
            .map_err(|err| match err {
                RemoteError::NotFound(_) => RemoteError::NotFound(format!("post {post_id}")),
                other => other,
            })
    }

    fn fetch_random_posts(&self, count: usize) -> RemoteResult<Vec<Post>> {
        let request = self
            .agent
            .get(&self.url("/posts/random"))
            .query("count", &count.to_string());
        self.get_json("random_posts", request, StatusPolicy::Strict)
    }

    fn react(
        &self,
        post_id: &str,
        kind: ReactionKind,
        delta: ReactionDelta,
    ) -> RemoteResult<ReactionTally> {
        let post_id = validate_remote_id(post_id)?;
        let request = self.agent.post(&self.url(&format!("/posts/{post_id}/react")));
        let body = ReactBody {
            reaction: kind.as_str(),
            amount: delta.amount(),
        };
        self.send("react", StatusPolicy::Strict, || request.send_json(&body))
    }
}

fn classify_error(err: ureq::Error, policy: StatusPolicy) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => match policy {
            StatusPolicy::NotFoundOnFailure => RemoteError::NotFound(response.get_url().to_string()),
            StatusPolicy::Strict if code == 404 => {
                RemoteError::NotFound(response.get_url().to_string())
            }
            StatusPolicy::Strict => RemoteError::Status {
                code,
                url: response.get_url().to_string(),
            },
        },
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}
