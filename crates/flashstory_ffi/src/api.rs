//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reader use cases (engagement, library, catalog, explore) to Dart
//!   via FRB.
//! - Keep error semantics simple: every call returns an envelope with `ok`
//!   and a diagnostic `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Local-only calls are `sync`; calls that reach the content API are not.
//! - Process-wide state (catalog, explore feed) is never locked while a
//!   network request is in flight.
//! - Engagement writes are serialized in-process; each call re-reads the
//!   tables it touches before writing them.

use flashstory_core::db::open_db;
use flashstory_core::{
    core_version as core_version_inner, execute_reaction_plan,
    fetch_saved_posts, init_logging as init_logging_inner, ping as ping_inner, Catalog,
    Collection, CollectionReader, CoreConfig, EngagementError, EngagementService, FeedSequencer,
    FetchCompletion, HttpRemoteSource, LoadOutcome, PositionTracker, Post, ReactionKind,
    ReactionTally, RemoteSource, SqlitePreferenceStore, Topic,
};
use log::warn;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const DB_FILE_NAME: &str = "flashstory_prefs.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static REMOTE: OnceLock<HttpRemoteSource> = OnceLock::new();
static CATALOG: OnceLock<Mutex<Catalog>> = OnceLock::new();
static EXPLORE: OnceLock<Mutex<FeedSequencer>> = OnceLock::new();
static ENGAGEMENT_WRITE: Mutex<()> = Mutex::new(());
static REACTIONS_IN_FLIGHT: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Reaction counts of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TallyItem {
    pub like: u32,
    pub mind_blowing: u32,
    pub already_knew: u32,
    pub hard_to_believe: u32,
    pub interesting: u32,
}

/// Post projection with the reader's engagement flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostItem {
    pub post_id: String,
    /// Pages in display order.
    pub pages: Vec<String>,
    pub collection_id: String,
    pub collection_name: String,
    pub tally: TallyItem,
    pub is_saved: bool,
    pub is_collection_favorite: bool,
    /// Reaction kind name (`like|mindBlowing|alreadyKnew|hardToBelieve|interesting`).
    pub my_reaction: Option<String>,
    /// A reaction change for this post is awaiting the server.
    pub reaction_pending: bool,
}

/// A reaction button: wire name and glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionKindItem {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionItem {
    pub collection_id: String,
    pub name: String,
    pub avatar_url: String,
    pub post_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicItem {
    pub topic_id: String,
    pub name: String,
    /// Only collections present in the catalog, in topic order.
    pub collections: Vec<CollectionItem>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Boolean query or toggle result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagResponse {
    pub ok: bool,
    /// Current flag value; `false` when `ok` is false.
    pub value: bool,
    pub message: String,
}

impl FlagResponse {
    fn from_result<E: std::fmt::Display>(operation: &str, result: Result<bool, E>) -> Self {
        match result {
            Ok(value) => Self {
                ok: true,
                value,
                message: String::new(),
            },
            Err(err) => Self {
                ok: false,
                value: false,
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Bulk removal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResponse {
    pub ok: bool,
    pub count: u32,
    pub message: String,
}

impl CountResponse {
    fn from_result<E: std::fmt::Display>(operation: &str, result: Result<usize, E>) -> Self {
        match result {
            Ok(count) => Self {
                ok: true,
                count: to_u32(count),
                message: format!("Removed {count} item(s)."),
            },
            Err(err) => Self {
                ok: false,
                count: 0,
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteItem {
    pub collection_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteListResponse {
    pub ok: bool,
    pub items: Vec<FavoriteItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionResponse {
    pub ok: bool,
    /// Confirmed reaction after the call.
    pub reaction: Option<String>,
    /// Server tally; present only after a reaction change.
    pub tally: Option<TallyItem>,
    /// The old reaction could not be retracted; remote counts may be off by one.
    pub retraction_failed: bool,
    /// Another reaction change for the post is still in flight.
    pub reaction_pending: bool,
    pub message: String,
}

impl ReactionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            reaction: None,
            tally: None,
            retraction_failed: false,
            reaction_pending: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressResponse {
    pub ok: bool,
    /// 1-based index of the visible post; 0 for an empty collection.
    pub current: u32,
    pub total: u32,
    pub is_finished: bool,
    pub is_in_progress: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    pub collection: CollectionItem,
    pub current: u32,
    pub total: u32,
    pub is_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryResponse {
    pub ok: bool,
    pub items: Vec<LibraryItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogResponse {
    pub ok: bool,
    /// Whether this call fetched from the API.
    pub refreshed: bool,
    pub collections: Vec<CollectionItem>,
    pub topics: Vec<TopicItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionListResponse {
    pub items: Vec<CollectionItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListResponse {
    pub ok: bool,
    pub items: Vec<PostItem>,
    /// Index the reader should show.
    pub current_index: u32,
    /// Saved ids the API no longer returns (saved posts only).
    pub missing: Vec<String>,
    pub message: String,
}

impl PostListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            current_index: 0,
            missing: Vec::new(),
            message: message.into(),
        }
    }
}

/// Whether a post is saved.
#[flutter_rust_bridge::frb(sync)]
pub fn is_saved(post_id: String) -> FlagResponse {
    let result = with_engagement(|service| Ok(service.is_saved(post_id.trim())));
    FlagResponse::from_result("is_saved", result)
}

/// Flips the saved flag of a post; `value` is the new flag.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_saved(post_id: String) -> FlagResponse {
    let result = with_engagement(|service| service.toggle_saved(post_id.trim()));
    FlagResponse::from_result("toggle_saved", result)
}

/// Unsaves a set of posts.
#[flutter_rust_bridge::frb(sync)]
pub fn unsave_posts(post_ids: Vec<String>) -> CountResponse {
    let result = with_engagement(|service| service.unsave_posts(&post_ids));
    CountResponse::from_result("unsave_posts", result)
}

/// Whether a collection is a favorite.
#[flutter_rust_bridge::frb(sync)]
pub fn is_favorite(collection_id: String) -> FlagResponse {
    let result = with_engagement(|service| Ok(service.is_favorite(collection_id.trim())));
    FlagResponse::from_result("is_favorite", result)
}

/// Flips the favorite flag of a collection; `value` is the new flag.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_favorite(collection_id: String, collection_name: String) -> FlagResponse {
    let result = with_engagement(|service| {
        service.toggle_favorite(collection_id.trim(), collection_name.trim())
    });
    FlagResponse::from_result("toggle_favorite", result)
}

/// Favorite collections as stored locally, ordered by id.
#[flutter_rust_bridge::frb(sync)]
pub fn list_favorites() -> FavoriteListResponse {
    match with_engagement(|service| Ok(service.favorite_collections())) {
        Ok(favorites) => FavoriteListResponse {
            ok: true,
            items: favorites
                .into_iter()
                .map(|(collection_id, name)| FavoriteItem {
                    collection_id,
                    name,
                })
                .collect(),
            message: String::new(),
        },
        Err(err) => FavoriteListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("list_favorites failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn remove_favorites(collection_ids: Vec<String>) -> CountResponse {
    let result = with_engagement(|service| service.remove_favorites(&collection_ids));
    CountResponse::from_result("remove_favorites", result)
}

/// Reaction buttons in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn reaction_kinds() -> Vec<ReactionKindItem> {
    ReactionKind::ALL
        .iter()
        .map(|kind| ReactionKindItem {
            name: kind.as_str().to_string(),
            emoji: kind.emoji().to_string(),
        })
        .collect()
}

/// The reader's confirmed reaction on a post.
///
/// While a change is in flight the confirmed (pre-tap) reaction is returned
/// with `reaction_pending` set.
#[flutter_rust_bridge::frb(sync)]
pub fn my_reaction(post_id: String) -> ReactionResponse {
    let post_id = post_id.trim();
    let pending = lock(reactions_in_flight()).contains(post_id);
    match with_engagement(|service| Ok(service.my_reaction(post_id))) {
        Ok(reaction) => ReactionResponse {
            ok: true,
            reaction: reaction.map(|kind| kind.as_str().to_string()),
            tally: None,
            retraction_failed: false,
            reaction_pending: pending,
            message: String::new(),
        },
        Err(err) => ReactionResponse::failure(format!("my_reaction failed: {err}")),
    }
}

/// Applies a reaction tap and returns the server tally.
///
/// # FFI contract
/// - Blocking network call; runs off the UI thread.
/// - A second tap on the same post while one is in flight is rejected.
/// - The explore feed, if it holds the post, picks up the new tally.
pub fn set_reaction(post_id: String, reaction: String) -> ReactionResponse {
    let post_id = post_id.trim().to_string();
    let kind = match reaction.trim().parse::<ReactionKind>() {
        Ok(kind) => kind,
        Err(err) => return ReactionResponse::failure(format!("set_reaction failed: {err}")),
    };

    let Some(_in_flight) = InFlightReaction::claim(&post_id) else {
        return ReactionResponse::failure(format!(
            "set_reaction failed: {}",
            EngagementError::ReactionInFlight(post_id)
        ));
    };

    let plan = match with_engagement(|service| service.begin_reaction(&post_id, kind)) {
        Ok(plan) => plan,
        Err(err) => return ReactionResponse::failure(format!("set_reaction failed: {err}")),
    };
    let result = execute_reaction_plan(remote(), &plan);
    let outcome = match with_engagement(|service| service.complete_reaction(&plan, result)) {
        Ok(outcome) => outcome,
        Err(err) => return ReactionResponse::failure(format!("set_reaction failed: {err}")),
    };

    lock(explore()).apply_tally(&outcome.post_id, outcome.tally);
    ReactionResponse {
        ok: true,
        reaction: outcome.reaction.map(|kind| kind.as_str().to_string()),
        tally: Some(to_tally_item(outcome.tally)),
        retraction_failed: outcome.retraction_failed,
        reaction_pending: false,
        message: if outcome.retraction_failed {
            "Reaction updated; previous reaction may still be counted.".to_string()
        } else {
            "Reaction updated.".to_string()
        },
    }
}

/// Persists the visible post index of a collection.
#[flutter_rust_bridge::frb(sync)]
pub fn record_position(collection_id: String, index: u32) -> ActionResponse {
    let result = with_tracker(|tracker| {
        tracker.record_position(collection_id.trim(), index as usize)
    });
    match result {
        Ok(()) => ActionResponse::success("Position recorded."),
        Err(err) => ActionResponse::failure(format!("record_position failed: {err}")),
    }
}

/// Progress through a collection of `total_posts` posts.
#[flutter_rust_bridge::frb(sync)]
pub fn collection_progress(collection_id: String, total_posts: u32) -> ProgressResponse {
    match with_tracker(|tracker| Ok(tracker.progress(collection_id.trim(), total_posts as usize)))
    {
        Ok(progress) => ProgressResponse {
            ok: true,
            current: to_u32(progress.current),
            total: to_u32(progress.total),
            is_finished: progress.is_finished(),
            is_in_progress: progress.is_in_progress(),
            message: String::new(),
        },
        Err(err) => ProgressResponse {
            ok: false,
            current: 0,
            total: total_posts,
            is_finished: false,
            is_in_progress: false,
            message: format!("collection_progress failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn restart_collection(collection_id: String) -> ActionResponse {
    match with_tracker(|tracker| tracker.restart(collection_id.trim())) {
        Ok(()) => ActionResponse::success("Collection restarted."),
        Err(err) => ActionResponse::failure(format!("restart_collection failed: {err}")),
    }
}

/// Forgets the reading position; `value` tells whether one was recorded.
#[flutter_rust_bridge::frb(sync)]
pub fn remove_from_library(collection_id: String) -> FlagResponse {
    let result = with_tracker(|tracker| tracker.remove_from_library(collection_id.trim()));
    FlagResponse::from_result("remove_from_library", result)
}

/// Started collections among the cached catalog.
#[flutter_rust_bridge::frb(sync)]
pub fn library() -> LibraryResponse {
    let collections = lock(catalog()).collections().to_vec();
    match with_tracker(|tracker| Ok(tracker.library(&collections))) {
        Ok(shelf) => LibraryResponse {
            ok: true,
            items: shelf
                .entries()
                .iter()
                .map(|entry| LibraryItem {
                    collection: to_collection_item(&entry.collection),
                    current: to_u32(entry.progress.current),
                    total: to_u32(entry.progress.total),
                    is_finished: entry.progress.is_finished(),
                })
                .collect(),
            message: String::new(),
        },
        Err(err) => LibraryResponse {
            ok: false,
            items: Vec::new(),
            message: format!("library failed: {err}"),
        },
    }
}

/// Loads collections and topics, from cache unless `force_refresh`.
///
/// # FFI contract
/// - Blocking network call on first load or when forced.
/// - On failure the previously cached catalog is returned with `ok=false`.
pub fn load_collections(force_refresh: bool) -> CatalogResponse {
    let cached = {
        let guard = lock(catalog());
        (guard.has_loaded_initial_data() && !force_refresh).then(|| guard.clone())
    };

    let (result, snapshot) = match cached {
        Some(snapshot) => (Ok(LoadOutcome::Cached), snapshot),
        None => {
            // Load into a scratch catalog so the shared one stays unlocked.
            let mut scratch = Catalog::new();
            let result = scratch.load(remote(), true);
            let mut guard = lock(catalog());
            if result.is_ok() {
                *guard = scratch;
            }
            (result, guard.clone())
        }
    };

    let collections = snapshot
        .collections()
        .iter()
        .map(to_collection_item)
        .collect();
    let topics = snapshot
        .topic_sections()
        .into_iter()
        .map(|section| to_topic_item(section.topic, &section.collections))
        .collect();

    match result {
        Ok(outcome) => CatalogResponse {
            ok: true,
            refreshed: matches!(outcome, LoadOutcome::Refreshed { .. }),
            collections,
            topics,
            message: String::new(),
        },
        Err(err) => CatalogResponse {
            ok: false,
            refreshed: false,
            collections,
            topics,
            message: format!("load_collections failed: {err}"),
        },
    }
}

/// Searches cached collections by name.
#[flutter_rust_bridge::frb(sync)]
pub fn search_collections(query: String) -> CollectionListResponse {
    let guard = lock(catalog());
    let items: Vec<CollectionItem> = guard
        .search(&query)
        .into_iter()
        .map(to_collection_item)
        .collect();
    let message = if items.is_empty() {
        "No results.".to_string()
    } else {
        format!("Found {} result(s).", items.len())
    };
    CollectionListResponse { items, message }
}

/// Fetches a collection's posts and the index to resume at.
///
/// # FFI contract
/// - Blocking network call; the preference database is not locked while
///   the posts are fetched.
pub fn open_collection(collection_id: String) -> PostListResponse {
    let collection_id = collection_id.trim().to_string();
    let posts = match remote().fetch_posts_by_collection(&collection_id) {
        Ok(posts) => posts,
        Err(err) => return PostListResponse::failure(format!("open_collection failed: {err}")),
    };
    let last_position = match with_tracker(|tracker| Ok(tracker.last_position(&collection_id))) {
        Ok(position) => position,
        Err(err) => return PostListResponse::failure(format!("open_collection failed: {err}")),
    };

    let mut reader = CollectionReader::new(collection_id.as_str());
    reader.install(posts, last_position);
    post_list(reader.posts(), reader.current_index(), Vec::new())
}

/// Moves the explore feed to `index`, fetching more posts when due.
///
/// An empty feed loads its first batch regardless of `index`.
///
/// # FFI contract
/// - Blocking network call when a fetch is due.
/// - Returns the whole buffer; appended posts never shift existing indices.
pub fn explore_advance(index: u32) -> PostListResponse {
    let ticket = {
        let mut feed = lock(explore());
        if feed.is_empty() {
            feed.request_initial_load()
        } else {
            feed.advance_to(index as usize)
        }
    };

    let mut message = String::new();
    if let Some(ticket) = ticket {
        let result = remote().fetch_random_posts(ticket.count());
        let completion = lock(explore()).complete_fetch(ticket, result);
        if let FetchCompletion::Failed(err) = completion {
            message = format!("explore fetch failed: {err}");
        }
    }

    let (posts, current_index) = {
        let feed = lock(explore());
        (feed.posts().to_vec(), feed.current_index())
    };
    let mut response = post_list(&posts, current_index, Vec::new());
    if !message.is_empty() {
        response.ok = false;
        response.message = message;
    }
    response
}

/// Starts a new explore session.
#[flutter_rust_bridge::frb(sync)]
pub fn explore_reset() -> ActionResponse {
    lock(explore()).reset();
    ActionResponse::success("Explore feed reset.")
}

/// Fetches every saved post, skipping ids the API no longer knows.
///
/// Saved ids are read under the write lock; the fetches run without it.
pub fn saved_posts() -> PostListResponse {
    let post_ids = match with_engagement(|service| Ok(service.saved_post_ids())) {
        Ok(ids) => ids,
        Err(err) => return PostListResponse::failure(format!("saved_posts failed: {err}")),
    };
    match fetch_saved_posts(remote(), &post_ids) {
        Ok(saved) => post_list(&saved.posts, 0, saved.missing),
        Err(err) => PostListResponse::failure(format!("saved_posts failed: {err}")),
    }
}

/// Releases a post claimed for a reaction change on drop.
struct InFlightReaction {
    post_id: String,
}

impl InFlightReaction {
    fn claim(post_id: &str) -> Option<Self> {
        let inserted = lock(reactions_in_flight()).insert(post_id.to_string());
        inserted.then(|| Self {
            post_id: post_id.to_string(),
        })
    }
}

impl Drop for InFlightReaction {
    fn drop(&mut self) {
        lock(reactions_in_flight()).remove(&self.post_id);
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("FLASHSTORY_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(|| {
        CoreConfig::from_env().unwrap_or_else(|err| {
            warn!("event=config_load module=ffi status=error error={err} fallback=defaults");
            CoreConfig::default()
        })
    })
}

fn remote() -> &'static HttpRemoteSource {
    REMOTE.get_or_init(|| HttpRemoteSource::new(config()))
}

fn catalog() -> &'static Mutex<Catalog> {
    CATALOG.get_or_init(|| Mutex::new(Catalog::new()))
}

fn explore() -> &'static Mutex<FeedSequencer> {
    EXPLORE.get_or_init(|| Mutex::new(FeedSequencer::from_config(config())))
}

fn reactions_in_flight() -> &'static Mutex<HashSet<String>> {
    REACTIONS_IN_FLIGHT.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Locks shared state; a panic in another call does not wedge the bridge.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_engagement<T>(
    f: impl FnOnce(
        &mut EngagementService<SqlitePreferenceStore<'_>>,
    ) -> Result<T, EngagementError>,
) -> Result<T, String> {
    let _write = lock(&ENGAGEMENT_WRITE);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("preference DB open failed: {err}"))?;
    let mut service = EngagementService::new(SqlitePreferenceStore::new(&conn))
        .map_err(|err| format!("engagement load failed: {err}"))?;
    f(&mut service).map_err(|err| err.to_string())
}

fn with_tracker<T>(
    f: impl FnOnce(
        &mut PositionTracker<SqlitePreferenceStore<'_>>,
    ) -> flashstory_core::StoreResult<T>,
) -> Result<T, String> {
    let _write = lock(&ENGAGEMENT_WRITE);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("preference DB open failed: {err}"))?;
    let mut tracker = PositionTracker::new(SqlitePreferenceStore::new(&conn))
        .map_err(|err| format!("position load failed: {err}"))?;
    f(&mut tracker).map_err(|err| err.to_string())
}

fn post_list(posts: &[Post], current_index: usize, missing: Vec<String>) -> PostListResponse {
    let pending = lock(reactions_in_flight()).clone();
    let annotated = with_engagement(|service| {
        Ok(posts
            .iter()
            .map(|post| {
                let flags = service.engagement_for(post);
                PostItem {
                    post_id: post.id.clone(),
                    pages: post.content.clone(),
                    collection_id: post.collection_id.clone(),
                    collection_name: post.collection_name.clone(),
                    tally: to_tally_item(post.reaction_counts),
                    is_saved: flags.is_saved,
                    is_collection_favorite: flags.is_collection_favorite,
                    my_reaction: flags.my_reaction.map(|kind| kind.as_str().to_string()),
                    reaction_pending: pending.contains(&post.id),
                }
            })
            .collect::<Vec<_>>())
    });

    match annotated {
        Ok(items) => {
            let message = format!("Loaded {} post(s).", items.len());
            PostListResponse {
                ok: true,
                items,
                current_index: to_u32(current_index),
                missing,
                message,
            }
        }
        Err(err) => PostListResponse::failure(format!("engagement lookup failed: {err}")),
    }
}

fn to_collection_item(collection: &Collection) -> CollectionItem {
    CollectionItem {
        collection_id: collection.id.clone(),
        name: collection.name.clone(),
        avatar_url: collection.avatar_url.clone(),
        post_count: to_u32(collection.post_count()),
    }
}

fn to_topic_item(topic: &Topic, collections: &[&Collection]) -> TopicItem {
    TopicItem {
        topic_id: topic.id.clone(),
        name: topic.name.clone(),
        collections: collections
            .iter()
            .map(|collection| to_collection_item(collection))
            .collect(),
    }
}

fn to_tally_item(tally: ReactionTally) -> TallyItem {
    TallyItem {
        like: tally.like,
        mind_blowing: tally.mind_blowing,
        already_knew: tally.already_knew,
        hard_to_believe: tally.hard_to_believe,
        interesting: tally.interesting,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
