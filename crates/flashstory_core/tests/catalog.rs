mod common;

use common::{collection, post, topic, Call, FakeRemote};
use flashstory_core::{
    fetch_saved_posts, load_saved_posts, Catalog, EngagementService, LoadOutcome,
    MemoryPreferenceStore, RemoteError, HOT_TOPIC_LIMIT,
};

fn remote_with_catalog() -> FakeRemote {
    let mut remote = FakeRemote::new();
    remote.collections = vec![
        collection("ocean", "Ocean Life", 4),
        collection("space", "Space Exploration", 6),
        collection("myth", "Ancient Myths", 3),
        collection("scifi", "Sci-Fi Stories", 5),
        collection("tech", "Technology Breakthroughs", 2),
        collection("art", "Art History", 7),
    ];
    remote.topics = vec![
        topic("nature", "Nature", &["ocean", "space", "gone"]),
        topic("history", "Historical Events", &["myth", "art"]),
    ];
    remote
}

#[test]
fn load_fetches_once_until_forced() {
    let remote = remote_with_catalog();
    let mut catalog = Catalog::new();
    assert!(!catalog.has_loaded_initial_data());

    assert_eq!(
        catalog.load(&remote, false).unwrap(),
        LoadOutcome::Refreshed {
            collections: 6,
            topics: 2
        }
    );
    assert!(catalog.has_loaded_initial_data());
    assert_eq!(catalog.load(&remote, false).unwrap(), LoadOutcome::Cached);
    assert_eq!(remote.calls(), vec![Call::Collections, Call::Topics]);

    catalog.load(&remote, true).unwrap();
    assert_eq!(remote.calls().len(), 4);
}

#[test]
fn failed_refresh_keeps_cached_data() {
    let mut remote = remote_with_catalog();
    let mut catalog = Catalog::new();
    catalog.load(&remote, false).unwrap();

    remote.fail_topics = true;
    remote.collections.clear();
    let err = catalog.load(&remote, true).unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
    assert_eq!(catalog.collections().len(), 6);
    assert!(catalog.has_loaded_initial_data());
}

#[test]
fn failed_first_load_leaves_catalog_unloaded() {
    let mut remote = remote_with_catalog();
    remote.fail_collections = true;
    let mut catalog = Catalog::new();

    catalog.load(&remote, false).unwrap_err();
    assert!(!catalog.has_loaded_initial_data());
    assert!(catalog.collections().is_empty());
}

#[test]
fn hot_search_and_lookup() {
    let remote = remote_with_catalog();
    let mut catalog = Catalog::new();
    catalog.load(&remote, false).unwrap();

    assert_eq!(catalog.hot(HOT_TOPIC_LIMIT).len(), 5);
    assert_eq!(catalog.hot(100).len(), 6);

    let names: Vec<&str> = catalog
        .search("  sci-FI ")
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Sci-Fi Stories"]);
    assert_eq!(catalog.search("").len(), 6);
    assert!(catalog.search("cooking").is_empty());

    assert_eq!(
        catalog.collection("art").map(|c| c.name.as_str()),
        Some("Art History")
    );
    assert!(catalog.collection("gone").is_none());
}

#[test]
fn topic_sections_skip_unknown_collections() {
    let remote = remote_with_catalog();
    let mut catalog = Catalog::new();
    catalog.load(&remote, false).unwrap();

    let sections = catalog.topic_sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].topic.name, "Nature");
    let ids: Vec<&str> = sections[0]
        .collections
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, vec!["ocean", "space"]);
}

#[test]
fn favorites_come_from_engagement_state() {
    let remote = remote_with_catalog();
    let mut catalog = Catalog::new();
    catalog.load(&remote, false).unwrap();
    let store = MemoryPreferenceStore::new();
    let mut engagement = EngagementService::new(&store).unwrap();
    engagement.toggle_favorite("myth", "Ancient Myths").unwrap();
    engagement.toggle_favorite("removed", "Old Collection").unwrap();

    let favorites = catalog.favorites(&engagement);
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "myth");
}

#[test]
fn saved_posts_tolerate_stale_ids() {
    let remote = FakeRemote::with_posts(vec![post("p1", "c1"), post("p3", "c2")]);
    let store = MemoryPreferenceStore::new();
    let mut engagement = EngagementService::new(&store).unwrap();
    for id in ["p1", "p2", "p3"] {
        engagement.toggle_saved(id).unwrap();
    }

    let mut saved = load_saved_posts(&remote, &engagement).unwrap();
    let ids: Vec<&str> = saved.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3"]);
    assert_eq!(saved.missing, vec!["p2".to_string()]);

    assert!(saved.remove("p1"));
    assert_eq!(saved.posts.len(), 1);
}

#[test]
fn saved_posts_abort_on_transport_errors() {
    let mut remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    remote.fail_post_ids = vec!["p1".to_string()];
    let store = MemoryPreferenceStore::new();
    let mut engagement = EngagementService::new(&store).unwrap();
    engagement.toggle_saved("p1").unwrap();

    let err = load_saved_posts(&remote, &engagement).unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
}

#[test]
fn saved_posts_fetch_from_an_id_snapshot() {
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    let ids = vec!["p1".to_string(), "gone".to_string()];

    let saved = fetch_saved_posts(&remote, &ids).unwrap();
    assert_eq!(saved.posts.len(), 1);
    assert_eq!(saved.missing, vec!["gone".to_string()]);
    assert_eq!(
        remote.calls(),
        vec![Call::Post("p1".to_string()), Call::Post("gone".to_string())]
    );
}
