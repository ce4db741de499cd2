mod common;

use common::{post, Call, FakeRemote};
use flashstory_core::db::open_db_in_memory;
use flashstory_core::{
    execute_reaction_plan, EngagementError, EngagementService, MemoryPreferenceStore, PrefTable,
    PreferenceStore, ReactionDelta, ReactionKind, ReactionPhase, RemoteError,
    SqlitePreferenceStore, StoreError, StoreResult,
};
use flashstory_core::store::StoredPayload;

/// Store whose writes fail; reads delegate to an inner memory store.
struct ReadOnlyStore(MemoryPreferenceStore);

impl PreferenceStore for ReadOnlyStore {
    fn load_raw(&self, table: PrefTable) -> StoreResult<Option<StoredPayload>> {
        self.0.load_raw(table)
    }

    fn save_raw(&self, table: PrefTable, _payload: &StoredPayload) -> StoreResult<()> {
        Err(StoreError::InvalidData(table, "read-only".to_string()))
    }
}

fn service(store: &MemoryPreferenceStore) -> EngagementService<&MemoryPreferenceStore> {
    EngagementService::new(store).unwrap()
}

#[test]
fn toggle_saved_twice_restores_original_state() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);

    assert!(!engagement.is_saved("p1"));
    assert!(engagement.toggle_saved("p1").unwrap());
    assert!(engagement.is_saved("p1"));
    assert_eq!(store.raw_json(PrefTable::SavedPosts).as_deref(), Some(r#"["p1"]"#));

    assert!(!engagement.toggle_saved("p1").unwrap());
    assert!(!engagement.is_saved("p1"));
    assert_eq!(store.raw_json(PrefTable::SavedPosts).as_deref(), Some("[]"));
}

#[test]
fn toggle_saved_is_visible_to_a_fresh_service_on_the_same_store() {
    let store = MemoryPreferenceStore::new();
    service(&store).toggle_saved("p7").unwrap();

    let reopened = service(&store);
    assert!(reopened.is_saved("p7"));
    assert_eq!(reopened.saved_post_ids(), vec!["p7".to_string()]);
}

#[test]
fn toggle_favorite_twice_restores_original_state() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);

    assert!(engagement.toggle_favorite("sci-1", "Space Oddities").unwrap());
    assert!(engagement.is_favorite("sci-1"));
    assert_eq!(
        engagement.favorite_collections(),
        vec![("sci-1".to_string(), "Space Oddities".to_string())]
    );

    assert!(!engagement.toggle_favorite("sci-1", "Space Oddities").unwrap());
    assert!(!engagement.is_favorite("sci-1"));
    assert!(engagement.favorite_collections().is_empty());
}

#[test]
fn toggle_favorite_for_post_uses_its_collection() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let current = post("p1", "hist-2");

    assert!(engagement.toggle_favorite_for(&current).unwrap());
    assert!(engagement.is_favorite("hist-2"));
    assert_eq!(
        engagement.favorite_collections()[0].1,
        current.collection_name
    );
}

#[test]
fn bulk_removals_only_count_present_entries() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    engagement.toggle_saved("a").unwrap();
    engagement.toggle_saved("b").unwrap();
    engagement.toggle_favorite("c1", "One").unwrap();

    let removed = engagement
        .unsave_posts(&["a".to_string(), "zzz".to_string()])
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(engagement.saved_post_ids(), vec!["b".to_string()]);

    let removed = engagement
        .remove_favorites(&["c1".to_string(), "c2".to_string()])
        .unwrap();
    assert_eq!(removed, 1);
    assert!(service(&store).favorite_collections().is_empty());
}

#[test]
fn failed_write_rolls_back_in_memory_state() {
    let inner = MemoryPreferenceStore::new();
    service(&inner).toggle_saved("kept").unwrap();

    let mut engagement = EngagementService::new(ReadOnlyStore(inner)).unwrap();
    let err = engagement.toggle_saved("new").unwrap_err();
    assert!(matches!(err, EngagementError::Store(_)));
    assert!(!engagement.is_saved("new"));

    engagement.toggle_saved("kept").unwrap_err();
    assert!(engagement.is_saved("kept"));

    engagement.toggle_favorite("c", "C").unwrap_err();
    assert!(!engagement.is_favorite("c"));
}

#[test]
fn first_reaction_increments_and_records_choice() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);

    let outcome = engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();

    assert_eq!(outcome.reaction, Some(ReactionKind::Like));
    assert_eq!(outcome.tally.like, 1);
    assert!(!outcome.retraction_failed);
    assert_eq!(engagement.my_reaction("p1"), Some(ReactionKind::Like));
    assert_eq!(
        remote.react_calls(),
        vec![Call::React("p1".to_string(), ReactionKind::Like, 1)]
    );
    assert_eq!(
        store.raw_json(PrefTable::UserReactions).as_deref(),
        Some(r#"{"p1":"like"}"#)
    );
}

#[test]
fn retapping_the_same_reaction_un_reacts_with_one_decrement() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();
    remote.calls.borrow_mut().clear();

    let outcome = engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();

    assert_eq!(outcome.reaction, None);
    assert_eq!(outcome.tally.like, 0);
    assert_eq!(engagement.my_reaction("p1"), None);
    assert_eq!(
        remote.react_calls(),
        vec![Call::React("p1".to_string(), ReactionKind::Like, -1)]
    );
}

#[test]
fn switching_reactions_retracts_then_adds() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();
    remote.calls.borrow_mut().clear();

    let outcome = engagement
        .set_reaction(&remote, "p1", ReactionKind::Interesting)
        .unwrap();

    assert_eq!(
        remote.react_calls(),
        vec![
            Call::React("p1".to_string(), ReactionKind::Like, -1),
            Call::React("p1".to_string(), ReactionKind::Interesting, 1),
        ]
    );
    assert_eq!(engagement.my_reaction("p1"), Some(ReactionKind::Interesting));
    assert_eq!(outcome.tally.like, 0);
    assert_eq!(outcome.tally.interesting, 1);
    assert_eq!(outcome.tally, remote.server_tally("p1"));
}

#[test]
fn failed_retraction_still_applies_the_new_reaction() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();
    remote.fail_react(ReactionKind::Like, ReactionDelta::Decrement);

    let outcome = engagement
        .set_reaction(&remote, "p1", ReactionKind::MindBlowing)
        .unwrap();

    assert!(outcome.retraction_failed);
    assert_eq!(engagement.my_reaction("p1"), Some(ReactionKind::MindBlowing));
    // The stale like stays on the server: the documented drift.
    assert_eq!(outcome.tally.like, 1);
    assert_eq!(outcome.tally.mind_blowing, 1);
}

#[test]
fn failed_increment_keeps_previous_reaction_and_surfaces_error() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    engagement
        .set_reaction(&remote, "p1", ReactionKind::Like)
        .unwrap();
    let persisted = store.raw_json(PrefTable::UserReactions);
    remote.fail_react(ReactionKind::AlreadyKnew, ReactionDelta::Increment);

    let err = engagement
        .set_reaction(&remote, "p1", ReactionKind::AlreadyKnew)
        .unwrap_err();

    assert!(matches!(err, EngagementError::Remote(RemoteError::Transport(_))));
    assert_eq!(engagement.my_reaction("p1"), Some(ReactionKind::Like));
    assert_eq!(
        engagement.reaction_phase("p1"),
        ReactionPhase::Confirmed(Some(ReactionKind::Like))
    );
    assert_eq!(store.raw_json(PrefTable::UserReactions), persisted);
}

#[test]
fn failed_un_react_keeps_reaction() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    engagement
        .set_reaction(&remote, "p1", ReactionKind::HardToBelieve)
        .unwrap();
    remote.fail_react(ReactionKind::HardToBelieve, ReactionDelta::Decrement);

    engagement
        .set_reaction(&remote, "p1", ReactionKind::HardToBelieve)
        .unwrap_err();
    assert_eq!(
        engagement.my_reaction("p1"),
        Some(ReactionKind::HardToBelieve)
    );
}

#[test]
fn pending_reaction_is_displayed_and_blocks_a_second_change() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);

    let plan = engagement
        .begin_reaction("p1", ReactionKind::Interesting)
        .unwrap();
    assert_eq!(
        engagement.reaction_phase("p1"),
        ReactionPhase::Pending {
            previous: None,
            target: Some(ReactionKind::Interesting)
        }
    );
    assert_eq!(
        engagement.displayed_reaction("p1"),
        Some(ReactionKind::Interesting)
    );
    assert_eq!(engagement.my_reaction("p1"), None);
    assert!(engagement.engagement_for(&post("p1", "c1")).reaction_pending);

    let err = engagement
        .begin_reaction("p1", ReactionKind::Like)
        .unwrap_err();
    assert!(matches!(err, EngagementError::ReactionInFlight(id) if id == "p1"));

    let receipt = execute_reaction_plan(&remote, &plan);
    engagement.complete_reaction(&plan, receipt).unwrap();
    assert_eq!(
        engagement.reaction_phase("p1"),
        ReactionPhase::Confirmed(Some(ReactionKind::Interesting))
    );
}

#[test]
fn any_tap_sequence_leaves_at_most_one_reaction() {
    let store = MemoryPreferenceStore::new();
    let mut engagement = service(&store);
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    let taps = [
        ReactionKind::Like,
        ReactionKind::Interesting,
        ReactionKind::Interesting,
        ReactionKind::MindBlowing,
        ReactionKind::AlreadyKnew,
        ReactionKind::AlreadyKnew,
        ReactionKind::Like,
    ];

    let mut expected = None;
    for tap in taps {
        engagement.set_reaction(&remote, "p1", tap).unwrap();
        expected = if expected == Some(tap) { None } else { Some(tap) };
        assert_eq!(engagement.my_reaction("p1"), expected);

        let tally = remote.server_tally("p1");
        assert_eq!(tally.total(), u64::from(expected.is_some()));
    }
}

#[test]
fn engagement_persists_through_sqlite_store() {
    let conn = open_db_in_memory().unwrap();
    let remote = FakeRemote::with_posts(vec![post("p1", "c1")]);
    {
        let mut engagement = EngagementService::new(SqlitePreferenceStore::new(&conn)).unwrap();
        engagement.toggle_saved("p1").unwrap();
        engagement.toggle_favorite("c1", "Science").unwrap();
        engagement
            .set_reaction(&remote, "p1", ReactionKind::Like)
            .unwrap();
    }

    let reopened = EngagementService::new(SqlitePreferenceStore::new(&conn)).unwrap();
    let flags = reopened.engagement_for(&post("p1", "c1"));
    assert!(flags.is_saved);
    assert!(flags.is_collection_favorite);
    assert_eq!(flags.my_reaction, Some(ReactionKind::Like));
    assert!(!flags.reaction_pending);
}
