//! Store behaviour against an in-memory database.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use yv_models::{
    Clock, ManualClock, NewComment, NewVideo, Privacy, ProfileUpdate, ReactionStatus, ReactionTarget,
    VideoEdit, VideoId,
};
use yv_store::{
    InteractionRepo, ListingRepo, PlaylistRepo, SqliteStore, StoreError, UserRepo, VideoRepo,
};

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.unwrap()
}

async fn store_with_clock() -> (SqliteStore, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let store = SqliteStore::in_memory_with_clock(Arc::new(clock.clone()))
        .await
        .unwrap();
    (store, clock)
}

fn new_video(owner: &str, title: &str, privacy: Privacy) -> NewVideo {
    NewVideo {
        owner_id: owner.to_string(),
        title: title.to_string(),
        description: format!("about {title}"),
        video_url: format!("/media/videos/{title}.mp4"),
        thumbnail_url: String::new(),
        preview_url: String::new(),
        duration: "00:00:10".to_string(),
        privacy,
        ai_summary: String::new(),
    }
}

async fn seed_users(store: &SqliteStore, ids: &[&str]) {
    for id in ids {
        store.ensure_user(id, &format!("{id}_name")).await.unwrap();
    }
}

fn comment(video: VideoId, author: &str, parent: Option<i64>, text: &str) -> NewComment {
    NewComment {
        video_id: video,
        author_id: author.to_string(),
        parent_id: parent,
        content: text.to_string(),
    }
}

#[tokio::test]
async fn test_ensure_user_is_idempotent() {
    let store = store().await;
    let first = store.ensure_user("u1", "alice").await.unwrap();
    let second = store.ensure_user("u1", "ignored").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.username, "alice");
    assert!(!second.is_premium);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let store = store().await;
    store.ensure_user("u1", "alice").await.unwrap();
    let err = store.ensure_user("u2", "alice").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_profile_update_and_picture_swap() {
    let store = store().await;
    seed_users(&store, &["u1"]).await;

    let update = ProfileUpdate {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        bio: "engines".into(),
    };
    let user = store.update_profile("u1", &update).await.unwrap();
    assert_eq!(user.first_name, "Ada");

    assert_eq!(store.set_profile_picture("u1", "/p/1.png").await.unwrap(), None);
    assert_eq!(
        store.set_profile_picture("u1", "/p/2.png").await.unwrap(),
        Some("/p/1.png".to_string())
    );
    assert!(store
        .set_profile_picture("missing", "/p/3.png")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_set_premium_reports_missing_user() {
    let store = store().await;
    seed_users(&store, &["u1"]).await;
    assert!(store.set_premium("u1", true).await.unwrap());
    assert!(store.get_user("u1").await.unwrap().unwrap().is_premium);
    assert!(!store.set_premium("nobody", true).await.unwrap());
}

#[tokio::test]
async fn test_update_video_keeps_thumbnail_unless_given() {
    let store = store().await;
    seed_users(&store, &["u1"]).await;
    let mut input = new_video("u1", "first", Privacy::Public);
    input.thumbnail_url = "/media/thumbnails/a.jpg".into();
    let video = store.insert_video(&input).await.unwrap();

    let edit = VideoEdit {
        title: "renamed".into(),
        description: String::new(),
        privacy: Privacy::Unlisted,
    };
    let updated = store.update_video(video.id, &edit, None).await.unwrap();
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.privacy, Privacy::Unlisted);
    assert_eq!(updated.thumbnail_url, "/media/thumbnails/a.jpg");

    let updated = store
        .update_video(video.id, &edit, Some("/media/thumbnails/b.png"))
        .await
        .unwrap();
    assert_eq!(updated.thumbnail_url, "/media/thumbnails/b.png");
}

#[tokio::test]
async fn test_video_delete_requires_dependents_first() {
    let store = store().await;
    seed_users(&store, &["owner", "fan"]).await;
    let video = store
        .insert_video(&new_video("owner", "clip", Privacy::Public))
        .await
        .unwrap();

    let root = store
        .add_comment(&comment(video.id, "fan", None, "first"))
        .await
        .unwrap();
    let reply = store
        .add_comment(&comment(video.id, "owner", Some(root.id), "thanks"))
        .await
        .unwrap();
    store
        .add_comment(&comment(video.id, "fan", Some(reply.id), "np"))
        .await
        .unwrap();
    store
        .toggle_reaction("fan", ReactionTarget::Video(video.id), true)
        .await
        .unwrap();
    store
        .toggle_reaction("owner", ReactionTarget::Comment(root.id), true)
        .await
        .unwrap();
    store
        .record_watch("fan", video.id, Utc::now())
        .await
        .unwrap();
    let playlist = store.create_playlist("fan", "later", "").await.unwrap();
    store
        .toggle_playlist_video(playlist.id, video.id)
        .await
        .unwrap();

    let err = store.delete_video_row(video.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)), "got {err:?}");

    let deleted = store
        .delete_video_with_dependents(video.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.id, video.id);
    assert!(store.get_video(video.id).await.unwrap().is_none());
    assert!(store.list_comments(video.id).await.unwrap().is_empty());
    assert!(store.list_history("fan", None, 10).await.unwrap().is_empty());

    let playlists = store.list_playlists("fan", None).await.unwrap();
    assert_eq!(playlists[0].video_count, 0);

    assert!(store
        .delete_video_with_dependents(video.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_comment_thread_delete() {
    let store = store().await;
    seed_users(&store, &["a", "b"]).await;
    let video = store
        .insert_video(&new_video("a", "talk", Privacy::Public))
        .await
        .unwrap();

    let root = store
        .add_comment(&comment(video.id, "a", None, "root"))
        .await
        .unwrap();
    let child = store
        .add_comment(&comment(video.id, "b", Some(root.id), "child"))
        .await
        .unwrap();
    store
        .add_comment(&comment(video.id, "a", Some(child.id), "grandchild"))
        .await
        .unwrap();
    let other = store
        .add_comment(&comment(video.id, "b", None, "unrelated"))
        .await
        .unwrap();
    store
        .toggle_reaction("b", ReactionTarget::Comment(child.id), false)
        .await
        .unwrap();

    assert_eq!(store.delete_comment_with_dependents(root.id).await.unwrap(), 3);

    let remaining = store.list_comments(video.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].comment.id, other.id);

    assert!(store
        .delete_comment_with_dependents(root.id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_reply_parent_must_be_on_same_video() {
    let store = store().await;
    seed_users(&store, &["a"]).await;
    let v1 = store
        .insert_video(&new_video("a", "one", Privacy::Public))
        .await
        .unwrap();
    let v2 = store
        .insert_video(&new_video("a", "two", Privacy::Public))
        .await
        .unwrap();
    let root = store
        .add_comment(&comment(v1.id, "a", None, "root"))
        .await
        .unwrap();

    let err = store
        .add_comment(&comment(v2.id, "a", Some(root.id), "misplaced"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_watch_dedup_window() {
    let (store, clock) = store_with_clock().await;
    seed_users(&store, &["owner", "viewer"]).await;
    let video = store
        .insert_video(&new_video("owner", "clip", Privacy::Public))
        .await
        .unwrap();

    assert!(store.record_watch("viewer", video.id, clock.now()).await.unwrap());

    clock.advance(Duration::minutes(4));
    assert!(!store.record_watch("viewer", video.id, clock.now()).await.unwrap());
    assert_eq!(store.list_history("viewer", None, 10).await.unwrap().len(), 1);

    clock.advance(Duration::minutes(1));
    assert!(store.record_watch("viewer", video.id, clock.now()).await.unwrap());
    assert_eq!(store.list_history("viewer", None, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reaction_toggle_sequence() {
    let store = store().await;
    seed_users(&store, &["owner", "u1", "u2"]).await;
    let video = store
        .insert_video(&new_video("owner", "clip", Privacy::Public))
        .await
        .unwrap();
    let target = ReactionTarget::Video(video.id);

    let counts = store.toggle_reaction("u1", target, true).await.unwrap();
    assert_eq!((counts.likes, counts.dislikes), (1, 0));
    assert_eq!(counts.status, ReactionStatus::Like);

    // Switching sides flips the same row
    let counts = store.toggle_reaction("u1", target, false).await.unwrap();
    assert_eq!((counts.likes, counts.dislikes), (0, 1));
    assert_eq!(counts.status, ReactionStatus::Dislike);

    store.toggle_reaction("u2", target, true).await.unwrap();

    // Same side again removes it
    let counts = store.toggle_reaction("u1", target, false).await.unwrap();
    assert_eq!((counts.likes, counts.dislikes), (1, 0));
    assert_eq!(counts.status, ReactionStatus::None);

    let anonymous = store.reaction_counts(target, None).await.unwrap();
    assert_eq!(anonymous.likes, 1);
    assert_eq!(anonymous.status, ReactionStatus::None);
}

#[tokio::test]
async fn test_subscription_rules() {
    let store = store().await;
    seed_users(&store, &["creator", "f1", "f2"]).await;

    assert_eq!(store.toggle_subscription("f1", "creator").await.unwrap(), (true, 1));
    assert_eq!(store.toggle_subscription("f2", "creator").await.unwrap(), (true, 2));
    assert!(store.is_subscribed("f1", "creator").await.unwrap());
    assert_eq!(store.toggle_subscription("f1", "creator").await.unwrap(), (false, 1));
    assert!(!store.is_subscribed("f1", "creator").await.unwrap());

    let err = store.toggle_subscription("creator", "creator").await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)));
    assert_eq!(store.subscriber_count("creator").await.unwrap(), 1);
}

#[tokio::test]
async fn test_public_listing_keyset() {
    let store = store().await;
    seed_users(&store, &["a"]).await;
    let mut ids = Vec::new();
    for i in 0..5 {
        let v = store
            .insert_video(&new_video("a", &format!("v{i}"), Privacy::Public))
            .await
            .unwrap();
        ids.push(v.id);
    }
    store
        .insert_video(&new_video("a", "hidden", Privacy::Private))
        .await
        .unwrap();
    store
        .insert_video(&new_video("a", "link-only", Privacy::Unlisted))
        .await
        .unwrap();

    let first = store.list_public_videos(None, 3).await.unwrap();
    let first_ids: Vec<_> = first.iter().map(|c| c.id).collect();
    assert_eq!(first_ids, vec![ids[4], ids[3], ids[2]]);
    assert_eq!(first[0].owner_name, "a_name");

    let rest = store
        .list_public_videos(Some(ids[2].get()), 3)
        .await
        .unwrap();
    let rest_ids: Vec<_> = rest.iter().map(|c| c.id).collect();
    assert_eq!(rest_ids, vec![ids[1], ids[0]]);
}

#[tokio::test]
async fn test_owner_listing_respects_privacy_flag() {
    let store = store().await;
    seed_users(&store, &["a"]).await;
    store
        .insert_video(&new_video("a", "pub", Privacy::Public))
        .await
        .unwrap();
    store
        .insert_video(&new_video("a", "priv", Privacy::Private))
        .await
        .unwrap();

    assert_eq!(store.list_owner_videos("a", false, None, 10).await.unwrap().len(), 1);
    assert_eq!(store.list_owner_videos("a", true, None, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_hides_other_owners_private_videos() {
    let store = store().await;
    seed_users(&store, &["owner", "viewer"]).await;
    let video = store
        .insert_video(&new_video("owner", "clip", Privacy::Public))
        .await
        .unwrap();
    store.record_watch("viewer", video.id, Utc::now()).await.unwrap();
    store
        .toggle_reaction("viewer", ReactionTarget::Video(video.id), true)
        .await
        .unwrap();

    let edit = VideoEdit {
        title: "clip".into(),
        description: String::new(),
        privacy: Privacy::Private,
    };
    store.update_video(video.id, &edit, None).await.unwrap();

    assert!(store.list_history("viewer", None, 10).await.unwrap().is_empty());
    assert!(store.list_liked("viewer", None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_every_term() {
    let store = store().await;
    seed_users(&store, &["a"]).await;
    store
        .insert_video(&new_video("a", "Funny Cat", Privacy::Public))
        .await
        .unwrap();
    store
        .insert_video(&new_video("a", "Cat facts", Privacy::Public))
        .await
        .unwrap();
    store
        .insert_video(&new_video("a", "funny cat secret", Privacy::Private))
        .await
        .unwrap();
    store
        .insert_video(&new_video("a", "100% real", Privacy::Public))
        .await
        .unwrap();

    let terms = vec!["cat".to_string(), "FUNNY".to_string()];
    let hits = store.search_videos(&terms, None, 20).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Funny Cat");

    // Wildcards are literal
    let hits = store
        .search_videos(&["%".to_string()], None, 20)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "100% real");

    assert!(store.search_videos(&[], None, 20).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_users_by_username() {
    let store = store().await;
    store.ensure_user("1", "catlover").await.unwrap();
    store.ensure_user("2", "dogperson").await.unwrap();
    store.ensure_user("3", "lovely_cat").await.unwrap();

    let users = store
        .search_users(&["cat".to_string(), "LOVE".to_string()], 20)
        .await
        .unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["catlover", "lovely_cat"]);
}

#[tokio::test]
async fn test_trending_orders_by_comment_count() {
    let store = store().await;
    seed_users(&store, &["a"]).await;
    let quiet = store
        .insert_video(&new_video("a", "quiet", Privacy::Public))
        .await
        .unwrap();
    let busy = store
        .insert_video(&new_video("a", "busy", Privacy::Public))
        .await
        .unwrap();
    let newest_quiet = store
        .insert_video(&new_video("a", "newest", Privacy::Public))
        .await
        .unwrap();
    for i in 0..3 {
        store
            .add_comment(&comment(busy.id, "a", None, &format!("c{i}")))
            .await
            .unwrap();
    }
    store
        .add_comment(&comment(quiet.id, "a", None, "one"))
        .await
        .unwrap();

    let ids: Vec<_> = store
        .trending(10)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![busy.id, quiet.id, newest_quiet.id]);
}

#[tokio::test]
async fn test_subscribed_unwatched() {
    let store = store().await;
    seed_users(&store, &["creator", "stranger", "viewer"]).await;
    let watched = store
        .insert_video(&new_video("creator", "seen", Privacy::Public))
        .await
        .unwrap();
    let fresh = store
        .insert_video(&new_video("creator", "fresh", Privacy::Public))
        .await
        .unwrap();
    store
        .insert_video(&new_video("creator", "private", Privacy::Private))
        .await
        .unwrap();
    store
        .insert_video(&new_video("stranger", "other", Privacy::Public))
        .await
        .unwrap();

    store.toggle_subscription("viewer", "creator").await.unwrap();
    store.record_watch("viewer", watched.id, Utc::now()).await.unwrap();

    let ids: Vec<_> = store
        .subscribed_unwatched("viewer", 30)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![fresh.id]);
}

#[tokio::test]
async fn test_playlist_toggle_and_membership() {
    let store = store().await;
    seed_users(&store, &["owner", "other"]).await;
    let v1 = store
        .insert_video(&new_video("owner", "one", Privacy::Public))
        .await
        .unwrap();
    let v2 = store
        .insert_video(&new_video("other", "two", Privacy::Private))
        .await
        .unwrap();
    let playlist = store.create_playlist("owner", "mix", "desc").await.unwrap();
    let empty = store.create_playlist("owner", "empty", "").await.unwrap();

    assert!(store.toggle_playlist_video(playlist.id, v1.id).await.unwrap());
    assert!(store.toggle_playlist_video(playlist.id, v2.id).await.unwrap());

    let memberships = store.list_playlists("owner", Some(v1.id)).await.unwrap();
    assert_eq!(memberships.len(), 2);
    let mix = memberships
        .iter()
        .find(|m| m.playlist.id == playlist.id)
        .unwrap();
    assert_eq!(mix.video_count, 2);
    assert!(mix.contains_video);
    let other = memberships.iter().find(|m| m.playlist.id == empty.id).unwrap();
    assert!(!other.contains_video);

    let details = store.playlist_details(playlist.id).await.unwrap().unwrap();
    assert_eq!(details.owner_name, "owner_name");
    assert_eq!(details.videos.len(), 1, "other owner's private video is hidden");

    assert!(!store.toggle_playlist_video(playlist.id, v1.id).await.unwrap());
    assert!(store.remove_playlist_video(playlist.id, v2.id).await.unwrap());
    assert!(!store.remove_playlist_video(playlist.id, v2.id).await.unwrap());

    let renamed = store.rename_playlist(playlist.id, "renamed").await.unwrap();
    assert_eq!(renamed.name, "renamed");

    store.delete_playlist_with_links(playlist.id).await.unwrap();
    assert!(store.get_playlist(playlist.id).await.unwrap().is_none());
    assert!(store
        .delete_playlist_with_links(playlist.id)
        .await
        .unwrap_err()
        .is_not_found());
}
