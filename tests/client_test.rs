mod common;

use road_report::client::{
    submit_draft, FeedLoader, HttpRemoteStore, NoticeKind, PhotoAttachment, PostDraft,
    PostInteractionController, PostView, Reconcile, SessionIdentityProvider, UpvoteToggle,
};
use road_report::models::Severity;
use road_report::services::feed_filter::FeedFilters;
use std::sync::Arc;

fn draft(city: &str) -> PostDraft {
    PostDraft {
        name: "Jane".to_string(),
        title: "Pothole on Main St".to_string(),
        severity: Some(Severity::High),
        state: "CA".to_string(),
        city: city.to_string(),
        latitude: Some(37.12),
        longitude: Some(-122.45),
        photo: Some(PhotoAttachment {
            filename: "pothole.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn draft_submission_then_interaction_over_http() {
    let app = common::spawn_app().await;
    let remote = Arc::new(HttpRemoteStore::new(app.addr.clone()).unwrap());
    let identity = Arc::new(SessionIdentityProvider::in_memory());
    let city = common::unique_city();

    let created = submit_draft(remote.as_ref(), &draft(&city)).await.unwrap();
    assert!(created.photo_url.starts_with("/uploads/post-photos/"));

    let loader = FeedLoader::new(remote.clone(), identity.clone());
    let filters = FeedFilters {
        severity: None,
        location: Some(city.clone()),
    };
    let page = loader.load(&filters, None, None, None).await;
    assert!(page.notice.is_none());
    assert_eq!(page.posts.len(), 1);
    let post = &page.posts[0];
    assert_eq!(post.id, created.id);

    let controller = PostInteractionController::new(
        remote.clone(),
        identity.get_or_create_session_id(),
        post,
    )
    .with_reconcile(Reconcile::Authoritative);

    assert_eq!(
        controller.toggle_upvote().await,
        UpvoteToggle::Applied {
            upvoted: true,
            upvote_count: 1
        }
    );
    controller.add_comment("Sam", "Still there").await.unwrap();
    assert_eq!(controller.toggle_comments().await, None);
    assert!(controller.report("Wrong city").await.is_some());

    match loader.open_post(created.id).await {
        PostView::Loaded(p) => {
            assert_eq!(p.upvote_count, 1);
            assert!(p.viewer_has_upvoted);
            assert_eq!(p.comment_count, 1);
        }
        other => panic!("expected loaded post, got {:?}", other),
    }

    assert_eq!(
        controller.toggle_upvote().await,
        UpvoteToggle::Applied {
            upvoted: false,
            upvote_count: 0
        }
    );
}

#[tokio::test]
async fn missing_post_redirects_to_feed() {
    let app = common::spawn_app().await;
    let remote = Arc::new(HttpRemoteStore::new(app.addr.clone()).unwrap());
    let loader = FeedLoader::new(remote, Arc::new(SessionIdentityProvider::in_memory()));

    match loader.open_post(uuid::Uuid::new_v4()).await {
        PostView::Redirect(n) => assert_eq!(n.kind, NoticeKind::NotFound),
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_degrades_to_empty_feed() {
    let remote = Arc::new(HttpRemoteStore::new("http://127.0.0.1:9").unwrap());
    let loader = FeedLoader::new(remote, Arc::new(SessionIdentityProvider::in_memory()));

    let page = loader.load(&FeedFilters::default(), None, None, None).await;
    assert!(page.posts.is_empty());
    assert_eq!(page.notice.unwrap().kind, NoticeKind::Failure);
}
