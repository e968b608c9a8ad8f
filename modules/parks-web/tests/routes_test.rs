//! Router tests: the full axum app over the in-memory store and a recording
//! mailer.
//!
//! Run with: cargo test -p parks-web --test routes_test

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use parks_common::geometry::encode_park_boundary;
use parks_store::testing::{sample_park, MockParkStore};
use parks_web::moderation::FLAG_SUBJECT;
use parks_web::testing::RecordingMailer;
use parks_web::{build_router, AppState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestApp {
    router: Router,
    store: Arc<MockParkStore>,
    mailer: Arc<RecordingMailer>,
}

fn fixture() -> MockParkStore {
    MockParkStore::new()
        .with_neighborhood("Dorchester", "dorchester")
        .with_neighborhood("Jamaica Plain", "jamaica-plain")
        .with_activity("Tennis", "tennis")
        .with_activity("Swimming", "swimming")
        .with_facilitytype("Court")
        .with_park(sample_park("Franklin Park", "franklin-park"), &["dorchester", "jamaica-plain"])
        .with_park(sample_park("Ronan Park", "ronan-park"), &["dorchester"])
        .with_facility("franklin-park", "Courts", &["tennis"])
        .with_facility("franklin-park", "Pool", &["swimming"])
        .with_facility("ronan-park", "Courts", &["tennis"])
        .with_event("Summer Concert", "Music on the lawn.")
        .with_story("franklin-park", "Older", "First visit.", false)
        .with_story("franklin-park", "Newer", "Second visit.", false)
}

fn app_with(store: MockParkStore, mailer: RecordingMailer) -> TestApp {
    let store = Arc::new(store);
    let mailer = Arc::new(mailer);
    let state = Arc::new(AppState {
        store: store.clone(),
        mailer: mailer.clone(),
        site_domain: "parks.example.org".into(),
        admins: vec!["admin@example.org".into()],
    });
    TestApp {
        router: build_router(state),
        store,
        mailer,
    }
}

fn app() -> TestApp {
    app_with(fixture(), RecordingMailer::new())
}

async fn get(app: &TestApp, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &TestApp, uri: &str, body: &str) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_lists_navigation() {
    let app = app();
    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("/neighborhood/jamaica-plain/"));
    assert!(html.contains("/play/swimming/all/"));
}

#[tokio::test]
async fn park_page_shows_acres_and_stories_newest_first() {
    let app = app();
    let response = get(&app, "/park/franklin-park/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("About 2.47 acres"));
    let newer = html.find("Second visit.").unwrap();
    let older = html.find("First visit.").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn park_page_embeds_encoded_boundary() {
    let app = app();
    let response = get(&app, "/park/franklin-park/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let encoded = encode_park_boundary(&sample_park("Franklin Park", "franklin-park")).unwrap();
    let literal = serde_json::to_string(&encoded).unwrap();
    let html = body_string(response).await;
    assert!(html.contains(&format!("decodePolyline({literal})")));
}

#[tokio::test]
async fn unknown_pages_are_404() {
    let app = app();
    for uri in [
        "/park/atlantis/",
        "/neighborhood/atlantis/",
        "/play/curling/all/",
        "/play/tennis/atlantis/",
        "/event/abc/concert/",
        "/event/99/concert/",
        "/story/99/",
        "/explore/?neighborhood=atlantis",
        "/no/such/page/",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn play_filtered_lists_matching_parks() {
    let app = app();
    let response = get(&app, "/play/swimming/dorchester/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Swimming in Dorchester"));
    assert!(html.contains(r#"href="/park/franklin-park/""#));
    assert!(!html.contains(r#"href="/park/ronan-park/""#));
}

#[tokio::test]
async fn event_page_ignores_name_segment() {
    let app = app();
    let response = get(&app, "/event/1/anything/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Summer Concert"));
}

#[tokio::test]
async fn explore_echoes_posted_park_name() {
    let app = app();
    let response = post_form(&app, "/explore/?neighborhood=dorchester", "parkname=Ronan").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(r#"value="Ronan""#));
    assert!(html.contains(r#"<option value="dorchester" selected>"#));
}

#[tokio::test]
async fn static_pages_render() {
    let app = app();
    for uri in ["/play/", "/trip/", "/policy/", "/explore/", "/story/1/"] {
        assert_eq!(get(&app, uri).await.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn store_failure_is_500() {
    let app = app_with(fixture().failing_reads(), RecordingMailer::new());
    let response = get(&app, "/park/franklin-park/").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// JSON endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_returns_name_to_url_map() {
    let app = app();
    let response = get(&app, "/parks/?neighborhood=jamaica-plain").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json, serde_json::json!({ "Franklin Park": "/park/franklin-park/" }));
}

#[tokio::test]
async fn filter_with_unknown_field_is_204() {
    let app = app();
    for uri in ["/parks/?geometry=POINT(0%200)", "/parks/?id=abc"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
        assert!(body_string(response).await.is_empty());
    }
}

#[tokio::test]
async fn filter_store_failure_is_204() {
    let app = app_with(fixture().failing_reads(), RecordingMailer::new());
    let response = get(&app, "/parks/").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn ajax_returns_park_summaries() {
    let app = app();
    let response = get(&app, "/ajax/all/tennis/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "activity": [{ "slug": "tennis" }, { "slug": "swimming" }],
                "name": "Franklin Park",
                "slug": "franklin-park",
                "description": "Franklin Park description",
            },
            {
                "activity": [{ "slug": "tennis" }],
                "name": "Ronan Park",
                "slug": "ronan-park",
                "description": "Ronan Park description",
            },
        ])
    );
}

#[tokio::test]
async fn ajax_unknown_slug_is_empty_object() {
    let app = app();
    for uri in ["/ajax/dorchester/curling/", "/ajax/atlantis/tennis/"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_string(response).await, "{}");
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_redirects_to_park() {
    let app = app();
    let response = post_form(&app, "/search/", "parkname=Franklin+Park").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/park/franklin-park/");
}

#[tokio::test]
async fn search_misses_redirect_home() {
    let app = app();
    for body in ["parkname=Nonexistent+Place", "parkname=", ""] {
        let response = post_form(&app, "/search/", body).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{body}");
        assert_eq!(location(&response), "/");
    }

    let response = get(&app, "/search/").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn search_store_failure_redirects_home() {
    let app = app_with(fixture().failing_reads(), RecordingMailer::new());
    let response = post_form(&app, "/search/", "parkname=Franklin+Park").await;
    assert_eq!(location(&response), "/");
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_story_is_saved_and_form_cleared() {
    let app = app();
    let response = post_form(
        &app,
        "/park/ronan-park/",
        "title=Pickup+game&text=Courts+were+busy&email=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.story_count(), 3);

    let story = app.store.story(3).unwrap();
    assert_eq!(story.park_id, 2);
    assert_eq!(story.title, "Pickup game");
    assert!(story.email.is_none());

    let html = body_string(response).await;
    assert!(html.contains("Courts were busy"));
    assert!(html.contains(r#"name="title" maxlength="100" value="""#));
}

#[tokio::test]
async fn invalid_story_rerenders_with_errors() {
    let app = app();
    let response = post_form(&app, "/park/ronan-park/", "title=&text=Kept+text").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.story_count(), 2);

    let html = body_string(response).await;
    assert!(html.contains("Title must be 1 to 100 characters."));
    assert!(html.contains("Kept text</textarea>"));
}

#[tokio::test]
async fn story_without_form_body_rerenders_with_errors() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/park/ronan-park/")
                .body(Body::from("title=Sneaky&text=No+content+type"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.story_count(), 2);

    let html = body_string(response).await;
    assert!(html.contains("Title must be 1 to 100 characters."));
    assert!(!html.contains("Sneaky"));
}

#[tokio::test]
async fn story_on_missing_park_is_404() {
    let app = app();
    let response = post_form(&app, "/park/atlantis/", "title=A&text=B").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.story_count(), 2);
}

#[tokio::test]
async fn flagging_twice_sends_one_notification() {
    let app = app();

    for _ in 0..2 {
        let response = post_form(&app, "/story/1/flag/", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.is_empty());
    }

    assert!(app.store.story(1).unwrap().objectionable_content);
    assert_eq!(app.store.objectionable_updates(), 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, FLAG_SUBJECT);
    assert_eq!(sent[0].to, vec!["admin@example.org".to_string()]);
    assert!(sent[0].body.contains("First visit."));
    assert!(sent[0]
        .body
        .contains("Link to Admin: http://parks.example.org/admin/parks/story/1"));
}

#[tokio::test]
async fn flagging_missing_story_is_404() {
    let app = app();
    assert_eq!(post_form(&app, "/story/99/flag/", "").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(post_form(&app, "/story/x/flag/", "").await.status(), StatusCode::NOT_FOUND);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn failed_delivery_is_500_and_story_stays_unflagged() {
    let app = app_with(fixture(), RecordingMailer::failing());
    let response = post_form(&app, "/story/1/flag/", "").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!app.store.story(1).unwrap().objectionable_content);
}
