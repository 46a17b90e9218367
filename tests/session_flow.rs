mod common;

use std::time::Duration;

use common::{build_kit, forged_token, fresh_token, stale_token};
use kindergate::api::ChangePasswordRequest;
use kindergate::error::SessionError;
use kindergate::guard::GuardState;
use kindergate::navigation::{Redirect, SESSION_EXPIRED_MESSAGE};
use kindergate::poller::PollOutcome;
use kindergate::refresh::Refresher;
use kindergate::store::CredentialStore;
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tempfile::tempdir;

#[tokio::test]
async fn test_expired_cookie_is_refreshed_and_request_replayed() {
    let stale = stale_token("teacher");
    let fresh = fresh_token("teacher");

    let mut server = Server::new_async().await;
    let denied = server
        .mock("GET", "/api/v1/classes")
        .match_header("cookie", Matcher::Regex(format!("access={}", stale)))
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(200)
        .with_header("set-cookie", &format!("access={}; Path=/", fresh))
        .expect(1)
        .create_async()
        .await;
    let allowed = server
        .mock("GET", "/api/v1/classes")
        .match_header("cookie", Matcher::Regex(format!("access={}", fresh)))
        .with_status(200)
        .with_body(r#"{"data":[{"id":1,"name":"Robins"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), None);
    kit.session.store().set_access_token(&stale);
    assert!(kit.session.is_token_expired());

    let body: Value = kit.gateway.get_json("classes").await.expect("replay should succeed");
    denied.assert_async().await;
    refresh.assert_async().await;
    allowed.assert_async().await;

    assert_eq!(body["data"][0]["name"], json!("Robins"));
    assert!(kit.session.is_authenticated());
    assert_eq!(kit.session.current_claims().map(|c| c.role), Some("teacher".to_string()));
}

#[tokio::test]
async fn test_failed_refresh_redirects_to_login_once() {
    let mut server = Server::new_async().await;
    let _denied = server
        .mock("GET", "/api/v1/children")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), None);
    kit.session.store().set_access_token(&stale_token("parent"));
    let mut redirects = kit.navigator.subscribe();

    let err = kit.gateway.get_json::<Value>("children").await.unwrap_err();
    refresh.assert_async().await;
    assert!(matches!(err, SessionError::Refresh(_)));

    assert_eq!(
        redirects.try_recv().unwrap(),
        Redirect::Login {
            path: "/login".to_string(),
            message: Some(SESSION_EXPIRED_MESSAGE.to_string()),
        }
    );
    assert!(redirects.try_recv().is_err(), "exactly one redirect expected");
}

#[tokio::test]
async fn test_login_guard_and_logout_end_to_end() {
    let token = fresh_token("parent");
    let dir = tempdir().unwrap();
    let cache = dir.path().join("user.json");

    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/v1/auth/login")
        .match_body(Matcher::PartialJson(json!({"email": "pat@example.com"})))
        .with_status(200)
        .with_header("set-cookie", &format!("access={}; Path=/; HttpOnly", token))
        .with_body(json!({"token": token, "role": "parent", "name": "Pat"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/v1/auth/logout")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), Some(&cache));
    assert!(!kit.session.is_authenticated());

    let claims = kit.auth_api.login("pat@example.com", "secret").await.unwrap();
    login.assert_async().await;
    assert_eq!(claims.subject, "user-42");
    assert!(cache.exists());

    let mut redirects = kit.navigator.subscribe();
    let guard = kit.guard();
    assert!(guard.check(&["Parent", "admin"]).await.is_authorized());
    assert_eq!(guard.check(&["admin"]).await, GuardState::Forbidden);
    assert!(matches!(redirects.try_recv(), Ok(Redirect::Unauthorized { .. })));

    kit.auth_api.logout().await.unwrap();
    logout.assert_async().await;
    assert!(!kit.session.has_token());
    assert!(!cache.exists());
}

#[tokio::test]
async fn test_unsigned_cookie_still_grants_access() {
    let server = Server::new_async().await;
    let kit = build_kit(&server.url(), None);
    kit.session.store().set_access_token(&forged_token("admin"));

    let guard = kit.guard();
    match guard.check(&["admin"]).await {
        GuardState::Authorized(claims) => assert_eq!(claims.subject, "user-7"),
        other => panic!("expected authorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poller_refreshes_near_expiry_token() {
    let near = common::mint_token("user-42", "teacher", kindergate::codec::now_seconds() + 60);
    let fresh = fresh_token("teacher");

    let mut server = Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(201)
        .with_header("set-cookie", &format!("access={}; Path=/", fresh))
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), None);
    kit.session.store().set_access_token(&near);

    let poller = kit.poller().with_interval(Duration::from_millis(20));
    assert_eq!(poller.tick().await, PollOutcome::Refreshed);
    assert_eq!(poller.tick().await, PollOutcome::Fresh);
    refresh.assert_async().await;
    assert_eq!(kit.session.store().access_token(), Some(fresh));
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_request() {
    let fresh = fresh_token("admin");
    let mut server = Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(200)
        .with_header("set-cookie", &format!("access={}; Path=/", fresh))
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), None);
    let results = futures::future::join_all((0..4).map(|_| kit.refresher.refresh())).await;
    refresh.assert_async().await;
    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|c| c.role == "admin")));
}

#[tokio::test]
async fn test_password_change_with_stale_cookie_refreshes_first() {
    let stale = stale_token("parent");
    let fresh = fresh_token("parent");

    let mut server = Server::new_async().await;
    let denied = server
        .mock("POST", "/api/v1/auth/password/reset")
        .match_header("cookie", Matcher::Regex(format!("access={}", stale)))
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(200)
        .with_header("set-cookie", &format!("access={}; Path=/", fresh))
        .expect(1)
        .create_async()
        .await;
    let changed = server
        .mock("POST", "/api/v1/auth/password/reset")
        .match_header("cookie", Matcher::Regex(format!("access={}", fresh)))
        .with_status(200)
        .with_body(r#"{"success":true,"message":"Password changed"}"#)
        .expect(1)
        .create_async()
        .await;

    let kit = build_kit(&server.url(), None);
    kit.session.store().set_access_token(&stale);

    let request = ChangePasswordRequest {
        current_password: "old-secret".to_string(),
        new_password: "new-secret".to_string(),
    };
    let ack = kit.auth_api.reset_password(&request).await.expect("replay should succeed");
    denied.assert_async().await;
    refresh.assert_async().await;
    changed.assert_async().await;
    assert_eq!(ack.success, Some(true));
}

#[test]
fn test_unusable_base_url_is_a_config_error() {
    let config = kindergate::config::load_config_from_str(
        "version: \"1.0.0\"\napi:\n  base_url: \"not a url\"\n",
    )
    .unwrap();
    let err = kindergate::startup::build(std::sync::Arc::new(config)).err();
    assert!(matches!(err, Some(SessionError::Config(_))));
}
