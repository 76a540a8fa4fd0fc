//! End-to-end session flow through the `sessio` facade

use sessio::prelude::*;
use sessio::serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_login_visit_logout() {
    let config = SessionConfig::from_json(
        r#"{"cookieName": "sess", "sidPrefix": "s_", "sessionIDLength": 4, "enableSetCookie": true}"#,
    )
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    let manager = SessionManager::with_store(config, store.clone()).unwrap();

    // Login: no cookie yet
    let mut req = HttpRequest::new("POST", "/login");
    let mut resp = HttpResponse::ok();
    let session = manager.start_session(&mut req, &mut resp).await.unwrap();
    session.set("name", "A");
    session.persist().await.unwrap();

    let cookie = resp.set_cookie_headers()[0]
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // Next visit presents the cookie
    let mut req = HttpRequest::new("GET", "/profile").with_header("Cookie", cookie.clone());
    let mut resp = HttpResponse::ok();
    let visit = manager.start_session(&mut req, &mut resp).await.unwrap();
    assert_eq!(visit.get("name"), Some(json!("A")));

    // Logout
    let mut req = HttpRequest::new("POST", "/logout").with_header("Cookie", cookie);
    let mut resp = HttpResponse::ok();
    manager.destroy_session(&mut req, &mut resp).await;

    assert!(store.is_empty());
    assert!(resp.set_cookie_headers()[0].contains("Max-Age=0"));
}
