// Wire-level tests for HttpAdminApi against a local mock server.

use std::time::Duration;

use impersonate_admin::api::{AdminApi, ApiError, HttpAdminApi};
use impersonate_admin::session::{CookieStore, IMPERSONATE_COOKIE, SharedCookies};
use mockito::Matcher;
use serde_json::json;

fn client(server: &mockito::Server, cookies: SharedCookies) -> HttpAdminApi {
    HttpAdminApi::new(&server.url(), Duration::from_secs(5), cookies).expect("client")
}

#[test]
fn lists_charges() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/billing/charges")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": "ch_1", "amount": 2999, "currency": "usd",
                 "created": 1700000000, "status": "succeeded", "refunded": false,
                 "amount_refunded": 0, "description": null},
                {"id": "ch_2", "amount": 900, "currency": "eur",
                 "created": 1700000100, "status": "succeeded", "refunded": true,
                 "amount_refunded": 900, "description": "Pro"}
            ])
            .to_string(),
        )
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    let charges = api.list_charges().unwrap();
    m.assert();
    assert_eq!(charges.len(), 2);
    assert!(charges[1].refunded);
    assert_eq!(charges[1].description.as_deref(), Some("Pro"));
}

#[test]
fn refund_posts_all_ids_in_one_body() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/billing/refund-charges")
        .match_body(Matcher::Json(json!({"chargeIds": ["ch_1", "ch_2"]})))
        .with_status(201)
        .with_body("{}")
        .expect(1)
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    api.refund_charges(&["ch_1".to_string(), "ch_2".to_string()])
        .unwrap();
    m.assert();
}

#[test]
fn refund_ignores_plain_text_success_body() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/billing/refund-charges")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("OK")
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    assert!(api.refund_charges(&["ch_1".to_string()]).is_ok());
    m.assert();
}

#[test]
fn impersonate_ignores_html_success_body() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/user/impersonate")
        .with_status(201)
        .with_body("<html>Created</html>")
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    assert!(api.set_impersonation("org-1-aaaa").is_ok());
}

#[test]
fn cancel_tolerates_empty_body() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/billing/cancel-subscription")
        .with_status(201)
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    api.cancel_subscription().unwrap();
    m.assert();
}

#[test]
fn add_subscription_posts_plan() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/billing/add-subscription")
        .match_body(Matcher::Json(json!({"subscription": "PRO"})))
        .with_status(201)
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    api.add_subscription("PRO").unwrap();
    m.assert();
}

#[test]
fn search_encodes_query_and_maps_rows() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/user/impersonate")
        .match_query(Matcher::UrlEncoded("name".into(), "ada l&co".into()))
        .with_status(200)
        .with_body(
            json!([{ "id": "org-1-aaaa", "user": { "name": "Ada L", "email": "ada@example.com" } }])
                .to_string(),
        )
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    let found = api.search_users("ada l&co").unwrap();
    m.assert();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].label(), "user:aaaa - Ada L - ada@example.com");
}

#[test]
fn impersonation_sends_cookies_and_stores_set_cookie() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/user/impersonate")
        .match_header("cookie", "auth=tok")
        .match_body(Matcher::Json(json!({"id": "org-1-aaaa"})))
        .with_status(201)
        .with_header("set-cookie", "impersonate=org-1-aaaa; Path=/; HttpOnly")
        .create();

    let mut store = CookieStore::in_memory();
    store.set("auth", "tok").unwrap();
    let cookies = store.shared();
    let api = client(&server, cookies.clone());
    api.set_impersonation("org-1-aaaa").unwrap();
    m.assert();
    assert_eq!(
        cookies.lock().unwrap().get(IMPERSONATE_COOKIE),
        Some("org-1-aaaa")
    );
}

#[test]
fn session_reads_impersonation_flag() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/user/self")
        .with_status(200)
        .with_body(
            json!({"id": "u1", "impersonate": true, "tier": {"current": "FREE"}}).to_string(),
        )
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    let s = api.session().unwrap();
    assert!(s.impersonating);
    assert!(s.on_free_tier());
}

#[test]
fn non_success_status_is_an_http_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/billing/charges")
        .with_status(403)
        .with_body("forbidden")
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    match api.list_charges() {
        Err(ApiError::Http { status, body, .. }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_decode_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/billing/charges")
        .with_status(200)
        .with_body("not json")
        .create();

    let api = client(&server, CookieStore::in_memory().shared());
    assert!(matches!(api.list_charges(), Err(ApiError::Decode { .. })));
}
