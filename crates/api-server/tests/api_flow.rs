//! End-to-end flow over the REST surface: login, account management,
//! directory, campaign lifecycle, suppression, import, analytics.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pressflow_api::{api_router, AppState};
use pressflow_core::{AppConfig, Role};
use pressflow_platform::accounts::CreateAccount;
use pressflow_platform::password;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig::default();
        let state = AppState::new(config);
        let router = api_router(state.clone());
        Self { router, state }
    }

    fn add_account(&self, email: &str, password_raw: &str, role: Role) -> uuid::Uuid {
        self.state
            .accounts
            .create(
                CreateAccount {
                    name: "Test Account".into(),
                    email: email.into(),
                    password: String::new(),
                    role,
                },
                password::hash_password(password_raw).unwrap(),
            )
            .unwrap()
            .id
    }

    async fn request(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(request).await
    }

    async fn login(&self, email: &str, password_raw: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password_raw})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new();
    app.add_account("admin@test.io", "admin-pass", Role::Admin);

    // Bad password.
    let (status, body) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@test.io", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let token = app.login("admin@test.io", "admin-pass").await;

    let (status, body) = app.json("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@test.io");
    // The credential hash never appears in a response.
    assert!(body["data"].get("password_hash").is_none());

    // No token at all.
    let (status, _) = app.json("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_management_policies() {
    let app = TestApp::new();
    let admin_id = app.add_account("admin@test.io", "admin-pass", Role::Admin);
    let manager_id = app.add_account("mgr@test.io", "manager-pass", Role::Manager);

    let admin = app.login("admin@test.io", "admin-pass").await;
    let manager = app.login("mgr@test.io", "manager-pass").await;

    // Only the admin creates accounts.
    let new_user = json!({
        "name": "Newbie",
        "email": "new@test.io",
        "password": "secret1",
        "role": "viewer"
    });
    let (status, _) = app
        .json("POST", "/api/users", Some(&manager), Some(new_user.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app
        .json("POST", "/api/users", Some(&admin), Some(new_user))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "viewer");

    // Duplicate email is a conflict.
    let (status, _) = app
        .json(
            "POST",
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Dup",
                "email": "new@test.io",
                "password": "secret1",
                "role": "viewer"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A manager cannot change their own role.
    let (status, _) = app
        .json(
            "PUT",
            &format!("/api/users/{manager_id}"),
            Some(&manager),
            Some(json!({"role": "admin"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.state.accounts.get(manager_id).unwrap().role, Role::Manager);

    // The admin cannot delete their own account.
    let (status, _) = app
        .json(
            "DELETE",
            &format!("/api/users/{admin_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.state.accounts.get(admin_id).is_some());
}

#[tokio::test]
async fn test_campaign_lifecycle_over_http() {
    let app = TestApp::new();
    app.add_account("mgr@test.io", "manager-pass", Role::Manager);
    let manager = app.login("mgr@test.io", "manager-pass").await;

    // Build a list with three contacts, one of them blacklisted.
    let (status, body) = app
        .json(
            "POST",
            "/api/contacts/lists",
            Some(&manager),
            Some(json!({"name": "Launch list"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let list_id = body["data"]["id"].as_str().unwrap().to_string();

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let (status, _) = app
            .json(
                "POST",
                "/api/contacts",
                Some(&manager),
                Some(json!({"name": "Contact", "email": email, "lists": [list_id]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .json(
            "POST",
            "/api/blacklist",
            Some(&manager),
            Some(json!({"email": "b@example.com", "reason": "unsubscribe"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Create and send the campaign.
    let (status, body) = app
        .json(
            "POST",
            "/api/campaigns",
            Some(&manager),
            Some(json!({
                "name": "Launch",
                "subject": "Subject",
                "sender_name": "Press",
                "sender_email": "press@test.io",
                "content": "<p>hi</p>",
                "target_lists": [list_id]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let campaign_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "draft");

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/campaigns/{campaign_id}/send"),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "send failed: {body}");
    assert_eq!(body["data"]["status"], "sent");
    // The blacklisted address is excluded from the audience.
    assert_eq!(body["data"]["analytics"]["total_sent"], 2);

    // A second send is rejected and the state is unchanged.
    let (status, _) = app
        .json(
            "POST",
            &format!("/api/campaigns/{campaign_id}/send"),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Sent campaigns are immutable.
    let (status, body) = app
        .json(
            "PUT",
            &format!("/api/campaigns/{campaign_id}"),
            Some(&manager),
            Some(json!({"name": "Renamed"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("immutable"));
    let (status, _) = app
        .json(
            "DELETE",
            &format!("/api/campaigns/{campaign_id}"),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_campaign_ownership_scoping() {
    let app = TestApp::new();
    app.add_account("mgr-a@test.io", "manager-pass", Role::Manager);
    app.add_account("mgr-b@test.io", "manager-pass", Role::Manager);
    app.add_account("admin@test.io", "admin-pass", Role::Admin);

    let mgr_a = app.login("mgr-a@test.io", "manager-pass").await;
    let mgr_b = app.login("mgr-b@test.io", "manager-pass").await;
    let admin = app.login("admin@test.io", "admin-pass").await;

    let (_, body) = app
        .json(
            "POST",
            "/api/campaigns",
            Some(&mgr_a),
            Some(json!({
                "name": "Private",
                "subject": "S",
                "sender_name": "P",
                "sender_email": "p@test.io",
                "content": "<p>b</p>"
            })),
        )
        .await;
    let campaign_id = body["data"]["id"].as_str().unwrap().to_string();

    // Another manager cannot see or send it; the admin can.
    let (status, _) = app
        .json(
            "GET",
            &format!("/api/campaigns/{campaign_id}"),
            Some(&mgr_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.json("GET", "/api/campaigns", Some(&mgr_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (status, _) = app
        .json(
            "GET",
            &format!("/api/campaigns/{campaign_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_csv_upload_multipart() {
    let app = TestApp::new();
    app.add_account("entry@test.io", "entry-pass", Role::DataEntry);
    let token = app.login("entry@test.io", "entry-pass").await;

    let boundary = "pressflow-test-boundary";
    let csv = "name,email\nX,x@y.com\n,z@y.com\nDup,x@y.com\n";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"contacts.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload/contacts")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = app.request(request).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(body["data"]["skipped"], 2);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_blacklist_check_and_soft_delete() {
    let app = TestApp::new();
    app.add_account("mgr@test.io", "manager-pass", Role::Manager);
    let manager = app.login("mgr@test.io", "manager-pass").await;

    let (_, body) = app
        .json(
            "POST",
            "/api/blacklist",
            Some(&manager),
            Some(json!({"email": "gone@test.io", "reason": "spam_complaint"})),
        )
        .await;
    let entry_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            "GET",
            "/api/blacklist/check/gone@test.io",
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_blacklisted"], true);

    let (status, _) = app
        .json(
            "DELETE",
            &format!("/api/blacklist/{entry_id}"),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .json(
            "GET",
            "/api/blacklist/check/gone@test.io",
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(body["data"]["is_blacklisted"], false);

    // The record survives as an inactive entry.
    let (_, body) = app
        .json(
            "GET",
            "/api/blacklist?is_active=false",
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    let account_id = app.add_account("reset@test.io", "old-pass", Role::Manager);

    let (status, _) = app
        .json(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({"email": "reset@test.io"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The stored hash and expiry are set; the raw token travels by mail, so
    // for the test we mint a token through the platform API directly.
    let account = app.state.accounts.get(account_id).unwrap();
    assert!(account.reset_token_hash.is_some());
    assert!(account.reset_token_expires.unwrap() > chrono::Utc::now());

    let (token_hash, raw_token) = pressflow_platform::tokens::generate_reset_token();
    app.state.accounts.set_reset_token(
        account_id,
        token_hash,
        chrono::Utc::now() + chrono::Duration::minutes(10),
    );

    let (status, body) = app
        .json(
            "PUT",
            &format!("/api/auth/reset-password/{raw_token}"),
            None,
            Some(json!({"password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "reset failed: {body}");

    // The token redeems exactly once.
    let (status, _) = app
        .json(
            "PUT",
            &format!("/api/auth/reset-password/{raw_token}"),
            None,
            Some(json!({"password": "another-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The new credential works.
    app.login("reset@test.io", "brand-new-pass").await;

    // Unknown email is a 404.
    let (status, _) = app
        .json(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({"email": "nobody@test.io"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_scoping() {
    let app = TestApp::new();
    app.add_account("admin@test.io", "admin-pass", Role::Admin);
    app.add_account("viewer@test.io", "viewer-pass", Role::Viewer);

    let admin = app.login("admin@test.io", "admin-pass").await;
    let viewer = app.login("viewer@test.io", "viewer-pass").await;

    let (status, body) = app
        .json("GET", "/api/analytics/dashboard", Some(&viewer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // User analytics is admin-only.
    let (status, _) = app
        .json("GET", "/api/analytics/users", Some(&viewer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app
        .json("GET", "/api/analytics/users", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_users"], 2);
}

#[tokio::test]
async fn test_health_probe_unauthenticated() {
    let app = TestApp::new();
    let (status, body) = app.json("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
