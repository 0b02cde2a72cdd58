use axum::http::StatusCode;
use http_body_util::BodyExt;
use leadbot_core::config::Config;
use leadbot_core::store::LeadStore;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "open-sesame";
const SCENARIO: [&str; 6] = ["Ali", "Lahore", "Buy", "House", "50 lakh", "03001234567"];

fn config(webhook_url: &str) -> Config {
    let mut config = Config {
        password: PASSWORD.to_string(),
        ..Config::default()
    };
    config.webhook.url = webhook_url.to_string();
    config.webhook.timeout_secs = 5;
    config
}

/// A browser stand-in: keeps the session cookie between requests.
struct Visitor {
    app: axum::Router,
    cookie: Option<String>,
}

impl Visitor {
    fn new(dir: &TempDir, config: Config) -> Self {
        let state = leadbot_server::AppState::new(dir.path(), config);
        Self {
            app: leadbot_server::build_router(state),
            cookie: None,
        }
    }

    async fn send(
        &mut self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = axum::http::Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            req = req.header("cookie", cookie.clone());
        }
        let req = match body {
            Some(json) => req
                .header("content-type", "application/json")
                .body(axum::body::Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => req.body(axum::body::Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(req).await.unwrap();
        if let Some(set) = response.headers().get("set-cookie") {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value =
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&mut self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn login(&mut self) {
        let (status, json) = self
            .post("/api/session/login", serde_json::json!({ "password": PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["authenticated"], true);
    }

    async fn answer(&mut self, value: &str) -> serde_json::Value {
        let (status, json) = self
            .post("/api/session/answer", serde_json::json!({ "value": value }))
            .await;
        assert_eq!(status, StatusCode::OK, "answer failed: {json}");
        json
    }

    async fn answer_all(&mut self) -> serde_json::Value {
        let mut last = serde_json::Value::Null;
        for value in SCENARIO {
            last = self.answer(value).await;
        }
        last
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_visit_shows_the_gate() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));

    let (status, json) = visitor.get("/api/session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], false);
    assert!(json["question"].is_null());
    assert!(visitor.cookie.as_deref().unwrap().starts_with("leadbot_session="));
}

#[tokio::test]
async fn wrong_password_shows_error() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));

    let (status, json) = visitor
        .post("/api/session/login", serde_json::json!({ "password": "guess" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], false);
    assert_eq!(json["message"], "Incorrect password");
}

#[tokio::test]
async fn empty_password_shows_nothing() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));

    let (_, json) = visitor
        .post("/api/session/login", serde_json::json!({ "password": "" }))
        .await;
    assert_eq!(json["authenticated"], false);
    assert!(json["message"].is_null());
}

#[tokio::test]
async fn answering_before_login_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));

    let (status, json) = visitor
        .post("/api/session/answer", serde_json::json!({ "value": "Ali" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());

    let (status, _) = visitor.post("/api/session/reset", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_shows_first_question() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));
    visitor.login().await;

    let (_, json) = visitor.get("/api/session").await;
    assert_eq!(json["step"], 0);
    assert_eq!(json["total"], 6);
    assert_eq!(json["question"]["prompt"], "What is your name?");
    assert_eq!(json["question"]["field"], "name");
}

#[tokio::test]
async fn sessions_do_not_share_login() {
    let dir = TempDir::new().unwrap();
    let state = leadbot_server::AppState::new(dir.path(), config("http://127.0.0.1:1/"));
    let app = leadbot_server::build_router(state);
    let mut alice = Visitor {
        app: app.clone(),
        cookie: None,
    };
    let mut bob = Visitor { app, cookie: None };

    alice.login().await;
    let (_, json) = bob.get("/api/session").await;
    assert_eq!(json["authenticated"], false);
    assert_ne!(alice.cookie, bob.cookie);
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_answer_does_not_advance() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));
    visitor.login().await;

    visitor.answer("Ali").await;
    let json = visitor.answer("").await;
    assert_eq!(json["step"], 1);
    assert_eq!(json["question"]["field"], "city");
    assert_eq!(json["answers"]["name"], "Ali");
}

#[tokio::test]
async fn each_answer_advances_one_step() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));
    visitor.login().await;

    for (i, value) in SCENARIO.iter().take(5).enumerate() {
        let json = visitor.answer(value).await;
        assert_eq!(json["step"], i + 1);
        assert_eq!(json["phase"], "collecting");
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn completed_inquiry_is_stored_and_posted_once() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hooks/catch")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "Name": "Ali",
            "City": "Lahore",
            "Intent": "Buy",
            "Type": "House",
            "Budget": "50 lakh",
            "Phone": "03001234567",
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut visitor = Visitor::new(&dir, config(&format!("{}/hooks/catch", server.url())));
    visitor.login().await;
    let json = visitor.answer_all().await;

    assert_eq!(json["phase"], "complete");
    assert_eq!(json["step"], 6);
    assert!(json["question"].is_null());
    assert_eq!(
        json["message"],
        "Thanks! Our property expert will contact you shortly."
    );
    assert_eq!(json["lead"]["Name"], "Ali");
    assert_eq!(json["lead"]["Phone"], "03001234567");
    assert!(json["lead"]["Timestamp"].is_string());
    assert_eq!(json["lead"].as_object().unwrap().len(), 7);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);

    // Re-rendering the summary does not repeat the side effects.
    let (_, again) = visitor.get("/api/session").await;
    assert_eq!(again["lead"], json["lead"]);
    let _ = visitor.answer("extra").await;

    let leads = LeadStore::open(dir.path().join("leads.csv")).load_all().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].name, "Ali");
    assert_eq!(leads[0].budget, "50 lakh");
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn delivery_failure_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));
    visitor.login().await;
    let json = visitor.answer_all().await;

    assert_eq!(json["phase"], "complete");
    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "delivery_failure");
    assert!(warnings[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to send the lead to the webhook"));

    let leads = LeadStore::open(dir.path().join("leads.csv")).load_all().unwrap();
    assert_eq!(leads.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_failure_still_posts() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut cfg = config(&server.url());
    // The store path is a directory, so the append cannot succeed.
    cfg.store_path = dir.path().to_path_buf();
    let mut visitor = Visitor::new(&dir, cfg);
    visitor.login().await;
    let json = visitor.answer_all().await;

    let warnings = json["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["kind"], "persistence_write_failure");
    assert!(warnings[0]["message"]
        .as_str()
        .unwrap()
        .contains("is the file open?"));
    assert_eq!(json["lead"]["Name"], "Ali");
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn reset_starts_a_new_inquiry() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let mut visitor = Visitor::new(&dir, config(&server.url()));
    visitor.login().await;
    visitor.answer_all().await;

    let (status, json) = visitor.post("/api/session/reset", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["step"], 0);
    assert_eq!(json["phase"], "collecting");
    assert_eq!(json["question"]["field"], "name");
    assert!(json["answers"].as_object().unwrap().is_empty());
    assert!(json["lead"].is_null());

    visitor.answer_all().await;
    let leads = LeadStore::open(dir.path().join("leads.csv")).load_all().unwrap();
    assert_eq!(leads.len(), 2);
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_can_require_login_again() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config("http://127.0.0.1:1/");
    cfg.session.reset_requires_login = true;
    let mut visitor = Visitor::new(&dir, cfg);
    visitor.login().await;
    visitor.answer_all().await;

    let (status, json) = visitor.post("/api/session/reset", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], false);

    let (status, _) = visitor
        .post("/api/session/answer", serde_json::json!({ "value": "Ali" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let mut visitor = Visitor::new(&dir, config("http://127.0.0.1:1/"));
    let (status, json) = visitor.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(visitor.cookie.is_none());
}

#[tokio::test]
async fn root_serves_the_page() {
    let dir = TempDir::new().unwrap();
    let state = leadbot_server::AppState::new(dir.path(), config("http://127.0.0.1:1/"));
    let app = leadbot_server::build_router(state);
    let req = axum::http::Request::builder()
        .uri("/")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ct = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.contains("text/html"));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("Start New Inquiry"));
}
