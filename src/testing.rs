use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::email::{MailError, Mailer};

/// A test application builder for integration testing.
///
/// Spins up a TalentBase server with an in-memory SQLite database and a
/// mail backend that captures messages instead of sending them.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_register() {
///     let app = TestApp::new().await;
///     let res = app.post("/api/auth/register", r#"{"email":"a@b.com","password":"secret123"}"#).await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<MemoryMailer>,
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database.
    pub async fn new() -> Self {
        Self::with_config(Self::test_config()).await
    }

    /// Default configuration for tests.
    pub fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret-key-for-testing".to_string(),
            jwt_expiry_hours: 24,
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            verification_code_expiry_secs: 1800,
            password_reset_expiry_secs: 3600,
            email_backend: "console".to_string(),
            email_from: "noreply@test.local".to_string(),
            public_base_url: "http://testserver".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
        }
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let mailer = Arc::new(MemoryMailer::default());

        let app = crate::App::with_config(config)
            .await
            .expect("Failed to create test app")
            .with_mailer(mailer.clone());

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
            mailer,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Send a GET request to a path.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.client.get(&self.url(path)).await
    }

    /// Send a POST request with a JSON body to a path.
    pub async fn post(&self, path: &str, body: &str) -> TestResponse {
        self.client.post(&self.url(path), body).await
    }

    /// Register, pull the verification code out of the captured email and
    /// verify. Returns the auth token and user payload.
    pub async fn create_verified_user(
        &self,
        email: &str,
        password: &str,
    ) -> (String, serde_json::Value) {
        let body = serde_json::json!({ "email": email, "password": password });
        let res = self.post("/api/auth/register", &body.to_string()).await;
        assert_eq!(res.status, 200, "Register failed: {}", res.body);

        let code = self
            .verification_code_for(email)
            .expect("No verification email captured");

        let body = serde_json::json!({ "email": email, "code": code });
        let res = self.post("/api/auth/verify", &body.to_string()).await;
        assert_eq!(res.status, 200, "Verify failed: {}", res.body);

        let json = res.json();
        let token = json["data"]["access_token"].as_str().unwrap().to_string();
        let user = json["data"]["user"].clone();
        (token, user)
    }

    /// Login and return the auth token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let res = self.post("/api/auth/login", &body.to_string()).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        res.json()["data"]["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Extract the verification code from the latest email sent to `to`.
    pub fn verification_code_for(&self, to: &str) -> Option<String> {
        self.mailer
            .last_message_to(to)
            .and_then(|mail| mail.body.rsplit(' ').next().map(str::to_string))
    }

    /// Extract the reset token from the latest reset-link email sent to `to`.
    pub fn reset_token_for(&self, to: &str) -> Option<String> {
        self.mailer
            .last_message_to(to)
            .and_then(|mail| mail.body.rsplit("token=").next().map(str::to_string))
    }
}

/// One captured outgoing email.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail backend that records messages in memory for assertions.
#[derive(Default)]
pub struct MemoryMailer {
    messages: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl MemoryMailer {
    /// All captured messages, in send order.
    pub fn messages(&self) -> Vec<SentMail> {
        self.messages.lock().unwrap().clone()
    }

    /// Make every subsequent `send` fail. Used to check that callers treat
    /// delivery as fire-and-forget.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent message addressed to `to`.
    pub fn last_message_to(&self, to: &str) -> Option<SentMail> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|mail| mail.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::SendFailed("mail transport down".to_string()));
        }
        self.messages.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an auth token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with auth token and JSON body.
    pub async fn post_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a PUT request with auth token and JSON body.
    pub async fn put_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .put(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(body.to_string())
            .send()
            .await
            .expect("PUT request failed");
        TestResponse::from_response(res).await
    }

    /// Send a DELETE request with auth token.
    pub async fn delete_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res = self
            .inner
            .delete(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("DELETE request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        TestResponse { status, body }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.json()["success"].as_bool().unwrap_or(false)
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the error field from the response.
    pub fn error(&self) -> serde_json::Value {
        self.json()["error"].clone()
    }
}
