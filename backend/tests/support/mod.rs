#![allow(dead_code)]
use std::{sync::Arc, time::Duration as StdDuration};

use account_backend::{
    config::{Config, SmtpConfig},
    repositories::InMemoryUserStore,
    router::build_router,
    state::AppState,
    types::UserId,
    utils::{
        email::{MailMessage, Mailer},
        jwt::TokenSubject,
    },
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "a_secure_token_that_is_long_enough_123";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        jwt_expiration_hours: 1,
        refresh_token_secret: TEST_SECRET.into(),
        refresh_token_expiration_days: 7,
        code_expiration_minutes: 5,
        cors_allow_origins: vec!["http://localhost:8000".into()],
        smtp: SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            username: String::new(),
            password: String::new(),
            from_address: "noreply@accounts.local".into(),
            skip_send: true,
            frontend_url: "http://localhost:8000".into(),
        },
    }
}

/// Captures every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }

    /// Waits until at least `count` messages were dispatched. Delivery runs on
    /// a spawned task, so callers cannot observe it synchronously.
    pub async fn wait_for(&self, count: usize) -> Vec<MailMessage> {
        for _ in 0..200 {
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        panic!("expected {} mails, got {}", count, self.sent.lock().await.len());
    }

    /// Code carried by the most recent message to `to`.
    pub async fn last_code_for(&self, to: &str) -> String {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .map(|m| m.context.code.clone())
            .unwrap_or_else(|| panic!("no mail sent to {}", to))
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        self.sent.lock().await.push(message);
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: MailMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp unavailable")
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryUserStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryUserStore::new());
        let mailer = RecordingMailer::new();
        let state = AppState::new(store.clone(), mailer.clone(), config);
        Self {
            state,
            store,
            mailer,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Access token for a caller that does not need to exist in the store.
    pub fn bearer(&self) -> String {
        self.state
            .tokens
            .issue_access_token(&TokenSubject::new(UserId::new(), "admin@example.com"))
            .expect("issue token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.router().oneshot(request).await.expect("call router");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }
}
