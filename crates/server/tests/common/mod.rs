#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bloglist_server::core::auth::hash_password;
use bloglist_server::core::models::{Blog, User};
use bloglist_server::{app, AppState, ServerConfig, Store};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const SEED_USERNAME: &str = "test";
pub const SEED_PASSWORD: &str = "salasana";

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

impl TestResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::for_tests()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let state = AppState::new(config, store);
        Self {
            router: app(state.clone()),
            state,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_string(&v).unwrap())
            }
            None => Body::empty(),
        };

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            content_type,
            body,
        }
    }

    pub async fn seed_user(&self, username: &str, name: &str, password: &str) -> User {
        let user = User {
            username: username.into(),
            name: name.into(),
            password_hash: hash_password(password).unwrap(),
            blogs: vec![],
            id: Uuid::new_v4(),
        };
        self.state.store.insert_user(&user).await.unwrap();
        user
    }

    /// Seed user `test`/`salasana` owning two blogs with likes 0 and 10.
    pub async fn seed_initial(&self) -> User {
        let mut user = self
            .seed_user(SEED_USERNAME, "test name", SEED_PASSWORD)
            .await;

        for (n, likes) in [(1, 0), (2, 10)] {
            let blog = Blog {
                title: format!("Test title {n}"),
                author: format!("Author {n}"),
                url: format!("Test URL {n}"),
                likes,
                user: user.id,
                id: Uuid::new_v4(),
            };
            self.state.store.insert_blog(&blog).await.unwrap();
            user.blogs.push(blog.id);
        }
        self.state.store.save_user_blogs(&user).await.unwrap();
        user
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let resp = self
            .call(
                Method::POST,
                "/api/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {:?}", resp.body);
        resp.body["token"].as_str().unwrap().to_string()
    }

    pub async fn blogs_in_db(&self) -> Vec<Blog> {
        self.state.store.list_blogs().await.unwrap()
    }

    pub async fn users_in_db(&self) -> Vec<User> {
        self.state.store.list_users().await.unwrap()
    }
}
