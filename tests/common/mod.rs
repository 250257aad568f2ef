#![allow(dead_code)]

use axum::body::Body;
use axum::extract::FromRef;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use macrolog::app::build_app;
use macrolog::auth::JwtKeys;
use macrolog::state::AppState;

/// A router over the in-memory state plus a way to mint tokens for it.
pub struct TestApp {
    pub router: Router,
    keys: JwtKeys,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        Self {
            router: build_app(state),
            keys,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.keys.sign_access(user_id).unwrap()
    }

    /// A fresh user and a bearer token for them.
    pub fn user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        (user_id, self.token_for(user_id))
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn food_body(name: &str, serving_size: f64) -> Value {
    serde_json::json!({
        "name": name,
        "serving_size": serving_size,
        "serving_unit": "g",
        "calories": 165.0,
        "protein": 31.0,
        "fat": 3.6,
        "carbs": 0.0,
        "sugar": 0.0
    })
}
