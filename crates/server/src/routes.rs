use axum::{
    routing::{get, post},
    Router,
};
use configs::{WallConfig, WallMode};
use service::WallService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod messages;
pub mod system;
pub mod words;

/// Shared by every handler; cloning only bumps the store's refcount.
#[derive(Clone)]
pub struct AppState {
    pub wall: WallService,
    /// Answer `GET /word-counts` with `{}` instead of 500 when the store fails.
    pub empty_snapshot_on_store_error: bool,
}

impl AppState {
    pub fn new(wall: WallService, cfg: &WallConfig) -> Self {
        Self { wall, empty_snapshot_on_store_error: cfg.empty_snapshot_on_store_error }
    }
}

/// Build the application router; `mode` decides which endpoint family is mounted.
pub fn build_router(state: AppState, mode: WallMode, cors: CorsLayer) -> Router {
    let mut router: Router<AppState> = Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics));

    if mode.serves_words() {
        router = router
            .route("/words", post(words::post_word))
            .route("/word-counts", get(words::word_counts))
            .route("/stats", get(words::stats));
    }
    if mode.serves_messages() {
        router = router.route("/messages", get(messages::recent_messages).post(messages::post_message));
    }

    router
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use configs::WordPolicy;
    use service::storage::MemoryStore;
    use tower::ServiceExt;

    use super::*;

    fn app(mode: WallMode) -> Router {
        let wall = WallService::new(Arc::new(MemoryStore::new()), WordPolicy::Strict);
        let state = AppState { wall, empty_snapshot_on_store_error: false };
        build_router(state, mode, CorsLayer::very_permissive())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn post_word_returns_created() {
        let res = app(WallMode::Words).oneshot(post_json("/words", r#"{"word":"Go"}"#)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(body_json(res).await["success"], true);
    }

    #[tokio::test]
    async fn missing_or_malformed_body_is_bad_request() {
        for body in ["{}", r#"{"word":null}"#, r#"{"word":42}"#, "not json"] {
            let res = app(WallMode::Words).oneshot(post_json("/words", body)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body_json(res).await["success"], false, "{body}");
        }
    }

    #[tokio::test]
    async fn bad_stats_limit_is_json_bad_request() {
        let res = app(WallMode::Words)
            .oneshot(Request::get("/stats?limit=abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

        let res = app(WallMode::Words)
            .oneshot(Request::get("/stats?limit=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mode_decides_mounted_routes() {
        let res = app(WallMode::Words)
            .oneshot(Request::get("/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app(WallMode::Messages)
            .oneshot(Request::get("/word-counts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app(WallMode::Both)
            .oneshot(Request::get("/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
