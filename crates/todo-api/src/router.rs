use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use infrastructure::TodoRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// ハンドラ共有の状態（プールを持つリポジトリのみ）
#[derive(Clone)]
pub struct AppState {
    pub repo: TodoRepository,
}

impl AppState {
    pub fn new(repo: TodoRepository) -> Self {
        Self { repo }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .fallback(handlers::fallback)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

// ブラウザクライアントは別オリジンから配信される
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
