//! # HTTP Routes
//!
//! ```text
//! GET    /health
//!
//! GET    /api/cart/{userId}
//! POST   /api/cart/{userId}/add        { productId, quantity?, price? }
//! POST   /api/cart/{userId}/remove     { productId }
//! PUT    /api/cart/{userId}/update     { productId, quantity }
//! POST   /api/cart/{userId}/clear
//!
//! GET    /api/orders
//! POST   /api/orders                   { userId, items, total, ... }
//! GET    /api/orders/user/{userId}
//! GET    /api/orders/{id}
//! PUT    /api/orders/{id}              { status }
//! ```
//!
//! Every failure answers `{ "code", "message" }` (see [`crate::error`]).

pub mod cart;
pub mod health;
pub mod order;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/cart/{user_id}", get(cart::get_cart))
        .route("/api/cart/{user_id}/add", post(cart::add_item))
        .route("/api/cart/{user_id}/remove", post(cart::remove_item))
        .route("/api/cart/{user_id}/update", put(cart::update_item))
        .route("/api/cart/{user_id}/clear", post(cart::clear_cart))
        .route("/api/orders", get(order::list_orders).post(order::create_order))
        .route("/api/orders/user/{user_id}", get(order::list_user_orders))
        .route("/api/orders/{id}", get(order::get_order).put(order::update_order))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
