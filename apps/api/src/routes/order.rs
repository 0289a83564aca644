//! # Order Routes
//!
//! HTTP handlers under `/api/orders`.
//!
//! ```text
//! POST /api/orders ──► pending ──► processing ──► shipped ──► delivered
//!                         │             │
//!                         └──────┬──────┘
//!                                ▼
//!                            cancelled
//!
//! PUT /api/orders/{id} { "status": ... } follows the arrows under the
//! strict policy and accepts any status under the permissive one.
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use bazaar_core::{CartItem, Money, NewOrder, Order, OrderList, OrderStatus, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

/// Order plus a human-readable confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub message: &'static str,
    pub order: Order,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub items: Vec<CartItem>,

    #[serde(default)]
    pub total: Option<Money>,

    #[serde(default)]
    pub shipping_address: Option<Value>,

    #[serde(default)]
    pub payment_method: Option<Value>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            owner_id: req.user_id,
            items: req.items,
            total: req.total,
            shipping_address: req.shipping_address,
            payment_method: req.payment_method,
        }
    }
}

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /api/orders`
pub async fn list_orders(State(state): State<AppState>) -> Json<OrderList> {
    Json(state.orders.list_all().await)
}

/// `GET /api/orders/user/{userId}`
///
/// `{ "total": 0, "orders": [] }` for an owner without orders.
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<OrderList> {
    debug!(owner_id = %user_id, "list_user_orders");
    Json(state.orders.list_by_owner(&user_id).await)
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.get(&id).await?))
}

/// `POST /api/orders`
///
/// Items are copied into the order; the cart they came from is not read or
/// cleared. The total is taken as given.
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(req) = body?;

    let order = state.orders.create(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order created successfully",
            order,
        }),
    ))
}

/// `PUT /api/orders/{id}`
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Json(req) = body?;

    let status = req
        .status
        .ok_or_else(|| ValidationError::Required {
            field: "status".to_string(),
        })
        .and_then(|raw| raw.parse::<OrderStatus>())
        .map_err(|e: ValidationError| ApiError::validation(e.to_string()))?;

    let order = state.orders.update_status(&id, status).await?;

    Ok(Json(OrderResponse {
        message: "Order updated successfully",
        order,
    }))
}
