//! # Cart Routes
//!
//! HTTP handlers for cart manipulation under `/api/cart/{userId}`.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐   POST /add    ┌──────────┐   POST /api/orders           │
//! │  │  (none)  │───────────────►│ In Cart  │──────────────────► Order     │
//! │  │          │                │          │   (snapshot of items;        │
//! │  └──────────┘                └──────────┘    cart is left as is)       │
//! │       │                        │    ▲                                   │
//! │       │ GET ► empty cart,      │    │ POST /add                         │
//! │       │       nothing stored   │    │ PUT  /update                      │
//! │       │                        │    │ POST /remove                      │
//! │       │                        ▼    │                                   │
//! │       └──── POST /clear ────► empty cart (stored)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bazaar_core::{Cart, Money};

use crate::error::ApiError;
use crate::state::AppState;

/// Cart plus a human-readable confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub message: &'static str,
    pub cart: Cart,
}

impl CartResponse {
    fn new(message: &'static str, cart: Cart) -> Self {
        CartResponse { message, cart }
    }
}

/// Body of `POST /api/cart/{userId}/add`.
///
/// `price` may also be sent as `unitPrice`. When it is missing the catalog
/// prices the product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default)]
    pub product_id: String,

    #[serde(default = "default_quantity")]
    pub quantity: i64,

    #[serde(default, alias = "unitPrice")]
    pub price: Option<Money>,
}

fn default_quantity() -> i64 {
    1
}

/// Body of `POST /api/cart/{userId}/remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    #[serde(default)]
    pub product_id: String,
}

/// Body of `PUT /api/cart/{userId}/update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub product_id: String,

    pub quantity: i64,
}

/// `GET /api/cart/{userId}`
///
/// Returns the owner's cart, or an empty one if they never added anything.
/// Never creates a cart.
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Cart> {
    debug!(owner_id = %user_id, "get_cart");
    Json(state.carts.get(&user_id).await)
}

/// `POST /api/cart/{userId}/add`
///
/// ## Behavior
/// - If the product is already in the cart: quantity increases, price stays
/// - If not: added as a new line with the given (or catalog) price
/// - Quantity defaults to 1
pub async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(req) = body?;

    let cart = state
        .carts
        .add_priced(&user_id, &req.product_id, req.quantity, req.price)
        .await?;

    Ok(Json(CartResponse::new("Item added to cart", cart)))
}

/// `POST /api/cart/{userId}/remove`
///
/// Removing a product that is not in the cart succeeds and changes nothing.
/// `404` if the owner has no cart at all.
pub async fn remove_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<RemoveItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(req) = body?;

    let cart = state.carts.remove(&user_id, &req.product_id).await?;

    Ok(Json(CartResponse::new("Item removed from cart", cart)))
}

/// `PUT /api/cart/{userId}/update`
///
/// Sets a line's quantity; `0` removes the line. `404` if the cart or the
/// line does not exist.
pub async fn update_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(req) = body?;

    let cart = state
        .carts
        .update(&user_id, &req.product_id, req.quantity)
        .await?;

    Ok(Json(CartResponse::new("Cart updated", cart)))
}

/// `POST /api/cart/{userId}/clear`
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.clear(&user_id).await?;

    Ok(Json(CartResponse::new("Cart cleared", cart)))
}
