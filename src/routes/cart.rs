use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::{
        cart::{AddToCartRequest, CartView, UpdateCartRequest},
        orders::CheckoutReceipt,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{cart_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/checkout", get(checkout_summary).post(checkout))
        .route("/{product_id}", post(add_to_cart))
        .route("/{product_id}/update", post(update_cart_item))
        .route("/{product_id}/remove", post(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current session cart", body = ApiResponse<CartView>),
        (status = 403, description = "Only buyers have a cart")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::view_cart(&state, &user, &session).await?))
}

#[utoipa::path(
    post,
    path = "/api/cart/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add to the line, or set it when `update` is true", body = ApiResponse<CartView>),
        (status = 400, description = "Quantity must be a positive whole number"),
        (status = 403, description = "Only buyers can add items to cart"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::add_to_cart(&state, &user, &session, product_id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/cart/{product_id}/update",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantity set; zero removes the line", body = ApiResponse<CartView>),
        (status = 400, description = "Quantity must be zero or a positive whole number"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::update_cart_item(&state, &user, &session, product_id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/cart/{product_id}/remove",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Line removed (no-op when absent)", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::remove_from_cart(&state, &user, &session, product_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/cart/checkout",
    responses(
        (status = 200, description = "Order summary to confirm", body = ApiResponse<CartView>),
        (status = 400, description = "Your cart is empty")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout_summary(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::checkout_summary(&state, &user, &session).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<CheckoutReceipt>),
        (status = 400, description = "Empty cart or unavailable products")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<CheckoutReceipt>>> {
    Ok(Json(order_service::checkout(&state, &user, &session).await?))
}
