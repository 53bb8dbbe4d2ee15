use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    audit,
    cart::Cart,
    dto::cart::{AddToCartRequest, CartView, UpdateCartRequest},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer},
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn view_cart(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let cart = Cart::load(session).await?;
    let view = cart_view(&state.orm, &cart).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
    product_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let quantity = parse_quantity(payload.quantity)
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::BadRequest("Quantity must be a positive whole number.".into()))?;

    let product = catalog_product(state, product_id).await?;

    let mut cart = Cart::load(session).await?;
    check_line_quantity(&cart, product_id, quantity, payload.update)?;
    cart.add(&product, quantity, payload.update);
    cart.save(session).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart",
        serde_json::json!({ "product_id": product_id, "quantity": quantity, "update": payload.update }),
    )
    .await;

    let view = cart_view(&state.orm, &cart).await?;
    Ok(ApiResponse::success(
        format!("{} added to cart", product.name),
        view,
        Some(Meta::empty()),
    ))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
    product_id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let quantity = parse_quantity(payload.quantity).ok_or_else(|| {
        AppError::BadRequest("Quantity must be zero or a positive whole number.".into())
    })?;

    let mut cart = Cart::load(session).await?;
    let message = if quantity == 0 {
        cart.remove(product_id);
        "Removed from cart".to_string()
    } else {
        check_line_quantity(&cart, product_id, quantity, true)?;
        let product = catalog_product(state, product_id).await?;
        cart.add(&product, quantity, true);
        format!("{} quantity updated", product.name)
    };
    cart.save(session).await?;

    let view = cart_view(&state.orm, &cart).await?;
    Ok(ApiResponse::success(message, view, Some(Meta::empty())))
}

/// Removing a product that is not in the cart is not an error. The product
/// does not need to exist in the catalog any more.
pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let mut cart = Cart::load(session).await?;
    if cart.remove(product_id) {
        cart.save(session).await?;
        audit::record(
            &state.orm,
            user.user_id,
            "cart_remove",
            "cart",
            serde_json::json!({ "product_id": product_id }),
        )
        .await;
    }

    let view = cart_view(&state.orm, &cart).await?;
    Ok(ApiResponse::success(
        "Removed from cart",
        view,
        Some(Meta::empty()),
    ))
}

/// Summary shown before the buyer confirms checkout.
pub async fn checkout_summary(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let cart = Cart::load(session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".into()));
    }
    let view = cart_view(&state.orm, &cart).await?;
    Ok(ApiResponse::success(
        "Confirm your order",
        view,
        Some(Meta::empty()),
    ))
}

pub(crate) async fn cart_view<C: ConnectionTrait>(conn: &C, cart: &Cart) -> AppResult<CartView> {
    let products = fetch_cart_products(conn, cart).await?;
    Ok(CartView {
        items: cart.view(products),
        item_count: cart.item_count(),
        total_amount: cart.total_amount(),
    })
}

/// Resolves every product in the cart with a single query.
pub(crate) async fn fetch_cart_products<C: ConnectionTrait>(
    conn: &C,
    cart: &Cart,
) -> AppResult<Vec<Product>> {
    if cart.is_empty() {
        return Ok(Vec::new());
    }
    let products = Products::find()
        .filter(ProdCol::Id.is_in(cart.product_ids()))
        .all(conn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(products)
}

async fn catalog_product(state: &AppState, product_id: Uuid) -> AppResult<Product> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound)
}

fn parse_quantity(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok()
}

/// Rejects a change that would leave the line above [`Cart::MAX_LINE_QUANTITY`].
fn check_line_quantity(
    cart: &Cart,
    product_id: Uuid,
    quantity: u32,
    replace: bool,
) -> AppResult<()> {
    let current = if replace {
        0
    } else {
        cart.line(product_id).map_or(0, |line| line.quantity)
    };
    if u64::from(current) + u64::from(quantity) > u64::from(Cart::MAX_LINE_QUANTITY) {
        return Err(AppError::BadRequest(format!(
            "A cart line can hold at most {} units.",
            Cart::MAX_LINE_QUANTITY
        )));
    }
    Ok(())
}
