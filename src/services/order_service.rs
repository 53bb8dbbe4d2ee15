use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    audit,
    cart::Cart,
    dto::orders::{CheckoutReceipt, OrderList, OrderWithItems},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    mailer::order_confirmation,
    middleware::auth::{AuthUser, ensure_buyer},
    models::{Order, OrderItem, OrderStatus},
    money,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::fetch_cart_products,
    state::AppState,
};

/// Turns the session cart into a completed order.
///
/// The order row and its items are written in one transaction. The cart is
/// cleared only once that transaction has committed, and the confirmation
/// mail goes out afterwards: a delivery failure or timeout is logged and
/// reported in the receipt, but the order stands.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    session: &Session,
) -> AppResult<ApiResponse<CheckoutReceipt>> {
    ensure_buyer(user)?;

    let cart = Cart::load(session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".into()));
    }

    let buyer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

    let lines = cart.view(fetch_cart_products(&state.orm, &cart).await?);
    if lines.len() != cart.product_ids().len() {
        let missing: Vec<String> = cart
            .product_ids()
            .into_iter()
            .filter(|id| !lines.iter().any(|line| line.product.id == *id))
            .map(|id| id.to_string())
            .collect();
        return Err(AppError::BadRequest(format!(
            "Products no longer available: {}; remove them from your cart",
            missing.join(", ")
        )));
    }

    // Rows are priced from the captured line prices, normalized to cents, so
    // the stored total is exactly the sum of its items.
    let mut priced = Vec::with_capacity(lines.len());
    let mut total_cents: i64 = 0;
    for line in &lines {
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| AppError::BadRequest("Cart has invalid quantity".into()))?;
        let price = money::to_cents(line.price)?;
        total_cents = price
            .checked_mul(i64::from(quantity))
            .and_then(|subtotal| total_cents.checked_add(subtotal))
            .ok_or_else(|| AppError::BadRequest("Order total is out of range".into()))?;
        priced.push((line.product.id, quantity, price));
    }

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_amount: Set(total_cents),
        status: Set(OrderStatus::Completed.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(priced.len());
    for (product_id, quantity, price) in priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;
    tracing::info!(order_id = %order.id, user_id = %user.user_id, items = order_items.len(), "order committed");

    if let Err(err) = Cart::clear(session).await {
        tracing::error!(error = %err, order_id = %order.id, "failed to clear cart after checkout");
    }

    let mail = order_confirmation(&buyer, &lines, money::from_cents(total_cents));
    let confirmation_sent =
        match tokio::time::timeout(state.config.mail.timeout, state.mailer.send(mail)).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, order_id = %order.id, "order confirmation mail failed");
                false
            }
            Err(_) => {
                tracing::warn!(order_id = %order.id, "order confirmation mail timed out");
                false
            }
        };

    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "confirmation_sent": confirmation_sent }),
    )
    .await;

    let message = if confirmation_sent {
        "Order placed successfully! Check your email for confirmation."
    } else {
        "Order placed successfully! The confirmation email could not be sent."
    };

    Ok(ApiResponse::success(
        message,
        CheckoutReceipt {
            order: Order::from(order),
            items: order_items,
            confirmation_sent,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await?;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(Meta::paged(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Moves one of the caller's orders to `cancelled`. Reviews already marked
/// as verified purchases keep their flag.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let owned = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(OrderCol::Id.eq(id));

    let txn = state.orm.begin().await?;

    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(OrderStatus::Cancelled.as_str()))
        .filter(owned.clone())
        .filter(OrderCol::Status.ne(OrderStatus::Cancelled.as_str()))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        let existing = Orders::find().filter(owned).one(&txn).await?;
        return Err(match existing {
            Some(_) => AppError::BadRequest("Order already cancelled".into()),
            None => AppError::NotFound,
        });
    }

    let order = Orders::find()
        .filter(owned)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}
