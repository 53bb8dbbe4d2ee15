use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::stores::{CreateStoreRequest, StoreList, UpdateStoreRequest},
    entity::stores::{ActiveModel, Column, Entity as Stores, Model as StoreModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_vendor},
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::StoreQuery,
    state::AppState,
};

pub async fn list_stores(state: &AppState, query: StoreQuery) -> AppResult<ApiResponse<StoreList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(category) = query.category {
        condition = condition.add(Column::Category.eq(category.as_str()));
    }

    let finder = Stores::find().filter(condition).order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Store::from)
        .collect();

    Ok(ApiResponse::success(
        "Stores",
        StoreList { items },
        Some(Meta::paged(page, limit, total)),
    ))
}

pub async fn get_store(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Store>> {
    let store = Stores::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Store", Store::from(store), None))
}

pub async fn create_store(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_vendor(user)?;
    let name = required(payload.name, "store name")?;

    let store = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(user.user_id),
        name: Set(name),
        description: Set(payload.description.trim().to_string()),
        category: Set(payload.category.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "store_create",
        "stores",
        serde_json::json!({ "store_id": store.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Store created",
        Store::from(store),
        Some(Meta::empty()),
    ))
}

pub async fn update_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_vendor(user)?;
    let existing = owned_store(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required(name, "store name")?);
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category.as_str().to_string());
    }
    let store = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "store_update",
        "stores",
        serde_json::json!({ "store_id": store.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Store::from(store),
        Some(Meta::empty()),
    ))
}

pub async fn delete_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_vendor(user)?;
    let store = owned_store(state, user, id).await?;
    Stores::delete_by_id(store.id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "store_delete",
        "stores",
        serde_json::json!({ "store_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Fetches a store and checks that `user` is its vendor.
pub(crate) async fn owned_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<StoreModel> {
    let store = Stores::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if store.vendor_id != user.user_id {
        return Err(AppError::Forbidden("you can only manage your own stores".into()));
    }
    Ok(store)
}

pub(crate) fn required(value: String, field: &str) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value)
}
