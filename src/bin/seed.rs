use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use axum_marketplace::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    models::{StoreCategory, UserRole},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let vendor_id = ensure_user(&orm, "ferris", "vendor@example.com", "Vendor123", UserRole::Vendor).await?;
    let buyer_id = ensure_user(&orm, "crab", "buyer@example.com", "Buyer1234", UserRole::Buyer).await?;
    let store_id = ensure_store(&orm, vendor_id, "Rustacean Supply", StoreCategory::Fashion).await?;
    seed_products(&orm, store_id).await?;

    println!("Seed completed. Vendor ID: {vendor_id}, Buyer ID: {buyer_id}");
    Ok(())
}

async fn ensure_user(
    orm: &OrmConn,
    username: &str,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(orm)
        .await?
    {
        println!("User {username} already exists");
        return Ok(existing.id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn ensure_store(
    orm: &OrmConn,
    vendor_id: Uuid,
    name: &str,
    category: StoreCategory,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Stores::find()
        .filter(StoreCol::VendorId.eq(vendor_id))
        .filter(StoreCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor_id),
        name: Set(name.to_string()),
        description: Set("Gear for Rustaceans".to_string()),
        category: Set(category.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Seeded store {name}");
    Ok(store.id)
}

async fn seed_products(orm: &OrmConn, store_id: Uuid) -> anyhow::Result<()> {
    // Prices in cents.
    let products = vec![
        ("Axum Hoodie", "Warm hoodie for Rustaceans", 5500),
        ("Ferris Mug", "Coffee tastes better with Ferris", 1200),
        ("Rust Sticker Pack", "Decorate your laptop", 500),
        ("E-book: Async Rust", "Learn async Rust patterns", 2500),
    ];

    for (name, desc, price) in products {
        let exists = Products::find()
            .filter(ProductCol::StoreId.eq(store_id))
            .filter(ProductCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ProductActive {
            id: Set(Uuid::new_v4()),
            store_id: Set(store_id),
            name: Set(name.to_string()),
            description: Set(desc.to_string()),
            price: Set(price),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
