#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum_marketplace::{
    config::{AppConfig, MailConfig},
    db::sync_schema,
    entity::{
        products::{ActiveModel as ProductActive, Model as ProductModel},
        stores::{ActiveModel as StoreActive, Model as StoreModel},
        users::ActiveModel as UserActive,
    },
    mailer::{Mail, Mailer},
    middleware::auth::AuthUser,
    models::UserRole,
    state::AppState,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use tower_sessions::{MemoryStore, Session};
use uuid::Uuid;

/// Captures every mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Mail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: Mail) -> anyhow::Result<()> {
        anyhow::bail!("smtp unavailable")
    }
}

/// Never finishes within the test mail timeout.
pub struct SlowMailer;

#[async_trait]
impl Mailer for SlowMailer {
    async fn send(&self, _mail: Mail) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

pub async fn setup_state(mailer: Arc<dyn Mailer>) -> anyhow::Result<AppState> {
    setup_state_with_mail_timeout(mailer, Duration::from_secs(2)).await
}

pub async fn setup_state_with_mail_timeout(
    mailer: Arc<dyn Mailer>,
    mail_timeout: Duration,
) -> anyhow::Result<AppState> {
    // A single connection keeps the in-memory database alive and shared.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let orm = Database::connect(options).await?;
    sync_schema(&orm).await?;

    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        session_idle_minutes: 60,
        mail: MailConfig {
            from: "orders@test.local".into(),
            timeout: mail_timeout,
            smtp: None,
        },
    };

    Ok(AppState {
        orm,
        mailer,
        config: Arc::new(config),
    })
}

pub fn new_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

pub async fn create_user(state: &AppState, username: &str, role: UserRole) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set("Test".into()),
        last_name: Set(username.to_string()),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn create_store(state: &AppState, vendor: &AuthUser, name: &str) -> anyhow::Result<StoreModel> {
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.user_id),
        name: Set(name.to_string()),
        description: Set(String::new()),
        category: Set("books".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(store)
}

pub async fn create_product(
    state: &AppState,
    store: &StoreModel,
    name: &str,
    price_cents: i64,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store.id),
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        price: Set(price_cents),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}
