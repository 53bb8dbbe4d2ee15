use axum_marketplace::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    let applied = run_migrations(&orm).await?;
    if applied == 0 {
        anyhow::bail!("no .sql files found in ./migrations");
    }
    println!("Applied {applied} migration file(s)");
    Ok(())
}
