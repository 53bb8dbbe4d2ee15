mod common;

use std::sync::Arc;

use axum::extract::State;
use axum_marketplace::routes::health::health_check;
use common::{RecordingMailer, setup_state};

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let state = setup_state(Arc::new(RecordingMailer::default())).await?;

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    Ok(())
}
