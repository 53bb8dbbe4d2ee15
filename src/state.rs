use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn, mailer::Mailer};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
}
