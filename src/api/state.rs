use std::sync::Arc;

use sqlx::{Pool, Sqlite};

use crate::auth::TokenService;
use crate::config::Config;
use crate::eth::LedgerGateway;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub tokens: Arc<TokenService>,
    pub gateway: Arc<dyn LedgerGateway>,
    pub config: Arc<Config>,
}
