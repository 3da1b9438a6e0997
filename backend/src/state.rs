use std::sync::Arc;

use crate::{
    config::Config,
    repositories::UserStore,
    services::{AccountService, UserService},
    utils::{email::Mailer, jwt::TokenIssuer},
};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub users: Arc<UserService>,
    pub tokens: TokenIssuer,
    pub config: Config,
}

impl AppState {
    /// Wires every service against one store and one mailer.
    pub fn new(store: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        let tokens = TokenIssuer::from_config(&config);
        let accounts = AccountService::new(
            store.clone(),
            mailer,
            tokens.clone(),
            config.code_ttl(),
        );
        Self {
            accounts: Arc::new(accounts),
            users: Arc::new(UserService::new(store)),
            tokens,
            config,
        }
    }
}
