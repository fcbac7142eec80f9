use axum::Router;
use domain_users::{
    BcryptHasher, InMemoryUserRepository, PostgresUserRepository, UserService, handlers,
};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let hasher = BcryptHasher::from_config(&state.config.hashing);

    match &state.db {
        Some(db) => {
            let repository = PostgresUserRepository::new(db.clone());
            handlers::router(UserService::new(repository, hasher))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory and lost on restart");
            handlers::router(UserService::new(InMemoryUserRepository::new(), hasher))
        }
    }
}
