use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for user account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. A taken username or email yields `Conflict`.
    async fn create(&self, user: User) -> UserResult<User>;

    /// First account whose username equals `username` or whose email equals `email`
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> UserResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// One page of matching accounts, oldest first
    async fn find_all(&self, filter: &UserFilter) -> UserResult<Vec<User>>;

    /// Persist a full record. Missing id yields `NotFound`.
    async fn update(&self, user: User) -> UserResult<User>;

    /// Remove by id; `false` when nothing was there
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Total stored accounts
    async fn count(&self) -> UserResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Records are kept in insertion order, which matches creation order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn taken(users: &[User], candidate: &User) -> bool {
    users.iter().any(|u| {
        u.id != candidate.id && (u.username == candidate.username || u.email == candidate.email)
    })
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if taken(&users, &user) {
            return Err(UserError::conflict());
        }

        users.push(user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self, filter: &UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);

        Ok(users
            .iter()
            .filter(|u| filter.matches(u))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if taken(&users, &user) {
            return Err(UserError::conflict());
        }

        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(UserError::NotFound(user.id))?;
        *slot = user.clone();

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() < before {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }
}
