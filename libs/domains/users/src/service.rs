use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::hasher::{CredentialHasher, HashedCredential};
use crate::models::{CreateUser, UpdateUser, User, UserFilter, UserQuery, UserResponse};
use crate::repository::UserRepository;

/// Account rules on top of a [`UserRepository`]
///
/// Lookups report a missing account as `Ok(None)`; mapping that to a 404 is
/// the HTTP layer's job.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    // verified against when the username is unknown
    dummy_hash: Arc<OnceCell<String>>,
}

const DUMMY_PASSWORD: &str = "not-a-real-account-password";

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, hasher: impl CredentialHasher + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher: Arc::new(hasher),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create an account, rejecting a taken username or email.
    ///
    /// A unique violation raised by storage after the pre-check passed (two
    /// concurrent creations) comes back as the same `Conflict`.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, mut input: CreateUser) -> UserResult<UserResponse> {
        let existing = self
            .repository
            .find_by_username_or_email(&input.username, &input.email)
            .await?;
        if existing.is_some() {
            tracing::info!("Username or email already taken");
            return Err(UserError::conflict());
        }

        let password = std::mem::take(&mut input.password);
        let credential = self.hash(password).await?;

        let created = self.repository.create(User::new(input, credential)).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> UserResult<Option<UserResponse>> {
        Ok(self
            .repository
            .find_by_username(username)
            .await?
            .map(Into::into))
    }

    /// The account for `username` if `password` matches its hash.
    ///
    /// Unknown username and wrong password both yield `None`. An unknown
    /// username still pays for one bcrypt verification so the two cases
    /// take the same time.
    #[instrument(skip(self, password))]
    pub async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> UserResult<Option<UserResponse>> {
        let user = self.repository.find_by_username(username).await?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?.to_owned(),
        };

        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let span = tracing::Span::current();
        let valid = tokio::task::spawn_blocking(move || {
            span.in_scope(|| hasher.validate_password(&password, &hash))
        })
        .await
        .map_err(|e| UserError::Internal(format!("Password check failed: {}", e)))?;

        Ok(user.filter(|_| valid).map(Into::into))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> UserResult<Option<UserResponse>> {
        Ok(self.repository.find_by_id(id).await?.map(Into::into))
    }

    /// One page of accounts in creation order
    #[instrument(skip(self))]
    pub async fn find_all(&self, query: UserQuery) -> UserResult<Vec<UserResponse>> {
        let filter = UserFilter::from(query);
        let users = self.repository.find_all(&filter).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Merge the supplied fields onto the stored account.
    #[instrument(skip(self, input), fields(user_id = %id))]
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<Option<UserResponse>> {
        let Some(mut user) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        user.apply_update(input);

        match self.repository.update(user).await {
            Ok(updated) => Ok(Some(updated.into())),
            // removed between the read and the write
            Err(UserError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete the account and return its last known values.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn remove(&self, id: Uuid) -> UserResult<Option<UserResponse>> {
        let Some(user) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        if self.repository.delete(id).await? {
            Ok(Some(user.into()))
        } else {
            Ok(None)
        }
    }

    async fn dummy_hash(&self) -> UserResult<&str> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async {
                self.hash(DUMMY_PASSWORD.to_string())
                    .await
                    .map(|credential| credential.hash)
            })
            .await?;
        Ok(hash)
    }

    async fn hash(&self, password: String) -> UserResult<HashedCredential> {
        let hasher = Arc::clone(&self.hasher);
        let span = tracing::Span::current();
        // bcrypt is CPU bound, keep it off the runtime threads
        let credential = tokio::task::spawn_blocking(move || {
            span.in_scope(|| hasher.hash_password_with_new_salt(&password))
        })
        .await
        .map_err(|e| UserError::Internal(format!("Hashing task failed: {}", e)))??;
        Ok(credential)
    }
}
