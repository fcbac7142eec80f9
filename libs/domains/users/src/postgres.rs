use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserFilter},
    repository::UserRepository,
};

/// Sea-ORM backed [`UserRepository`]
///
/// Uniqueness is enforced by the `users` table constraints; a violation
/// surfaces as [`UserError::Conflict`].
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(err: DbErr) -> UserError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        tracing::debug!(%detail, "Unique constraint violated");
        return UserError::conflict();
    }
    UserError::Internal(format!("Database error: {}", err))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let active_model: entity::ActiveModel = user.into();

        let model = active_model.insert(&self.db).await.map_err(db_error)?;

        tracing::info!(user_id = %model.id, username = %model.username, "Created user");
        Ok(model.into())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(
                Condition::any()
                    .add(entity::Column::Username.eq(username))
                    .add(entity::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_all(&self, filter: &UserFilter) -> UserResult<Vec<User>> {
        let mut query = entity::Entity::find();

        if let Some(username) = &filter.username {
            query = query.filter(entity::Column::Username.contains(username));
        }
        if let Some(tel) = &filter.tel {
            query = query.filter(entity::Column::Tel.contains(tel));
        }
        if let Some(nickname) = &filter.nickname {
            query = query.filter(entity::Column::Nickname.contains(nickname));
        }
        if let Some(status) = filter.status {
            query = query.filter(entity::Column::Status.eq(status));
        }
        if let Some(gender) = filter.gender {
            query = query.filter(entity::Column::Gender.eq(gender));
        }
        if let Some(deleted) = filter.deleted {
            query = query.filter(entity::Column::Deleted.eq(deleted));
        }

        // id breaks ties between rows created in the same instant
        let models = query
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let id = user.id;
        let active_model: entity::ActiveModel = user.into();

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound(id),
            other => db_error(other),
        })?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> UserResult<u64> {
        entity::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(username: &str) -> entity::Model {
        let now = Utc::now();
        entity::Model {
            id: Uuid::now_v7(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "$2b$04$hash".to_string(),
            salt: "00".repeat(16),
            nickname: Some("张三".to_string()),
            tel: Some("13800138000".to_string()),
            avatar: None,
            gender: Gender::Male,
            birthday: Some("1990-01-01".to_string()),
            status: 1,
            deleted: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_username_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model("zhangsan")]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let user = repo.find_by_username("zhangsan").await.unwrap().unwrap();
        assert_eq!(user.username, "zhangsan");
        assert_eq!(user.gender, Gender::Male);
    }

    #[tokio::test]
    async fn test_find_by_id_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        assert!(repo.find_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let id = Uuid::now_v7();
        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_errors_become_internal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("boom".to_string())])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let result = repo.find_by_username("zhangsan").await;
        assert!(matches!(result, Err(UserError::Internal(msg)) if msg.contains("boom")));
    }
}
