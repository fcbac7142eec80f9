//! Integration tests for the users domain
//!
//! These use real PostgreSQL via testcontainers to check:
//! - Column mapping through the sea-orm entity
//! - Unique constraints on username and email
//! - Filtered, ordered pagination
//! - The service on top of the Postgres repository
//!
//! Docker is required: `cargo test -p domain_users -- --ignored`

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn input(builder: &TestDataBuilder, prefix: &str) -> CreateUser {
    CreateUser {
        username: builder.username(prefix),
        password: "Pass123!".to_string(),
        email: builder.email(prefix),
        nickname: format!("{}-nick", prefix),
        tel: builder.tel(0),
        gender: Gender::Female,
        birthday: "1990-01-01".to_string(),
    }
}

fn service(db: &TestDatabase) -> UserService<PostgresUserRepository> {
    UserService::new(PostgresUserRepository::new(db.connection()), BcryptHasher::new(4))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_read_back() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_read_back");
    let service = service(&db);

    let created = service.create(input(&builder, "reader")).await.unwrap();
    assert_eq!(created.gender, Gender::Female);
    assert_eq!(created.status, 1);
    assert_eq!(created.deleted, 0);

    let stored = assert_some(repo.find_by_id(created.id).await.unwrap(), "stored user");
    assert_uuid_eq(stored.id, created.id, "stored id");
    assert_ne!(stored.password_hash, "Pass123!");
    assert_eq!(stored.salt.len(), 32);

    let by_name = service.find_by_username(&created.username).await.unwrap();
    assert_some(by_name, "lookup by username");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_constraints_map_to_conflict() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("unique_constraints");

    let first = input(&builder, "dup");
    let hashed = BcryptHasher::new(4)
        .hash_password_with_new_salt("Pass123!")
        .unwrap();
    repo.create(User::new(first.clone(), hashed.clone()))
        .await
        .unwrap();

    // bypass the service pre-check so the table constraint has to catch it
    let mut same_email = input(&builder, "other");
    same_email.email = first.email.clone();
    let result = repo.create(User::new(same_email, hashed)).await;

    assert!(matches!(result, Err(UserError::Conflict(_))));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pagination_and_filters() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    for i in 0..25 {
        let builder = TestDataBuilder::new(i);
        let prefix = if i % 5 == 0 { "zhang" } else { "li" };
        service.create(input(&builder, prefix)).await.unwrap();
    }

    let first = service.find_all(UserQuery::default()).await.unwrap();
    assert_eq!(first.len(), 10);

    let third = service
        .find_all(UserQuery {
            page: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(third.len(), 5);

    // creation order is stable across pages
    let everything = service
        .find_all(UserQuery {
            size: 100,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(everything[0].id, first[0].id);
    assert_eq!(everything[20].id, third[0].id);

    let zhang = service
        .find_all(UserQuery {
            username: Some("zhang".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(zhang.len(), 5);

    let live = service
        .find_all(UserQuery {
            deleted: Some(0),
            status: Some(1),
            gender: Some(Gender::Female),
            size: 100,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(live.len(), 25);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_remove() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("update_and_remove");

    let created = service.create(input(&builder, "editor")).await.unwrap();

    let repo = PostgresUserRepository::new(db.connection());
    let mut stored = assert_some(repo.find_by_id(created.id).await.unwrap(), "stored user");
    stored.updated_at = chrono::Utc::now() - chrono::Duration::seconds(5);
    let stored = repo.update(stored).await.unwrap();

    let updated = service
        .update(
            created.id,
            UpdateUser {
                nickname: Some("张三更新".to_string()),
                status: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let updated = assert_some(updated, "updated user");
    assert_eq!(updated.nickname.as_deref(), Some("张三更新"));
    assert_eq!(updated.status, 0);
    assert_eq!(updated.email, created.email);
    assert!(updated.updated_at > stored.updated_at);

    let removed = assert_some(service.remove(created.id).await.unwrap(), "removed user");
    assert_uuid_eq(removed.id, created.id, "removed id");
    assert!(service.find_by_id(created.id).await.unwrap().is_none());
    assert!(service.remove(created.id).await.unwrap().is_none());

    db.truncate_users().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_validate_user_against_stored_hash() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("validate_user");

    let created = service.create(input(&builder, "login")).await.unwrap();

    let ok = service
        .validate_user(&created.username, "Pass123!")
        .await
        .unwrap();
    assert_some(ok, "valid credentials");

    let wrong = service
        .validate_user(&created.username, "Wrong123!")
        .await
        .unwrap();
    assert!(wrong.is_none());
}
