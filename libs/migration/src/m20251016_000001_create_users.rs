use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len(Users::Username, 20).unique_key())
                    .col(string_len(Users::Email, 50).unique_key())
                    .col(string_len(Users::PasswordHash, 100))
                    .col(string_len(Users::Salt, 64))
                    .col(string_len_null(Users::Nickname, 20))
                    .col(string_len_null(Users::Tel, 20))
                    .col(string_len_null(Users::Avatar, 255))
                    .col(string_len(Users::Gender, 1).default("2"))
                    .col(string_len_null(Users::Birthday, 20))
                    .col(small_integer(Users::Status).default(1))
                    .col(small_integer(Users::Deleted).default(0))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing pages through users in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .col(Users::Id)
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            r#"
            CREATE OR REPLACE FUNCTION users_touch_updated_at()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .await?;
        db.execute_unprepared(
            r#"
            CREATE TRIGGER users_touch_updated_at
                BEFORE UPDATE ON users
                FOR EACH ROW
                EXECUTE FUNCTION users_touch_updated_at()
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TRIGGER IF EXISTS users_touch_updated_at ON users")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS users_touch_updated_at()")
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Salt,
    Nickname,
    Tel,
    Avatar,
    Gender,
    Birthday,
    Status,
    Deleted,
    CreatedAt,
    UpdatedAt,
}
