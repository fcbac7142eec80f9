use crate::models::{Gender, User};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the `users` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub nickname: Option<String>,
    pub tel: Option<String>,
    pub avatar: Option<String>,
    pub gender: Gender,
    pub birthday: Option<String>,
    pub status: i16,
    pub deleted: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            salt: model.salt,
            nickname: model.nickname,
            tel: model.tel,
            avatar: model.avatar,
            gender: model.gender,
            birthday: model.birthday,
            status: model.status,
            deleted: model.deleted,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

// Every column is set; used for inserts and full-row updates alike.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        ActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            salt: Set(user.salt),
            nickname: Set(user.nickname),
            tel: Set(user.tel),
            avatar: Set(user.avatar),
            gender: Set(user.gender),
            birthday: Set(user.birthday),
            status: Set(user.status),
            deleted: Set(user.deleted),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
