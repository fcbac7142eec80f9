use chrono::{DateTime, Utc};
use regex::Regex;
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::hasher::{HashedCredential, MAX_PASSWORD_BYTES};

/// `status` value of an enabled account
pub const STATUS_ACTIVE: i16 = 1;
/// `status` value of a disabled account
pub const STATUS_DISABLED: i16 = 0;
/// `deleted` value written for every stored account
pub const NOT_DELETED: i16 = 0;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Characters that satisfy the "special character" password rule
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Mainland mobile number: 11 digits starting with 13..19
static TEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9][0-9]{9}$").expect("valid tel regex"));

static BIRTHDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid birthday regex"));

fn validate_password_rules(password: &str) -> Result<(), ValidationError> {
    // the length rule counts chars, bcrypt counts bytes
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long").with_message(Cow::Borrowed(
            "password must be at most 72 bytes",
        )));
    }

    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if lower && upper && digit && special {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
            "password must contain lowercase, uppercase, digit and one of !@#$%^&*",
        )))
    }
}

/// Gender code stored as a single character
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Gender {
    #[serde(rename = "0")]
    #[strum(serialize = "0")]
    #[sea_orm(string_value = "0")]
    Male,
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    #[sea_orm(string_value = "1")]
    Female,
    #[default]
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    #[sea_orm(string_value = "2")]
    Unknown,
}

// Clients send the code either as "0" or as 0.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GenderVisitor;

        impl de::Visitor<'_> for GenderVisitor {
            type Value = Gender;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("gender code 0, 1 or 2")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Gender, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Gender, E> {
                match v {
                    0 => Ok(Gender::Male),
                    1 => Ok(Gender::Female),
                    2 => Ok(Gender::Unknown),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Gender, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(GenderVisitor)
    }
}

/// A user account as stored
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    pub salt: String,
    pub nickname: Option<String>,
    pub tel: Option<String>,
    pub avatar: Option<String>,
    pub gender: Gender,
    pub birthday: Option<String>,
    pub status: i16,
    pub deleted: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new account from validated input and its credential.
    ///
    /// The plaintext password is dropped here.
    pub fn new(input: CreateUser, credential: HashedCredential) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: input.username,
            email: input.email,
            password_hash: credential.hash,
            salt: credential.salt.into_inner(),
            nickname: Some(input.nickname),
            tel: Some(input.tel),
            avatar: None,
            gender: input.gender,
            birthday: Some(input.birthday),
            status: STATUS_ACTIVE,
            deleted: NOT_DELETED,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply only the supplied fields and bump `updated_at`.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(nickname) = update.nickname {
            self.nickname = Some(nickname);
        }
        if let Some(tel) = update.tel {
            self.tel = Some(tel);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(birthday) = update.birthday {
            self.birthday = Some(birthday);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Public view of an account; the hash and salt never leave the service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "zhangsan")]
    pub username: String,
    #[schema(example = "zhangsan@example.com")]
    pub email: String,
    pub nickname: Option<String>,
    pub tel: Option<String>,
    pub avatar: Option<String>,
    pub gender: Gender,
    pub birthday: Option<String>,
    /// 1 = active, 0 = disabled
    pub status: i16,
    pub deleted: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            nickname: user.nickname,
            tel: user.tel,
            avatar: user.avatar,
            gender: user.gender,
            birthday: user.birthday,
            status: user.status,
            deleted: user.deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Input for account creation
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Login name, surrounding whitespace is dropped
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, max = 20))]
    #[schema(example = "zhangsan", min_length = 3, max_length = 20)]
    pub username: String,
    #[validate(
        length(min = 6, max = 72),
        custom(function = "validate_password_rules")
    )]
    #[schema(example = "Pass123!", min_length = 6, write_only)]
    pub password: String,
    #[validate(email, length(max = 50))]
    #[schema(example = "zhangsan@example.com")]
    pub email: String,
    #[validate(length(max = 20))]
    #[schema(example = "张三")]
    pub nickname: String,
    #[validate(regex(path = *TEL, message = "tel must be an 11 digit mobile number"))]
    #[schema(example = "13800138000")]
    pub tel: String,
    pub gender: Gender,
    #[validate(regex(path = *BIRTHDAY, message = "birthday must be YYYY-MM-DD"))]
    #[schema(example = "1990-01-01")]
    pub birthday: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("tel", &self.tel)
            .field("gender", &self.gender)
            .field("birthday", &self.birthday)
            .finish()
    }
}

/// Partial update; omitted fields keep their values
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email, length(max = 50))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    #[schema(example = "张三更新")]
    pub nickname: Option<String>,
    #[validate(regex(path = *TEL, message = "tel must be an 11 digit mobile number"))]
    pub tel: Option<String>,
    #[validate(length(max = 255))]
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
    #[validate(regex(path = *BIRTHDAY, message = "birthday must be YYYY-MM-DD"))]
    pub birthday: Option<String>,
    /// 1 = active, 0 = disabled
    #[validate(range(min = 0, max = 1))]
    pub status: Option<i16>,
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|v| !v.is_empty()))
}

// Non-numeric input counts as "not supplied", 0 is a real value.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i16>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|v| v.trim().parse().ok()))
}

fn optional_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(v) if !v.is_empty() => v.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// List parameters: offset pagination plus optional filters
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    #[param(default = 1, minimum = 1)]
    pub page: u64,
    /// Page size
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100))]
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub size: u64,
    /// Substring of the username
    #[serde(default, deserialize_with = "non_empty")]
    pub username: Option<String>,
    /// Substring of the phone number
    #[serde(default, deserialize_with = "non_empty")]
    pub tel: Option<String>,
    /// Substring of the nickname
    #[serde(default, deserialize_with = "non_empty")]
    pub nickname: Option<String>,
    /// Exact status, 0 included
    #[serde(default, deserialize_with = "lenient_int")]
    #[param(value_type = Option<i16>)]
    pub status: Option<i16>,
    /// Exact gender code
    #[serde(default, deserialize_with = "optional_gender")]
    #[param(value_type = Option<String>, pattern = "^[012]$")]
    pub gender: Option<Gender>,
    /// Exact deleted flag, 0 included
    #[serde(default, deserialize_with = "lenient_int")]
    #[param(value_type = Option<i16>)]
    pub deleted: Option<i16>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            username: None,
            tel: None,
            nickname: None,
            status: None,
            gender: None,
            deleted: None,
        }
    }
}

/// Storage-level listing criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub username: Option<String>,
    pub tel: Option<String>,
    pub nickname: Option<String>,
    pub status: Option<i16>,
    pub gender: Option<Gender>,
    pub deleted: Option<i16>,
    pub offset: u64,
    pub limit: u64,
}

impl UserFilter {
    /// Whether `user` passes every supplied criterion (pagination aside).
    pub fn matches(&self, user: &User) -> bool {
        fn contains(field: &Option<String>, needle: &Option<String>) -> bool {
            match needle {
                Some(needle) => field.as_deref().is_some_and(|f| f.contains(needle.as_str())),
                None => true,
            }
        }

        self.username
            .as_deref()
            .is_none_or(|needle| user.username.contains(needle))
            && contains(&user.tel, &self.tel)
            && contains(&user.nickname, &self.nickname)
            && self.status.is_none_or(|s| user.status == s)
            && self.gender.is_none_or(|g| user.gender == g)
            && self.deleted.is_none_or(|d| user.deleted == d)
    }
}

impl From<UserQuery> for UserFilter {
    fn from(query: UserQuery) -> Self {
        Self {
            offset: query.page.saturating_sub(1).saturating_mul(query.size),
            limit: query.size,
            username: query.username,
            tel: query.tel,
            nickname: query.nickname,
            status: query.status,
            gender: query.gender,
            deleted: query.deleted,
        }
    }
}

/// Username/password pair for the credential check
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    #[schema(example = "zhangsan")]
    pub username: String,
    #[validate(length(min = 1))]
    #[schema(example = "Pass123!", write_only)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Salt;

    fn valid_input() -> CreateUser {
        serde_json::from_value(serde_json::json!({
            "username": "zhangsan",
            "password": "Pass123!",
            "email": "zhangsan@example.com",
            "nickname": "张三",
            "tel": "13800138000",
            "gender": "0",
            "birthday": "1990-01-01"
        }))
        .unwrap()
    }

    fn field_fails(input: &CreateUser, field: &str) -> bool {
        input
            .validate()
            .err()
            .is_some_and(|e| e.field_errors().contains_key(field))
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_username_is_trimmed_before_length_check() {
        let mut value = serde_json::json!({
            "username": "  ab  ",
            "password": "Pass123!",
            "email": "zhangsan@example.com",
            "nickname": "张三",
            "tel": "13800138000",
            "gender": 0,
            "birthday": "1990-01-01"
        });
        let input: CreateUser = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(input.username, "ab");
        assert!(field_fails(&input, "username"));

        value["username"] = serde_json::json!("  abc ");
        let input: CreateUser = serde_json::from_value(value).unwrap();
        assert_eq!(input.username, "abc");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_password_rules() {
        for weak in ["Pa1!", "password1!", "PASSWORD1!", "Password!", "Password1", "Pass123?"] {
            let mut input = valid_input();
            input.password = weak.to_string();
            assert!(field_fails(&input, "password"), "{} should be rejected", weak);
        }
    }

    #[test]
    fn test_multibyte_password_over_72_bytes_rejected() {
        let mut input = valid_input();
        input.password = format!("Aa1!{}", "密".repeat(30));
        assert_eq!(input.password.chars().count(), 34);
        assert!(field_fails(&input, "password"));

        input.password = format!("Aa1!{}", "密".repeat(22));
        assert_eq!(input.password.len(), 70);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_tel_rules() {
        for bad in ["12800138000", "1380013800", "138001380001", "1380013800a", "１3800138000"] {
            let mut input = valid_input();
            input.tel = bad.to_string();
            assert!(field_fails(&input, "tel"), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_email_and_birthday_rules() {
        let mut input = valid_input();
        input.email = "not-an-email".to_string();
        assert!(field_fails(&input, "email"));

        let mut input = valid_input();
        input.birthday = "1990/01/01".to_string();
        assert!(field_fails(&input, "birthday"));
    }

    #[test]
    fn test_gender_accepts_string_or_number() {
        assert_eq!(serde_json::from_str::<Gender>("\"1\"").unwrap(), Gender::Female);
        assert_eq!(serde_json::from_str::<Gender>("2").unwrap(), Gender::Unknown);
        assert!(serde_json::from_str::<Gender>("\"3\"").is_err());
        assert!(serde_json::from_str::<Gender>("-1").is_err());
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"0\"");
    }

    #[test]
    fn test_debug_never_prints_password() {
        let rendered = format!("{:?}", valid_input());
        assert!(!rendered.contains("Pass123!"));

        let login = LoginRequest {
            username: "zhangsan".into(),
            password: "Pass123!".into(),
        };
        assert!(!format!("{:?}", login).contains("Pass123!"));
    }

    #[test]
    fn test_new_user_drops_plaintext() {
        let credential = HashedCredential {
            hash: "$2b$04$hash".to_string(),
            salt: Salt::from("00".repeat(16)),
        };
        let user = User::new(valid_input(), credential);

        assert_eq!(user.password_hash, "$2b$04$hash");
        assert_eq!(user.status, STATUS_ACTIVE);
        assert_eq!(user.deleted, NOT_DELETED);
        assert_eq!(user.gender, Gender::Male);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_apply_update_changes_only_supplied_fields() {
        let credential = HashedCredential {
            hash: "h".to_string(),
            salt: Salt::from(String::new()),
        };
        let mut user = User::new(valid_input(), credential);
        user.updated_at = Utc::now() - chrono::Duration::seconds(5);
        let before = user.clone();

        user.apply_update(UpdateUser {
            nickname: Some("张三更新".to_string()),
            ..Default::default()
        });

        assert_eq!(user.nickname.as_deref(), Some("张三更新"));
        assert_eq!(user.email, before.email);
        assert_eq!(user.tel, before.tel);
        assert_eq!(user.gender, before.gender);
        assert_eq!(user.created_at, before.created_at);
        assert!(user.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_status_range() {
        let update = UpdateUser {
            status: Some(2),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_query_to_filter_offsets() {
        let filter = UserFilter::from(UserQuery {
            page: 3,
            size: 10,
            ..Default::default()
        });
        assert_eq!(filter.offset, 20);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_filter_matching() {
        let credential = HashedCredential {
            hash: "h".to_string(),
            salt: Salt::from(String::new()),
        };
        let user = User::new(valid_input(), credential);

        let by_name = UserFilter {
            username: Some("zhang".into()),
            ..Default::default()
        };
        assert!(by_name.matches(&user));

        let disabled = UserFilter {
            status: Some(STATUS_DISABLED),
            ..Default::default()
        };
        assert!(!disabled.matches(&user));

        let not_deleted = UserFilter {
            deleted: Some(0),
            gender: Some(Gender::Male),
            tel: Some("0013".into()),
            ..Default::default()
        };
        assert!(not_deleted.matches(&user));
    }
}
