//! Users Domain
//!
//! User accounts for the blog platform: registration, lookup, filtered
//! listing, partial updates, deletion and a username/password check.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /user
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │   Service   │ ──► │   Hasher    │  ← bcrypt, salt per account
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait, in-memory and Postgres implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← account record, inputs with validation rules
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     hasher::BcryptHasher,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let service = UserService::new(InMemoryUserRepository::new(), BcryptHasher::default());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod hasher;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use hasher::{BcryptHasher, CredentialHasher, HashingConfig};
pub use models::{
    CreateUser, Gender, LoginRequest, UpdateUser, User, UserFilter, UserQuery, UserResponse,
};
pub use postgres::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
