//! ledgerctl-server: PostgreSQL storage and the HTTP API
//!
//! Companies own packages; packages own charges, payments and uploaded
//! documents. Any write below a company flags it (and the package) as
//! having updates until the flags are reset.

pub mod db;
pub mod http;
pub mod models;
pub mod storage;

pub use db::{create_pool, create_pool_with_options, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use storage::{StorageError, UploadStore};
