pub mod access;
pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod remote;
pub mod sample;
pub mod schema;
pub mod stats;
pub mod storage;
pub mod store;
pub mod support;
pub mod sync;
pub mod users;
pub mod validate;
pub mod wards;

pub use context::AppContext;
pub use error::{StoreError, StoreResult};
