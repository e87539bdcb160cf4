pub mod collation;
pub mod db;
pub mod error;
pub mod schema;
pub mod stats;

pub use error::{StoreError, StoreResult};
