pub mod database;
pub mod error;
pub mod models;
pub mod repositories;

pub use database::*;
pub use error::*;
pub use models::*;
pub use repositories::*;
