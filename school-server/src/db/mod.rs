//! Database layer - connection pool, schema, and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections) - no Arc<Mutex<Connection>>
//! - Relationship lists are loaded with one JOIN per page - no N+1 queries
//! - Cascade deletes run in a single transaction
//! - Absent rows surface as `DbError::NotFound`, never as empty results

pub mod pool;
pub mod schema;
pub mod repos;
pub mod memory;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use memory::MemoryStore;
