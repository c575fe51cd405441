//! school-server: student and course records over HTTP
//!
//! Layered as models -> db (repository traits with PostgreSQL and
//! in-memory backends) -> service -> http. [`AppState`] wires a backend
//! into the services and [`http::build_router`] serves them.

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod seed;
pub mod service;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;
