//! Infrastructure Layer
//!
//! Concrete adapters for the domain ports: Postgres for the local
//! user store, HTTP for the cabinet backend.

pub mod cabinet;
pub mod postgres;

pub use cabinet::CabinetClient;
pub use postgres::PgUserRepository;
