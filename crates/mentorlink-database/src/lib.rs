//! # mentorlink-database
//!
//! Persistence for the MentorLink coordination core. The engines talk to
//! the narrow store traits in [`store`]; [`repositories`] implements them on
//! PostgreSQL and [`memory`] implements them on process-local maps.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MessageStore, RequestStore, SessionStore, Stores, UserDirectory};
