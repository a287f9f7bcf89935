//! Process-local store implementations.
//!
//! Each store keeps its rows in a `HashMap` behind a tokio `RwLock`; every
//! check-then-write happens under a single write guard, which gives the same
//! guarantees as the PostgreSQL unique index and conditional updates.

pub mod directory;
pub mod message;
pub mod request;
pub mod session;

pub use directory::MemoryDirectory;
pub use message::MemoryMessageStore;
pub use request::MemoryRequestStore;
pub use session::MemorySessionStore;
