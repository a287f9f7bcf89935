//! User identities as seen through the external directory.

pub mod role;
pub mod summary;

pub use role::UserRole;
pub use summary::UserSummary;
