//! # mentorlink-service
//!
//! The coordination engines. Each service validates a command, mutates
//! state through the store traits, and hands the resulting event to an
//! [`EventPublisher`] addressed to the affected users' private channels.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod conversation;
pub mod directory;
pub mod publisher;
pub mod request;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use conversation::{ConversationService, PostMessage};
pub use directory::DisplayResolver;
pub use publisher::{DomainEvent, EventPublisher, NoopPublisher};
pub use request::{RequestService, SendRequest};
pub use session::{CreateSessionRequest, SessionService};
