//! Mentor/mentee connection requests.

pub mod model;
pub mod status;

pub use model::{ConnectionRequest, RequestView};
pub use status::RequestStatus;
