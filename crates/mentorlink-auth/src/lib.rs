//! # mentorlink-auth
//!
//! Verification of the identity tokens issued by the platform's login
//! service. Every REST call and every bus handshake presents an HS256 JWT;
//! the decoder turns it into [`Claims`] from which callers build their
//! request context.
//!
//! ## Modules
//!
//! - `jwt`: claims, token decoding, and token minting for tests and tooling

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
