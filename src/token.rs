//! Local token issuance: signed access tokens and opaque refresh tokens.

/// HS256 access-token minting.
pub mod jwt;
/// Opaque refresh-token issuance.
pub mod refresh;

pub use jwt::*;
pub use refresh::*;
