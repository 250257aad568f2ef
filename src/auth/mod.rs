//! Identity boundary. Sign-in happens at an external identity provider; this
//! service only verifies its bearer tokens.

mod claims;
pub mod extractors;
pub mod jwt;

pub use claims::{Claims, TokenKind};
pub use extractors::AuthUser;
pub use jwt::JwtKeys;
