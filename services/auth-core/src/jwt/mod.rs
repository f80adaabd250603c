//! Access tokens: claims and the HMAC codec that signs and verifies them.

pub mod claims;
pub mod codec;

pub use claims::Claims;
pub use codec::AccessTokenCodec;
