//! Password credentials.

pub mod hasher;

pub use hasher::{PasswordHasher, MAX_PASSWORD_BYTES};
