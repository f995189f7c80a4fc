//! Token domain module.

pub mod amount;
pub mod types;

pub use types::{ScamAnnotation, Token, TokenKind, NATIVE_SENTINEL};
