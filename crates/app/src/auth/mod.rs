//! Authentication
//!
//! Issues opaque shopper session tokens and resolves a bearer token back to
//! the user it was issued for. Only the token's hash is stored.

mod errors;
pub mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use service::*;
pub use token::*;
