//! Order Handlers

pub(crate) mod confirm;
pub(crate) mod get;
pub(crate) mod index;
