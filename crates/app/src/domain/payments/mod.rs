//! Payments

mod gateway;
pub mod models;

pub use gateway::{
    DEFAULT_GATEWAY_TIMEOUT, GatewayConfig, HttpPaymentGateway, MockPaymentGateway, PaymentGateway,
};
