//! API Gateway client module
//!
//! This module provides:
//! - Request/response values and their builders
//! - The gateway client and its validating builder
//! - AWS SigV4 signing for the execute-api service
//! - The client error taxonomy

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod signer;
pub mod signing;

pub use client::{GatewayClient, GatewayClientBuilder};
pub use error::{compact_whitespace, ClientError, GatewayError, Result};
pub use request::{GatewayRequest, GatewayRequestBuilder, QueryParameters};
pub use response::GatewayResponse;
pub use signer::{Credentials, SigV4Signer};
pub use signing::{OutboundRequest, SigningClient, API_KEY_HEADER};
