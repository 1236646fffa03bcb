//! apigw-client - SigV4-signed HTTP client for API Gateway endpoints

pub mod config;
pub mod gateway;
pub mod transport;

pub use config::{Config, HttpConfig, Profile};
pub use gateway::{
    ClientError, Credentials, GatewayClient, GatewayClientBuilder, GatewayError, GatewayRequest,
    GatewayRequestBuilder, GatewayResponse,
};
pub use transport::{HttpTransport, HyperTransport, TransportError};
