//! Basic usage example for apigw-client
//!
//! Reads the gateway profile from the environment (APIGW_ENDPOINT,
//! AWS_REGION, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, APIGW_API_KEY)
//! and issues one signed POST.
//!
//! Run with:
//! ```
//! RUST_LOG=apigw_client=debug cargo run --example basic_usage
//! ```

use apigw_client::{config, ClientError, GatewayClientBuilder, GatewayRequestBuilder};
use hyper::Method;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::load_from_env()?;
    let profile = config
        .get_profile(None)
        .ok_or_else(|| anyhow::anyhow!("No profile found in configuration"))?;

    let client = GatewayClientBuilder::from_profile(profile, &config.http).build()?;

    let request = GatewayRequestBuilder::new()
        .with_http_method(Method::POST)
        .with_resource_path("/test/orders")
        .with_header("Content-Type", "application/json")
        .with_query_parameter("expand", "items")
        .with_body(r#"{"sku":"ABC-1","quantity":2}"#)
        .build();

    match client.execute(&request).await {
        Ok(response) => {
            let status = response.status_code();
            println!("{} {}", status, response.into_body());
        }
        Err(ClientError::Gateway(err)) => {
            println!("gateway rejected request: {} {}", err.status_code(), err.error_message());
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
