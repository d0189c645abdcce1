//! Exchanges an IAM API key for an access token and an IMS token against live IAM.
//!
//! ```sh
//! IAM_URL=https://iam.cloud.ibm.com IAM_CLIENT_ID=bx IAM_CLIENT_SECRET=bx \
//! IAM_API_KEY=... cargo run --example exchange_api_key
//! ```

// std
use std::env;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use iam_token_exchange::{config::AuthConfiguration, exchange::TokenExchangeClient};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let iam_url = Url::parse(&env::var("IAM_URL")?)?;
	let config =
		AuthConfiguration::new(iam_url, env::var("IAM_CLIENT_ID")?, env::var("IAM_CLIENT_SECRET")?);
	let client = TokenExchangeClient::new(config);
	let api_key = env::var("IAM_API_KEY")?;
	let access = client.exchange_iam_api_key_for_access_token(&api_key).await?;

	println!("Access token issued ({} bytes).", access.token.expose().len());

	let ims = client.exchange_iam_api_key_for_ims_token(&api_key).await?;

	println!("IMS token issued for user {} ({} bytes).", ims.user_id, ims.token.expose().len());

	Ok(())
}
