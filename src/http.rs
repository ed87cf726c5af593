//! Transport primitives for provider token and user-info calls.
//!
//! The module exposes [`ProviderHttpClient`] so downstream crates can integrate custom
//! HTTP stacks; the broker only ever needs a form-encoded POST to the token endpoint and
//! a bearer-authenticated GET to the user-info endpoint. Responses come back whole —
//! status plus body — because flow code decides how a non-2xx answer is classified.
//! No call is retried here; retry policy belongs to the caller.

// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by transport implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ProviderResponse, TransportError>> + 'a + Send>>;

/// Raw response surfaced to the flows.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body, decoded as text.
	pub body: String,
}
impl ProviderResponse {
	/// Checks whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of the two provider calls this crate makes.
///
/// Implementations must be `Send + Sync + 'static` so they can sit behind an `Arc` shared
/// across concurrent callback handlers, and must not follow redirects on the token
/// endpoint, matching OAuth 2.0 guidance that token endpoints answer directly.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// POSTs an `application/x-www-form-urlencoded` body to the token endpoint.
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		params: Vec<(String, String)>,
	) -> TransportFuture<'a>;

	/// GETs the user-info endpoint with a bearer access token, accepting JSON.
	fn get_with_bearer<'a>(
		&'a self,
		endpoint: &'a Url,
		access_token: &'a str,
	) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub reqwest::Client);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self(client)
	}

	async fn read(response: reqwest::Response) -> Result<ProviderResponse, TransportError> {
		let status = response.status().as_u16();
		let body = response.text().await?;

		Ok(ProviderResponse { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestHttpClient").finish_non_exhaustive()
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn post_form<'a>(
		&'a self,
		endpoint: &'a Url,
		params: Vec<(String, String)>,
	) -> TransportFuture<'a> {
		let client = self.0.clone();
		let endpoint = endpoint.clone();

		Box::pin(async move {
			let response = client.post(endpoint).form(&params).send().await?;

			Self::read(response).await
		})
	}

	fn get_with_bearer<'a>(
		&'a self,
		endpoint: &'a Url,
		access_token: &'a str,
	) -> TransportFuture<'a> {
		let client = self.0.clone();
		let endpoint = endpoint.clone();

		Box::pin(async move {
			let response = client
				.get(endpoint)
				.bearer_auth(access_token)
				.header(reqwest::header::ACCEPT, "application/json")
				.send()
				.await?;

			Self::read(response).await
		})
	}
}
