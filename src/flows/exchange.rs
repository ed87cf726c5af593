// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	http::ProviderHttpClient,
	identity::ExternalProfile,
	obs::{FlowKind, FlowOutcome, record_flow_outcome},
	secret::SecretString,
};

/// Token-endpoint payload with provider-tolerant field types.
///
/// Providers are sloppy: `expires_in` shows up as a number or a numeric string, extra
/// fields abound. Everything is optional and unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: Option<String>,
	refresh_token: Option<String>,
	id_token: Option<String>,
	expires_in: Option<LooseNumber>,
	token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
	Number(i64),
	Text(String),
}
impl LooseNumber {
	fn as_seconds(&self) -> Option<i64> {
		match self {
			LooseNumber::Number(value) => Some(*value),
			LooseNumber::Text(value) => value.trim().parse().ok(),
		}
	}
}

impl<C> super::SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Redeems an authorization code for provider tokens and a normalized profile.
	///
	/// The provider is resolved from the consumed state's recorded name, never from
	/// caller input, so a callback cannot be replayed against a different provider's
	/// endpoints. An invalid state fails before any network traffic.
	pub async fn exchange(&self, code: &str, state_value: &str) -> Result<ExternalProfile> {
		record_flow_outcome(FlowKind::Exchange, FlowOutcome::Attempt);

		let state = self.state_store.consume(state_value).ok_or(Error::InvalidState)?;
		let provider = self.registry.require(&state.provider)?;
		let mut params = vec![
			("grant_type".to_owned(), "authorization_code".to_owned()),
			("code".to_owned(), code.to_owned()),
			("redirect_uri".to_owned(), state.redirect_uri.clone()),
			("client_id".to_owned(), provider.client_id.clone()),
		];

		if let Some(secret) = provider.client_secret.as_ref().filter(|secret| !secret.is_empty()) {
			params.push(("client_secret".to_owned(), secret.expose().to_owned()));
		}

		params.push(("code_verifier".to_owned(), state.code_verifier.expose().to_owned()));

		let response = self.http_client.post_form(&provider.token_uri, params).await?;

		if !response.is_success() {
			record_flow_outcome(FlowKind::Exchange, FlowOutcome::Failure);

			return Err(Error::TokenExchangeFailed {
				status: response.status,
				body: response.body,
			});
		}

		let tokens = parse_token_response(&response.body, response.status)?;

		tracing::debug!(
			provider = %state.provider,
			token_type = tokens.token_type.as_deref().unwrap_or("unspecified"),
			has_refresh_token = tokens.refresh_token.is_some(),
			"token endpoint responded"
		);

		let claims = match provider.user_info_uri.as_ref() {
			Some(endpoint) => {
				let bearer = tokens.access_token.as_deref().unwrap_or_default();
				let info = self.http_client.get_with_bearer(endpoint, bearer).await?;

				if !info.is_success() {
					record_flow_outcome(FlowKind::Exchange, FlowOutcome::Failure);

					return Err(Error::UserInfoFailed { status: info.status, body: info.body });
				}

				serde_json::from_str::<Value>(&info.body).map_err(|_| Error::UserInfoFailed {
					status: info.status,
					body: info.body,
				})?
			},
			None => Value::Object(Default::default()),
		};
		let expires_at = tokens
			.expires_in
			.as_ref()
			.and_then(LooseNumber::as_seconds)
			.map(|seconds| OffsetDateTime::now_utc() + Duration::seconds(seconds));
		let profile = ExternalProfile {
			provider: state.provider,
			provider_user_id: read_string(&claims, "sub").or_else(|| read_string(&claims, "id")),
			email: read_string(&claims, "email"),
			email_verified: read_bool(&claims, "email_verified"),
			display_name: read_string(&claims, "name")
				.filter(|name| !name.is_empty())
				.or_else(|| read_string(&claims, "given_name")),
			picture_url: read_string(&claims, "picture"),
			access_token: tokens.access_token.map(SecretString::new),
			refresh_token: tokens.refresh_token.map(SecretString::new),
			id_token: tokens.id_token.map(SecretString::new),
			expires_at,
			raw_claims: claims,
		};

		record_flow_outcome(FlowKind::Exchange, FlowOutcome::Success);

		Ok(profile)
	}
}

fn parse_token_response(body: &str, status: u16) -> Result<TokenEndpointResponse> {
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::TokenResponseParse { source, status })
}

/// Reads a claim as text, stringifying numbers and booleans the way sloppy providers
/// expect.
fn read_string(claims: &Value, key: &str) -> Option<String> {
	match claims.get(key)? {
		Value::String(value) => Some(value.clone()),
		Value::Number(value) => Some(value.to_string()),
		Value::Bool(value) => Some(value.to_string()),
		_ => None,
	}
}

/// Reads a claim as a boolean, accepting `"true"`/`"false"` strings; anything else is
/// `false`.
fn read_bool(claims: &Value, key: &str) -> bool {
	match claims.get(key) {
		Some(Value::Bool(value)) => *value,
		Some(Value::String(value)) => value.eq_ignore_ascii_case("true"),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_response_tolerates_numeric_strings() {
		let parsed = parse_token_response(
			r#"{"access_token":"at","refresh_token":"rt","expires_in":"3600","token_type":"bearer"}"#,
			200,
		)
		.expect("Numeric-string expires_in should parse.");

		assert_eq!(parsed.expires_in.as_ref().and_then(LooseNumber::as_seconds), Some(3600));
		assert_eq!(parsed.access_token.as_deref(), Some("at"));
	}

	#[test]
	fn token_response_tolerates_missing_fields() {
		let parsed = parse_token_response(r#"{"access_token":"at"}"#, 200)
			.expect("Minimal response should parse.");

		assert!(parsed.refresh_token.is_none());
		assert!(parsed.id_token.is_none());
		assert!(parsed.expires_in.is_none());
	}

	#[test]
	fn malformed_token_response_reports_the_path() {
		let err = parse_token_response(r#"{"access_token":42}"#, 200)
			.expect_err("A numeric access_token should fail to parse.");

		match err {
			Error::TokenResponseParse { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "access_token");
			},
			other => panic!("Expected TokenResponseParse, got {other:?}."),
		}
	}

	#[test]
	fn claim_readers_coerce_provider_sloppiness() {
		let claims = serde_json::json!({
			"sub": 12345,
			"email_verified": "True",
			"flag": "no",
			"nested": { "ignored": true }
		});

		assert_eq!(read_string(&claims, "sub").as_deref(), Some("12345"));
		assert!(read_bool(&claims, "email_verified"));
		assert!(!read_bool(&claims, "flag"));
		assert!(!read_bool(&claims, "missing"));
		assert_eq!(read_string(&claims, "nested"), None);
	}
}
