// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	http::ProviderHttpClient,
	obs::{FlowKind, FlowOutcome, record_flow_outcome},
	provider::ProviderConfig,
	secret::{SecretString, random_token},
};

const PKCE_VERIFIER_BYTES: usize = 32;
const NONCE_BYTES: usize = 32;
const DEFAULT_SCOPE: &str = "openid email profile";

/// Everything the HTTP layer needs to send the end-user to the provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorizationRequest {
	/// Fully-formed provider authorization URL.
	pub authorization_uri: String,
	/// Opaque state value that must round-trip via the callback.
	pub state: String,
	/// OpenID Connect nonce bound to this attempt.
	pub nonce: String,
}

/// PKCE verifier/challenge pair for one authorization attempt (RFC 7636 S256).
#[derive(Clone)]
pub(crate) struct PkcePair {
	pub(crate) verifier: SecretString,
	pub(crate) challenge: String,
}
impl PkcePair {
	pub(crate) fn generate() -> Self {
		let verifier = random_token(PKCE_VERIFIER_BYTES);
		let challenge = compute_challenge(&verifier);

		Self { verifier: SecretString::new(verifier), challenge }
	}
}

impl<C> super::SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Builds the provider authorization URL and persists the matching state entry.
	///
	/// The redirect URI is the override when non-empty, else the provider default. One
	/// state entry is stored per call; abandoned attempts age out via the state TTL.
	pub fn authorize(
		&self,
		provider_name: &str,
		override_redirect_uri: Option<&str>,
	) -> Result<AuthorizationRequest> {
		record_flow_outcome(FlowKind::Authorize, FlowOutcome::Attempt);

		let provider = self.registry.require(provider_name)?;
		let redirect_uri = override_redirect_uri
			.filter(|uri| !uri.is_empty())
			.unwrap_or(provider.redirect_uri.as_str());
		let pkce = PkcePair::generate();
		let nonce = random_token(NONCE_BYTES);
		let state =
			self.state_store.create(provider_name, redirect_uri, pkce.verifier.clone(), &nonce);
		let authorization_uri =
			build_authorization_uri(provider, redirect_uri, &state.value, &nonce, &pkce);

		tracing::debug!(provider = provider_name, "authorization URL issued");
		record_flow_outcome(FlowKind::Authorize, FlowOutcome::Success);

		Ok(AuthorizationRequest { authorization_uri, state: state.value, nonce })
	}
}

fn build_authorization_uri(
	provider: &ProviderConfig,
	redirect_uri: &str,
	state: &str,
	nonce: &str,
	pkce: &PkcePair,
) -> String {
	let mut url = provider.authorization_uri.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", &provider.client_id);
		pairs.append_pair("response_type", "code");
		pairs.append_pair("scope", &format_scopes(&provider.scopes));
		pairs.append_pair("redirect_uri", redirect_uri);
		pairs.append_pair("state", state);
		pairs.append_pair("nonce", nonce);
		pairs.append_pair("access_type", "offline");
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", "S256");
	}

	url.into()
}

fn format_scopes(scopes: &[String]) -> String {
	if scopes.is_empty() {
		return DEFAULT_SCOPE.into();
	}

	scopes.join(" ")
}

fn compute_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
