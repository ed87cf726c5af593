//! High-level login flows coordinated by the broker facade.

/// Authorization-URL construction with state and PKCE generation.
pub mod authorize;
/// Callback completion and the one-time session-code handoff.
pub mod callback;
/// Code-for-token exchange and profile normalization.
pub mod exchange;

pub use authorize::*;

// self
use crate::{
	_prelude::*,
	config::SocialLoginConfig,
	crypto::TokenEncryptionService,
	http::ProviderHttpClient,
	identity::IdentityLinkingService,
	provider::ProviderRegistry,
	session::LoginSessionStore,
	state::StateStore,
	store::{ExternalIdentityRepository, RefreshTokenRepository, UserRepository},
	token::{JwtTokenService, RefreshTokenIssuer},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = SocialLoginBroker<ReqwestHttpClient>;

/// Coordinates the social-login protocol end to end.
///
/// The broker owns the provider registry, the two in-process stores, the transport, and
/// the linking/issuing services so individual flow implementations can focus on one step
/// of the protocol (URL construction, code exchange, callback completion, session
/// finalization). Everything is explicitly constructed and dependency-injected; there is
/// no ambient global state.
#[derive(Clone)]
pub struct SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Per-provider OAuth configuration table.
	pub registry: Arc<ProviderRegistry>,
	/// Pending authorization states.
	pub state_store: Arc<StateStore>,
	/// One-time session codes awaiting finalization.
	pub session_store: Arc<LoginSessionStore>,
	/// HTTP transport used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Identity-merge service applied on every callback.
	pub linking: IdentityLinkingService,
	/// Local access-token signer.
	pub token_issuer: JwtTokenService,
	/// Local refresh-token issuer.
	pub refresh_issuer: RefreshTokenIssuer,
}
impl<C> SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		config: &SocialLoginConfig,
		registry: ProviderRegistry,
		users: Arc<dyn UserRepository>,
		identities: Arc<dyn ExternalIdentityRepository>,
		refresh_tokens: Arc<dyn RefreshTokenRepository>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let encryption = TokenEncryptionService::new(&config.encryption_secret);

		Self {
			registry: Arc::new(registry),
			state_store: Arc::new(StateStore::new(config.state_ttl)),
			session_store: Arc::new(LoginSessionStore::new(config.session_ttl())),
			http_client: http_client.into(),
			linking: IdentityLinkingService::new(users, identities, encryption),
			token_issuer: JwtTokenService::new(
				&config.jwt_secret,
				config.access_token_ttl,
				config.issuer.clone(),
			),
			refresh_issuer: RefreshTokenIssuer::new(refresh_tokens),
		}
	}
}
#[cfg(feature = "reqwest")]
impl SocialLoginBroker<ReqwestHttpClient> {
	/// Creates a broker with its own reqwest-backed transport.
	pub fn new(
		config: &SocialLoginConfig,
		registry: ProviderRegistry,
		users: Arc<dyn UserRepository>,
		identities: Arc<dyn ExternalIdentityRepository>,
		refresh_tokens: Arc<dyn RefreshTokenRepository>,
	) -> Self {
		Self::with_http_client(
			config,
			registry,
			users,
			identities,
			refresh_tokens,
			ReqwestHttpClient::default(),
		)
	}
}
impl<C> Debug for SocialLoginBroker<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SocialLoginBroker")
			.field("providers", &self.registry.len())
			.field("pending_states", &self.state_store.len())
			.field("pending_sessions", &self.session_store.len())
			.finish_non_exhaustive()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use crate::{
		_preludet::*, provider::tests::google_fixture, session::tests::bundle_fixture,
	};

	#[test]
	fn authorize_builds_the_provider_url_and_persists_state() {
		let (broker, _) = build_reqwest_test_broker([google_fixture()]);
		let request = broker.authorize("google", None).expect("Authorize should succeed.");
		let url =
			Url::parse(&request.authorization_uri).expect("Authorization URI should parse.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("client_id"), Some(&"client-123".into()));
		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("scope"), Some(&"openid email".into()));
		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://auth.example.com/oauth2/callback/google".into())
		);
		assert_eq!(pairs.get("state"), Some(&request.state));
		assert_eq!(pairs.get("nonce"), Some(&request.nonce));
		assert_eq!(pairs.get("access_type"), Some(&"offline".into()));
		assert_eq!(pairs.get("code_challenge_method"), Some(&"S256".into()));
		assert!(pairs.contains_key("code_challenge"));
		assert_eq!(broker.state_store.len(), 1);

		let state = broker
			.state_store
			.consume(&request.state)
			.expect("Issued state should be stored under its value.");

		assert_eq!(state.provider, "google");
		assert_eq!(state.nonce, request.nonce);
	}

	#[test]
	fn authorize_prefers_a_non_empty_override_redirect() {
		let (broker, _) = build_reqwest_test_broker([google_fixture()]);
		let request = broker
			.authorize("google", Some("https://other.example.com/cb"))
			.expect("Authorize should succeed.");
		let url =
			Url::parse(&request.authorization_uri).expect("Authorization URI should parse.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("redirect_uri"), Some(&"https://other.example.com/cb".into()));

		// An empty override falls back to the provider default.
		let request =
			broker.authorize("google", Some("")).expect("Authorize should succeed.");
		let url =
			Url::parse(&request.authorization_uri).expect("Authorization URI should parse.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://auth.example.com/oauth2/callback/google".into())
		);
	}

	#[test]
	fn authorize_rejects_unknown_and_disabled_providers() {
		let mut disabled = google_fixture();

		disabled.name = "facebook".into();
		disabled.enabled = false;

		let (broker, _) = build_reqwest_test_broker([google_fixture(), disabled]);

		assert!(matches!(
			broker.authorize("github", None),
			Err(Error::UnknownProvider { .. })
		));
		assert!(matches!(
			broker.authorize("facebook", None),
			Err(Error::ProviderDisabled { .. })
		));
		assert!(broker.state_store.is_empty(), "Failed authorize must not persist state.");
	}

	#[test]
	fn handoff_then_finalize_is_exactly_once() {
		let (broker, _) = build_reqwest_test_broker([google_fixture()]);
		let bundle = bundle_fixture();
		let code = broker.handoff(bundle.clone());
		let finalized = broker.finalize(&code).expect("First finalize should succeed.");

		assert_eq!(finalized.user_id, bundle.user_id);
		assert_eq!(finalized.access_token, bundle.access_token);
		assert!(matches!(broker.finalize(&code), Err(Error::InvalidSessionCode)));
		assert!(matches!(broker.finalize("never-issued"), Err(Error::InvalidSessionCode)));
	}
}
