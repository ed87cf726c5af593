//! Short-lived authorization state tying a provider callback to the request that started it.

// self
use crate::{_prelude::*, secret::SecretString};

const STATE_VALUE_BYTES: usize = 32;

/// One authorization attempt's CSRF/replay guard.
///
/// Created once per [`authorize`](crate::flows::SocialLoginBroker::authorize) call and
/// consumed exactly once by the matching callback; abandoned entries age out via TTL.
#[derive(Clone, Debug)]
pub struct AuthorizationState {
	/// Opaque, unguessable key the provider round-trips through the redirect.
	pub value: String,
	/// Provider the attempt was started against.
	pub provider: String,
	/// Redirect URI the eventual code exchange must repeat.
	pub redirect_uri: String,
	/// PKCE verifier proving the exchange comes from the initiating party.
	pub code_verifier: SecretString,
	/// OpenID Connect nonce bound to the attempt.
	pub nonce: String,
	/// Instant after which the entry no longer validates.
	pub expires_at: OffsetDateTime,
}

/// Concurrent map of pending authorization states.
#[derive(Debug)]
pub struct StateStore {
	ttl: Duration,
	states: RwLock<HashMap<String, AuthorizationState>>,
}
impl StateStore {
	/// Creates a store whose entries expire `ttl` after creation.
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, states: RwLock::new(HashMap::new()) }
	}

	/// Generates and stores a fresh state entry for one authorization attempt.
	pub fn create(
		&self,
		provider: &str,
		redirect_uri: &str,
		code_verifier: SecretString,
		nonce: &str,
	) -> AuthorizationState {
		let state = AuthorizationState {
			value: crate::secret::random_token(STATE_VALUE_BYTES),
			provider: provider.to_owned(),
			redirect_uri: redirect_uri.to_owned(),
			code_verifier,
			nonce: nonce.to_owned(),
			expires_at: OffsetDateTime::now_utc() + self.ttl,
		};

		self.states.write().insert(state.value.clone(), state.clone());

		state
	}

	/// Atomically removes and returns the entry when present and unexpired.
	///
	/// Removal happens under a single write lock, so two concurrent callbacks presenting
	/// the same value cannot both succeed. Expired and absent entries are indistinguishable
	/// to the caller; the entry is deleted either way.
	pub fn consume(&self, value: &str) -> Option<AuthorizationState> {
		let state = self.states.write().remove(value)?;

		if OffsetDateTime::now_utc() > state.expires_at {
			return None;
		}

		Some(state)
	}

	/// Drops every entry that expired before `now`; returns how many were removed.
	///
	/// Expiry is already enforced lazily at consume time, so this sweep only bounds
	/// memory growth for abandoned flows.
	pub fn evict_expired(&self, now: OffsetDateTime) -> usize {
		let mut states = self.states.write();
		let before = states.len();

		states.retain(|_, state| state.expires_at >= now);

		before - states.len()
	}

	/// Number of pending entries.
	pub fn len(&self) -> usize {
		self.states.read().len()
	}

	/// Checks whether no entries are pending.
	pub fn is_empty(&self) -> bool {
		self.states.read().is_empty()
	}
}
