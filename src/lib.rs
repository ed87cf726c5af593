//! Social-login core—OAuth 2.0 Authorization Code + PKCE flows that link external identities to
//! local accounts and hand out local sessions through one-time codes.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod flows;
pub mod http;
pub mod identity;
pub mod obs;
pub mod provider;
pub mod secret;
pub mod session;
pub mod state;
pub mod store;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::SocialLoginConfig,
		flows::SocialLoginBroker,
		http::ReqwestHttpClient,
		provider::{ProviderConfig, ProviderRegistry},
		store::memory::{
			MemoryExternalIdentityRepository, MemoryRefreshTokenRepository, MemoryUserRepository,
		},
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = SocialLoginBroker<ReqwestHttpClient>;

	/// In-memory repository trio handed back next to the test broker for assertions.
	#[derive(Clone, Debug, Default)]
	pub struct TestRepositories {
		/// Local user rows.
		pub users: Arc<MemoryUserRepository>,
		/// External identity rows.
		pub identities: Arc<MemoryExternalIdentityRepository>,
		/// Refresh token rows.
		pub refresh_tokens: Arc<MemoryRefreshTokenRepository>,
	}

	/// Builds a [`SocialLoginConfig`] with fixed secrets for tests.
	pub fn test_config() -> SocialLoginConfig {
		SocialLoginConfig {
			encryption_secret: "integration-test-encryption-secret".into(),
			jwt_secret: "integration-test-jwt-secret".into(),
			..Default::default()
		}
	}

	/// Constructs a [`SocialLoginBroker`] backed by in-memory repositories and the default
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_broker(
		providers: impl IntoIterator<Item = ProviderConfig>,
	) -> (ReqwestTestBroker, TestRepositories) {
		let registry =
			ProviderRegistry::new(providers).expect("Test provider configs should be valid.");
		let repositories = TestRepositories::default();
		let broker = SocialLoginBroker::new(
			&test_config(),
			registry,
			repositories.users.clone(),
			repositories.identities.clone(),
			repositories.refresh_tokens.clone(),
		);

		(broker, repositories)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;
	pub use uuid::Uuid;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {httpmock as _, tokio as _};
