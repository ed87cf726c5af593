// self
use crate::{
	_prelude::*,
	provider::{ProviderConfig, ProviderConfigError},
};

/// Immutable provider table keyed by case-folded name.
///
/// Names are unique after case-folding; on collision the last-registered entry wins.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
	providers: HashMap<String, ProviderConfig>,
}
impl ProviderRegistry {
	/// Builds a registry after validating every entry.
	pub fn new(
		configs: impl IntoIterator<Item = ProviderConfig>,
	) -> Result<Self, ProviderConfigError> {
		let mut providers = HashMap::new();

		for config in configs {
			config.validate()?;

			providers.insert(config.name.to_lowercase(), config);
		}

		Ok(Self { providers })
	}

	/// Case-insensitive lookup returning the config regardless of its enabled flag.
	pub fn find(&self, name: &str) -> Option<&ProviderConfig> {
		self.providers.get(&name.to_lowercase())
	}

	/// Resolves an enabled provider or fails with the matching taxonomy error.
	pub fn require(&self, name: &str) -> Result<&ProviderConfig> {
		let config =
			self.find(name).ok_or_else(|| Error::UnknownProvider { name: name.to_owned() })?;

		if !config.enabled {
			return Err(Error::ProviderDisabled { name: name.to_owned() });
		}

		Ok(config)
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Checks whether any provider is registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}
