//! Bot descriptor files
//!
//! A descriptor names a bot and pins it to one built-in strategy with its
//! parameters:
//!
//! ```toml
//! name = "Patient Grudge"
//! description = "Forgives one slip, then never again."
//! seed = 7
//!
//! [strategy]
//! base = "GrimTrigger"
//! params = { noise_tolerance = 1 }
//! ```
//!
//! The same shape is accepted as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bot::{Bot, StrategyBot};
use crate::error::{LoadCause, LoadError};
use crate::registry::{BotFactory, StrategyFactory};
use crate::strategy::Strategy;

/// Contents of a descriptor file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotDescriptor {
    /// Defaults to the strategy's display name
    #[serde(default)]
    pub name: Option<String>,
    /// Defaults to the generated strategy description
    #[serde(default)]
    pub description: Option<String>,
    pub strategy: Strategy,
    /// Seed for randomised strategies
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BotDescriptor {
    /// Parse descriptor text, picking the format from the file extension
    pub fn parse(content: &str, extension: &str) -> Result<Self, LoadCause> {
        let descriptor: BotDescriptor = match extension.to_ascii_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(LoadCause::UnsupportedFormat(other.to_string())),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), LoadCause> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(LoadCause::Invalid("name must not be empty".to_string()));
            }
        }
        self.strategy.params.validate().map_err(LoadCause::Invalid)
    }

    /// Construct a fresh bot from this descriptor
    pub fn instantiate(&self) -> StrategyBot {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| self.strategy.base.display_name().to_string());
        let mut bot = StrategyBot::new(name, self.strategy).with_seed(self.seed.unwrap_or(0));
        if let Some(description) = &self.description {
            bot = bot.with_description(description.clone());
        }
        bot
    }

    /// Factory that rebuilds this descriptor without touching the file again
    pub fn into_factory(self, id: impl Into<String>) -> StrategyFactory {
        let name = self
            .name
            .unwrap_or_else(|| self.strategy.base.display_name().to_string());
        let mut factory = StrategyFactory::new(id, name, self.strategy).with_seed(self.seed.unwrap_or(0));
        if let Some(description) = self.description {
            factory = factory.with_description(description);
        }
        factory
    }
}

/// Factory for a descriptor on disk
///
/// `build` reads the file each time it is called. Runners work from
/// [`BotFactory::snapshot`], which parses the file once, so editing a
/// descriptor mid-run cannot change or break the bot halfway through.
#[derive(Clone, Debug)]
pub struct DescriptorFile {
    id: String,
    path: PathBuf,
}

impl DescriptorFile {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let path = PathBuf::from(&id);
        Self { id, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the descriptor
    pub fn load(&self) -> Result<BotDescriptor, LoadError> {
        if !self.path.is_file() {
            return Err(LoadError::new(&self.id, LoadCause::Unknown));
        }
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let content = std::fs::read_to_string(&self.path).map_err(|err| LoadError::new(&self.id, err))?;
        BotDescriptor::parse(&content, extension).map_err(|cause| LoadError::new(&self.id, cause))
    }
}

impl BotFactory for DescriptorFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn build(&self) -> Result<Box<dyn Bot>, LoadError> {
        let descriptor = self.load()?;
        Ok(Box::new(descriptor.instantiate()))
    }

    fn snapshot(&self) -> Result<Arc<dyn BotFactory>, LoadError> {
        let descriptor = self.load()?;
        Ok(Arc::new(descriptor.into_factory(self.id.clone())))
    }
}
