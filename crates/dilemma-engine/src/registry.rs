//! Bot discovery: explicit registration of typed factories

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::bot::{Bot, StrategyBot};
use crate::error::LoadError;
use crate::loader::DescriptorFile;
use crate::strategy::{describe_strategy, Strategy, StrategyBase, StrategyParams};

/// Builds fresh bot instances for one identifier
///
/// Schedulers call [`BotFactory::snapshot`] once when a run is set up, then
/// [`BotFactory::build`] on that snapshot once per match so no two matches
/// ever share a bot instance.
pub trait BotFactory: Send + Sync {
    /// Identifier the factory was resolved from
    fn id(&self) -> &str;

    fn build(&self) -> Result<Box<dyn Bot>, LoadError>;

    /// Factory pinned to the bot definition as it is right now
    ///
    /// Anything read from outside the process is read here, so builds from
    /// the snapshot see one definition for the whole run.
    fn snapshot(&self) -> Result<Arc<dyn BotFactory>, LoadError>;
}

/// Factory for a bot driven by a built-in strategy
#[derive(Clone, Debug)]
pub struct StrategyFactory {
    id: String,
    name: String,
    description: String,
    strategy: Strategy,
    seed: u64,
}

impl StrategyFactory {
    pub fn new(id: impl Into<String>, name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: describe_strategy(&strategy),
            strategy,
            seed: 0,
        }
    }

    /// Factory for one of the stock strategies with default parameters
    pub fn builtin(base: StrategyBase) -> Self {
        Self::new(base.id(), base.display_name(), Strategy::new(base))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}

impl BotFactory for StrategyFactory {
    fn id(&self) -> &str {
        &self.id
    }

    fn build(&self) -> Result<Box<dyn Bot>, LoadError> {
        let bot = StrategyBot::new(self.name.clone(), self.strategy)
            .with_description(self.description.clone())
            .with_seed(self.seed);
        Ok(Box::new(bot))
    }

    fn snapshot(&self) -> Result<Arc<dyn BotFactory>, LoadError> {
        Ok(Arc::new(self.clone()))
    }
}

/// Factory wrapping a constructor closure, for hand-written [`Bot`] types
pub struct FnFactory<F> {
    id: String,
    constructor: Arc<F>,
}

impl<F> FnFactory<F>
where
    F: Fn() -> Box<dyn Bot> + Send + Sync,
{
    pub fn new(id: impl Into<String>, constructor: F) -> Self {
        Self {
            id: id.into(),
            constructor: Arc::new(constructor),
        }
    }
}

impl<F> BotFactory for FnFactory<F>
where
    F: Fn() -> Box<dyn Bot> + Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn build(&self) -> Result<Box<dyn Bot>, LoadError> {
        Ok((self.constructor)())
    }

    fn snapshot(&self) -> Result<Arc<dyn BotFactory>, LoadError> {
        Ok(Arc::new(Self {
            id: self.id.clone(),
            constructor: Arc::clone(&self.constructor),
        }))
    }
}

/// One line of the `list` output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Registered bot factories keyed by id
#[derive(Clone, Default)]
pub struct BotRegistry {
    factories: BTreeMap<String, Arc<dyn BotFactory>>,
}

impl BotRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every stock strategy
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for base in StrategyBase::ALL {
            registry.register(StrategyFactory::builtin(base));
        }
        // Tit for Tat that cashes in on the known final round
        let endgame = StrategyParams {
            endgame_defections: 1,
            ..Default::default()
        };
        registry.register(StrategyFactory::new(
            "endgame-defector",
            "Endgame Defector",
            Strategy::with_params(StrategyBase::TitForTat, endgame),
        ));
        registry
    }

    /// Add a factory, replacing any previous one with the same id
    pub fn register(&mut self, factory: impl BotFactory + 'static) {
        let id = factory.id().to_string();
        if self.factories.insert(id.clone(), Arc::new(factory)).is_some() {
            tracing::debug!(id = %id, "replaced registered bot factory");
        }
    }

    /// Register a hand-written bot type by constructor
    pub fn register_fn<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Bot> + Send + Sync + 'static,
    {
        self.register(FnFactory::new(id, constructor));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn BotFactory>> {
        self.factories.get(id).cloned()
    }

    /// Resolve an identifier to a factory
    ///
    /// Registered ids win; anything else is treated as a descriptor path.
    /// Resolution itself never fails: an identifier that names neither
    /// reports its [`LoadError`] from `build`.
    pub fn resolve(&self, id: &str) -> Arc<dyn BotFactory> {
        match self.get(id) {
            Some(factory) => factory,
            None => Arc::new(DescriptorFile::new(id)),
        }
    }

    pub fn resolve_all<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Arc<dyn BotFactory>> {
        ids.iter().map(|id| self.resolve(id.as_ref())).collect()
    }

    pub fn list_ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Name and description of every registered bot, sorted by id
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::with_capacity(self.factories.len());
        for (id, factory) in &self.factories {
            match factory.build() {
                Ok(bot) => entries.push(CatalogEntry {
                    id: id.clone(),
                    name: bot.name().to_string(),
                    description: bot.description().to_string(),
                }),
                Err(err) => tracing::warn!(id = %id, error = %err, "registered bot failed to build"),
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::HistoryView;
    use crate::error::{LoadCause, StrategyError};
    use crate::strategy::Move;

    struct Contrarian;

    impl Bot for Contrarian {
        fn name(&self) -> &str {
            "Contrarian"
        }

        fn decide(&mut self, view: &HistoryView<'_>) -> Result<Move, StrategyError> {
            Ok(view.opponent_history.last().map_or(Move::Defect, |m| m.opposite()))
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = BotRegistry::with_builtins();
        for base in StrategyBase::ALL {
            assert!(registry.get(base.id()).is_some(), "missing {}", base.id());
        }
        assert!(registry.get("endgame-defector").is_some());
        assert_eq!(registry.list_ids().len(), StrategyBase::ALL.len() + 1);
    }

    #[test]
    fn test_builtin_build_names() {
        let registry = BotRegistry::with_builtins();
        let bot = registry.resolve("grudge").build().unwrap();
        assert_eq!(bot.name(), "Grudge Bot");
        assert_eq!(bot.description(), "Cooperates until betrayed, then never forgives.");
    }

    #[test]
    fn test_register_fn() {
        let mut registry = BotRegistry::new();
        registry.register_fn("contrarian", || Box::new(Contrarian) as Box<dyn Bot>);
        let bot = registry.resolve("contrarian").build().unwrap();
        assert_eq!(bot.name(), "Contrarian");
        assert_eq!(bot.description(), "");
    }

    #[test]
    fn test_unknown_id_fails_at_build() {
        let registry = BotRegistry::with_builtins();
        let factory = registry.resolve("no-such-bot");
        assert_eq!(factory.id(), "no-such-bot");

        let err = factory.build().err().unwrap();
        assert_eq!(err.id, "no-such-bot");
        assert!(matches!(err.cause, LoadCause::Unknown));
    }

    #[test]
    fn test_snapshot_keeps_identity() {
        let mut registry = BotRegistry::with_builtins();
        registry.register_fn("contrarian", || Box::new(Contrarian) as Box<dyn Bot>);

        for id in ["pavlov", "contrarian"] {
            let factory = registry.resolve(id);
            let frozen = factory.snapshot().unwrap();
            assert_eq!(frozen.id(), id);
            assert_eq!(frozen.build().unwrap().name(), factory.build().unwrap().name());
        }
    }

    #[test]
    fn test_unknown_id_fails_at_snapshot() {
        let err = BotRegistry::new().resolve("nobody").snapshot().err().unwrap();
        assert!(matches!(err.cause, LoadCause::Unknown));
    }

    #[test]
    fn test_catalog_sorted_by_id() {
        let catalog = BotRegistry::with_builtins().catalog();
        let ids: Vec<&str> = catalog.iter().map(|e| e.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(catalog.iter().any(|e| e.name == "Tit for Tat"));
    }
}
