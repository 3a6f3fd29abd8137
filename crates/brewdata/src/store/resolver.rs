use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::types::MaterialId;

const NAMESPACE_PREFIX: &str = "minecraft:";

#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    canonical: HashMap<String, MaterialId>,
    by_normalized: HashMap<String, MaterialId>,
}

impl MaterialCatalog {
    pub fn new<I, S>(materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for name in materials {
            let name = name.into();
            let id = MaterialId::new(name.clone());
            catalog
                .by_normalized
                .entry(normalize(&name))
                .or_insert_with(|| id.clone());
            catalog.canonical.insert(name, id);
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&MaterialId> {
        self.canonical.get(name)
    }

    pub fn get_normalized(&self, name: &str) -> Option<&MaterialId> {
        self.by_normalized.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let bare = match lowered.strip_prefix(NAMESPACE_PREFIX) {
        Some(rest) => &trimmed[trimmed.len() - rest.len()..],
        None => trimmed,
    };
    bare.chars()
        .map(|ch| match ch {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

pub trait MaterialResolver: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, raw: &str, catalog: &MaterialCatalog) -> Option<MaterialId>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl MaterialResolver for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn resolve(&self, raw: &str, catalog: &MaterialCatalog) -> Option<MaterialId> {
        catalog.get(raw).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    renames: BTreeMap<String, String>,
}

impl RenameTable {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        Self { renames }
    }

    pub fn builtin() -> Self {
        Self::new(default_renames())
    }
}

pub fn default_renames() -> BTreeMap<String, String> {
    BTreeMap::from([("LONG_GRASS".to_string(), "GRASS".to_string())])
}

impl MaterialResolver for RenameTable {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn resolve(&self, raw: &str, catalog: &MaterialCatalog) -> Option<MaterialId> {
        let target = self.renames.get(raw)?;
        catalog.get(target).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatch;

impl MaterialResolver for FuzzyMatch {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn resolve(&self, raw: &str, catalog: &MaterialCatalog) -> Option<MaterialId> {
        catalog.get_normalized(raw).cloned()
    }
}

#[derive(Debug, Default)]
pub struct ResolverChain {
    catalog: MaterialCatalog,
    strategies: Vec<Box<dyn MaterialResolver>>,
}

impl ResolverChain {
    pub fn new(catalog: MaterialCatalog) -> Self {
        Self {
            catalog,
            strategies: Vec::new(),
        }
    }

    pub fn standard(
        catalog: MaterialCatalog,
        modern_materials: bool,
        renames: BTreeMap<String, String>,
    ) -> Self {
        let chain = Self::new(catalog).with_strategy(ExactMatch);
        if modern_materials {
            chain
                .with_strategy(RenameTable::new(renames))
                .with_strategy(FuzzyMatch)
        } else {
            chain
        }
    }

    pub fn with_strategy(mut self, strategy: impl MaterialResolver + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    pub fn resolve(&self, raw: &str) -> Option<MaterialId> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.resolve(raw, &self.catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MaterialCatalog {
        MaterialCatalog::new(["WHEAT", "GRASS", "SUGAR_CANE", "OAK_LOG"])
    }

    #[test]
    fn exact_names_resolve_without_fallbacks() {
        let chain = ResolverChain::standard(catalog(), false, default_renames());
        assert_eq!(chain.resolve("WHEAT"), Some(MaterialId::new("WHEAT")));
        assert_eq!(chain.resolve("LONG_GRASS"), None);
        assert_eq!(chain.resolve("wheat"), None);
        assert_eq!(chain.strategy_names(), vec!["exact"]);
    }

    #[test]
    fn modern_chain_renames_then_fuzzy_matches() {
        let chain = ResolverChain::standard(catalog(), true, default_renames());
        assert_eq!(chain.strategy_names(), vec!["exact", "rename", "fuzzy"]);
        assert_eq!(chain.resolve("LONG_GRASS"), Some(MaterialId::new("GRASS")));
        assert_eq!(chain.resolve("sugar cane"), Some(MaterialId::new("SUGAR_CANE")));
        assert_eq!(
            chain.resolve("minecraft:oak-log"),
            Some(MaterialId::new("OAK_LOG"))
        );
        assert_eq!(chain.resolve("NETHER_STALK"), None);
    }

    #[test]
    fn rename_to_unknown_target_does_not_resolve() {
        let renames = BTreeMap::from([("OLD".to_string(), "MISSING".to_string())]);
        let chain = ResolverChain::new(catalog()).with_strategy(RenameTable::new(renames));
        assert_eq!(chain.resolve("OLD"), None);
    }

    #[derive(Debug)]
    struct Prefixed;

    impl MaterialResolver for Prefixed {
        fn name(&self) -> &'static str {
            "prefixed"
        }

        fn resolve(&self, raw: &str, catalog: &MaterialCatalog) -> Option<MaterialId> {
            catalog.get(raw.strip_prefix("LEGACY_")?).cloned()
        }
    }

    #[test]
    fn custom_strategies_extend_the_chain() {
        let chain = ResolverChain::standard(catalog(), true, default_renames()).with_strategy(Prefixed);
        assert_eq!(chain.resolve("LEGACY_WHEAT"), Some(MaterialId::new("WHEAT")));
    }
}
