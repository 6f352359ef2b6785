//! # Attribute Aliases
//!
//! Names that refer to the same underlying attribute. Overriding any alias of a declared
//! attribute suppresses that attribute, so passing `author_id` keeps the `author`
//! association from being built and assigned alongside it.

use parking_lot::RwLock;
use std::sync::Arc;

/// Maps an attribute name to one alias, when the rule applies
pub type AliasRule = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

const FOREIGN_KEY_SUFFIX: &str = "_id";

fn foreign_key_to_association(name: &str) -> Option<String> {
    name.strip_suffix(FOREIGN_KEY_SUFFIX)
        .filter(|base| !base.is_empty())
        .map(str::to_string)
}

fn association_to_foreign_key(name: &str) -> Option<String> {
    Some(format!("{name}{FOREIGN_KEY_SUFFIX}"))
}

fn default_rules() -> Vec<AliasRule> {
    vec![
        Arc::new(foreign_key_to_association),
        Arc::new(association_to_foreign_key),
    ]
}

pub struct AliasRules {
    rules: RwLock<Vec<AliasRule>>,
}

impl AliasRules {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(default_rules()),
        }
    }

    pub fn add_rule<F>(&self, rule: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.rules.write().push(Arc::new(rule));
    }

    /// Every name that refers to `name`, including `name` itself
    pub fn aliases_for(&self, name: &str) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .rules
            .read()
            .iter()
            .filter_map(|rule| rule(name))
            .collect();
        if !aliases.iter().any(|alias| alias == name) {
            aliases.push(name.to_string());
        }
        aliases
    }

    /// Drop custom rules, keeping the foreign key rules
    pub fn reset(&self) {
        *self.rules.write() = default_rules();
    }
}

impl Default for AliasRules {
    fn default() -> Self {
        Self::new()
    }
}
