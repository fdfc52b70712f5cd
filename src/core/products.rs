//! Shared product registry modules declare their data dependencies against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::ScheduleError;

/// A product a module puts into the event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductDeclaration {
    /// Type name of the product.
    pub type_name: String,
    /// Instance name; empty for the default instance.
    pub instance: String,
}

impl ProductDeclaration {
    /// Default-instance product of `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            instance: String::new(),
        }
    }

    /// Set the instance name.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }
}

/// Key of a registered product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BranchKey {
    /// Producing module label.
    pub module_label: String,
    /// Product instance name.
    pub instance: String,
}

/// A product a module reads, identified by producer label and instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsumesDeclaration {
    /// Label of the producing module.
    pub module_label: String,
    /// Instance name; empty for the default instance.
    pub instance: String,
}

impl ConsumesDeclaration {
    /// Consume the default instance produced by `module_label`.
    pub fn new(module_label: impl Into<String>) -> Self {
        Self {
            module_label: module_label.into(),
            instance: String::new(),
        }
    }
}

/// Products and consumers registered by every constructed module.
///
/// Re-registering an identical declaration for the same label is a no-op,
/// so building the same module once per slot registers its products once.
#[derive(Debug, Clone, Default)]
pub struct ProductRegistry {
    products: BTreeMap<BranchKey, String>,
    consumers: BTreeMap<String, Vec<ConsumesDeclaration>>,
}

impl ProductRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product produced by `module_label`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::ProductConflict`] if the same label and
    /// instance were already registered with a different type.
    pub fn add_product(
        &mut self,
        module_label: &str,
        declaration: &ProductDeclaration,
    ) -> Result<(), ScheduleError> {
        let key = BranchKey {
            module_label: module_label.to_string(),
            instance: declaration.instance.clone(),
        };
        match self.products.get(&key) {
            Some(existing) if existing == &declaration.type_name => Ok(()),
            Some(existing) => Err(ScheduleError::ProductConflict(format!(
                "`{module_label}:{}` already registered as `{existing}`, not `{}`",
                declaration.instance, declaration.type_name
            ))),
            None => {
                self.products.insert(key, declaration.type_name.clone());
                Ok(())
            }
        }
    }

    /// Record what `module_label` consumes. Later calls replace earlier ones.
    pub fn set_consumes(&mut self, module_label: &str, consumes: Vec<ConsumesDeclaration>) {
        self.consumers.insert(module_label.to_string(), consumes);
    }

    /// Type of the product registered under `key`.
    pub fn product_type(&self, key: &BranchKey) -> Option<&str> {
        self.products.get(key).map(String::as_str)
    }

    /// Number of registered products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Labels of modules consuming any product of `producer_label`.
    pub fn consumers_of(&self, producer_label: &str) -> Vec<&str> {
        self.consumers
            .iter()
            .filter(|(_, consumes)| consumes.iter().any(|c| c.module_label == producer_label))
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_registration_is_idempotent() {
        let mut registry = ProductRegistry::new();
        let decl = ProductDeclaration::new("Tracks");
        registry.add_product("tracker", &decl).unwrap();
        registry.add_product("tracker", &decl).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut registry = ProductRegistry::new();
        registry
            .add_product("tracker", &ProductDeclaration::new("Tracks"))
            .unwrap();
        let err = registry
            .add_product("tracker", &ProductDeclaration::new("Hits"))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::ProductConflict(_)));
    }

    #[test]
    fn test_consumers_of() {
        let mut registry = ProductRegistry::new();
        registry.set_consumes("analyzer", vec![ConsumesDeclaration::new("tracker")]);
        registry.set_consumes("other", vec![ConsumesDeclaration::new("calo")]);
        assert_eq!(registry.consumers_of("tracker"), vec!["analyzer"]);
    }
}
