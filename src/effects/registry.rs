use std::collections::HashMap;

use crate::effects::EffectKind;

/// Registry mapping effect store type names to effect kinds
///
/// The store publishes free-form `type` strings. The registry is the single
/// place that decides which of them the compositor understands; anything it
/// does not know is skipped at the boundary.
pub struct EffectRegistry {
    effects: HashMap<String, EffectKind>,
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            effects: HashMap::new(),
        };

        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        for kind in EffectKind::ALL {
            self.effects.insert(kind.name().to_string(), kind);
        }
    }

    /// Register an alias for an existing kind
    ///
    /// Names are matched case-insensitively.
    pub fn register<S: Into<String>>(&mut self, name: S, kind: EffectKind) {
        self.effects.insert(name.into().to_lowercase(), kind);
    }

    /// Look up a type name
    pub fn resolve(&self, name: &str) -> Option<EffectKind> {
        self.effects.get(name.trim().to_lowercase().as_str()).copied()
    }

    /// Get all registered names, sorted
    pub fn available_effects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.effects.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_effects_available() {
        let registry = EffectRegistry::new();

        assert!(registry.has_effect("grayscale"));
        assert!(registry.has_effect("sepia"));
        assert!(registry.has_effect("invert"));
        assert!(registry.has_effect("blur"));
        assert!(registry.has_effect("segmentation"));

        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = EffectRegistry::new();

        assert_eq!(registry.resolve("Sepia"), Some(EffectKind::Sepia));
        assert_eq!(registry.resolve(" INVERT "), Some(EffectKind::Invert));
        assert_eq!(registry.resolve("pixelate"), None);
    }

    #[test]
    fn test_alias_registration() {
        let mut registry = EffectRegistry::new();
        registry.register("Greyscale", EffectKind::Grayscale);

        assert_eq!(registry.resolve("greyscale"), Some(EffectKind::Grayscale));
        assert_eq!(registry.len(), 6);
        assert!(registry.available_effects().contains(&"greyscale".to_string()));
    }
}
