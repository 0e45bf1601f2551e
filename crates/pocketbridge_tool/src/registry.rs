//! Tool registry for discovery and dispatch.

use crate::catalog;
use crate::tool::Tool;
use indexmap::IndexMap;
use std::sync::Arc;

/// Error from registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Tool already registered
    #[error("Tool already registered: {name}")]
    AlreadyRegistered {
        /// Tool name
        name: String,
    },
    /// Tool not found
    #[error("Tool not found: {name}")]
    NotFound {
        /// Tool name
        name: String,
    },
}

/// Entry for a registered tool
#[derive(Clone)]
pub struct ToolEntry {
    /// The tool itself
    pub tool: Arc<dyn Tool>,
    /// Whether the tool is advertised and callable
    pub enabled: bool,
}

impl ToolEntry {
    /// Create an enabled entry
    #[must_use]
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool, enabled: true }
    }
}

/// Registry of tools, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, ToolEntry>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tool in catalog::builtin() {
            let name = tool.name().to_string();
            if registry.register(tool).is_err() {
                tracing::warn!(tool = %name, "duplicate built-in tool skipped");
            }
        }
        registry
    }

    /// Register a tool
    ///
    /// # Errors
    ///
    /// Returns error if a tool with the same name is already registered
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        self.tools.insert(name, ToolEntry::new(tool));
        Ok(())
    }

    /// Get an enabled tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .filter(|e| e.enabled)
            .map(|e| Arc::clone(&e.tool))
    }

    /// Names of enabled tools
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// `tools/list` descriptors of enabled tools
    #[must_use]
    pub fn descriptors(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .filter(|e| e.enabled)
            .map(|e| e.tool.schema().descriptor())
            .collect()
    }

    /// Check if an enabled tool is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.get(name).is_some_and(|e| e.enabled)
    }

    /// Enable a tool
    ///
    /// # Errors
    ///
    /// Returns error if tool not found
    pub fn enable(&mut self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, true)
    }

    /// Disable a tool
    ///
    /// # Errors
    ///
    /// Returns error if tool not found
    pub fn disable(&mut self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        self.tools
            .get_mut(name)
            .map(|e| e.enabled = enabled)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Number of enabled tools
    #[must_use]
    pub fn count(&self) -> usize {
        self.tools.values().filter(|e| e.enabled).count()
    }

    /// Check if no tool is enabled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::auth::Logout;

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("logout").is_none());
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Logout::new())).unwrap();
        let err = registry.register(Arc::new(Logout::new())).unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyRegistered {
                name: "logout".to_string()
            }
        );
    }

    #[test]
    fn test_builtin_order_starts_with_records() {
        let registry = ToolRegistry::builtin();
        let names = registry.list();
        assert_eq!(names[0], "list_records");
        assert_eq!(names.len(), registry.count());
        assert_eq!(registry.descriptors().len(), names.len());
    }

    #[test]
    fn test_disable_hides_tool() {
        let mut registry = ToolRegistry::builtin();
        let before = registry.count();
        registry.disable("delete_collection").unwrap();
        assert!(!registry.contains("delete_collection"));
        assert!(registry.get("delete_collection").is_none());
        assert_eq!(registry.count(), before - 1);
        assert!(
            registry
                .descriptors()
                .iter()
                .all(|d| d["name"] != "delete_collection")
        );

        registry.enable("delete_collection").unwrap();
        assert!(registry.contains("delete_collection"));
    }

    #[test]
    fn test_disable_unknown() {
        let mut registry = ToolRegistry::new();
        assert!(matches!(
            registry.disable("nope"),
            Err(RegistryError::NotFound { .. })
        ));
    }
}
