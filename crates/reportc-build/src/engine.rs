//! Engine configuration properties and scoped overlays
//!
//! The external engine is configured through a flat string property map.
//! A compile pass overlays pass-scoped values (classpath, temp dir, keep
//! flag, XML validation, user properties) on top of whatever the map held
//! before, and the prior map must come back when the pass ends, success
//! or failure. `PropertyOverlay` models that contract as a drop guard.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Classpath the engine's expression compiler resolves classes against
pub const PROPERTY_COMPILER_CLASSPATH: &str = "net.sf.jasperreports.compiler.classpath";
/// Directory for intermediate sources generated by the engine
pub const PROPERTY_COMPILER_TEMP_DIR: &str = "net.sf.jasperreports.compiler.temp.dir";
/// Whether the engine keeps generated sources after compilation
pub const PROPERTY_KEEP_JAVA_FILE: &str = "net.sf.jasperreports.compiler.keep.java.file";
/// Whether the engine validates report XML against its schema
pub const PROPERTY_XML_VALIDATION: &str = "net.sf.jasperreports.compiler.xml.validation";

/// Property map configuring the report-compilation engine
///
/// Keys iterate in sorted order so engine invocations are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineContext {
    properties: BTreeMap<String, String>,
}

impl EngineContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Look up a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Remove a property, returning the previous value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    /// The full property map, sorted by key
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Number of properties set
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no properties are set
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Begin a scoped overlay of the property map
    ///
    /// The returned guard gives mutable access to the context; dropping it
    /// restores the map to its state at the time of this call.
    pub fn overlay(&mut self) -> PropertyOverlay<'_> {
        PropertyOverlay {
            saved: self.properties.clone(),
            context: self,
        }
    }
}

/// Drop guard restoring engine properties at the end of a pass
pub struct PropertyOverlay<'a> {
    context: &'a mut EngineContext,
    saved: BTreeMap<String, String>,
}

impl Deref for PropertyOverlay<'_> {
    type Target = EngineContext;

    fn deref(&self) -> &EngineContext {
        self.context
    }
}

impl DerefMut for PropertyOverlay<'_> {
    fn deref_mut(&mut self) -> &mut EngineContext {
        self.context
    }
}

impl Drop for PropertyOverlay<'_> {
    fn drop(&mut self) {
        self.context.properties = std::mem::take(&mut self.saved);
        debug!("engine properties restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut context = EngineContext::new();
        context.set(PROPERTY_XML_VALIDATION, "true");

        assert_eq!(context.get(PROPERTY_XML_VALIDATION), Some("true"));
        assert_eq!(context.get("missing"), None);
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_overlay_restores_added_keys() {
        let mut context = EngineContext::new();
        context.set("base.key", "base");

        {
            let mut overlay = context.overlay();
            overlay.set(PROPERTY_COMPILER_CLASSPATH, "lib/a.jar");
            overlay.set(PROPERTY_COMPILER_TEMP_DIR, "/tmp/gen");
            assert_eq!(overlay.len(), 3);
        }

        assert_eq!(context.len(), 1);
        assert_eq!(context.get("base.key"), Some("base"));
        assert_eq!(context.get(PROPERTY_COMPILER_CLASSPATH), None);
    }

    #[test]
    fn test_overlay_restores_overwritten_values() {
        let mut context = EngineContext::new();
        context.set(PROPERTY_XML_VALIDATION, "true");

        {
            let mut overlay = context.overlay();
            overlay.set(PROPERTY_XML_VALIDATION, "false");
            assert_eq!(overlay.get(PROPERTY_XML_VALIDATION), Some("false"));
        }

        assert_eq!(context.get(PROPERTY_XML_VALIDATION), Some("true"));
    }

    #[test]
    fn test_overlay_restores_removed_keys() {
        let mut context = EngineContext::new();
        context.set("base.key", "base");

        {
            let mut overlay = context.overlay();
            overlay.remove("base.key");
            assert!(overlay.is_empty());
        }

        assert_eq!(context.get("base.key"), Some("base"));
    }

    #[test]
    fn test_overlay_restores_on_early_exit() {
        fn failing_pass(context: &mut EngineContext) -> Result<(), String> {
            let mut overlay = context.overlay();
            overlay.set(PROPERTY_KEEP_JAVA_FILE, "true");
            Err("engine failure".to_string())
        }

        let mut context = EngineContext::new();
        let result = failing_pass(&mut context);

        assert!(result.is_err());
        assert!(context.is_empty());
    }

    #[test]
    fn test_property_keys() {
        assert_eq!(
            PROPERTY_COMPILER_CLASSPATH,
            "net.sf.jasperreports.compiler.classpath"
        );
        assert_eq!(
            PROPERTY_KEEP_JAVA_FILE,
            "net.sf.jasperreports.compiler.keep.java.file"
        );
    }
}
