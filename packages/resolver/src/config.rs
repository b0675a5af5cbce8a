//! Resolver configuration.

/// Where the resolver answers and how it guesses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// URL path prefix served from the store, with leading and trailing `/`.
    pub debug_root: String,
    /// Extension tried once, without the dot, when a bare name is not found.
    pub fallback_extension: Option<String>,
    /// File served for paths ending in `/`.
    pub index_file: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debug_root: "/debug/".to_string(),
            fallback_extension: Some("ts".to_string()),
            index_file: "index.html".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Set the debug root. Missing leading or trailing slashes are added.
    #[must_use]
    pub fn with_debug_root(mut self, root: impl AsRef<str>) -> Self {
        let trimmed = root.as_ref().trim_matches('/');
        self.debug_root = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self
    }

    /// Set the fallback extension. A leading dot is dropped.
    #[must_use]
    pub fn with_fallback_extension(mut self, ext: impl AsRef<str>) -> Self {
        let ext = ext.as_ref().trim_start_matches('.');
        self.fallback_extension = if ext.is_empty() {
            None
        } else {
            Some(ext.to_string())
        };
        self
    }

    #[must_use]
    pub fn without_fallback(mut self) -> Self {
        self.fallback_extension = None;
        self
    }

    #[must_use]
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.debug_root, "/debug/");
        assert_eq!(config.fallback_extension.as_deref(), Some("ts"));
        assert_eq!(config.index_file, "index.html");
    }

    #[test]
    fn debug_root_is_normalized() {
        assert_eq!(ResolverConfig::default().with_debug_root("run").debug_root, "/run/");
        assert_eq!(ResolverConfig::default().with_debug_root("/a/b/").debug_root, "/a/b/");
        assert_eq!(ResolverConfig::default().with_debug_root("/").debug_root, "/");
    }

    #[test]
    fn fallback_extension_forms() {
        let config = ResolverConfig::default().with_fallback_extension(".js");
        assert_eq!(config.fallback_extension.as_deref(), Some("js"));
        assert_eq!(ResolverConfig::default().with_fallback_extension("").fallback_extension, None);
        assert_eq!(ResolverConfig::default().without_fallback().fallback_extension, None);
    }
}
