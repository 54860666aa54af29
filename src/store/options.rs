use std::path::PathBuf;

/// Options for opening a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Directory of a log-backed store; None keeps everything in memory
    pub path: Option<PathBuf>,
    /// Create the directory if it does not exist
    pub create_if_missing: bool,
    /// Fsync the table log after every mutation
    pub sync_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            path: None,
            create_if_missing: true,
            sync_writes: false,
        }
    }
}

impl StoreOptions {
    /// Purely in-memory store
    pub fn in_memory() -> Self {
        StoreOptions::default()
    }

    /// Log-backed store in `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        StoreOptions {
            path: Some(path.into()),
            ..StoreOptions::default()
        }
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert!(options.path.is_none());
        assert!(options.create_if_missing);
        assert!(!options.sync_writes);

        let options = StoreOptions::at("/tmp/x").with_sync_writes(true);
        assert_eq!(options.path, Some(PathBuf::from("/tmp/x")));
        assert!(options.sync_writes);
    }
}
