use {
    crate::{crypto, ValidationError},
    log::{debug, warn},
    rsa::RsaPublicKey,
    std::{
        collections::HashMap,
        path::{Path, PathBuf},
        sync::{Arc, PoisonError, RwLock},
    },
};

/// A memoized mapping from key pair identifier to loaded public key.
///
/// The identifier→location mapping is populated once at construction from configuration; there
/// is no rotation or revocation. Keys are loaded lazily on first reference and cached for the
/// process lifetime, shared read-only across validation calls. Two threads racing on the first
/// load of the same key may both load it; the loser's copy is discarded, which is harmless since
/// keys are immutable and loads are idempotent.
#[derive(Debug)]
pub struct KeyResolver {
    /// Configured key file location for each key pair id.
    locations: HashMap<String, PathBuf>,

    /// Loaded keys, by the path they were loaded from.
    cache: RwLock<HashMap<PathBuf, Arc<RsaPublicKey>>>,
}

impl KeyResolver {
    /// Create a resolver over a configured `key id → PEM file path` mapping.
    pub fn new(locations: HashMap<String, PathBuf>) -> Self {
        Self {
            locations,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The configured key file location for a key pair id, if any.
    pub fn location(&self, key_id: &str) -> Option<&Path> {
        self.locations.get(key_id).map(PathBuf::as_path)
    }

    /// Resolve a key pair id to its loaded public key.
    ///
    /// Fails closed with [`ValidationError::KeyNotFound`] when the id has no configured location
    /// or its configured file cannot be loaded; the load failure is logged. One key's failure
    /// never affects another key.
    pub fn resolve(&self, key_id: &str) -> Result<Arc<RsaPublicKey>, ValidationError> {
        let Some(path) = self.locations.get(key_id) else {
            return Err(ValidationError::KeyNotFound(format!("no key configured for key id: {}", key_id)));
        };

        self.load(path).map_err(|e| {
            warn!("unable to load key id:{} location:{}: {}", key_id, path.display(), e);
            ValidationError::KeyNotFound(format!("key id is unusable: {}", key_id))
        })
    }

    /// Load the public key at `path`, caching it for subsequent calls.
    ///
    /// Fails with [`ValidationError::KeyLoad`] wrapping the underlying cause when the file
    /// cannot be read or parsed.
    pub fn load(&self, path: &Path) -> Result<Arc<RsaPublicKey>, ValidationError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = cache.get(path) {
                return Ok(key.clone());
            }
        }

        // Load outside the lock; a racing loader's entry wins below.
        let key = Arc::new(crypto::load_public_key(path)?);
        debug!("loaded public key from {}", path.display());

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(path.to_path_buf()).or_insert(key).clone())
    }

    /// Eagerly load every configured key, removing file I/O from the request hot path.
    ///
    /// A key that fails to load is logged and skipped; later requests referencing it fail closed
    /// with [`ValidationError::KeyNotFound`]. The process is never aborted for a bad key.
    pub fn preload(&self) {
        for (key_id, path) in &self.locations {
            if let Err(e) = self.load(path) {
                warn!("unable to load key id:{} location:{}: {}", key_id, path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::KeyResolver,
        crate::unittest::test_key,
        crate::ValidationError,
        std::{collections::HashMap, path::PathBuf, sync::Arc},
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(ref v) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), v),
                Err(ref e) => match e {
                    ValidationError::$expected(..) => e.to_string(),
                    _ => panic!("Expected {}; got {:#?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    #[test_log::test]
    fn test_resolve_and_cache() {
        let key = test_key();
        let mut locations = HashMap::new();
        locations.insert("test-keypair".to_string(), key.key_file.clone());
        locations.insert("broken".to_string(), PathBuf::from("/file/does/not/exist.pem"));
        let resolver = KeyResolver::new(locations);

        assert_eq!(resolver.location("test-keypair"), Some(key.key_file.as_path()));
        assert_eq!(resolver.location("unknown"), None);

        let first = resolver.resolve("test-keypair").unwrap();
        let second = resolver.resolve("test-keypair").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let msg = expect_err!(resolver.resolve("unknown"), KeyNotFound);
        assert_eq!(msg, "no key configured for key id: unknown");

        // The configured-but-unloadable key fails closed, independently of the good key.
        let msg = expect_err!(resolver.resolve("broken"), KeyNotFound);
        assert_eq!(msg, "key id is unusable: broken");
        assert!(resolver.resolve("test-keypair").is_ok());
    }

    #[test_log::test]
    fn test_load_surfaces_cause() {
        let resolver = KeyResolver::new(HashMap::new());
        let msg = expect_err!(resolver.load(PathBuf::from("/file/does/not/exist.pem").as_path()), KeyLoad);
        assert!(msg.starts_with("unable to read key file"));
    }

    #[test_log::test]
    fn test_preload() {
        let key = test_key();
        let mut locations = HashMap::new();
        locations.insert("test-keypair".to_string(), key.key_file.clone());
        locations.insert("broken".to_string(), PathBuf::from("/file/does/not/exist.pem"));
        let resolver = KeyResolver::new(locations);

        // Logs and skips the broken key; the good one is now cached.
        resolver.preload();
        assert!(resolver.resolve("test-keypair").is_ok());
    }
}
