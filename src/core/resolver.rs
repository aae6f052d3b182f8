//! The resolution engine.
//!
//! Owns the manifest mapping, the resolution cache, and the backend handle,
//! and applies the three-tier lookup policy: process environment first, then
//! the cache, then a backend fetch. Single-threaded and blocking; hosts that
//! share a `Resolver` across threads serialize access themselves.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::backends::{Secret, SecretBackend, VaultBackend};
use crate::constants;
use crate::core::address::Address;
use crate::core::manifest;
use crate::error::{Error, Result};

pub struct Resolver {
    manifest_path: PathBuf,
    // parsed at most once, on first use
    manifest: Option<IndexMap<String, String>>,
    cache: HashMap<String, Secret>,
    backend: Option<Box<dyn SecretBackend>>,
}

impl Resolver {
    /// Engine with an injected backend and the default manifest path
    /// (`SECRETFILE_PATH` override, else `Secretfile` in the working dir).
    pub fn new(backend: Box<dyn SecretBackend>) -> Self {
        Self {
            manifest_path: manifest::manifest_path(None),
            manifest: None,
            cache: HashMap::new(),
            backend: Some(backend),
        }
    }

    /// Engine with no backend. Resolutions that reach the backend tier fail
    /// with a configuration error; environment-tier lookups still work.
    pub fn without_backend() -> Self {
        Self {
            manifest_path: manifest::manifest_path(None),
            manifest: None,
            cache: HashMap::new(),
            backend: None,
        }
    }

    /// Pick the backend from ambient settings: Vault when `VAULT_ADDR` is
    /// set, otherwise none. This is a deliberate factory call for hosts that
    /// want environment-driven setup, not an import-time side effect.
    pub fn from_env() -> Result<Self> {
        if env::var(constants::VAULT_ADDR_ENV).is_ok() {
            Ok(Self::new(Box::new(VaultBackend::new()?)))
        } else {
            Ok(Self::without_backend())
        }
    }

    /// Override the manifest location.
    pub fn with_manifest_path(mut self, path: PathBuf) -> Self {
        self.manifest_path = path;
        self
    }

    /// Inject a pre-parsed manifest, skipping the file read.
    pub fn with_manifest(mut self, entries: IndexMap<String, String>) -> Self {
        self.manifest = Some(entries);
        self
    }

    /// Resolve a single key through the three tiers.
    ///
    /// The process environment always wins and bypasses manifest, cache, and
    /// backend entirely. On a cache miss the key's address is fetched from
    /// the backend, indexed by its field if one is given, and cached for the
    /// rest of the process lifetime.
    pub fn get(&mut self, key: &str) -> Result<Secret> {
        if let Ok(value) = env::var(key) {
            return Ok(Secret::Text(value));
        }
        if let Some(value) = self.cache.get(key) {
            return Ok(value.clone());
        }

        let address = self
            .manifest()?
            .get(key)
            .cloned()
            .ok_or_else(|| Error::KeyNotResolvable(key.to_string()))?;
        let address = Address::parse(&address)?;

        let fetched = self.backend()?.fetch(&address.path)?;
        let value = match &address.field {
            Some(field) => fetched.field(field, &address.path)?,
            None => fetched,
        };

        self.cache.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Like [`get`](Self::get), but an unresolvable key yields the caller's
    /// default instead of an error. Every other failure still propagates.
    pub fn get_or(&mut self, key: &str, default: impl Into<Secret>) -> Result<Secret> {
        match self.get(key) {
            Ok(value) => Ok(value),
            Err(Error::KeyNotResolvable(_)) => Ok(default.into()),
            Err(err) => Err(err),
        }
    }

    /// Resolve a group of related keys (e.g. a credential pair) in one call.
    ///
    /// Environment-tier semantics match `get`. For the remaining keys, every
    /// address must be field-qualified (`path:field`), and backend reads are
    /// deduplicated by path within this call so coupled keys observe one
    /// consistent read. The process-lifetime cache is neither consulted nor
    /// populated here. The first failure aborts the whole batch.
    pub fn get_many<I, S>(&mut self, keys: I) -> Result<IndexMap<String, Secret>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fetched: HashMap<String, Secret> = HashMap::new();
        let mut values = IndexMap::new();

        for key in keys {
            let key = key.as_ref();
            if let Ok(value) = env::var(key) {
                values.insert(key.to_string(), Secret::Text(value));
                continue;
            }

            let raw = self
                .manifest()?
                .get(key)
                .cloned()
                .ok_or_else(|| Error::KeyNotResolvable(key.to_string()))?;
            let address = Address::parse(&raw)?;
            let field = address.field.ok_or_else(|| Error::FieldRequired {
                key: key.to_string(),
                address: raw.clone(),
            })?;

            if !fetched.contains_key(&address.path) {
                let value = self.backend()?.fetch(&address.path)?;
                fetched.insert(address.path.clone(), value);
            }
            let pathval = &fetched[&address.path];

            values.insert(key.to_string(), pathval.field(&field, &address.path)?);
        }

        Ok(values)
    }

    /// Manifest keys in manifest order, without resolving any values.
    pub fn keys(&mut self) -> Result<Vec<String>> {
        Ok(self.manifest()?.keys().cloned().collect())
    }

    /// The key's address after interpolation, if the manifest has it.
    pub fn address_of(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.manifest()?.get(key).cloned())
    }

    /// Resolve every manifest key through the full tiered lookup, in
    /// manifest order, populating the cache as a side effect.
    pub fn items(&mut self) -> Result<Vec<(String, Secret)>> {
        let mut out = Vec::new();
        for key in self.keys()? {
            let value = self.get(&key)?;
            out.push((key, value));
        }
        Ok(out)
    }

    fn manifest(&mut self) -> Result<&IndexMap<String, String>> {
        if self.manifest.is_none() {
            self.manifest = Some(manifest::load(&self.manifest_path)?);
        }
        Ok(self.manifest.as_ref().unwrap())
    }

    fn backend(&self) -> Result<&dyn SecretBackend> {
        match &self.backend {
            Some(backend) => Ok(backend.as_ref()),
            None => Err(Error::BackendNotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Memory backend that records every fetched path.
    struct CountingBackend {
        inner: MemoryBackend,
        fetches: Rc<RefCell<Vec<String>>>,
    }

    impl SecretBackend for CountingBackend {
        fn fetch_secret(&self, path: &str) -> Result<Secret> {
            self.fetches.borrow_mut().push(path.to_string());
            self.inner.fetch_secret(path)
        }
    }

    fn counting_resolver(
        seeds: &[(&str, Secret)],
        manifest: &[(&str, &str)],
    ) -> (Resolver, Rc<RefCell<Vec<String>>>) {
        let mut inner = MemoryBackend::default();
        for (path, secret) in seeds {
            inner.insert(*path, secret.clone());
        }
        let fetches = Rc::new(RefCell::new(Vec::new()));
        let backend = CountingBackend {
            inner,
            fetches: Rc::clone(&fetches),
        };
        let entries: IndexMap<String, String> = manifest
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let resolver = Resolver::new(Box::new(backend)).with_manifest(entries);
        (resolver, fetches)
    }

    #[test]
    fn test_get_field_from_backend() {
        let (mut resolver, _) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds:password")],
        );
        let value = resolver.get("SECRET_DB").unwrap();
        assert_eq!(value.as_text(), Some("s3cr3t"));
    }

    #[test]
    fn test_get_whole_secret_without_field() {
        let (mut resolver, _) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds")],
        );
        let value = resolver.get("SECRET_DB").unwrap();
        assert_eq!(value, Secret::fields([("password", "s3cr3t")]));
    }

    #[test]
    fn test_environment_always_wins() {
        let (mut resolver, fetches) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("RESOLVER_ENV_WINS_KEY", "db/creds:password")],
        );
        env::set_var("RESOLVER_ENV_WINS_KEY", "override");
        let value = resolver.get("RESOLVER_ENV_WINS_KEY").unwrap();
        env::remove_var("RESOLVER_ENV_WINS_KEY");
        assert_eq!(value.as_text(), Some("override"));
        assert!(fetches.borrow().is_empty());
    }

    #[test]
    fn test_second_get_served_from_cache() {
        let (mut resolver, fetches) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds:password")],
        );
        resolver.get("SECRET_DB").unwrap();
        resolver.get("SECRET_DB").unwrap();
        assert_eq!(fetches.borrow().len(), 1);
    }

    #[test]
    fn test_get_unknown_key() {
        let (mut resolver, _) = counting_resolver(&[], &[]);
        let err = resolver.get("NOPE").unwrap_err();
        assert!(matches!(err, Error::KeyNotResolvable(_)));
    }

    #[test]
    fn test_get_or_default_on_absence() {
        let (mut resolver, _) = counting_resolver(&[], &[]);
        let value = resolver.get_or("NOPE", "fallback").unwrap();
        assert_eq!(value.as_text(), Some("fallback"));
    }

    #[test]
    fn test_get_or_propagates_other_failures() {
        // key is in the manifest, so absence is not the failure here
        let (mut resolver, _) =
            counting_resolver(&[], &[("SECRET_DB", "missing/path:password")]);
        assert!(resolver.get_or("SECRET_DB", "fallback").is_err());
    }

    #[test]
    fn test_get_rejects_multi_colon_address() {
        let (mut resolver, _) = counting_resolver(&[], &[("BAD", "path:one:two")]);
        let err = resolver.get("BAD").unwrap_err();
        assert!(matches!(err, Error::MalformedAddress { .. }));
    }

    #[test]
    fn test_get_missing_field_is_an_error() {
        let (mut resolver, _) = counting_resolver(
            &[("db/creds", Secret::fields([("user", "admin")]))],
            &[("SECRET_DB", "db/creds:password")],
        );
        let err = resolver.get("SECRET_DB").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { .. }));
    }

    #[test]
    fn test_get_without_backend() {
        let entries: IndexMap<String, String> =
            [("K".to_string(), "p:f".to_string())].into_iter().collect();
        let mut resolver = Resolver::without_backend().with_manifest(entries);
        let err = resolver.get("K").unwrap_err();
        assert!(matches!(err, Error::BackendNotConfigured));
    }

    #[test]
    fn test_get_many_dedupes_by_path() {
        let (mut resolver, fetches) = counting_resolver(
            &[(
                "aws/keys",
                Secret::fields([("access", "AKIA"), ("secret", "wJal")]),
            )],
            &[("AWS_ACCESS", "aws/keys:access"), ("AWS_SECRET", "aws/keys:secret")],
        );
        let values = resolver.get_many(["AWS_ACCESS", "AWS_SECRET"]).unwrap();
        assert_eq!(values["AWS_ACCESS"].as_text(), Some("AKIA"));
        assert_eq!(values["AWS_SECRET"].as_text(), Some("wJal"));
        assert_eq!(fetches.borrow().len(), 1);
        assert_eq!(fetches.borrow()[0], "aws/keys");
    }

    #[test]
    fn test_get_many_requires_field() {
        let (mut resolver, _) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds")],
        );
        let err = resolver.get_many(["SECRET_DB"]).unwrap_err();
        assert!(matches!(err, Error::FieldRequired { .. }));
    }

    #[test]
    fn test_get_many_env_tier() {
        let (mut resolver, fetches) =
            counting_resolver(&[], &[("RESOLVER_GROUP_ENV_KEY", "p:f")]);
        env::set_var("RESOLVER_GROUP_ENV_KEY", "from-env");
        let values = resolver.get_many(["RESOLVER_GROUP_ENV_KEY"]).unwrap();
        env::remove_var("RESOLVER_GROUP_ENV_KEY");
        assert_eq!(values["RESOLVER_GROUP_ENV_KEY"].as_text(), Some("from-env"));
        assert!(fetches.borrow().is_empty());
    }

    #[test]
    fn test_get_many_does_not_populate_cache() {
        let (mut resolver, fetches) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds:password")],
        );
        resolver.get_many(["SECRET_DB"]).unwrap();
        // a later single-key get must issue its own fetch
        resolver.get("SECRET_DB").unwrap();
        assert_eq!(fetches.borrow().len(), 2);
    }

    #[test]
    fn test_get_many_aborts_on_first_failure() {
        let (mut resolver, _) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("GOOD", "db/creds:password"), ("BAD", "db/creds:absent")],
        );
        assert!(resolver.get_many(["GOOD", "BAD"]).is_err());
    }

    #[test]
    fn test_items_in_manifest_order() {
        let (mut resolver, _) = counting_resolver(
            &[
                ("z/path", Secret::Text("zv".to_string())),
                ("a/path", Secret::Text("av".to_string())),
            ],
            &[("Z_KEY", "z/path"), ("A_KEY", "a/path")],
        );
        let items = resolver.items().unwrap();
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Z_KEY", "A_KEY"]);
    }

    #[test]
    fn test_items_populates_cache() {
        let (mut resolver, fetches) = counting_resolver(
            &[("db/creds", Secret::fields([("password", "s3cr3t")]))],
            &[("SECRET_DB", "db/creds:password")],
        );
        resolver.items().unwrap();
        resolver.get("SECRET_DB").unwrap();
        assert_eq!(fetches.borrow().len(), 1);
    }

    #[test]
    fn test_from_env_requires_vault_token() {
        env::set_var(constants::VAULT_ADDR_ENV, "http://127.0.0.1:8200");
        env::remove_var(constants::VAULT_TOKEN_ENV);

        // construction fails before any fetch, naming the missing setting
        let direct = VaultBackend::new().unwrap_err();
        assert!(matches!(direct, Error::BackendSetting(_)));
        assert!(direct.to_string().contains(constants::VAULT_TOKEN_ENV));

        // the ambient factory routes on VAULT_ADDR and propagates the error
        let via_factory = match Resolver::from_env() {
            Ok(_) => panic!("from_env must fail while VAULT_TOKEN is unset"),
            Err(err) => err,
        };
        assert!(matches!(via_factory, Error::BackendSetting(_)));

        env::remove_var(constants::VAULT_ADDR_ENV);
    }

    #[test]
    fn test_backend_fetch_failure_propagates() {
        let (mut resolver, _) = counting_resolver(&[], &[("K", "gone/path:f")]);
        let err = resolver.get("K").unwrap_err();
        assert!(matches!(err, Error::BackendFetch { .. }));
    }
}
