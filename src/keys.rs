//! Cache Keys
//!
//! Keys follow `<role>_<resource>[_<discriminator>]`, e.g. `admin_logs`,
//! `kader_child_42`, `consultations_open`. A [`CacheKey<T>`] also fixes the
//! type its payload decodes to, so one key cannot be read back as two
//! different shapes by accident.
//!
//! The cache does no parameter-aware partitioning: anything that changes the
//! result set (id, status, page, filters) has to be part of the key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

// == Role ==
/// Dashboard role that owns a key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Kader,
    Parent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Kader => "kader",
            Role::Parent => "parent",
        }
    }

    /// `<role>_<resource>`
    pub fn key<T>(self, resource: &str) -> CacheKey<T> {
        CacheKey::new(format!("{}_{}", self.as_str(), resource))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Key ==
pub struct CacheKey<T> {
    key: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> CacheKey<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _value: PhantomData,
        }
    }

    /// Appends `_<discriminator>`.
    pub fn with(mut self, discriminator: impl fmt::Display) -> Self {
        self.key.push('_');
        self.key.push_str(&discriminator.to_string());
        self
    }

    /// Appends `_<name>=<value>` for each parameter, ordered by name so the
    /// same parameter set always yields the same key.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        params.sort();

        for (name, value) in params {
            self.key.push('_');
            self.key.push_str(&name);
            self.key.push('=');
            self.key.push_str(&value);
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn into_string(self) -> String {
        self.key
    }
}

// Manual impls: a key is comparable and cloneable whatever T is.
impl<T> Clone for CacheKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T> PartialEq for CacheKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for CacheKey<T> {}

impl<T> Hash for CacheKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.key).finish()
    }
}

impl<T> fmt::Display for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl<T> AsRef<str> for CacheKey<T> {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key() {
        let key: CacheKey<Vec<u32>> = CacheKey::new("consultations_open");
        assert_eq!(key.as_str(), "consultations_open");
    }

    #[test]
    fn test_role_key_with_discriminator() {
        let key: CacheKey<String> = Role::Kader.key("child").with(42);
        assert_eq!(key.as_str(), "kader_child_42");
        assert_eq!(key.to_string(), "kader_child_42");
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::Admin.key::<()>("logs").as_str(), "admin_logs");
        assert_eq!(Role::Parent.to_string(), "parent");
    }

    #[test]
    fn test_params_are_sorted() {
        let a: CacheKey<()> =
            CacheKey::new("consultations_open").with_params([("page", "2"), ("q", "gizi")]);
        let b: CacheKey<()> =
            CacheKey::new("consultations_open").with_params([("q", "gizi"), ("page", "2")]);

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "consultations_open_page=2_q=gizi");
    }

    #[test]
    fn test_distinct_params_give_distinct_keys() {
        let page1: CacheKey<()> = Role::Admin.key("logs").with_params([("page", 1)]);
        let page2: CacheKey<()> = Role::Admin.key("logs").with_params([("page", 2)]);

        assert_ne!(page1, page2);
        assert!(page1.as_str().starts_with("admin_logs"));
    }

    #[test]
    fn test_clone_and_debug_without_bounds_on_t() {
        let key: CacheKey<String> = CacheKey::new("kader_child_1");
        let copy = key.clone();

        assert_eq!(key, copy);
        assert_eq!(format!("{:?}", copy), "CacheKey(\"kader_child_1\")");
        assert_eq!(copy.into_string(), "kader_child_1");
    }
}
