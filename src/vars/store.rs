use std::collections::HashMap;

/// Read access to named value lists.
pub trait Lookup: Sync {
    fn lookup(&self, key: &str) -> Option<&[String]>;
}

/// Variable name to ordered value list.
///
/// Lookups never fail: a missing key reads as `""` / `None` and the caller
/// decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    vars: HashMap<String, Vec<String>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value of `key`.
    pub fn set<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.vars
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn set_one(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), vec![value.into()]);
    }

    /// Add values after the existing ones, creating `key` if needed.
    pub fn append<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.vars
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn set_many<K, I, V>(&mut self, entries: impl IntoIterator<Item = (K, I)>)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for (key, values) in entries {
            self.set(key, values);
        }
    }

    /// First value of `key`, or `""`.
    pub fn get_one(&self, key: &str) -> &str {
        self.vars
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.vars.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variable names, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Lookup for VariableStore {
    fn lookup(&self, key: &str) -> Option<&[String]> {
        self.get_all(key)
    }
}

/// A store of local variables that shadows a read-only parent.
///
/// Generators use this to bind per-project or per-source values without
/// copying the shared package variables.
pub struct Scope<'a> {
    parent: &'a dyn Lookup,
    local: VariableStore,
}

impl<'a> Scope<'a> {
    pub fn new(parent: &'a dyn Lookup) -> Self {
        Self {
            parent,
            local: VariableStore::new(),
        }
    }

    pub fn set<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.local.set(key, values);
    }

    pub fn set_one(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.local.set_one(key, value);
    }

    pub fn get_one(&self, key: &str) -> &str {
        self.lookup(key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Lookup for Scope<'_> {
    fn lookup(&self, key: &str) -> Option<&[String]> {
        self.local.lookup(key).or_else(|| self.parent.lookup(key))
    }
}
