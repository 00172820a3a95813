//! Property maps: associative stores keyed by vertex/arc identity with a default value.
//!
//! Absent keys read as the default, so algorithms can query any vertex
//! without seeding the map first.
use ahash::RandomState;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone)]
pub struct PropertyMap<K, V> {
    default: V,
    values: HashMap<K, V, RandomState>,
}

impl<K, V> PropertyMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(default: V) -> Self {
        Self {
            default,
            values: HashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn with_capacity(default: V, capacity: usize) -> Self {
        Self {
            default,
            values: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// Changes the default. Keys already set keep their values.
    pub fn set_default_value(&mut self, default: V) {
        self.default = default;
    }

    pub fn get(&self, key: &K) -> &V {
        self.values.get(key).unwrap_or(&self.default)
    }

    pub fn value(&self, key: &K) -> V {
        self.get(key).clone()
    }

    pub fn set(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    /// Mutable access, materializing the default for an absent key.
    pub fn get_mut(&mut self, key: K) -> &mut V {
        let default = &self.default;
        self.values.entry(key).or_insert_with(|| default.clone())
    }

    pub fn reset_to_default(&mut self, key: &K) {
        self.values.remove(key);
    }

    pub fn reset_all(&mut self) {
        self.values.clear();
    }

    /// Whether `key` carries an explicitly set value.
    pub fn has_value(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Number of explicitly set keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.values.iter()
    }
}

impl<K, V> std::ops::Index<&K> for PropertyMap<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key)
    }
}

impl<K, V> std::fmt::Debug for PropertyMap<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMap")
            .field("default", &self.default)
            .field("values", &self.values)
            .finish()
    }
}
