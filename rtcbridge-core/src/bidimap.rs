use crate::functional::Maybe;
use std::collections::HashMap;
use std::hash::Hash;

/// Invertible lookup table. Every key maps to one value and every value back
/// to one key; overwriting either side evicts the stale pairing.
#[derive(Debug, Clone)]
pub struct BidiMap<K, V> {
    forward: HashMap<K, V>,
    backward: HashMap<V, K>,
}

impl<K, V> Default for BidiMap<K, V> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<K, V> BidiMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from a plain one; `None` if two keys share a value.
    pub fn from_map(map: HashMap<K, V>) -> Maybe<Self> {
        let mut bidi = Self::new();
        for (key, value) in map {
            if bidi.reverse_has(&value) {
                return None;
            }
            bidi.set(key, value);
        }
        Some(bidi)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    pub fn get(&self, key: &K) -> Maybe<V> {
        self.forward.get(key).cloned()
    }

    pub fn has(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    pub fn reverse_get(&self, value: &V) -> Maybe<K> {
        self.backward.get(value).cloned()
    }

    pub fn reverse_has(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    /// Associates `key` with `value`. Returns the value `key` used to map to
    /// and the key `value` used to belong to.
    pub fn set(&mut self, key: K, value: V) -> (Maybe<V>, Maybe<K>) {
        let previous_value = self.forward.insert(key.clone(), value.clone());
        if let Some(old) = &previous_value
            && *old != value
        {
            self.backward.remove(old);
        }

        let previous_key = self.backward.insert(value, key.clone());
        if let Some(old) = &previous_key
            && *old != key
        {
            self.forward.remove(old);
        }

        (previous_value, previous_key)
    }

    pub fn reverse_set(&mut self, value: V, key: K) -> (Maybe<K>, Maybe<V>) {
        let (previous_value, previous_key) = self.set(key, value);
        (previous_key, previous_value)
    }

    pub fn remove(&mut self, key: &K) -> Maybe<V> {
        let value = self.forward.remove(key)?;
        self.backward.remove(&value);
        Some(value)
    }

    pub fn reverse_remove(&mut self, value: &V) -> Maybe<K> {
        let key = self.backward.remove(value)?;
        self.forward.remove(&key);
        Some(key)
    }

    pub fn compute_if_absent<F: FnOnce() -> V>(&mut self, key: K, compute: F) -> V {
        if let Some(value) = self.forward.get(&key) {
            return value.clone();
        }
        let value = compute();
        self.set(key, value.clone());
        value
    }

    pub fn reverse_compute_if_absent<F: FnOnce() -> K>(&mut self, value: V, compute: F) -> K {
        if let Some(key) = self.backward.get(&value) {
            return key.clone();
        }
        let key = compute();
        self.set(key.clone(), value);
        key
    }

    pub fn reverse(self) -> BidiMap<V, K> {
        BidiMap {
            forward: self.backward,
            backward: self.forward,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.forward.values()
    }
}
