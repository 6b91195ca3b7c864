//! Bounded, newest-first transaction log.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Append-only history capped at `CAP` entries.
///
/// Entries are stored newest-first. Pushing past the cap drops the oldest
/// entry. Serialized as a plain JSON array; a longer array on load is
/// truncated to the cap.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedLog<T, const CAP: usize> {
    entries: Vec<T>,
}

impl<T, const CAP: usize> BoundedLog<T, CAP> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a new entry at the front.
    pub fn push(&mut self, entry: T) {
        self.entries.insert(0, entry);
        self.entries.truncate(CAP);
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

impl<T, const CAP: usize> Default for BoundedLog<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> From<Vec<T>> for BoundedLog<T, CAP> {
    fn from(mut entries: Vec<T>) -> Self {
        entries.truncate(CAP);
        Self { entries }
    }
}

impl<T: Serialize, const CAP: usize> Serialize for BoundedLog<T, CAP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const CAP: usize> Deserialize<'de> for BoundedLog<T, CAP> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn newest_first() {
        let mut log: BoundedLog<u32, 3> = BoundedLog::new();
        log.push(1);
        log.push(2);
        assert_eq!(log.as_slice(), &[2, 1]);
        assert_eq!(log.latest(), Some(&2));
    }

    #[test]
    fn drops_oldest_past_cap() {
        let mut log: BoundedLog<u32, 3> = BoundedLog::new();
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.as_slice(), &[4, 3, 2]);
    }

    #[test]
    fn deserialize_truncates() {
        let log: BoundedLog<u32, 2> = serde_json::from_str("[9, 8, 7]").unwrap();
        assert_eq!(log.as_slice(), &[9, 8]);
        assert_eq!(serde_json::to_string(&log).unwrap(), "[9,8]");
    }

    proptest! {
        #[test]
        fn never_exceeds_cap(n in 0usize..300) {
            let mut log: BoundedLog<usize, 50> = BoundedLog::new();
            for i in 0..n {
                log.push(i);
            }
            prop_assert!(log.len() <= 50);
            if n > 0 {
                prop_assert_eq!(log.latest(), Some(&(n - 1)));
            }
        }
    }
}
