// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, KvStore};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// An in-memory key-value store backed by a `BTreeMap`, so that
/// `iterate_prefix` naturally visits keys in sorted (lexical) order.
///
/// Unlike the teacher's `MemoryDB` (which hashes keys into a `HashMap` and
/// so cannot support prefix iteration), this keeps the real key bytes.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), Error> {
        self.map
            .write()
            .map_err(|_| Error::Other("lock poisoned".into()))?
            .insert(key.to_vec(), value);
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .map
            .read()
            .map_err(|_| Error::Other("lock poisoned".into()))?
            .get(key)
            .cloned())
    }

    fn delete(&self, key: &[u8]) -> Result<(), Error> {
        self.map
            .write()
            .map_err(|_| Error::Other("lock poisoned".into()))?
            .remove(key);
        Ok(())
    }

    fn view<R>(&self, key: &[u8], f: impl FnOnce(&[u8]) -> R) -> Result<Option<R>, Error> {
        let guard = self
            .map
            .read()
            .map_err(|_| Error::Other("lock poisoned".into()))?;
        Ok(guard.get(key).map(|bytes| f(bytes.as_slice())))
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        let guard = self
            .map
            .read()
            .map_err(|_| Error::Other("lock poisoned".into()))?;
        Ok(guard
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let kv = MemoryKvStore::new();
        kv.put(b"a", b"1".to_vec()).unwrap();
        assert_eq!(kv.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(kv.get(b"missing").unwrap(), None);
    }

    #[test]
    fn delete_removes_key() {
        let kv = MemoryKvStore::new();
        kv.put(b"a", b"1".to_vec()).unwrap();
        kv.delete(b"a").unwrap();
        assert_eq!(kv.get(b"a").unwrap(), None);
        assert!(!kv.has(b"a").unwrap());
    }

    #[test]
    fn prefix_iteration_is_sorted_and_scoped() {
        let kv = MemoryKvStore::new();
        kv.put(b"/blocks/b", b"2".to_vec()).unwrap();
        kv.put(b"/blocks/a", b"1".to_vec()).unwrap();
        kv.put(b"/other/x", b"3".to_vec()).unwrap();

        let items = kv.iterate_prefix(b"/blocks/").unwrap();
        assert_eq!(
            items,
            vec![
                (b"/blocks/a".to_vec(), b"1".to_vec()),
                (b"/blocks/b".to_vec(), b"2".to_vec()),
            ]
        );
    }

    #[test]
    fn view_avoids_reporting_missing_as_error() {
        let kv = MemoryKvStore::new();
        kv.put(b"a", b"hello".to_vec()).unwrap();
        let len = kv.view(b"a", |bytes| bytes.len()).unwrap();
        assert_eq!(len, Some(5));
        assert_eq!(kv.view(b"missing", |bytes| bytes.len()).unwrap(), None);
    }
}
