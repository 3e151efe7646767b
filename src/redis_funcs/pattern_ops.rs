use std::io::Write;

use tracing::debug;

use super::Summary;
use crate::error::Result;
use crate::store::HashStore;

pub fn get_keys_by_pattern<S: HashStore, W: Write>(
    pattern: &str,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    writeln!(out, "Pattern:{}", pattern)?;
    let keys = store.keys(pattern)?;
    for key in &keys {
        writeln!(out, "Key:{}", key)?;
    }
    Ok(Summary {
        considered: keys.len(),
        affected: keys.len() as i64,
    })
}

/// KEYS then a single DEL over everything that matched.
pub fn delete_keys_by_pattern<S: HashStore, W: Write>(
    pattern: &str,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    writeln!(out, "Pattern:{}", pattern)?;
    let keys = store.keys(pattern)?;
    debug!("{} keys match {}", keys.len(), pattern);
    let deleted = store.del_many(&keys)?;
    writeln!(out, "Deleting the keys:{}, pattern:{}", deleted, keys.len())?;
    Ok(Summary {
        considered: keys.len(),
        affected: deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        for key in ["user:1", "user:2", "user:10", "admin:1"] {
            store.hset(key, "name", "x").unwrap();
        }
        store
    }

    #[test]
    fn test_get_keys_by_pattern() {
        let mut store = seeded();
        let mut out = Vec::new();
        let summary = get_keys_by_pattern("user:?", &mut store, &mut out).unwrap();
        assert_eq!(2, summary.considered);
        assert_eq!(
            "Pattern:user:?\nKey:user:1\nKey:user:2\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn test_get_keys_by_pattern_no_match() {
        let mut store = seeded();
        let mut out = Vec::new();
        let summary = get_keys_by_pattern("nobody:*", &mut store, &mut out).unwrap();
        assert_eq!(Summary::default(), summary);
        assert_eq!("Pattern:nobody:*\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn test_delete_keys_by_pattern() {
        let mut store = seeded();
        let mut out = Vec::new();
        let summary = delete_keys_by_pattern("user:*", &mut store, &mut out).unwrap();
        assert_eq!(3, summary.affected);
        assert_eq!(
            "Pattern:user:*\nDeleting the keys:3, pattern:3\n",
            String::from_utf8(out).unwrap()
        );
        assert_eq!(1, store.key_count());
    }

    #[test]
    fn test_delete_keys_by_pattern_no_match() {
        let mut store = seeded();
        let mut out = Vec::new();
        delete_keys_by_pattern("nobody:*", &mut store, &mut out).unwrap();
        assert_eq!(
            "Pattern:nobody:*\nDeleting the keys:0, pattern:0\n",
            String::from_utf8(out).unwrap()
        );
        assert_eq!(4, store.key_count());
    }
}
