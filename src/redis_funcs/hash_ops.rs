use std::io::Write;

use tracing::debug;

use super::{Summary, MISSING_VALUE};
use crate::error::Result;
use crate::records::RecordSet;
use crate::store::HashStore;

/// HSET every record, then EXPIRE its key when the record carries a positive expiry.
///
/// Expiry is per key: the last record written for a key decides its TTL.
pub fn push_keys<S: HashStore, W: Write>(
    records: &RecordSet,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    let mut inserted = 0;
    for record in records.iter() {
        if store.hset(&record.key, &record.hash, &record.value)? {
            inserted += 1;
        }
        if record.expiry > 0 {
            store.expire(&record.key, record.expiry)?;
            debug!("Key {} expires in {}s", record.key, record.expiry);
        }
    }
    writeln!(
        out,
        "Number of key inserted:{}, keys in file:{}",
        inserted,
        records.len()
    )?;
    Ok(Summary {
        considered: records.len(),
        affected: inserted,
    })
}

pub fn get_keys<S: HashStore, W: Write>(
    records: &RecordSet,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    let mut found = 0;
    for record in records.iter() {
        let value = store.hget(&record.key, &record.hash)?;
        if value.is_some() {
            found += 1;
        }
        writeln!(
            out,
            "Key:{}, Hash:{}, Value:{}",
            record.key,
            record.hash,
            value.as_deref().unwrap_or(MISSING_VALUE)
        )?;
    }
    Ok(Summary {
        considered: records.len(),
        affected: found,
    })
}

/// DEL the whole key of every record, not just its hash field.
pub fn delete_keys<S: HashStore, W: Write>(
    records: &RecordSet,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    let mut deleted = 0;
    for record in records.iter() {
        deleted += store.del(&record.key)?;
    }
    writeln!(
        out,
        "Number of keys deleted:{} , keys in file:{}",
        deleted,
        records.len()
    )?;
    Ok(Summary {
        considered: records.len(),
        affected: deleted,
    })
}
