use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::error::{LoaderError, Result};

const KEY_FIELD: usize = 0;
const HASH_FIELD: usize = 1;
const VALUE_FIELD: usize = 2;
// field 3 is reserved
const EXPIRY_FIELD: usize = 4;

/// One `key,hash[,value[,reserved,expiry]]` line of the keys file.
///
/// Identity is `(key, hash, value)`; the expiry rides along and does not
/// take part in equality.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    pub key: String,
    pub hash: String,
    pub value: String,
    pub expiry: i64,
}

impl KeyRecord {
    pub fn new(key: &str, hash: &str, value: &str) -> KeyRecord {
        KeyRecord {
            key: String::from(key),
            hash: String::from(hash),
            value: String::from(value),
            expiry: 0,
        }
    }

    pub fn with_expiry(mut self, expiry: i64) -> KeyRecord {
        self.expiry = expiry;
        self
    }

    fn from_line(line: &str) -> Option<KeyRecord> {
        let fields = split_fields(line);
        if fields.len() < 2 {
            return None;
        }
        let value = fields.get(VALUE_FIELD).copied().unwrap_or("");
        let expiry = fields
            .get(EXPIRY_FIELD)
            .and_then(|e| e.parse::<i64>().ok())
            .unwrap_or(0);
        Some(KeyRecord::new(fields[KEY_FIELD], fields[HASH_FIELD], value).with_expiry(expiry))
    }
}

impl PartialEq for KeyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.hash == other.hash && self.value == other.value
    }
}

impl Eq for KeyRecord {}

impl Hash for KeyRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.hash.hash(state);
        self.value.hash(state);
    }
}

/// Splits on commas and drops trailing empty fields, so `k,h,,` has two fields.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Deduplicated records in order of first appearance.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: IndexSet<KeyRecord>,
}

impl RecordSet {
    /// Keeps the first record on a `(key, hash, value)` collision.
    pub fn insert(&mut self, record: KeyRecord) -> bool {
        self.records.insert(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyRecord> {
        self.records.iter()
    }
}

impl FromIterator<KeyRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = KeyRecord>>(iter: I) -> Self {
        let mut set = RecordSet::default();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// Invalid UTF-8 is decoded lossily so one bad byte never costs the rest of the file.
pub fn parse_records<R: BufRead>(mut reader: R) -> Result<RecordSet> {
    let mut set = RecordSet::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        let line = String::from_utf8_lossy(&buf);
        match KeyRecord::from_line(&line) {
            Some(record) => {
                if !set.insert(record) {
                    debug!("Duplicate line ignored: {}", line);
                }
            }
            None => warn!("Ignoring line because it does not have correct format.{}", line),
        }
    }
    Ok(set)
}

pub fn load_records(path: &Path) -> Result<RecordSet> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let set = parse_records(BufReader::new(file))?;
    if set.is_empty() {
        return Err(LoaderError::NoValidRecords);
    }
    debug!("Loaded {} records from {}", set.len(), path.display());
    Ok(set)
}
