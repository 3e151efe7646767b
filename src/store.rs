#[cfg(test)]
use std::collections::{BTreeMap, HashMap};

use redis::{ConnectionLike, RedisResult};
#[cfg(test)]
use regex::Regex;

/// The handful of commands the bulk operations need.
pub trait HashStore {
    /// Returns true when `field` did not exist before.
    fn hset(&mut self, key: &str, field: &str, value: &str) -> RedisResult<bool>;
    fn hget(&mut self, key: &str, field: &str) -> RedisResult<Option<String>>;
    fn expire(&mut self, key: &str, seconds: i64) -> RedisResult<bool>;
    fn del(&mut self, key: &str) -> RedisResult<i64>;
    fn del_many(&mut self, keys: &[String]) -> RedisResult<i64>;
    fn keys(&mut self, pattern: &str) -> RedisResult<Vec<String>>;
}

/// `HashStore` over a live connection, cluster or single node.
pub struct RedisStore<C> {
    con: C,
}

impl<C: ConnectionLike> RedisStore<C> {
    pub fn new(con: C) -> RedisStore<C> {
        RedisStore { con }
    }
}

impl<C: ConnectionLike> HashStore for RedisStore<C> {
    fn hset(&mut self, key: &str, field: &str, value: &str) -> RedisResult<bool> {
        let added: i64 = redis::cmd("HSET").arg(key).arg(field).arg(value).query(&mut self.con)?;
        Ok(added > 0)
    }

    fn hget(&mut self, key: &str, field: &str) -> RedisResult<Option<String>> {
        redis::cmd("HGET").arg(key).arg(field).query(&mut self.con)
    }

    fn expire(&mut self, key: &str, seconds: i64) -> RedisResult<bool> {
        redis::cmd("EXPIRE").arg(key).arg(seconds).query(&mut self.con)
    }

    fn del(&mut self, key: &str) -> RedisResult<i64> {
        redis::cmd("DEL").arg(key).query(&mut self.con)
    }

    fn del_many(&mut self, keys: &[String]) -> RedisResult<i64> {
        if keys.is_empty() {
            // DEL with no keys is an arity error on the server
            return Ok(0);
        }
        redis::cmd("DEL").arg(keys).query(&mut self.con)
    }

    fn keys(&mut self, pattern: &str) -> RedisResult<Vec<String>> {
        redis::cmd("KEYS").arg(pattern).query(&mut self.con)
    }
}

/// In-process store with the same observable behavior.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: BTreeMap<String, HashMap<String, String>>,
    ttls: HashMap<String, i64>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn ttl(&self, key: &str) -> Option<i64> {
        self.ttls.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.hashes.contains_key(key)
    }

    pub fn key_count(&self) -> usize {
        self.hashes.len()
    }

    fn remove(&mut self, key: &str) -> i64 {
        self.ttls.remove(key);
        match self.hashes.remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }
}

#[cfg(test)]
impl HashStore for MemoryStore {
    fn hset(&mut self, key: &str, field: &str, value: &str) -> RedisResult<bool> {
        let fields = self.hashes.entry(String::from(key)).or_default();
        Ok(fields.insert(String::from(field), String::from(value)).is_none())
    }

    fn hget(&mut self, key: &str, field: &str) -> RedisResult<Option<String>> {
        Ok(self.hashes.get(key).and_then(|f| f.get(field)).cloned())
    }

    fn expire(&mut self, key: &str, seconds: i64) -> RedisResult<bool> {
        if !self.hashes.contains_key(key) {
            return Ok(false);
        }
        if seconds <= 0 {
            self.remove(key);
        } else {
            self.ttls.insert(String::from(key), seconds);
        }
        Ok(true)
    }

    fn del(&mut self, key: &str) -> RedisResult<i64> {
        Ok(self.remove(key))
    }

    fn del_many(&mut self, keys: &[String]) -> RedisResult<i64> {
        Ok(keys.iter().map(|k| self.remove(k)).sum())
    }

    fn keys(&mut self, pattern: &str) -> RedisResult<Vec<String>> {
        let re = glob_to_regex(pattern).map_err(|err| {
            redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "invalid pattern",
                err.to_string(),
            ))
        })?;
        Ok(self.hashes.keys().filter(|k| re.is_match(k)).cloned().collect())
    }
}

/// Translates a redis glob (`*`, `?`, `[...]`, `\x`) into an anchored regex.
#[cfg(test)]
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::from("(?s)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => re.push_str(&regex::escape(&escaped.to_string())),
                None => re.push_str(r"\\"),
            },
            '[' => {
                re.push('[');
                for class_char in chars.by_ref() {
                    if class_char == ']' {
                        break;
                    }
                    match class_char {
                        '^' | '-' => re.push(class_char),
                        '\\' | '[' | '&' | '~' => {
                            re.push('\\');
                            re.push(class_char);
                        }
                        _ => re.push(class_char),
                    }
                }
                re.push(']');
            }
            _ => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}
