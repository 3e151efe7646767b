use std::fmt;
use std::time::Duration;

use derivative::Derivative;
use redis::cluster::{ClusterClientBuilder, ClusterConnection};
use tracing::{debug, info, warn};

use crate::error::{LoaderError, Result};
use crate::store::RedisStore;

/// Command redirects (MOVED/ASK) followed before a command fails.
pub const MAX_REDIRECTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddr {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Client behavior applied to every cluster connection.
#[derive(Derivative, Debug, Clone)]
#[derivative(Default(bound = ""))]
pub struct ClusterOptions {
    #[derivative(Default(value = "MAX_REDIRECTS"))]
    pub max_redirects: u32,
    #[derivative(Default(value = "Duration::from_secs(10)"))]
    pub connection_timeout: Duration,
    #[derivative(Default(value = "Duration::from_secs(30)"))]
    pub response_timeout: Duration,
    #[derivative(Default(value = "true"))]
    pub ping_before_activate: bool,
}

/// Everything needed to reach the cluster.
#[derive(Derivative, Debug, Clone)]
#[derivative(Default(bound = ""))]
pub struct RedisContext {
    /// `host1:port1,host2:port2,...`
    #[derivative(Default(value = "String::from(\"127.0.0.1:7000\")"))]
    pub hosts: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl: bool,
    pub options: ClusterOptions,
}

impl RedisContext {
    pub fn new(hosts: &str, username: &str, password: &str, ssl: bool) -> RedisContext {
        RedisContext {
            hosts: String::from(hosts),
            username: non_empty(username),
            password: non_empty(password),
            ssl,
            options: ClusterOptions::default(),
        }
    }

    /// Seed URLs for the cluster client, one per parsable node.
    pub(crate) fn get_node_urls(&self) -> Vec<String> {
        let scheme = if self.ssl { "rediss" } else { "redis" };
        parse_nodes(&self.hosts)
            .iter()
            .map(|node| format!("{scheme}://{node}"))
            .collect()
    }

    pub fn make_connection(&self) -> Result<RedisStore<ClusterConnection>> {
        let urls = self.get_node_urls();
        if urls.is_empty() {
            return Err(LoaderError::NoNodes(self.hosts.clone()));
        }
        debug!("Cluster seed nodes: {:?}", urls);

        let mut builder = ClusterClientBuilder::new(urls)
            .retries(self.options.max_redirects)
            .connection_timeout(self.options.connection_timeout)
            .response_timeout(self.options.response_timeout);
        if let Some(username) = &self.username {
            builder = builder.username(username.clone());
        }
        if let Some(password) = &self.password {
            builder = builder.password(password.clone());
        }

        let client = builder.build().map_err(LoaderError::Connection)?;
        let mut con = client.get_connection().map_err(LoaderError::Connection)?;
        if self.options.ping_before_activate {
            let _: () = redis::cmd("PING")
                .query(&mut con)
                .map_err(LoaderError::Connection)?;
        }
        info!("Connected to redis cluster via {}", self.hosts);
        Ok(RedisStore::new(con))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(String::from(s))
    }
}

/// Parses `host:port` entries; entries that do not parse are logged and dropped.
pub fn parse_nodes(hosts: &str) -> Vec<NodeAddr> {
    if hosts.trim().is_empty() {
        return Vec::new();
    }
    hosts
        .split(',')
        .filter_map(|entry| match parse_node(entry) {
            Some(node) => Some(node),
            None => {
                warn!("Skipping invalid redis node '{}', expected host:port", entry);
                None
            }
        })
        .collect()
}

fn parse_node(entry: &str) -> Option<NodeAddr> {
    let mut parts = entry.trim().split(':');
    let host = parts.next()?.trim();
    let port = parts.next()?.trim().parse::<u16>().ok()?;
    if host.is_empty() {
        return None;
    }
    Some(NodeAddr {
        host: String::from(host),
        port,
    })
}
