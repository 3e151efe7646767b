use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use super::redis_context::RedisContext;
use super::redis_funcs::Operation;
use crate::error::{LoaderError, Result};

const USAGE: &str = "redis-hash-loader <HOSTS> <USERNAME> <PASSWORD> <SSL> <OPERATION> <FILE_OR_PATTERN>";
const EXAMPLE: &str = "Example:\n  redis-hash-loader 192.168.13.120:9001,192.168.13.121:9001 redis redis true add /tmp/redis-add.txt";

/// Bulk hash-field operations against a Redis Cluster
#[derive(Parser, Debug)]
#[command(author, version, about, override_usage = USAGE, after_help = EXAMPLE)]
pub struct Args {
    /// Cluster nodes, host1:port1,host2:port2,...
    pub hosts: String,
    /// ACL username, empty for none
    #[arg(allow_hyphen_values = true)]
    pub username: String,
    /// Password, empty for none
    #[arg(allow_hyphen_values = true)]
    pub password: String,
    /// Connect with TLS (true/false)
    #[arg(action = clap::ArgAction::Set, value_parser = parse_ssl_flag)]
    pub ssl: bool,
    /// add, get, delete, get-pattern or delete-pattern
    #[arg(value_parser = parse_operation)]
    pub operation: Operation,
    /// Keys file for add/get/delete, glob pattern for get-pattern/delete-pattern
    #[arg(allow_hyphen_values = true)]
    pub file_or_pattern: String,
    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Per-node connection timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,
    /// Per-command response timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub response_timeout: u64,
}

/// Anything other than a case-insensitive `true` means no TLS.
fn parse_ssl_flag(s: &str) -> std::result::Result<bool, String> {
    Ok(s.trim().eq_ignore_ascii_case("true"))
}

fn parse_operation(s: &str) -> std::result::Result<Operation, String> {
    Operation::from_str(s.trim(), false)
}

/// What to run once connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub operation: Operation,
    pub file: Option<PathBuf>,
    pub pattern: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Args {
    pub fn into_parts(self) -> (RedisContext, Job) {
        let mut redis_context = RedisContext::new(
            self.hosts.trim(),
            self.username.trim(),
            self.password.trim(),
            self.ssl,
        );
        redis_context.options.connection_timeout = Duration::from_secs(self.connect_timeout);
        redis_context.options.response_timeout = Duration::from_secs(self.response_timeout);

        let target = self.file_or_pattern.trim().to_string();
        let (file, pattern) = if self.operation.is_pattern() {
            (None, Some(target))
        } else {
            (Some(PathBuf::from(target)), None)
        };
        let job = Job {
            operation: self.operation,
            file,
            pattern,
            verbose: self.verbose,
            quiet: self.quiet,
        };
        (redis_context, job)
    }
}

/// Help and version requests exit here; every other parse failure becomes `Usage`.
pub fn try_parse_args<I, T>(args: I) -> Result<(RedisContext, Job)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(args.into_parts()),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => Err(LoaderError::Usage(format!("{}\n{}", err, EXAMPLE))),
        },
    }
}

pub fn parse_args() -> Result<(RedisContext, Job)> {
    try_parse_args(std::env::args_os())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rest: &[&str]) -> Vec<String> {
        std::iter::once("redis-hash-loader")
            .chain(rest.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_file_operation() {
        let (ctx, job) = try_parse_args(args(&[
            "h1:9001,h2:9002", "redis", "secret", "TRUE", "add", " /tmp/keys.txt ",
        ]))
        .unwrap();
        assert_eq!("h1:9001,h2:9002", ctx.hosts);
        assert_eq!(Some(String::from("redis")), ctx.username);
        assert!(ctx.ssl);
        assert_eq!(Operation::Add, job.operation);
        assert_eq!(Some(PathBuf::from("/tmp/keys.txt")), job.file);
        assert_eq!(None, job.pattern);
    }

    #[test]
    fn test_parse_pattern_operation() {
        let (ctx, job) = try_parse_args(args(&[
            "h1:9001", "", "", "no", "delete-pattern", "user:*",
        ]))
        .unwrap();
        assert!(!ctx.ssl);
        assert_eq!(None, ctx.password);
        assert_eq!(Operation::DeletePattern, job.operation);
        assert_eq!(Some(String::from("user:*")), job.pattern);
        assert_eq!(None, job.file);
    }

    #[test]
    fn test_optional_flags() {
        let (ctx, job) = try_parse_args(args(&[
            "h1:9001", "u", "p", "false", "get", "keys.txt", "-v", "--connect-timeout", "3",
        ]))
        .unwrap();
        assert!(job.verbose);
        assert_eq!(Duration::from_secs(3), ctx.options.connection_timeout);
        assert_eq!(Duration::from_secs(30), ctx.options.response_timeout);
    }

    #[test]
    fn test_hyphen_leading_values() {
        let (ctx, job) = try_parse_args(args(&[
            "h1:9001", "-user", "-secret", "true", "delete-pattern", "-tmp:*",
        ]))
        .unwrap();
        assert_eq!(Some(String::from("-user")), ctx.username);
        assert_eq!(Some(String::from("-secret")), ctx.password);
        assert_eq!(Some(String::from("-tmp:*")), job.pattern);
    }

    #[test]
    fn test_operation_is_trimmed() {
        let (_, job) = try_parse_args(args(&["h1:9001", "u", "p", "true", " add ", "f"])).unwrap();
        assert_eq!(Operation::Add, job.operation);
        assert!(try_parse_args(args(&["h1:9001", "u", "p", "true", "ADD", "f"])).is_err());
    }

    #[test]
    fn test_too_few_arguments() {
        let err = try_parse_args(args(&["h1:9001", "u", "p", "true", "add"])).unwrap_err();
        assert!(matches!(err, LoaderError::Usage(_)));
        assert_eq!(crate::error::ABORT_STATUS, err.exit_code());
    }

    #[test]
    fn test_unknown_operation() {
        let err = try_parse_args(args(&["h1:9001", "u", "p", "true", "upsert", "f"])).unwrap_err();
        assert!(matches!(err, LoaderError::Usage(_)));
    }
}
