use std::io;
use std::io::Write;

use tracing::info;

use cmd_parser::Job;
use error::{LoaderError, Result};
use records::RecordSet;
use redis_context::RedisContext;
use redis_funcs::{Summary, Target};
use store::HashStore;

pub mod cmd_parser;
pub mod error;
pub mod records;
pub mod redis_context;
pub mod redis_funcs;
pub mod store;

/// Reads the keys file for non-pattern operations; pattern operations load nothing.
pub fn load_job_records(job: &Job) -> Result<Option<RecordSet>> {
    match &job.file {
        Some(path) if !job.operation.is_pattern() => Ok(Some(records::load_records(path)?)),
        _ => Ok(None),
    }
}

pub fn run_job<S: HashStore, W: Write>(
    job: &Job,
    records: Option<&RecordSet>,
    store: &mut S,
    out: &mut W,
) -> Result<Summary> {
    let target = match (records, &job.pattern) {
        (Some(records), _) => Target::Records(records),
        (None, Some(pattern)) => Target::Pattern(pattern),
        (None, None) => {
            return Err(LoaderError::Usage(String::from("no keys file or pattern given")))
        }
    };
    redis_funcs::dispatch(job.operation, target, store, out)
}

/// Loads input before connecting so that a bad keys file never touches the cluster.
pub fn work_with_redis(redis_context: &RedisContext, job: &Job) -> Result<Summary> {
    let records = load_job_records(job)?;
    let mut store = redis_context.make_connection()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_job(job, records.as_ref(), &mut store, &mut out)?;
    out.flush()?;
    info!(
        "{:?} finished: {} considered, {} affected",
        job.operation, summary.considered, summary.affected
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::redis_funcs::Operation;
    use crate::store::MemoryStore;

    fn job(operation: Operation, file: Option<&str>, pattern: Option<&str>) -> Job {
        Job {
            operation,
            file: file.map(PathBuf::from),
            pattern: pattern.map(String::from),
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_pattern_job_skips_loader() {
        let job = job(Operation::GetPattern, None, Some("user:*"));
        assert!(load_job_records(&job).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_aborts_before_connecting() {
        let job = job(Operation::Add, Some("/nonexistent/keys.txt"), None);
        let ctx = RedisContext::new("unreachable:1", "", "", false);
        let err = work_with_redis(&ctx, &job).unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
        assert_eq!(error::ABORT_STATUS, err.exit_code());
    }

    #[test]
    fn test_run_job_with_records() {
        let records = records::parse_records("k1,h1,v1\n".as_bytes()).unwrap();
        let mut store = MemoryStore::new();
        let mut out = Vec::new();
        let add = job(Operation::Add, Some("keys.txt"), None);
        let summary = run_job(&add, Some(&records), &mut store, &mut out).unwrap();
        assert_eq!(1, summary.affected);
        assert_eq!(
            "Number of key inserted:1, keys in file:1\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn test_run_job_with_pattern() {
        let mut store = MemoryStore::new();
        store.hset("user:1", "h", "v").unwrap();
        let mut out = Vec::new();
        let get = job(Operation::GetPattern, None, Some("user:*"));
        run_job(&get, None, &mut store, &mut out).unwrap();
        assert_eq!("Pattern:user:*\nKey:user:1\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn test_run_job_without_input() {
        let mut store = MemoryStore::new();
        let mut out = Vec::new();
        let get = job(Operation::Get, None, None);
        assert!(matches!(
            run_job(&get, None, &mut store, &mut out),
            Err(LoaderError::Usage(_))
        ));
    }
}
