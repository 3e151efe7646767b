use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Status used for every "abort" path: bad arguments, bad input file, no connection.
pub const ABORT_STATUS: i32 = -9;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("{0}")]
    Usage(String),

    #[error("File does not exists. File:{}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid keys exists in the file or file is empty.")]
    NoValidRecords,

    #[error("Redis node details are empty. redisHostDetails:{0}")]
    NoNodes(String),

    #[error("Could not connect to redis. Check the input parameters: {0}")]
    Connection(redis::RedisError),

    #[error("Redis error: {0}")]
    Store(#[from] redis::RedisError),
}

impl LoaderError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoaderError::Store(_) => 1,
            _ => ABORT_STATUS,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
