use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use redis_hash_loader::cmd_parser::parse_args;
use redis_hash_loader::error::ABORT_STATUS;
use redis_hash_loader::work_with_redis;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn main() {
    let (redis_context, job) = match parse_args() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(ABORT_STATUS);
        }
    };
    setup_logging(job.verbose, job.quiet);

    if let Err(err) = work_with_redis(&redis_context, &job) {
        error!("{}", err);
        std::process::exit(err.exit_code());
    }
}
