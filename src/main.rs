use bucketeer::cli::Args;
use clap::Parser;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
    let args = Args::parse();

    // A panic anywhere in the run comes back as a JoinError.
    let task = tokio::spawn(bucketeer::run(args.source_dir, args.output_dir));
    tokio::select! {
        joined = task => match joined {
            // Fatal errors were logged by run() itself.
            Ok(_) => {},
            Err(err) => tracing::error!("Unexpected error occurred: {err}"),
        },
        Ok(()) = tokio::signal::ctrl_c() => tracing::warn!("Operation interrupted by the user."),
    }
}
