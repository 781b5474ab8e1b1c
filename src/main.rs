use anyhow::Result;
use clap::Parser;
use deepquery::cli::{self, Args};
use deepquery::launch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = Args::parse();
    let query = args.query.take();
    let config = args.into_config()?;
    init_tracing(config.verbose);

    let query = match query {
        Some(query) => query,
        None => cli::read_query(&mut std::io::stdin().lock(), &mut std::io::stdout())?,
    };

    launch(&config, &query).await?;
    Ok(())
}

/// 日志写到stderr，RUST_LOG优先于verbose开关
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "deepquery=debug"
    } else {
        "deepquery=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
