use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::{error, info};

use nianbao::{batch, config::Config, report};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "nianbao=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(".", "nianbao.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env())
        )
        .init();

    // Usage problems are reported, not turned into an exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(());
        }
    };

    let job = match cli.job() {
        Ok(Some(job)) => job,
        Ok(None) => {
            Cli::command().print_help()?;
            return Ok(());
        }
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    let mut config = Config::from_env()?;
    config.download_dir = cli.dir.clone();
    config.validate()?;

    info!(
        "Starting download: {} stock codes, {} years into {}",
        job.codes.len(),
        job.years.len(),
        config.download_dir.display()
    );

    let started = std::time::Instant::now();
    let outcomes = batch::download_reports(&config, &job.codes, &job.years).await?;
    let elapsed = started.elapsed();

    let summary = report::render(&outcomes);
    println!("{}", summary);

    match report::save(&summary, &config.download_dir, chrono::Local::now()) {
        Ok(path) => info!("Report saved to {}", path.display()),
        Err(e) => error!("Failed to save report: {}", e),
    }
    info!("Finished in {:.1} seconds", elapsed.as_secs_f64());

    Ok(())
}
