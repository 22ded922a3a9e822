use anyhow::Context;
use chainbasis::{config::Config, pipeline, CsvTransferSource};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config).await {
        tracing::error!(error = %e, "run aborted");
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let source = CsvTransferSource::new(&config.input_path);
    pipeline::run(config, &source)
        .await
        .with_context(|| format!("processing {}", config.input_path))?;
    Ok(())
}
