use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = csv_api::Cli::parse();

    if let Err(err) = csv_api::run(cli).await {
        tracing::error!(error = %err, "csv-api exited with an error");
        std::process::exit(1);
    }
}
