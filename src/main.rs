use chalet_media::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chalet_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            chalet_media::cli::init::run(path).await?;
        }
        Some(Commands::Check { files }) => {
            chalet_media::cli::check::run(&cli.config, &cli.manifest, files).await?;
        }
        Some(Commands::Upload { files, retry }) => {
            chalet_media::cli::upload::run(&cli.config, &cli.manifest, files, retry).await?;
        }
        Some(Commands::List) => {
            chalet_media::cli::collection::list(&cli.manifest).await?;
        }
        Some(Commands::Move { from, to }) => {
            chalet_media::cli::collection::reorder(&cli.config, &cli.manifest, from, to).await?;
        }
        Some(Commands::Label { index, text }) => {
            chalet_media::cli::collection::label(&cli.config, &cli.manifest, index, &text).await?;
        }
        Some(Commands::Delete { index }) => {
            chalet_media::cli::delete::run(&cli.config, &cli.manifest, index).await?;
        }
        Some(Commands::Verify) => {
            chalet_media::cli::collection::verify(&cli.manifest).await?;
        }
        None => {
            // No subcommand provided, print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
