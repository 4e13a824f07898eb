use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, about, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API.
    Serve {
        /// Overrides `server.host`.
        #[arg(long, env = "BOOKSTORE_HOST")]
        host: Option<String>,
        /// Overrides `server.port`.
        #[arg(long, env = "BOOKSTORE_PORT")]
        port: Option<u16>,
    },
    /// Apply pending migrations and exit.
    Migrate,
    /// Print the mounted modules and their migrations.
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, "bookstore CLI starting");

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            bookstore_app::serve(settings).await
        }
        Command::Migrate => {
            let registry = bookstore_app::registry();
            let db = bookstore_app::migrate(&settings, &registry).await?;
            db.close().await;
            Ok(())
        }
        Command::Routes => {
            let registry = bookstore_app::registry();
            for module in registry.modules() {
                println!(
                    "/{}\t{} migration(s)",
                    module.name(),
                    module.migrations().len()
                );
            }
            Ok(())
        }
    }
}
