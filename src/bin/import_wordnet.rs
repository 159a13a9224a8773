use std::path::PathBuf;
use std::process;

use clap::Parser;

use sanakota_backend::config::Config;
use sanakota_backend::db::{migrate, Database};
use sanakota_backend::import;
use sanakota_backend::logging;
use sanakota_backend::services::words::WordRepository;

/// Imports a FinnWordNet TSV export into the words table.
#[derive(Parser)]
#[command(name = "import-wordnet", about = "Import FinnWordNet synsets into the dictionary")]
struct Cli {
    /// Path to the synset records file (fiwn-synsets-extra.tsv).
    #[arg(long)]
    synsets: PathBuf,

    /// Path to the semantic relation records file (fiwn-semrels-extra.tsv).
    #[arg(long)]
    semrels: Option<PathBuf>,

    /// Delete all existing words before importing.
    #[arg(long)]
    truncate: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let database = match Database::connect(&config.database).await {
        Ok(database) => database,
        Err(err) => {
            tracing::error!(error = %err, "database connection failed");
            process::exit(1);
        }
    };

    if let Err(err) = migrate::run_migrations(database.pool()).await {
        tracing::error!(error = %err, "migrations failed");
        process::exit(1);
    }

    let repo = WordRepository::new(&database);

    match import::import_wordnet(&repo, &cli.synsets, cli.semrels.as_deref(), cli.truncate).await {
        Ok(report) => {
            for (relation, count) in &report.relations {
                tracing::info!(relation = %relation, count = *count, "semantic relations seen");
            }
            tracing::info!(
                imported = report.imported,
                skipped = report.skipped,
                "import finished"
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "import failed");
            process::exit(1);
        }
    }
}
