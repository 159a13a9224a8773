use std::process;

use clap::Parser;

use sanakota_backend::config::Config;
use sanakota_backend::db::Database;
use sanakota_backend::logging;
use sanakota_backend::morphology::{self, HfstGenerator};
use sanakota_backend::services::words::{WordRepository, WordUpdate};

/// Fills inflection maps by querying the omorfi generator transducer.
#[derive(Parser)]
#[command(
    name = "generate-inflections",
    about = "Generate surface forms for stored words via hfst-lookup"
)]
struct Cli {
    /// Restrict the run to one part of speech.
    #[arg(long)]
    pos: Option<String>,

    /// Only process words whose inflection map is still empty.
    #[arg(long)]
    only_missing: bool,

    /// Maximum number of words to process.
    #[arg(long, default_value_t = 500)]
    limit: i64,

    /// Number of words to skip from the oldest-first ordering.
    #[arg(long, default_value_t = 0)]
    offset: i64,

    /// Print generated forms without writing them back.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let generator = match HfstGenerator::from_env() {
        Ok(generator) => generator,
        Err(err) => {
            tracing::error!(error = %err, "morphology generator not configured");
            process::exit(1);
        }
    };

    let database = match Database::connect(&config.database).await {
        Ok(database) => database,
        Err(err) => {
            tracing::error!(error = %err, "database connection failed");
            process::exit(1);
        }
    };

    let repo = WordRepository::new(&database);

    let words = match repo
        .find_inflection_batch(cli.pos.as_deref(), cli.only_missing, cli.limit, cli.offset)
        .await
    {
        Ok(words) => words,
        Err(err) => {
            tracing::error!(error = %err, "failed to fetch words to inflect");
            process::exit(1);
        }
    };

    tracing::info!(count = words.len(), "words selected for inflection");

    let mut processed = 0u64;
    let mut updated = 0u64;

    for word in words {
        let generated = morphology::generate_paradigm(&generator, &word.lemma, &word.pos).await;
        processed += 1;

        if processed % 50 == 0 {
            tracing::info!(processed, "inflection progress");
        }

        if generated.is_empty() {
            continue;
        }

        if cli.dry_run {
            println!("{} ({}) => {:?}", word.lemma, word.pos, generated);
            continue;
        }

        // Generated forms win per slot; untouched slots keep their value.
        let mut merged = word.inflections.clone();
        merged.extend(generated);

        let update = WordUpdate {
            inflections: Some(merged),
            ..WordUpdate::default()
        };

        match repo.update(word.id, update).await {
            Ok(Some(_)) => updated += 1,
            Ok(None) => {
                tracing::warn!(id = word.id, "word disappeared during inflection run");
            }
            Err(err) => {
                tracing::warn!(id = word.id, error = %err, "failed to store inflections");
            }
        }
    }

    tracing::info!(processed, updated, "inflection run finished");
}
