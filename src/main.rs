//! sumoql - query assistant for log analytics
//!
//! Fetches folder listings, custom fields and partitions from a Sumo
//! Logic-style API and keeps per-profile autocomplete state that grows with
//! every search you run.
//!
//! # Usage
//!
//! ```bash
//! # Learn custom fields and partitions for the default profile
//! sumoql sync
//!
//! # Run a search and learn the fields in its results
//! sumoql search '_sourceCategory=prod/web' --from 2024-01-01T00:00:00 --to 2024-01-01T01:00:00
//!
//! # Show what the editor would suggest
//! sumoql suggest _source
//! ```

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};

use sumoql::cli::{CliInterface, Commands};
use sumoql::client::{ApiClient, SearchJobRequest, SearchOptions};
use sumoql::completion::{CompletionCatalog, DynamicCompletionStore, JsonFileStore};
use sumoql::config::TimeZoneSetting;
use sumoql::error::Result;
use sumoql::formatter::{SuggestionTable, format_folder_report, format_folder_report_in, format_json};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle local subcommands or dispatch to a remote/store command
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    match &cli.args().command {
        Commands::Folder { id, json } => run_folder(&cli, id.as_deref(), *json).await,
        Commands::Sync => run_sync(&cli).await,
        Commands::Search {
            query,
            from,
            to,
            time_zone,
            limit,
        } => {
            let mut request = SearchJobRequest::new(query, from, to);
            if let Some(tz) = time_zone {
                request = request.with_time_zone(tz);
            }
            run_search(&cli, &request, *limit).await
        }
        Commands::Suggest { prefix, json } => {
            run_suggest(&cli, prefix.as_deref().unwrap_or(""), *json).await
        }
        Commands::Forget { profile } => run_forget(&cli, profile.as_deref()).await,
        Commands::Config { .. } | Commands::Completion { .. } | Commands::Version => Ok(()),
    }
}

/// Build an API client for the active profile
fn connect(cli: &CliInterface) -> Result<ApiClient> {
    let connection = cli.connection()?;
    info!(
        "Using profile '{}' at {}",
        connection.profile, connection.endpoint
    );
    ApiClient::from_connection(&connection)
}

/// Open the completion store and load the active profile
async fn open_store(cli: &CliInterface) -> DynamicCompletionStore {
    let completion = &cli.config().completion;
    let backend = Arc::new(JsonFileStore::new(&completion.state_file));
    let mut store = DynamicCompletionStore::new(backend, completion.key_prefix.clone());
    store.load_profile(&cli.profile()).await;
    store
}

/// Print a folder report or its raw JSON
async fn run_folder(cli: &CliInterface, id: Option<&str>, json: bool) -> Result<()> {
    let client = connect(cli)?;
    let folder = match id {
        Some(id) => client.folder(id).await?,
        None => client.personal_folder().await?,
    };

    let output = if json {
        format_json(&folder)?
    } else {
        match cli.config().display.time_zone {
            TimeZoneSetting::Local => format_folder_report(&folder),
            TimeZoneSetting::Utc => format_folder_report_in(&folder, &Utc),
        }
    };
    print!("{}", output);
    if json {
        println!();
    }
    Ok(())
}

/// Pull custom fields and partitions into the completion store
async fn run_sync(cli: &CliInterface) -> Result<()> {
    let client = connect(cli)?;
    let fields = client.custom_field_names().await?;
    let partitions = client.partition_names().await?;

    let mut store = open_store(cli).await;
    let new_fields = store.add_custom_fields(&fields).await;
    let new_partitions = store.add_partitions(&partitions).await;

    println!(
        "Profile '{}': {} custom fields ({} new), {} partitions ({} new)",
        cli.profile(),
        fields.len(),
        new_fields,
        partitions.len(),
        new_partitions
    );
    Ok(())
}

/// Run a search job and feed its rows to the completion store
async fn run_search(
    cli: &CliInterface,
    request: &SearchJobRequest,
    limit: Option<u32>,
) -> Result<()> {
    let client = connect(cli)?;
    let search = &cli.config().search;
    let options = SearchOptions {
        poll_interval: cli.config().poll_interval(),
        max_wait: Duration::from_secs(search.max_wait_secs),
        limit: limit.unwrap_or(search.limit),
    };

    let outcome = client.run_search(request, options).await?;
    let mut store = open_store(cli).await;
    let new_fields = store.add_search_outcome(&outcome).await?;

    println!(
        "Search job {} finished ({}): {} rows, {} new fields",
        outcome.job_id,
        outcome.status.state,
        outcome.rows.len(),
        new_fields
    );
    Ok(())
}

/// Print tier-ordered suggestions for the active profile
async fn run_suggest(cli: &CliInterface, prefix: &str, json: bool) -> Result<()> {
    let store = open_store(cli).await;
    let items = CompletionCatalog::new().complete(&store, prefix);

    if json {
        println!("{}", format_json(&items)?);
    } else {
        let table = SuggestionTable::with_colors(cli.config().display.color_output);
        println!("{}", table.format(&items));
    }
    Ok(())
}

/// Delete a profile's stored completion state
async fn run_forget(cli: &CliInterface, profile: Option<&str>) -> Result<()> {
    let name = profile.map(str::to_string).unwrap_or_else(|| cli.profile());
    let mut store = open_store(cli).await;
    store.clear_profile(&name).await?;
    println!("Forgot completion state for profile '{}'", name);
    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so command output on stdout stays clean.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
