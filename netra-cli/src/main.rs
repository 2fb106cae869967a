mod args;
mod config;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{Args, Command, ImportArgs, UpdateArgs};
use config::NetraConfig;
use netra_core::{ImportRequest, filter_datasets, import_scan, shared_store};
use netra_db::DatasetStore;
use netra_parser::ParserRunner;
use netra_types::{DatasetId, now_timestamp};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing based on verbosity
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = NetraConfig::load(args.config.as_deref())?;
    let db_path = config.database_path(args.db.as_deref());
    debug!(path = %db_path.display(), "opening dataset library");
    let store = DatasetStore::open(&db_path)
        .with_context(|| format!("failed to open dataset library {}", db_path.display()))?;

    match args.command {
        Command::Import(import) => run_import(import, &config, store).await,
        Command::List { filter, json } => list_datasets(&store, filter.as_deref(), json),
        Command::Show { id, assets, json } => show_dataset(&store, id, assets, json),
        Command::Search { term, json } => search_datasets(&store, &term, json),
        Command::Update(update) => update_dataset(&store, update),
        Command::Delete { id } => delete_dataset(&store, id),
    }
}

async fn run_import(import: ImportArgs, config: &NetraConfig, store: DatasetStore) -> Result<()> {
    let runner = ParserRunner::new(
        config.parser_config(import.parser_script.as_deref(), import.timeout),
    );
    let scan_date = import.date.unwrap_or_else(|| now_timestamp().date());
    let request = ImportRequest::new(import.company, scan_date, import.files)
        .with_notes(import.notes.unwrap_or_default())
        .allow_empty(import.allow_empty);

    let outcome = import_scan(request, &runner, shared_store(store))
        .await
        .context("import failed")?;

    eprintln!("{}", outcome.selection.status_line());
    for warning in &outcome.warnings {
        eprintln!("Warning: {warning}");
    }

    let ds = &outcome.dataset;
    println!(
        "Imported dataset {} for {}: {} assets ({} active) from {} file(s).",
        ds.id.map(|id| id.to_string()).unwrap_or_default(),
        ds.company_name,
        ds.total_assets,
        ds.active_assets,
        ds.scans_processed
    );
    if !ds.all_services.is_empty() {
        println!("Top services: {}", ds.all_services);
    }
    Ok(())
}

fn list_datasets(store: &DatasetStore, filter: Option<&str>, json: bool) -> Result<()> {
    let datasets = store.list_datasets().context("failed to list datasets")?;
    let shown = filter_datasets(&datasets, filter.unwrap_or_default());
    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", output::dataset_table(&shown));
    }
    Ok(())
}

fn show_dataset(store: &DatasetStore, id: DatasetId, with_assets: bool, json: bool) -> Result<()> {
    let Some(dataset) = store
        .get_dataset(id)
        .with_context(|| format!("failed to load dataset {id}"))?
    else {
        bail!("no dataset with id {id}");
    };
    let assets = if with_assets {
        store
            .dataset_assets(id)
            .with_context(|| format!("failed to load assets for dataset {id}"))?
    } else {
        Vec::new()
    };

    if json {
        let value = if with_assets {
            serde_json::json!({ "dataset": dataset, "assets": assets })
        } else {
            serde_json::to_value(&dataset)?
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", output::dataset_detail(&dataset));
        if with_assets {
            println!();
            print!("{}", output::asset_table(&assets));
        }
    }
    Ok(())
}

fn search_datasets(store: &DatasetStore, term: &str, json: bool) -> Result<()> {
    let found = store
        .search_datasets(term)
        .with_context(|| format!("failed to search for '{term}'"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        let refs: Vec<_> = found.iter().collect();
        print!("{}", output::dataset_table(&refs));
    }
    Ok(())
}

fn update_dataset(store: &DatasetStore, update: UpdateArgs) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to update: pass --company, --date, --risk or --notes");
    }
    let id = update.id;
    let Some(mut dataset) = store
        .get_dataset(id)
        .with_context(|| format!("failed to load dataset {id}"))?
    else {
        bail!("no dataset with id {id}");
    };

    if let Some(company) = update.company {
        dataset.company_name = company;
    }
    if let Some(date) = update.date {
        dataset.scan_date = date;
    }
    if let Some(risk) = update.risk {
        dataset.risk_level = risk;
    }
    if let Some(notes) = update.notes {
        dataset.file_notes = notes;
    }

    if !store
        .update_dataset(&dataset)
        .with_context(|| format!("failed to update dataset {id}"))?
    {
        bail!("dataset {id} no longer exists");
    }
    println!("Dataset {id} updated.");
    Ok(())
}

fn delete_dataset(store: &DatasetStore, id: DatasetId) -> Result<()> {
    if !store
        .delete_dataset(id)
        .with_context(|| format!("failed to delete dataset {id}"))?
    {
        bail!("no dataset with id {id}");
    }
    println!("Dataset {id} deleted.");
    Ok(())
}
