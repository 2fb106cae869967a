use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use netra_types::DatasetId;

/// netra: a local library of nmap scan datasets
#[derive(Parser, Debug)]
#[command(name = "netra", version, about = "Import, browse and manage nmap scan datasets")]
pub struct Args {
    /// Increase verbosity level (use -v, -vv or -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Dataset library file (overrides the config file)
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.netra/config.toml, %APPDATA%\Netra\config.toml on Windows)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse scan files and save them as a new dataset
    Import(ImportArgs),

    /// List datasets, most recently modified first
    List {
        /// Keep only datasets matching every comma-separated term
        #[arg(long = "filter", value_name = "TERMS")]
        filter: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one dataset
    Show {
        #[arg(value_name = "ID")]
        id: DatasetId,

        /// Also list the dataset's assets
        #[arg(long)]
        assets: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search company, services, risk level and notes
    Search {
        #[arg(value_name = "TERM")]
        term: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Edit a dataset's metadata
    Update(UpdateArgs),

    /// Delete a dataset and all of its assets
    Delete {
        #[arg(value_name = "ID")]
        id: DatasetId,
    },
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Scan files (.zip, .txt, .nmap by default)
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Company or client the scans belong to
    #[arg(short = 'c', long = "company", value_name = "NAME")]
    pub company: String,

    /// Scan date, YYYY-MM-DD (default: today)
    #[arg(long = "date", value_name = "DATE", value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Free-text notes stored with the dataset
    #[arg(long = "notes", value_name = "TEXT")]
    pub notes: Option<String>,

    /// Save the dataset even if the parser finds no assets
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,

    /// Parser script to run (overrides the config file)
    #[arg(long = "parser-script", value_name = "PATH")]
    pub parser_script: Option<PathBuf>,

    /// Parser timeout in seconds (overrides the config file)
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    #[arg(value_name = "ID")]
    pub id: DatasetId,

    #[arg(long = "company", value_name = "NAME")]
    pub company: Option<String>,

    #[arg(long = "date", value_name = "DATE", value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    #[arg(long = "risk", value_name = "LEVEL")]
    pub risk: Option<String>,

    #[arg(long = "notes", value_name = "TEXT")]
    pub notes: Option<String>,
}

impl UpdateArgs {
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.date.is_none() && self.risk.is_none() && self.notes.is_none()
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), netra_types::DATE_FORMAT)
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}
