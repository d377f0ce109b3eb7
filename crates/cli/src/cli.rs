// crates/cli/src/cli.rs

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{builder::ValueHint, Parser, Subcommand};
use dbj::{
    document_from_value, Document, FindOptions, Key, QueryConfig, Settings, Store, StoreConfig,
    TextMatch,
};
use serde_json::Value as Json;
use tracing::{debug, error, info};

/// dbj CLI
#[tracing::instrument(skip_all)]
pub fn start() -> ExitCode {
    let cli = Cli::parse();
    let stdout = io::stdout();

    run(cli, &mut stdout.lock()).map_or_else(
        |e| {
            error!("dbj failed: {:#}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[derive(Parser, Debug)]
#[command(name = "dbj", version, about = "Query and edit a dbj JSON document store")]
pub struct Cli {
    /// Settings file (TOML) describing the store and query defaults
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DBJ_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Store file; overrides `store.path` from the settings file
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "DBJ_PATH",
        value_hint = ValueHint::FilePath
    )]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query, e.g. `name ?= "silva" and age >= 18`
    Find(FindCmd),
    /// Text search on a single field
    Text(TextCmd),
    /// Numeric comparison on a single field, e.g. `age >= 18`
    Num {
        #[arg(value_name = "EXPR")]
        expression: String,
    },
    /// List every key ordered by a field
    Sort {
        field: String,
        #[arg(long)]
        reverse: bool,
    },
    /// Print the document stored under KEY
    Get { key: String },
    /// Insert a JSON object, printing its key
    Insert {
        json: String,
        /// Use this key instead of a generated one
        #[arg(long)]
        key: Option<String>,
    },
    /// Merge the fields of a JSON object into an existing document
    Update { key: String, json: String },
    /// Delete documents, printing how many existed
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List every key in store order
    Keys,
    /// Print the number of documents
    Size,
}

#[derive(Parser, Debug)]
pub struct FindCmd {
    pub query: String,
    /// Case-sensitive text comparisons
    #[arg(long)]
    pub sens: bool,
    /// Keep diacritics significant
    #[arg(long)]
    pub no_fold: bool,
    /// Sort the result by this field
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,
    /// Reverse the sort order
    #[arg(long, requires = "sort")]
    pub reverse: bool,
    /// Print matching documents instead of keys
    #[arg(long)]
    pub docs: bool,
}

#[derive(Parser, Debug)]
pub struct TextCmd {
    pub field: String,
    pub text: String,
    /// Whole-value match instead of substring
    #[arg(long)]
    pub exact: bool,
    /// Case-sensitive comparison
    #[arg(long)]
    pub sens: bool,
    /// Print the documents that do not match
    #[arg(long)]
    pub invert: bool,
    /// Keep diacritics significant
    #[arg(long)]
    pub no_fold: bool,
}

/// Resolve settings from `--config` and `--db`.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match (&cli.config, &cli.db) {
        (Some(config), _) => Settings::from_file(config)
            .with_context(|| format!("loading settings from {}", config.display()))?,
        (None, Some(db)) => Settings {
            store: StoreConfig::new(db),
            query: QueryConfig::default(),
        },
        (None, None) => bail!("no store given; pass --db FILE or --config FILE"),
    };

    if let Some(db) = &cli.db {
        settings.store.path = db.clone();
    }
    debug!(path = %settings.store.path.display(), "settings resolved");
    Ok(settings)
}

#[tracing::instrument(skip_all)]
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let settings = load_settings(&cli)?;
    let mut store = Store::open(&settings.store)
        .with_context(|| format!("opening store {}", settings.store.path.display()))?;
    let defaults = settings.query;

    match cli.command {
        Commands::Find(cmd) => {
            let mut opts = FindOptions {
                case_sensitive: defaults.case_sensitive || cmd.sens,
                fold_diacritics: defaults.fold_diacritics && !cmd.no_fold,
                ..FindOptions::default()
            };
            if let Some(field) = cmd.sort {
                opts = opts.sort_by(field, cmd.reverse);
            }

            let keys = store.find(&cmd.query, &opts)?;
            if cmd.docs {
                write_documents(out, &store, &keys)?;
            } else {
                write_keys(out, &keys)?;
            }
        }
        Commands::Text(cmd) => {
            let opts = TextMatch {
                exact: cmd.exact,
                case_sensitive: defaults.case_sensitive || cmd.sens,
                invert: cmd.invert,
                fold_diacritics: defaults.fold_diacritics && !cmd.no_fold,
            };
            let keys = store.find_text(&cmd.field, &cmd.text, opts);
            write_keys(out, &keys)?;
        }
        Commands::Num { expression } => {
            let keys = store.find_num(&expression)?;
            write_keys(out, &keys)?;
        }
        Commands::Sort { field, reverse } => {
            let keys = store.sort(&store.keys(), &field, reverse);
            write_keys(out, &keys)?;
        }
        Commands::Get { key } => {
            let doc = store
                .get(&key)
                .ok_or_else(|| anyhow!("no document under key {key}"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(doc)?)?;
        }
        Commands::Insert { json, key } => {
            let value: Json = serde_json::from_str(&json).context("parsing document")?;
            let key = store.insert_value(value, key.as_deref())?;
            persist(&store)?;
            info!(%key, "document inserted");
            writeln!(out, "{key}")?;
        }
        Commands::Update { key, json } => {
            let values = parse_document(&json)?;
            if !store.update(&key, values)? {
                bail!("no document under key {key}");
            }
            persist(&store)?;
            info!(%key, "document updated");
        }
        Commands::Delete { keys } => {
            let deleted = store.delete_many(&keys)?;
            if deleted > 0 {
                persist(&store)?;
            }
            info!(deleted, "documents deleted");
            writeln!(out, "{deleted}")?;
        }
        Commands::Keys => write_keys(out, &store.keys())?,
        Commands::Size => writeln!(out, "{}", store.len())?,
    }

    Ok(())
}

fn parse_document(json: &str) -> Result<Document> {
    let value: Json = serde_json::from_str(json).context("parsing document")?;
    Ok(document_from_value(value)?)
}

/// Save unless autosave already did.
fn persist(store: &Store) -> Result<()> {
    if !store.autosave() {
        store.save()?;
    }
    Ok(())
}

fn write_keys<'a>(out: &mut impl Write, keys: impl IntoIterator<Item = &'a Key>) -> Result<()> {
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

fn write_documents(out: &mut impl Write, store: &Store, keys: &[Key]) -> Result<()> {
    let docs: serde_json::Map<String, Json> = keys
        .iter()
        .filter_map(|key| {
            store
                .get(key)
                .map(|doc| (key.clone(), Json::Object(doc.clone())))
        })
        .collect();
    writeln!(out, "{}", serde_json::to_string_pretty(&docs)?)?;
    Ok(())
}
