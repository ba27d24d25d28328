/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command-line access to structure documents and the snapshot store.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bpaf::Bpaf;
use log::{error, info};

use rnashell::config::EditorConfig;
use rnashell::graph::Structure;
use rnashell::persistence::codec::{self, ValidationError};
use rnashell::persistence::document::Document;
use rnashell::persistence::{DocumentStore, StoreError};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Inspect, transform and store RNA structure documents
struct Options {
    /// Snapshot store directory (default: from config.toml)
    #[bpaf(long, argument("DIR"))]
    data_dir: Option<PathBuf>,

    /// Store key prefix (default: from config.toml)
    #[bpaf(long, argument("NAME"))]
    namespace: Option<String>,

    #[bpaf(external(command))]
    command: Command,
}

#[derive(Debug, Clone, Bpaf)]
enum Command {
    /// Check that a document file would import
    #[bpaf(command)]
    Validate {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },

    /// Print counts and the sequence of a document
    #[bpaf(command)]
    Stats {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },

    /// Write a horizontally mirrored copy of a document
    #[bpaf(command)]
    Flip {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
        #[bpaf(positional("OUT"))]
        out: PathBuf,
    },

    /// Store a document as a named snapshot
    #[bpaf(command)]
    Save {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },

    /// List named snapshots, newest first
    #[bpaf(command)]
    List,

    /// Export a snapshot to a file
    #[bpaf(command)]
    Restore {
        /// Snapshot key (default: the autosave slot)
        #[bpaf(long, argument("KEY"))]
        key: Option<String>,
        #[bpaf(positional("OUT"))]
        out: PathBuf,
    },

    /// Delete a named snapshot
    #[bpaf(command)]
    Delete {
        #[bpaf(positional("KEY"))]
        key: String,
    },
}

#[derive(Debug)]
enum CliError {
    Io(PathBuf, std::io::Error),
    Invalid(PathBuf, ValidationError),
    Store(StoreError),
    Encode(serde_json::Error),
    NoSnapshot(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            CliError::Invalid(path, e) => write!(f, "{} is not a valid document: {e}", path.display()),
            CliError::Store(e) => write!(f, "{e}"),
            CliError::Encode(e) => write!(f, "Failed to encode document: {e}"),
            CliError::NoSnapshot(key) => write!(f, "No readable snapshot under {key}"),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Encode(e)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let options = options().run();
    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("rnashell: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(options: Options) -> Result<(), CliError> {
    match options.command {
        Command::Validate { ref file } => {
            let structure = Structure::from_document(&read_document(file)?);
            let stats = structure.stats();
            println!(
                "{}: {} nucleotides, {} base pairs, {} annotations, {} features",
                structure.info().name,
                stats.nucleotides,
                stats.base_pairs,
                stats.annotations,
                stats.features
            );
        },
        Command::Stats { ref file } => {
            let structure = Structure::from_document(&read_document(file)?);
            let stats = structure.stats();
            println!("name:            {}", structure.info().name);
            println!("nucleotides:     {}", stats.nucleotides);
            println!("unassigned:      {}", stats.unassigned_bases);
            println!("base pairs:      {}", stats.base_pairs);
            println!("  watson-crick:  {}", stats.canonical_pairs);
            println!("  wobble:        {}", stats.wobble_pairs);
            println!("annotations:     {}", stats.annotations);
            println!("features:        {}", stats.features);
            println!("sequence:        {}", structure.sequence());
        },
        Command::Flip { ref file, ref out } => {
            let mut structure = Structure::from_document(&read_document(file)?);
            if !structure.flip_horizontal() {
                info!("{} has no nucleotides, writing it unchanged", file.display());
            }
            write_document(out, &structure.to_document())?;
        },
        Command::Save { ref file } => {
            let doc = read_document(file)?;
            let mut store = open_store(&options)?;
            println!("{}", store.save_named(&doc)?);
        },
        Command::List => {
            let store = open_store(&options)?;
            for snapshot in store.list_snapshots()? {
                let saved_at = snapshot
                    .saved_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{saved_at}", snapshot.key, snapshot.name);
            }
        },
        Command::Restore { ref key, ref out } => {
            let store = open_store(&options)?;
            let key = key.clone().unwrap_or_else(|| store.autosave_key());
            let doc = store.restore(&key).ok_or(CliError::NoSnapshot(key))?;
            write_document(out, &doc)?;
        },
        Command::Delete { ref key } => {
            let mut store = open_store(&options)?;
            if !store.delete_snapshot(key)? {
                return Err(CliError::NoSnapshot(key.clone()));
            }
        },
    }
    Ok(())
}

fn open_store(options: &Options) -> Result<DocumentStore, CliError> {
    let config = EditorConfig::load();
    let data_dir = options
        .data_dir
        .clone()
        .unwrap_or_else(|| config.resolved_data_dir());
    let namespace = options.namespace.as_deref().unwrap_or(&config.namespace);
    Ok(DocumentStore::open(data_dir, namespace)?)
}

fn read_document(path: &Path) -> Result<Document, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Io(path.to_path_buf(), e))?;
    codec::deserialize(&text).map_err(|e| CliError::Invalid(path.to_path_buf(), e))
}

fn write_document(path: &Path, doc: &Document) -> Result<(), CliError> {
    let text = codec::serialize(doc)?;
    std::fs::write(path, text).map_err(|e| CliError::Io(path.to_path_buf(), e))?;
    info!("Wrote {}", path.display());
    Ok(())
}
