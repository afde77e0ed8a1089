//! Command-line interface for the wndb_rs library.
//!
//! This CLI provides commands for looking up word definitions, walking
//! relation edges and inspecting evocation strengths against a local
//! WordNet installation.

use clap::{Parser, Subcommand};
use colored::*;
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use wndb_rs::{
    Connector, OpenOptions, PartOfSpeech, RelationKind, Wordnet, error::Result,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "WordNet flat-file reader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend to use (pure or sqlite)
    #[arg(long, global = true, default_value = "pure")]
    connector: String,

    /// Path to the wordnet dictionary files (optional; searched otherwise)
    #[arg(long, global = true)]
    wordnet_path: Option<PathBuf>,

    /// Path to the constructed dataset directory (optional)
    #[arg(long, global = true)]
    data_path: Option<PathBuf>,

    /// Set verbosity level (use -v, -vv, or -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a term, optionally filtering by part of speech
    Define {
        /// The term to look up
        term: String,
        /// Optional part of speech filter (noun, verb, adj, adv)
        pos: Option<PartOfSpeech>,
    },
    /// List a term's relations of a given kind
    Relations {
        /// The term to look up
        term: String,
        /// Relation kind by name ("hyponym"), raw symbol ("~"), or "all"
        #[arg(default_value = "all")]
        kind: String,
    },
    /// Show evocation strengths for a term's senses
    Evocations {
        /// The term to look up
        term: String,
    },
}

/// Sets up logging based on verbosity level.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let connector = Connector::from_str(&cli.connector)?;
    let wordnet = Wordnet::open_with_options(
        connector,
        OpenOptions {
            wordnet_path: cli.wordnet_path,
            data_path: cli.data_path,
        },
    )?;

    match cli.command {
        Commands::Define { term, pos } => define(&wordnet, &term, pos),
        Commands::Relations { term, kind } => relations(&wordnet, &term, &kind),
        Commands::Evocations { term } => evocations(&wordnet, &term),
    }
}

fn define(wordnet: &Wordnet, term: &str, pos: Option<PartOfSpeech>) -> Result<()> {
    let Some(homographs) = wordnet.find(term)? else {
        println!("No entry found for '{}'.", term);
        return Ok(());
    };

    let pos_list: Vec<String> = homographs
        .available_pos()
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!(
        "{} ({})",
        homographs.lemma().bold(),
        pos_list.join("/").cyan()
    );

    for (i, synset) in homographs.synsets(pos)?.iter().enumerate() {
        let category = synset.lexical_category().map(|c| c.name).unwrap_or("?");
        println!(
            "  {}. {} [{}] {}",
            i + 1,
            synset.words().join(", ").bold(),
            category.cyan(),
            synset.gloss().dimmed()
        );
    }
    Ok(())
}

fn relations(wordnet: &Wordnet, term: &str, kind: &str) -> Result<()> {
    let filter = match kind {
        "all" => None,
        other => Some(
            RelationKind::from_str(other)
                .map_err(wndb_rs::WndbError::InvalidArgument)?,
        ),
    };

    let Some(homographs) = wordnet.find(term)? else {
        println!("No entry found for '{}'.", term);
        return Ok(());
    };

    for synset in homographs.synsets(None)? {
        let relations = synset.relations(filter);
        if relations.is_empty() {
            continue;
        }
        println!("{}", synset.to_string().bold());
        for relation in relations {
            let destination = relation.destination()?;
            let anchor = match (relation.source_word(), relation.destination_word()?) {
                (Some(source), Some(dest)) => format!(" [{} -> {}]", source, dest),
                _ => String::new(),
            };
            println!(
                "  {} {} {}{}",
                relation.kind().name().replace('_', " ").cyan(),
                destination.id().dimmed(),
                destination.words().join(", "),
                anchor.dimmed()
            );
        }
    }
    Ok(())
}

fn evocations(wordnet: &Wordnet, term: &str) -> Result<()> {
    if !wordnet.evocations_available()? {
        println!("The evocation dataset is not installed.");
        return Ok(());
    }

    let Some(homographs) = wordnet.find(term)? else {
        println!("No entry found for '{}'.", term);
        return Ok(());
    };

    let mut any = false;
    for synset in homographs.synsets(None)? {
        let Some(evocations) = synset.evocations()? else {
            continue;
        };
        any = true;
        println!("{}", synset.to_string().bold());
        for index in 0..evocations.len() {
            if let Some(edge) = evocations.get(index) {
                let destination = wordnet.synset(&edge.target_id)?;
                println!(
                    "  {} {} (mean {:.3}, median {:.3})",
                    destination.id().dimmed(),
                    destination.words().join(", "),
                    edge.mean,
                    edge.median
                );
            }
        }
    }
    if !any {
        println!("No evocations recorded for '{}'.", term);
    }
    Ok(())
}
