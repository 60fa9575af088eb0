//! Dumps information on a K-file, such as entity counts, parse timing and
//! duplicated IDs.

#![allow(clippy::needless_return)] // i'll never forgive rust for this
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use kfile::prelude::*;
use log::{LevelFilter, info, error, warn};

/// The arguments passed to the summariser.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
  /// Output extra/debug info while parsing.
  #[arg(short, long)]
  verbose: bool,
  /// Only parse these keyword families. Can be specified more than once, or
  /// comma-separated. If absent, everything is parsed.
  #[arg(short = 'f', long = "only", num_args = 0.., value_delimiter = ',')]
  only: Vec<KeywordFamily>,
  /// A TOML file with parser switches. Overridden by --only.
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Don't build the ID index.
  #[arg(short = 'I', long)]
  no_index: bool,
  /// The parsing backend.
  #[arg(short, long, value_enum, default_value_t = Backend::preferred())]
  backend: Backend,
  /// File path (set to "-" to read from standard input).
  file: PathBuf
}

/// Indentation for listed items.
const INDENT: &str = "  ";

/// Loads parser switches from a TOML file.
fn load_config(path: &Path) -> Option<ParserConfig> {
  let text = match fs::read_to_string(path) {
    Ok(t) => t,
    Err(e) => {
      error!("Couldn't read {}: {}", path.display(), e);
      return None;
    }
  };
  return match toml::from_str(&text) {
    Ok(cfg) => Some(cfg),
    Err(e) => {
      error!("Bad config file {}: {}", path.display(), e);
      None
    }
  };
}

/// Parses the deck and logs a summary of it.
fn main() -> io::Result<()> {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  // work out the configuration
  let mut config = match args.config {
    Some(ref p) => match load_config(p) {
      Some(cfg) => cfg,
      None => std::process::exit(1)
    },
    None => ParserConfig::default()
  };
  if !args.only.is_empty() {
    config = ParserConfig::only(&args.only).with_index(config.build_index);
  }
  if args.no_index {
    config.build_index = false;
  }
  let parser = KFileParser::new(config, args.backend);
  // parse the file
  let deck: ParsedResult = if args.file.as_os_str().eq_ignore_ascii_case("-") {
    parser.parse_reader(io::stdin().lock()).map_err(io::Error::other)?
  } else if args.file.is_file() {
    if let Some(sbn) = args.file.file_name().and_then(|s| s.to_str()) {
      info!("Parsing {}...", sbn);
    } else {
      info!("Parsing...");
    }
    parser.parse(&args.file).map_err(io::Error::other)?
  } else {
    error!("Provided path either does not exist or is not a file!");
    std::process::exit(1);
  };
  // print general info
  let stats = &deck.stats;
  info!(
    "Done parsing {} lines in {:.1} ms with the {} backend.",
    stats.total_lines,
    stats.parse_time_ms,
    stats.backend
  );
  let disabled = KeywordFamily::all()
    .iter()
    .filter(|f| !config.enabled(**f))
    .map(|f| f.snake_case_name())
    .collect::<Vec<_>>();
  if !disabled.is_empty() {
    info!("Skipped families: {}.", disabled.join(", "));
  }
  // print counts
  if deck.total_entities() == 0 {
    info!("No supported entities were found.");
  } else {
    info!("Entities found:");
    for cat in Category::all() {
      info!("{}- {}: {}", INDENT, cat, stats.count(*cat));
    }
  }
  if !deck.materials.is_empty() {
    let mut kinds: BTreeMap<MaterialKind, usize> = BTreeMap::new();
    deck.materials.iter().for_each(|m| *kinds.entry(m.kind).or_default() += 1);
    info!("Material types:");
    for (kind, n) in kinds {
      info!("{}- {}: {}", INDENT, kind, n);
    }
  }
  if !deck.contacts.is_empty() {
    let mut kinds: BTreeMap<ContactKind, usize> = BTreeMap::new();
    deck.contacts.iter().for_each(|c| *kinds.entry(c.kind).or_default() += 1);
    info!("Contact types:");
    for (kind, n) in kinds {
      info!("{}- {}: {}", INDENT, kind, n);
    }
  }
  if let Some((lo, hi)) = deck.bounding_box() {
    info!(
      "Node bounding box: ({}, {}, {}) to ({}, {}, {}).",
      lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
    );
  }
  // print duplicates
  for cat in Category::all() {
    let dups = deck.duplicate_ids(*cat);
    if dups.is_empty() {
      continue;
    }
    warn!(
      "{} {} {} occur more than once; lookups return the first:",
      dups.len(),
      cat,
      cat.key_name()
    );
    for id in dups.iter().take(10) {
      warn!("{}- {}", INDENT, id);
    }
    if dups.len() > 10 {
      warn!("{}- (other {} omitted)", INDENT, dups.len() - 10);
    }
  }
  // print diagnostics
  for w in stats.warnings.iter() {
    warn!("{}", w);
  }
  for e in stats.errors.iter() {
    error!("{}", e);
  }
  return Ok(());
}
