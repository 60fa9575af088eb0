//! A command-line application to dump the entities of a K-file as JSON or
//! CSV.

#![allow(clippy::needless_return)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use kfile::prelude::*;
use log::*;
use serde::Serialize;

/// Output formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
  /// The whole parse result (or a single category of it) as JSON.
  Json,
  /// One category as a flat CSV table.
  Csv
}

/// The arguments passed to the dumper.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
struct Cli {
  /// The output format.
  #[arg(short = 'f', long = "format", value_enum, default_value_t = DumpFormat::Json)]
  format: DumpFormat,
  /// Only dump this category. Required for CSV output.
  #[arg(short = 'c', long = "category")]
  category: Option<Category>,
  /// Pretty-print JSON output.
  #[arg(short = 'p', long = "pretty")]
  pretty: bool,
  /// The delimiter used in the CSV.
  #[arg(short = 'd', long = "delim", default_value = ",")]
  delim: char,
  /// Only parse these keyword families. Can be specified more than once, or
  /// comma-separated. If absent, everything is parsed.
  #[arg(long = "only", num_args = 0.., value_delimiter = ',')]
  only: Vec<KeywordFamily>,
  /// A TOML file with parser switches. Overridden by --only.
  #[arg(long = "config")]
  config: Option<PathBuf>,
  /// Don't build the ID index.
  #[arg(short = 'I', long = "no-index")]
  no_index: bool,
  /// The parsing backend.
  #[arg(short = 'b', long = "backend", value_enum, default_value_t = Backend::preferred())]
  backend: Backend,
  /// Output extra/debug info while parsing.
  #[arg(short = 'v', long = "verbose")]
  verbose: bool,
  /// Path to write output to. If absent, writes to standard output.
  #[arg(short = 'o')]
  output: Option<PathBuf>,
  /// The name of the input K-file. If -, reads from standard input.
  input: PathBuf,
}

/// Loads parser switches from a TOML file.
fn load_config(path: &Path) -> io::Result<ParserConfig> {
  let text = fs::read_to_string(path)?;
  return toml::from_str(&text).map_err(io::Error::other);
}

/// Joins IDs with spaces, for list-valued CSV columns.
fn join_ids(ids: &[i64]) -> String {
  return ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
}

/// Builds the header and rows of the CSV table for a category.
fn csv_table(
  deck: &ParsedResult,
  category: Category
) -> (Vec<&'static str>, Vec<Vec<String>>) {
  return match category {
    Category::Node => (
      vec!["nid", "x", "y", "z", "tc", "rc"],
      deck.nodes.iter().map(|n| vec![
        n.nid.to_string(),
        n.x.to_string(),
        n.y.to_string(),
        n.z.to_string(),
        n.tc.to_string(),
        n.rc.to_string()
      ]).collect()
    ),
    Category::Part => (
      vec!["pid", "name", "secid", "mid", "eosid", "hgid", "grav", "adpopt",
        "tmid"],
      deck.parts.iter().map(|p| vec![
        p.pid.to_string(),
        p.name.clone(),
        p.secid.to_string(),
        p.mid.to_string(),
        p.eosid.to_string(),
        p.hgid.to_string(),
        p.grav.to_string(),
        p.adpopt.to_string(),
        p.tmid.to_string()
      ]).collect()
    ),
    Category::Element => (
      vec!["eid", "pid", "kind", "nodes"],
      deck.elements.iter().map(|e| vec![
        e.eid.to_string(),
        e.pid.to_string(),
        format!("{:?}", e.kind),
        join_ids(&e.nodes)
      ]).collect()
    ),
    Category::Set => (
      vec!["sid", "kind", "title", "count", "ids"],
      deck.sets.iter().map(|s| vec![
        s.sid.to_string(),
        format!("{:?}", s.kind),
        s.title.clone(),
        s.len().to_string(),
        if s.segments.is_empty() {
          join_ids(&s.ids)
        } else {
          s.segments.iter().map(|q| join_ids(q)).collect::<Vec<_>>().join(";")
        }
      ]).collect()
    ),
    Category::Section => (
      vec!["secid", "kind", "title", "elform"],
      deck.sections.iter().map(|s| vec![
        s.secid.to_string(),
        format!("{:?}", s.kind()),
        s.title.clone(),
        s.elform.to_string()
      ]).collect()
    ),
    Category::Contact => (
      vec!["ssid", "cid", "kind", "msid", "sstyp", "mstyp", "fs", "fd",
        "cards_parsed"],
      deck.contacts.iter().map(|c| vec![
        c.ssid.to_string(),
        c.cid.to_string(),
        c.kind.to_string(),
        c.msid.to_string(),
        c.sstyp.to_string(),
        c.mstyp.to_string(),
        c.fs.to_string(),
        c.fd.to_string(),
        c.cards_parsed.to_string()
      ]).collect()
    ),
    Category::Material => (
      vec!["mid", "kind", "title", "ro", "e", "pr", "cards_parsed"],
      deck.materials.iter().map(|m| vec![
        m.mid.to_string(),
        m.kind.to_string(),
        m.title.clone(),
        m.ro.to_string(),
        m.e.to_string(),
        m.pr.to_string(),
        m.cards_parsed.to_string()
      ]).collect()
    ),
  };
}

/// Writes a value as JSON.
fn write_json<W: Write, T: Serialize + ?Sized>(
  out: W,
  value: &T,
  pretty: bool
) -> io::Result<()> {
  let res = if pretty {
    serde_json::to_writer_pretty(out, value)
  } else {
    serde_json::to_writer(out, value)
  };
  return res.map_err(io::Error::other);
}

/// Parses the deck and writes it out in the requested format.
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
      Ok(cfg) => cfg,
      Err(e) => {
        error!("Bad config file {}: {}", p.display(), e);
        std::process::exit(1);
      }
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
  let deck: ParsedResult = if args.input.as_os_str().eq_ignore_ascii_case("-") {
    parser.parse_reader(io::stdin().lock()).map_err(io::Error::other)?
  } else if args.input.is_file() {
    if let Some(sbn) = args.input.file_name().and_then(|s| s.to_str()) {
      info!("Parsing {}...", sbn);
    } else {
      info!("Parsing...");
    }
    parser.parse(&args.input).map_err(io::Error::other)?
  } else {
    error!("Provided path either does not exist or is not a file!");
    std::process::exit(1);
  };
  info!("Done parsing, {} entities found.", deck.total_entities());
  // init the writer
  let mut output: BufWriter<Box<dyn Write>> = BufWriter::new(
    if let Some(ref op) = args.output {
      Box::new(File::create(op)?)
    } else {
      Box::new(io::stdout())
    }
  );
  match (args.format, args.category) {
    (DumpFormat::Json, None) => write_json(&mut output, &deck, args.pretty)?,
    (DumpFormat::Json, Some(cat)) => {
      let entities = deck.entities()
        .filter(|e| e.category() == cat)
        .map(|e| e.to_entity())
        .collect::<Vec<_>>();
      write_json(&mut output, &entities, args.pretty)?;
    },
    (DumpFormat::Csv, Some(cat)) => {
      let delim_byte: u8 = match args.delim.try_into() {
        Ok(b) => b,
        Err(_) => {
          error!("Delimiter must be a single-byte character!");
          std::process::exit(1);
        }
      };
      let mut wtr = csv::WriterBuilder::new()
        .delimiter(delim_byte)
        .from_writer(&mut output);
      let (header, rows) = csv_table(&deck, cat);
      info!("Writing {} CSV records...", rows.len());
      wtr.write_record(&header)?;
      for row in rows {
        wtr.write_record(&row)?;
      }
      wtr.flush()?;
    },
    (DumpFormat::Csv, None) => {
      error!("CSV output needs a category (use -c).");
      std::process::exit(1);
    },
  }
  output.flush()?;
  info!("All done.");
  // done
  return Ok(());
}
