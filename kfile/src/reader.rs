//! This module implements the parser façade: it owns the configuration and
//! the resolved backend, reads decks from files, readers or strings, and
//! hands back indexed results.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::backend::Backend;
use crate::config::ParserConfig;
use crate::error::{KFileError, Result};
use crate::result::ParsedResult;

/// The entry point for parsing K-files.
#[derive(Copy, Clone, Debug)]
pub struct KFileParser {
  /// Which families to parse, and whether to index.
  config: ParserConfig,
  /// The backend, resolved once at construction.
  backend: Backend
}

impl Default for KFileParser {
  fn default() -> Self {
    return Self::new(ParserConfig::default(), Backend::preferred());
  }
}

impl KFileParser {
  /// Instantiates a parser. If the requested backend isn't available, the
  /// reference one is used instead.
  pub fn new(config: ParserConfig, backend: Backend) -> Self {
    return Self { config, backend: backend.resolve() };
  }

  /// Instantiates a parser with the reference backend.
  pub fn reference(config: ParserConfig) -> Self {
    return Self::new(config, Backend::Reference);
  }

  /// Returns the resolved backend.
  pub fn backend(&self) -> Backend {
    return self.backend;
  }

  /// Returns the configuration.
  pub fn config(&self) -> &ParserConfig {
    return &self.config;
  }

  /// Parses a deck held in a string.
  pub fn parse_string(&self, content: &str) -> ParsedResult {
    let start = Instant::now();
    let mut result = self.backend.run(content, self.config);
    if self.config.build_index {
      result.build_index();
    }
    result.stats.parse_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(
      "Parsed {} lines into {} entities in {:.3} ms using the {} backend.",
      result.stats.total_lines,
      result.total_entities(),
      result.stats.parse_time_ms,
      self.backend
    );
    return result;
  }

  /// Parses raw bytes. Invalid UTF-8 is replaced rather than rejected.
  pub fn parse_bytes(&self, bytes: &[u8]) -> ParsedResult {
    return self.parse_string(&String::from_utf8_lossy(bytes));
  }

  /// Parses everything a reader yields.
  pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<ParsedResult> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    return Ok(self.parse_bytes(&bytes));
  }

  /// Reads and parses a file.
  pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<ParsedResult> {
    let path = path.as_ref();
    if !path.exists() {
      return Err(KFileError::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
      info!("Read {} ({} bytes).", name, bytes.len());
    }
    return Ok(self.parse_bytes(&bytes));
  }
}
