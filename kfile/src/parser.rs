//! This module implements the card state machine that drives the decoders:
//! the one-pass parser for K-files. It doesn't care how lines are fed into
//! it.

use log::debug;
use serde::{Serialize, Deserialize};

use crate::config::ParserConfig;
use crate::decoders::{init_decoder, CardDecoder, CardOutcome, CardResponse};
use crate::entities::Entity;
use crate::keywords::{classify, is_comment, is_keyword, KeywordFamily};
use crate::result::ParsedResult;

/// The parser responds with one of these for every line it consumes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum ParserResponse {
  /// The line was blank.
  Blank,
  /// The line was a comment.
  Comment,
  /// The line was data, but no decoder was open to take it.
  Useless,
  /// The line was a keyword we parse, and a decoder was opened for it.
  Keyword(KeywordFamily),
  /// The line was a keyword we parse, but its family is switched off.
  Disabled(KeywordFamily),
  /// The line was a keyword we don't parse.
  Unsupported,
  /// The line was passed to the open decoder.
  PassedToDecoder(KeywordFamily, CardOutcome)
}

/// This is the K-file parser. It's one-pass and single-thread.
pub struct OnePassParser {
  /// Which families to parse.
  config: ParserConfig,
  /// The result so far.
  result: ParsedResult,
  /// The decoder for the keyword we're currently in; None means idle.
  current_decoder: Option<Box<dyn CardDecoder>>,
  /// The total number of consumed lines.
  total_lines: usize,
  /// Line of the last keyword we opened a decoder for.
  last_keyword: usize
}

impl Default for OnePassParser {
  fn default() -> Self {
    return Self::new(ParserConfig::default());
  }
}

impl OnePassParser {
  /// Instantiates a new parser.
  pub fn new(config: ParserConfig) -> Self {
    return Self {
      config,
      result: ParsedResult::new(),
      current_decoder: None,
      total_lines: 0,
      last_keyword: 0
    };
  }

  /// Returns the number of lines consumed so far.
  pub fn total_lines(&self) -> usize {
    return self.total_lines;
  }

  /// Returns the records completed so far. A record under construction is
  /// never in here.
  pub fn result(&self) -> &ParsedResult {
    return &self.result;
  }

  /// Returns the family of the open decoder, if any.
  pub fn current_family(&self) -> Option<KeywordFamily> {
    return self.current_decoder.as_ref().map(|d| d.family());
  }

  /// Appends a completed entity.
  fn push(&mut self, entity: Entity) {
    self.result.push(entity);
  }

  /// Finalises the open decoder, keeping whatever record it had in progress
  /// if it's acceptable, and goes idle.
  fn flush_decoder(&mut self) {
    if let Some(dec) = self.current_decoder.take() {
      let family = dec.family();
      match dec.finalise() {
        Some(entity) => {
          debug!(
            "Closed a pending {} record (ID {}) on line {}.",
            entity.category(),
            entity.id(),
            self.total_lines
          );
          self.push(entity);
        },
        None => debug!(
          "Finished \"{}\" block started on line {}.",
          family,
          self.last_keyword
        )
      };
    }
  }

  /// Consumes a line into the parser.
  pub fn consume(&mut self, line: &str) -> ParserResponse {
    self.total_lines += 1;
    if line.trim().is_empty() {
      return ParserResponse::Blank;
    }
    if is_comment(line) {
      return ParserResponse::Comment;
    }
    if is_keyword(line) {
      // any keyword ends the previous one
      self.flush_decoder();
      let kw = match classify(line) {
        Some(kw) => kw,
        None => {
          debug!(
            "Unsupported keyword on line {}: {}",
            self.total_lines,
            line.trim()
          );
          return ParserResponse::Unsupported;
        }
      };
      if !self.config.enabled(kw.family) {
        debug!(
          "Skipping disabled \"{}\" block on line {}.",
          kw.family,
          self.total_lines
        );
        return ParserResponse::Disabled(kw.family);
      }
      self.last_keyword = self.total_lines;
      self.current_decoder = Some(init_decoder(&kw));
      return ParserResponse::Keyword(kw.family);
    }
    // data line. is there a decoder to take it?
    let dec = match self.current_decoder {
      Some(ref mut dec) => dec,
      None => return ParserResponse::Useless
    };
    let family = dec.family();
    let outcome = match dec.consume(line) {
      CardResponse::Card => CardOutcome::Card,
      CardResponse::Skipped => CardOutcome::Skipped,
      CardResponse::Record(entity) => {
        self.push(entity);
        CardOutcome::Record
      },
      CardResponse::Done(entity) => {
        self.push(entity);
        self.current_decoder = None;
        CardOutcome::Done
      },
      CardResponse::Abandoned => {
        debug!(
          "Dropped a \"{}\" record ending on line {}.",
          family,
          self.total_lines
        );
        self.current_decoder = None;
        CardOutcome::Abandoned
      }
    };
    return ParserResponse::PassedToDecoder(family, outcome);
  }

  /// Finishes up and returns the result. The ID index is not built here.
  pub fn finish(mut self) -> ParsedResult {
    self.flush_decoder();
    self.result.stats.total_lines = self.total_lines;
    self.result.update_counts();
    return self.result;
  }

  /// Parses a sequence of lines.
  pub fn parse_lines<'a, I>(lines: I, config: ParserConfig) -> ParsedResult
    where I: IntoIterator<Item = &'a str> {
    let mut parser = Self::new(config);
    for line in lines {
      parser.consume(line);
    }
    return parser.finish();
  }
}
