//! This module implements the parsing backends. The reference backend is the
//! plain one-pass parser; the native backend runs one parser per keyword
//! block in parallel and stitches the results back in file order.
//!
//! Every keyword line closes whatever record came before it, so keyword
//! blocks are independent of each other and both backends produce the same
//! entities, field for field.

use std::fmt::Display;

use clap::ValueEnum;
use log::warn;
use serde::{Serialize, Deserialize};

use crate::config::ParserConfig;
use crate::parser::OnePassParser;
use crate::result::ParsedResult;

/// The available parsing backends.
#[derive(
  Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq,
  ValueEnum
)]
pub enum Backend {
  /// The accelerated, block-parallel engine. Needs the `native` feature.
  Native,
  /// The single-thread reference parser.
  #[default]
  Reference
}

impl Backend {
  /// Returns the lowercase name of the backend.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::Native => "native",
      Self::Reference => "reference",
    };
  }

  /// Returns true if this backend was compiled in.
  pub const fn is_available(&self) -> bool {
    return match self {
      Self::Native => cfg!(feature = "native"),
      Self::Reference => true,
    };
  }

  /// The fastest available backend.
  pub const fn preferred() -> Self {
    return if Self::Native.is_available() {
      Self::Native
    } else {
      Self::Reference
    };
  }

  /// Returns this backend if it's available, otherwise falls back to the
  /// reference one.
  pub fn resolve(self) -> Self {
    if self.is_available() {
      return self;
    }
    warn!(
      "The {} backend isn't available in this build, using the reference one.",
      self
    );
    return Self::Reference;
  }

  /// Runs this backend over some content. Neither the index nor the timing
  /// are filled in here.
  pub(crate) fn run(&self, content: &str, config: ParserConfig) -> ParsedResult {
    let mut result = match self {
      #[cfg(feature = "native")]
      Self::Native => native::parse(content, config),
      _ => OnePassParser::parse_lines(content.lines(), config),
    };
    result.stats.backend = *self;
    return result;
  }
}

impl Display for Backend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// Splits content into keyword blocks: slices that each start at a keyword
/// line (except maybe the first) and run until the next one.
pub(crate) fn split_blocks(content: &str) -> Vec<&str> {
  let mut blocks = Vec::new();
  let mut start = 0;
  let mut offset = 0;
  for piece in content.split_inclusive('\n') {
    if offset > start && crate::keywords::is_keyword(piece) {
      blocks.push(&content[start..offset]);
      start = offset;
    }
    offset += piece.len();
  }
  if offset > start {
    blocks.push(&content[start..offset]);
  }
  return blocks;
}

#[cfg(feature = "native")]
mod native {
  //! The block-parallel engine.

  use rayon::prelude::*;

  use super::split_blocks;
  use crate::config::ParserConfig;
  use crate::parser::OnePassParser;
  use crate::result::ParsedResult;

  /// Parses content one keyword block per task, then merges in order.
  pub(super) fn parse(content: &str, config: ParserConfig) -> ParsedResult {
    let partials: Vec<ParsedResult> = split_blocks(content)
      .par_iter()
      .map(|block| OnePassParser::parse_lines(block.lines(), config))
      .collect();
    let mut result = ParsedResult::new();
    for partial in partials {
      result.append(partial);
    }
    result.update_counts();
    return result;
  }
}
