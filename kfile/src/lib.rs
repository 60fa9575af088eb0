//! This library parses LS-DYNA keyword input decks ("K-files") into a typed,
//! indexed in-memory model: nodes, parts, elements, sets, sections, contacts
//! and materials, looked up by their numeric IDs.
//!
//! Decks are fixed-column, card-oriented text. A keyword line (`*NODE`,
//! `*MAT_ELASTIC`, ...) opens a record family, and the data lines ("cards")
//! that follow are decoded column by column until the next keyword. Parsing
//! is tolerant: malformed fields decode to zero, short lines are padded with
//! blanks, and unknown keywords are skipped.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod backend;
pub mod config;
pub mod decoders;
pub mod entities;
pub mod error;
pub mod fields;
pub mod keywords;
pub mod materials;
pub mod parser;
pub mod reader;
pub mod result;

pub mod prelude {
  //! Re-exports the most-used types.
  pub use crate::backend::Backend;
  pub use crate::config::ParserConfig;
  pub use crate::decoders::CardOutcome;
  pub use crate::entities::*;
  pub use crate::error::{KFileError, Result as KFileResult};
  pub use crate::keywords::{classify, Keyword, KeywordFamily, KeywordFlags};
  pub use crate::materials::{Material, MaterialField, MaterialKind};
  pub use crate::parser::{OnePassParser, ParserResponse};
  pub use crate::reader::KFileParser;
  pub use crate::result::{ParseStats, ParsedResult};
}

#[cfg(test)]
mod tests;
