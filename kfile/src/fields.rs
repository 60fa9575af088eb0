//! This module implements the field decoder: the thing that turns a slice of
//! columns in a card into an integer, a real, or a trimmed string.
//!
//! Decoding never fails. Blank fields, short lines and garbage all decode to
//! the zero value of the requested type, since real decks are hand-edited and
//! we'd rather have a best-effort model than no model at all.

use serde::{Serialize, Deserialize};

/// The width of a small fixed field (elements, node IDs), in characters.
pub const SMALL_FIELD: usize = 8;

/// The width of a regular fixed field (most keywords), in characters.
pub const LARGE_FIELD: usize = 10;

/// The width of a node coordinate field, in characters.
pub const COORD_FIELD: usize = 2*SMALL_FIELD;

/// The width of a whole card, in characters.
pub const CARD_WIDTH: usize = 80;

/// The type of value a field should be decoded into.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldKind {
  /// A signed integer.
  Integer,
  /// A floating-point number.
  Real,
  /// A trimmed string.
  Text
}

/// A decoded field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
  /// A signed integer.
  Integer(i64),
  /// A floating-point number.
  Real(f64),
  /// A trimmed string.
  Text(String)
}

impl FieldValue {
  /// Returns the zero value of a field kind.
  pub fn zero(kind: FieldKind) -> Self {
    return match kind {
      FieldKind::Integer => Self::Integer(0),
      FieldKind::Real => Self::Real(0.0),
      FieldKind::Text => Self::Text(String::new()),
    };
  }
}

/// Slices `width` characters of a line starting at character `start`. Missing
/// characters are treated as blanks, so this returns a shorter (or empty)
/// slice instead of panicking on short lines.
pub fn column(line: &str, start: usize, width: usize) -> &str {
  if line.is_ascii() {
    let begin = start.min(line.len());
    let end = start.saturating_add(width).min(line.len());
    return &line[begin..end];
  }
  // slow path, column positions are in characters, not bytes
  let mut bounds = line.char_indices()
    .map(|(i, _)| i)
    .chain(std::iter::once(line.len()))
    .skip(start);
  let begin = match bounds.next() {
    Some(b) => b,
    None => return "",
  };
  let end = bounds.nth(width.saturating_sub(1)).unwrap_or(line.len());
  return if width == 0 { "" } else { &line[begin..end] };
}

/// Decodes a trimmed string into an integer, or zero.
pub fn parse_int(s: &str) -> i64 {
  return s.trim().parse::<i64>().unwrap_or(0);
}

/// Decodes a trimmed string into a real, or zero.
pub fn parse_real(s: &str) -> f64 {
  return s.trim().parse::<f64>().unwrap_or(0.0);
}

/// Decodes a column slice of a line into a value of the requested kind.
pub fn decode(line: &str, start: usize, width: usize, kind: FieldKind) -> FieldValue {
  let raw = column(line, start, width).trim();
  if raw.is_empty() {
    return FieldValue::zero(kind);
  }
  return match kind {
    FieldKind::Integer => FieldValue::Integer(parse_int(raw)),
    FieldKind::Real => FieldValue::Real(parse_real(raw)),
    FieldKind::Text => FieldValue::Text(raw.to_string()),
  };
}

/// Decodes a column slice into an integer.
pub fn decode_int(line: &str, start: usize, width: usize) -> i64 {
  return parse_int(column(line, start, width));
}

/// Decodes a column slice into a real.
pub fn decode_real(line: &str, start: usize, width: usize) -> f64 {
  return parse_real(column(line, start, width));
}

/// Decodes a column slice into a trimmed string.
pub fn decode_text(line: &str, start: usize, width: usize) -> String {
  return column(line, start, width).trim().to_string();
}

/// A single data line, seen through a field layout. Lines containing a comma
/// are free-format: fields are taken by position between commas instead of
/// by column.
#[derive(Clone, Debug)]
pub struct Card<'a> {
  /// The raw line.
  line: &'a str,
  /// The comma-separated tokens, if the line is free-format.
  tokens: Option<Vec<&'a str>>
}

impl<'a> Card<'a> {
  /// Wraps a line.
  pub fn new(line: &'a str) -> Self {
    let tokens = if line.contains(',') {
      Some(line.split(',').collect())
    } else {
      None
    };
    return Self { line, tokens };
  }

  /// Returns true if this card is free-format.
  pub fn is_free_format(&self) -> bool {
    return self.tokens.is_some();
  }

  /// Returns the raw text of the n-th field of a layout, untrimmed.
  pub fn raw(&self, widths: &[usize], n: usize) -> &'a str {
    if let Some(ref tokens) = self.tokens {
      return tokens.get(n).copied().unwrap_or("");
    }
    if n >= widths.len() {
      return "";
    }
    let start: usize = widths[..n].iter().sum();
    return column(self.line, start, widths[n]);
  }

  /// Decodes the n-th field of a layout as an integer.
  pub fn int(&self, widths: &[usize], n: usize) -> i64 {
    return parse_int(self.raw(widths, n));
  }

  /// Decodes the n-th field of a layout as a real.
  pub fn real(&self, widths: &[usize], n: usize) -> f64 {
    return parse_real(self.raw(widths, n));
  }

  /// Decodes the n-th field of a layout as a trimmed string.
  pub fn text(&self, widths: &[usize], n: usize) -> String {
    return self.raw(widths, n).trim().to_string();
  }

  /// Decodes the n-th field of a uniform layout of `count` fields of `width`
  /// characters as an integer.
  pub fn nth_int(&self, width: usize, n: usize) -> i64 {
    if let Some(ref tokens) = self.tokens {
      return parse_int(tokens.get(n).copied().unwrap_or(""));
    }
    return decode_int(self.line, n*width, width);
  }

  /// Decodes the n-th field of a uniform layout as a real.
  pub fn nth_real(&self, width: usize, n: usize) -> f64 {
    if let Some(ref tokens) = self.tokens {
      return parse_real(tokens.get(n).copied().unwrap_or(""));
    }
    return decode_real(self.line, n*width, width);
  }

  /// Decodes `N` consecutive uniform fields as reals.
  pub fn reals<const N: usize>(&self, width: usize) -> [f64; N] {
    let mut out = [0.0; N];
    for (i, v) in out.iter_mut().enumerate() {
      *v = self.nth_real(width, i);
    }
    return out;
  }

  /// Decodes `N` consecutive uniform fields as integers.
  pub fn ints<const N: usize>(&self, width: usize) -> [i64; N] {
    let mut out = [0; N];
    for (i, v) in out.iter_mut().enumerate() {
      *v = self.nth_int(width, i);
    }
    return out;
  }

  /// Returns the whole line, trimmed and cut at the card width. Used for
  /// title lines, which are free text and never split.
  pub fn title(&self) -> String {
    return column(self.line, 0, CARD_WIDTH).trim().to_string();
  }
}
