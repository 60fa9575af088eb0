//! This module implements the keyword classifier: given a line starting with
//! an asterisk, it works out which family of record follows, which optional
//! suffixes are present, and which sub-type a material or contact is.

use std::fmt::Display;

use clap::ValueEnum;
use convert_case::{Case, Casing};
use serde::{Serialize, Deserialize};

use crate::entities::{Category, ContactKind, ElementKind, SectionKind, SetKind};
use crate::materials::MaterialKind;

/// Generates the KeywordFamily enum and its lookup functions.
macro_rules! gen_families {
  (
    $(($vn:ident, $kw:literal, $cat:ident, $desc:literal),)*
  ) => {
    /// The keyword families we know how to turn into entities. There's one
    /// per parser switch.
    #[derive(
      Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd,
      Ord, Hash, ValueEnum
    )]
    #[non_exhaustive]
    pub enum KeywordFamily {
      $(
        #[doc = $desc]
        $vn,
      )*
    }

    impl KeywordFamily {
      /// Returns all known families.
      pub const fn all() -> &'static [Self] {
        return &[$(Self::$vn,)*];
      }

      /// Returns the canonical keyword (sans asterisk) of this family. For
      /// sub-typed families, this is just the prefix.
      pub const fn keyword(&self) -> &'static str {
        return match self {
          $(Self::$vn => $kw,)*
        };
      }

      /// Returns the entity category this family produces.
      pub const fn category(&self) -> Category {
        return match self {
          $(Self::$vn => Category::$cat,)*
        };
      }

      /// Returns a human description of this family.
      pub const fn desc(&self) -> &'static str {
        return match self {
          $(Self::$vn => $desc,)*
        };
      }

      /// Returns the CamelCase name of the variant.
      pub const fn short_name(&self) -> &'static str {
        return match self {
          $(Self::$vn => stringify!($vn),)*
        };
      }
    }
  };
}

gen_families!(
  (Nodes, "NODE", Node, "Nodes"),
  (Parts, "PART", Part, "Parts"),
  (ElementShells, "ELEMENT_SHELL", Element, "Shell elements"),
  (ElementSolids, "ELEMENT_SOLID", Element, "Solid elements"),
  (ElementBeams, "ELEMENT_BEAM", Element, "Beam elements"),
  (NodeSets, "SET_NODE_LIST", Set, "Node sets"),
  (PartSets, "SET_PART_LIST", Set, "Part sets"),
  (SegmentSets, "SET_SEGMENT", Set, "Segment sets"),
  (ShellSets, "SET_SHELL_LIST", Set, "Shell element sets"),
  (SolidSets, "SET_SOLID", Set, "Solid element sets"),
  (ShellSections, "SECTION_SHELL", Section, "Shell sections"),
  (SolidSections, "SECTION_SOLID", Section, "Solid sections"),
  (BeamSections, "SECTION_BEAM", Section, "Beam sections"),
  (Contacts, "CONTACT_", Contact, "Contacts"),
  (Materials, "MAT_", Material, "Materials"),
);

impl KeywordFamily {
  /// Returns the snake case name of the family, as used in the parser
  /// switches (`parse_<name>`).
  pub fn snake_case_name(&self) -> String {
    return self.short_name().to_case(Case::Snake);
  }

  /// Returns the element kind of an element family.
  pub const fn element_kind(&self) -> Option<ElementKind> {
    return match self {
      Self::ElementShells => Some(ElementKind::Shell),
      Self::ElementSolids => Some(ElementKind::Solid),
      Self::ElementBeams => Some(ElementKind::Beam),
      _ => None
    };
  }

  /// Returns the set kind of a set family.
  pub const fn set_kind(&self) -> Option<SetKind> {
    return match self {
      Self::NodeSets => Some(SetKind::NodeList),
      Self::PartSets => Some(SetKind::PartList),
      Self::SegmentSets => Some(SetKind::Segment),
      Self::ShellSets => Some(SetKind::Shell),
      Self::SolidSets => Some(SetKind::Solid),
      _ => None
    };
  }

  /// Returns the section kind of a section family.
  pub const fn section_kind(&self) -> Option<SectionKind> {
    return match self {
      Self::ShellSections => Some(SectionKind::Shell),
      Self::SolidSections => Some(SectionKind::Solid),
      Self::BeamSections => Some(SectionKind::Beam),
      _ => None
    };
  }
}

impl Display for KeywordFamily {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.desc());
  }
}

/// Suffix flags found on a keyword.
#[derive(
  Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq
)]
pub struct KeywordFlags {
  /// `_TITLE` was present: a title line precedes the data cards.
  pub title: bool,
  /// `_ID` was present (contacts only): an ID card precedes the data cards.
  pub id: bool,
  /// `_MPP` was present (contacts only): MPP cards precede the data cards.
  pub mpp: bool
}

/// A classified keyword line.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyword {
  /// The family of records this keyword opens.
  pub family: KeywordFamily,
  /// The suffix flags.
  pub flags: KeywordFlags,
  /// For materials and contacts, the free-text type token after the prefix
  /// with option suffixes removed (e.g. `ELASTIC`, `AUTOMATIC_SINGLE_SURFACE`).
  pub type_token: String,
  /// The material sub-type, for material keywords.
  pub material: Option<MaterialKind>,
  /// The contact sub-type, for contact keywords.
  pub contact: Option<ContactKind>
}

impl Keyword {
  /// Makes a keyword with no sub-type.
  fn plain(family: KeywordFamily, title: bool) -> Self {
    return Self {
      family,
      flags: KeywordFlags { title, ..Default::default() },
      type_token: String::new(),
      material: None,
      contact: None
    };
  }
}

/// Returns true if the line is a keyword line (first non-blank is `*`).
pub fn is_keyword(line: &str) -> bool {
  return line.trim_start().starts_with('*');
}

/// Returns true if the line is a comment line (first non-blank is `$`).
pub fn is_comment(line: &str) -> bool {
  return line.trim_start().starts_with('$');
}

/// Strips a suffix off a keyword, returning the rest if it was there.
fn strip_option<'a>(kw: &'a str, suffix: &str) -> Option<&'a str> {
  return kw.strip_suffix(suffix).filter(|rest| !rest.is_empty());
}

/// Classifies a keyword line. Returns None for anything that isn't a keyword
/// line or that isn't a keyword we turn into entities; those just send the
/// card state machine back to idle.
pub fn classify(line: &str) -> Option<Keyword> {
  let trimmed = line.trim_start();
  let upper = trimmed.strip_prefix('*')?
    .split_whitespace()
    .next()
    .unwrap_or("")
    .to_ascii_uppercase();
  let kw = upper.as_str();
  // exact matches first, so *NODE doesn't swallow *NODE_SCALAR and so on
  let exact = match kw {
    "NODE" => Some(Keyword::plain(KeywordFamily::Nodes, false)),
    "PART" => Some(Keyword::plain(KeywordFamily::Parts, false)),
    "PART_TITLE" => Some(Keyword::plain(KeywordFamily::Parts, true)),
    "ELEMENT_SHELL" => Some(Keyword::plain(KeywordFamily::ElementShells, false)),
    "ELEMENT_SOLID" => Some(Keyword::plain(KeywordFamily::ElementSolids, false)),
    "ELEMENT_BEAM" => Some(Keyword::plain(KeywordFamily::ElementBeams, false)),
    _ => None
  };
  if exact.is_some() {
    return exact;
  }
  if let Some(rest) = kw.strip_prefix("SET_") {
    let (rest, title) = match strip_option(rest, "_TITLE") {
      Some(r) => (r, true),
      None => (rest, false)
    };
    let family = match rest {
      "NODE_LIST" | "NODE" => KeywordFamily::NodeSets,
      "PART_LIST" | "PART" => KeywordFamily::PartSets,
      "SEGMENT" => KeywordFamily::SegmentSets,
      "SHELL_LIST" | "SHELL" => KeywordFamily::ShellSets,
      "SOLID" => KeywordFamily::SolidSets,
      _ => return None
    };
    return Some(Keyword::plain(family, title));
  }
  if let Some(rest) = kw.strip_prefix("SECTION_") {
    let (rest, title) = match strip_option(rest, "_TITLE") {
      Some(r) => (r, true),
      None => (rest, false)
    };
    let family = match rest {
      "SHELL" => KeywordFamily::ShellSections,
      "SOLID" => KeywordFamily::SolidSections,
      "BEAM" => KeywordFamily::BeamSections,
      _ => return None
    };
    return Some(Keyword::plain(family, title));
  }
  if let Some(rest) = kw.strip_prefix("CONTACT_") {
    let mut flags = KeywordFlags::default();
    let mut token = rest;
    // _ID and _TITLE are mutually exclusive, and always come last
    if let Some(r) = strip_option(token, "_TITLE") {
      flags.title = true;
      token = r;
    } else if let Some(r) = strip_option(token, "_ID") {
      flags.id = true;
      token = r;
    }
    if let Some(r) = strip_option(token, "_MPP") {
      flags.mpp = true;
      token = r;
    }
    return Some(Keyword {
      family: KeywordFamily::Contacts,
      flags,
      type_token: token.to_string(),
      material: None,
      contact: Some(ContactKind::lookup(token))
    });
  }
  if let Some(rest) = kw.strip_prefix("MAT_") {
    let (token, title) = match strip_option(rest, "_TITLE") {
      Some(r) => (r, true),
      None => (rest, false)
    };
    return Some(Keyword {
      family: KeywordFamily::Materials,
      flags: KeywordFlags { title, ..Default::default() },
      type_token: token.to_string(),
      material: Some(MaterialKind::lookup(token)),
      contact: None
    });
  }
  return None;
}
