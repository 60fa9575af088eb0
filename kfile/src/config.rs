//! This module implements the parser configuration: one switch per keyword
//! family, plus whether to build the ID index.

use serde::{Serialize, Deserialize};

use crate::keywords::KeywordFamily;

/// Generates the ParserConfig struct from the list of family switches.
macro_rules! gen_config {
  (
    $(($field:ident, $family:ident),)*
  ) => {
    /// Which keyword families to parse, and whether to index the result.
    /// Everything is on by default; missing keys in a config file keep their
    /// defaults.
    #[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(default)]
    pub struct ParserConfig {
      $(
        #[doc = concat!("Parse `", stringify!($family), "`.")]
        pub $field: bool,
      )*
      /// Build ID to position maps after parsing.
      pub build_index: bool
    }

    impl Default for ParserConfig {
      fn default() -> Self {
        return Self {
          $($field: true,)*
          build_index: true
        };
      }
    }

    impl ParserConfig {
      /// Returns true if a family is enabled.
      pub const fn enabled(&self, family: KeywordFamily) -> bool {
        return match family {
          $(KeywordFamily::$family => self.$field,)*
        };
      }

      /// Enables or disables a family.
      pub fn set(&mut self, family: KeywordFamily, on: bool) {
        match family {
          $(KeywordFamily::$family => self.$field = on,)*
        };
      }
    }
  };
}

gen_config!(
  (parse_nodes, Nodes),
  (parse_parts, Parts),
  (parse_element_shells, ElementShells),
  (parse_element_solids, ElementSolids),
  (parse_element_beams, ElementBeams),
  (parse_node_sets, NodeSets),
  (parse_part_sets, PartSets),
  (parse_segment_sets, SegmentSets),
  (parse_shell_sets, ShellSets),
  (parse_solid_sets, SolidSets),
  (parse_shell_sections, ShellSections),
  (parse_solid_sections, SolidSections),
  (parse_beam_sections, BeamSections),
  (parse_contacts, Contacts),
  (parse_materials, Materials),
);

impl ParserConfig {
  /// A configuration with every family disabled (indexing stays on).
  pub fn none() -> Self {
    let mut cfg = Self::default();
    for family in KeywordFamily::all() {
      cfg.set(*family, false);
    }
    return cfg;
  }

  /// A configuration with exactly the given families enabled.
  pub fn only(families: &[KeywordFamily]) -> Self {
    let mut cfg = Self::none();
    for family in families {
      cfg.set(*family, true);
    }
    return cfg;
  }

  /// Sets whether to build the ID index.
  pub fn with_index(mut self, build_index: bool) -> Self {
    self.build_index = build_index;
    return self;
  }

  /// Returns the enabled families.
  pub fn enabled_families(&self) -> Vec<KeywordFamily> {
    return KeywordFamily::all()
      .iter()
      .copied()
      .filter(|f| self.enabled(*f))
      .collect();
  }
}
