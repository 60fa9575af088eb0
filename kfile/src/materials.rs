//! This module implements materials. The same column means different things
//! for different material types, so which columns get promoted to named
//! fields is driven by a table keyed on (kind, card). Every card is also kept
//! verbatim, so unpromoted columns are still reachable by position.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Serialize, Deserialize};

use crate::fields::{Card, LARGE_FIELD};

/// The number of fields on a material card.
pub const MAT_CARD_FIELDS: usize = 8;

/// A raw material card.
pub type MaterialCard = [f64; MAT_CARD_FIELDS];

/// Generates the MaterialKind enum and its lookups.
macro_rules! gen_materials {
  (
    $(($vn:ident, $nm:literal, [$($code:literal),+], $cards:literal),)*
  ) => {
    /// Known material types. Anything else is `Other`.
    #[derive(
      Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd,
      Ord, Hash
    )]
    #[allow(missing_docs)]
    #[non_exhaustive]
    pub enum MaterialKind {
      $($vn,)*
      Other
    }

    impl MaterialKind {
      /// Returns the keyword name of this material kind.
      pub const fn name(&self) -> &'static str {
        return match self {
          $(Self::$vn => $nm,)*
          Self::Other => "OTHER",
        };
      }

      /// Returns the number of cards a material of this kind has.
      pub const fn expected_cards(&self) -> usize {
        return match self {
          $(Self::$vn => $cards,)*
          Self::Other => 2,
        };
      }

      /// Returns all known material kinds, except `Other`.
      pub const fn known() -> &'static [Self] {
        return &[$(Self::$vn,)*];
      }

      /// Returns the kind for a numeric material type, if known.
      pub const fn from_code(code: u32) -> Option<Self> {
        return match code {
          $($($code)|+ => Some(Self::$vn),)*
          _ => None
        };
      }

      /// Returns the kind for a material name, if known.
      pub fn from_name(name: &str) -> Option<Self> {
        return match name {
          $($nm => Some(Self::$vn),)*
          _ => None
        };
      }
    }
  };
}

gen_materials!(
  (Elastic, "ELASTIC", [1], 1),
  (OrthotropicElastic, "ORTHOTROPIC_ELASTIC", [2], 4),
  (PlasticKinematic, "PLASTIC_KINEMATIC", [3], 2),
  (Null, "NULL", [9], 1),
  (Rigid, "RIGID", [20], 3),
  (CompositeDamage, "COMPOSITE_DAMAGE", [22], 5),
  (PiecewiseLinearPlasticity, "PIECEWISE_LINEAR_PLASTICITY", [24], 4),
  (EnhancedCompositeDamage, "ENHANCED_COMPOSITE_DAMAGE", [54, 55], 6),
);

impl MaterialKind {
  /// Looks up a material type token: either a name (`ELASTIC`) or a
  /// three-digit code (`001`), possibly followed by an option suffix. For
  /// names, the longest known name that prefixes the token up to a `_`
  /// boundary wins.
  pub fn lookup(token: &str) -> Self {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 3 {
      let code = token[..3].parse::<u32>().unwrap_or(0);
      return Self::from_code(code).unwrap_or(Self::Other);
    }
    if let Some(kind) = Self::from_name(token) {
      return kind;
    }
    return Self::known()
      .iter()
      .copied()
      .filter(|k| {
        token.strip_prefix(k.name())
          .is_some_and(|rest| rest.starts_with('_'))
      })
      .max_by_key(|k| k.name().len())
      .unwrap_or(Self::Other);
  }

  /// Returns true if the third and fourth columns of the first card are
  /// directional moduli and ratios rather than `e` and `pr`.
  pub const fn is_orthotropic(&self) -> bool {
    return matches!(
      self,
      Self::OrthotropicElastic
        | Self::CompositeDamage
        | Self::EnhancedCompositeDamage
    );
  }
}

impl Display for MaterialKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// Named material fields that can be promoted out of the raw cards.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash
)]
#[allow(missing_docs)]
pub enum MaterialField {
  // common
  Ro, E, Pr,
  // elastic
  Da, Db, K,
  // null
  Pc, Mu, Terod, Cerod,
  // plasticity
  Sigy, Etan, Fail, Tdel, C, P, Lcss, Lcsr, Vp,
  // rigid
  N, Couple, M, Alias, Cmo, Con1, Con2,
  // orthotropic
  Ea, Eb, Ec, Prba, Prca, Prcb, Gab, Gbc, Gca, Aopt, G, Sigf, Kfail, Macf,
  // material axes
  Xp, Yp, Zp, A1, A2, A3, V1, V2, V3, D1, D2, D3, Beta, Ref, Mangle,
  // composite strengths and failure
  Xc, Xt, Yc, Yt, Sc, Alph, Sn, Syz, Szx, Crit, Dfailm, Dfails, Tfail, Soft,
  Fbrt, Ycfac, Dfailt, Dfailc, Efs
}

use MaterialField as F;

/// Promoted columns of the first card of isotropic materials.
const ISOTROPIC: &[(usize, MaterialField)] = &[(1, F::Ro), (2, F::E), (3, F::Pr)];

/// Promoted columns of the first card of orthotropic materials.
const ORTHOTROPIC: &[(usize, MaterialField)] = &[
  (1, F::Ro), (2, F::Ea), (3, F::Eb), (4, F::Ec), (5, F::Prba), (6, F::Prca),
  (7, F::Prcb),
];

/// Material axes card (positions and vectors).
const AXES_POINTS: &[(usize, MaterialField)] = &[
  (0, F::Xp), (1, F::Yp), (2, F::Zp), (3, F::A1), (4, F::A2), (5, F::A3),
];

/// Returns the columns of a card that are promoted to named fields, for a
/// given material kind and card index. Column 0 of the first card is always
/// the MID and isn't listed.
pub fn field_layout(
  kind: MaterialKind,
  card: usize
) -> &'static [(usize, MaterialField)] {
  use MaterialKind as K;
  return match (kind, card) {
    // first cards
    (K::Elastic, 0) => &[
      (1, F::Ro), (2, F::E), (3, F::Pr), (4, F::Da), (5, F::Db), (6, F::K),
    ],
    (K::Null, 0) => &[
      (1, F::Ro), (2, F::Pc), (3, F::Mu), (4, F::Terod), (5, F::Cerod),
      (6, F::E), (7, F::Pr),
    ],
    (K::PlasticKinematic | K::PiecewiseLinearPlasticity, 0) => &[
      (1, F::Ro), (2, F::E), (3, F::Pr), (4, F::Sigy), (5, F::Etan),
      (6, F::Fail), (7, F::Tdel),
    ],
    (K::Rigid, 0) => &[
      (1, F::Ro), (2, F::E), (3, F::Pr), (4, F::N), (5, F::Couple), (6, F::M),
      (7, F::Alias),
    ],
    (k, 0) if k.is_orthotropic() => ORTHOTROPIC,
    (_, 0) => ISOTROPIC,
    // plasticity
    (K::PlasticKinematic | K::PiecewiseLinearPlasticity, 1) => &[
      (0, F::C), (1, F::P), (2, F::Lcss), (3, F::Lcsr), (4, F::Vp),
    ],
    // rigid
    (K::Rigid, 1) => &[(0, F::Cmo), (1, F::Con1), (2, F::Con2)],
    // orthotropic elastic
    (K::OrthotropicElastic, 1) => &[
      (0, F::Gab), (1, F::Gbc), (2, F::Gca), (3, F::Aopt), (4, F::G),
      (5, F::Sigf),
    ],
    (K::OrthotropicElastic, 2) => &[
      (0, F::Xp), (1, F::Yp), (2, F::Zp), (3, F::A1), (4, F::A2), (5, F::A3),
      (6, F::Macf),
    ],
    (K::OrthotropicElastic, 3) => &[
      (0, F::V1), (1, F::V2), (2, F::V3), (3, F::D1), (4, F::D2), (5, F::D3),
      (6, F::Beta), (7, F::Ref),
    ],
    // composite damage
    (K::CompositeDamage, 1) => &[
      (0, F::Gab), (1, F::Gbc), (2, F::Gca), (3, F::Kfail), (4, F::Aopt),
      (5, F::Macf),
    ],
    (K::CompositeDamage, 2) => AXES_POINTS,
    (K::CompositeDamage, 3) => &[
      (0, F::V1), (1, F::V2), (2, F::V3), (3, F::D1), (4, F::D2), (5, F::D3),
      (6, F::Beta),
    ],
    (K::CompositeDamage, 4) => &[
      (0, F::Sc), (1, F::Xt), (2, F::Yt), (3, F::Yc), (4, F::Alph), (5, F::Sn),
      (6, F::Syz), (7, F::Szx),
    ],
    // enhanced composite damage
    (K::EnhancedCompositeDamage, 1) => &[
      (0, F::Gab), (1, F::Gbc), (2, F::Gca), (4, F::Aopt),
    ],
    (K::EnhancedCompositeDamage, 2) => &[
      (0, F::Xp), (1, F::Yp), (2, F::Zp), (3, F::A1), (4, F::A2), (5, F::A3),
      (6, F::Mangle),
    ],
    (K::EnhancedCompositeDamage, 3) => &[
      (0, F::V1), (1, F::V2), (2, F::V3), (3, F::D1), (4, F::D2), (5, F::D3),
      (6, F::Dfailm), (7, F::Dfails),
    ],
    (K::EnhancedCompositeDamage, 4) => &[
      (0, F::Tfail), (1, F::Alph), (2, F::Soft), (3, F::Fbrt), (4, F::Ycfac),
      (5, F::Dfailt), (6, F::Dfailc), (7, F::Efs),
    ],
    (K::EnhancedCompositeDamage, 5) => &[
      (0, F::Xc), (1, F::Xt), (2, F::Yc), (3, F::Yt), (4, F::Sc), (5, F::Crit),
      (6, F::Beta),
    ],
    _ => &[]
  };
}

/// A material.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Material {
  /// Material ID.
  pub mid: i64,
  /// The kind of material.
  pub kind: MaterialKind,
  /// The type token from the keyword (e.g. `ELASTIC` or `024`).
  pub type_token: String,
  /// The title, if the keyword had `_TITLE`.
  pub title: String,
  /// Mass density.
  pub ro: f64,
  /// Young's modulus (isotropic kinds only).
  pub e: f64,
  /// Poisson's ratio (isotropic kinds only).
  pub pr: f64,
  /// Kind-specific promoted fields.
  pub fields: BTreeMap<MaterialField, f64>,
  /// Every card read, verbatim.
  pub cards: Vec<MaterialCard>,
  /// The number of cards read.
  pub cards_parsed: usize
}

impl Material {
  /// Makes an empty material of some kind.
  pub fn new(kind: MaterialKind, type_token: &str) -> Self {
    return Self {
      mid: 0,
      kind,
      type_token: type_token.to_string(),
      title: String::new(),
      ro: 0.0,
      e: 0.0,
      pr: 0.0,
      fields: BTreeMap::new(),
      cards: Vec::new(),
      cards_parsed: 0
    };
  }

  /// Returns the number of cards this material expects.
  pub fn expected_cards(&self) -> usize {
    return self.kind.expected_cards();
  }

  /// Returns true once every expected card has been read.
  pub fn is_complete(&self) -> bool {
    return self.cards_parsed >= self.expected_cards();
  }

  /// Returns true if the material is worth keeping (positive MID).
  pub fn is_acceptable(&self) -> bool {
    return self.mid > 0;
  }

  /// Returns a promoted field, if this material's kind defines it and its
  /// card has been read.
  pub fn get(&self, field: MaterialField) -> Option<f64> {
    return match field {
      MaterialField::Ro if self.cards_parsed > 0 => Some(self.ro),
      MaterialField::E | MaterialField::Pr if self.kind.is_orthotropic() => None,
      MaterialField::E if self.cards_parsed > 0 => Some(self.e),
      MaterialField::Pr if self.cards_parsed > 0 => Some(self.pr),
      _ => self.fields.get(&field).copied()
    };
  }

  /// Returns a raw card value by card index and column.
  pub fn raw(&self, card: usize, column: usize) -> Option<f64> {
    return self.cards.get(card).and_then(|c| c.get(column)).copied();
  }

  /// Reads the next card into the material, storing it verbatim and
  /// promoting the columns its kind defines.
  pub fn push_card(&mut self, card: &Card) {
    let index = self.cards_parsed;
    let values: MaterialCard = card.reals(LARGE_FIELD);
    if index == 0 {
      self.mid = card.nth_int(LARGE_FIELD, 0);
    }
    for &(col, field) in field_layout(self.kind, index) {
      let v = values[col];
      match field {
        MaterialField::Ro => self.ro = v,
        MaterialField::E => self.e = v,
        MaterialField::Pr => self.pr = v,
        _ => { self.fields.insert(field, v); }
      }
    }
    self.cards.push(values);
    self.cards_parsed += 1;
  }
}
