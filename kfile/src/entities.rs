//! This module defines the typed records a deck is made of: nodes, parts,
//! elements, sets, sections and contacts. Materials get their own module
//! since their fields depend on their sub-type.

use std::fmt::Display;

use clap::ValueEnum;
use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

use crate::materials::Material;

/// The entity categories, each with its own vector and index in a result.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash, ValueEnum
)]
pub enum Category {
  /// Nodes, keyed by NID.
  Node,
  /// Parts, keyed by PID.
  Part,
  /// Elements of any kind, keyed by EID.
  Element,
  /// Sets of any kind, keyed by SID.
  Set,
  /// Sections of any kind, keyed by SECID.
  Section,
  /// Contacts, keyed by their slave segment/set ID.
  Contact,
  /// Materials, keyed by MID.
  Material
}

impl Category {
  /// Returns all categories, in canonical order.
  pub const fn all() -> &'static [Self] {
    return &[
      Self::Node,
      Self::Part,
      Self::Element,
      Self::Set,
      Self::Section,
      Self::Contact,
      Self::Material,
    ];
  }

  /// Returns the plural, lowercase name of the category.
  pub const fn plural(&self) -> &'static str {
    return match self {
      Self::Node => "nodes",
      Self::Part => "parts",
      Self::Element => "elements",
      Self::Set => "sets",
      Self::Section => "sections",
      Self::Contact => "contacts",
      Self::Material => "materials",
    };
  }

  /// Returns the name of the key field of the category.
  pub const fn key_name(&self) -> &'static str {
    return match self {
      Self::Node => "NID",
      Self::Part => "PID",
      Self::Element => "EID",
      Self::Set => "SID",
      Self::Section => "SECID",
      Self::Contact => "SSID",
      Self::Material => "MID",
    };
  }
}

impl Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.plural());
  }
}

/// A node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Node {
  /// Node ID.
  pub nid: i64,
  /// X coordinate.
  pub x: f64,
  /// Y coordinate.
  pub y: f64,
  /// Z coordinate.
  pub z: f64,
  /// Translational constraint code.
  pub tc: i64,
  /// Rotational constraint code.
  pub rc: i64
}

impl Node {
  /// Returns the position of the node as a vector.
  pub fn position(&self) -> Vector3<f64> {
    return Vector3::new(self.x, self.y, self.z);
  }
}

/// A part: a name plus references to its section, material and friends.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
  /// Part ID.
  pub pid: i64,
  /// Part name, from the title line.
  pub name: String,
  /// Section ID.
  pub secid: i64,
  /// Material ID.
  pub mid: i64,
  /// Equation of state ID.
  pub eosid: i64,
  /// Hourglass control ID.
  pub hgid: i64,
  /// Gravity flag.
  pub grav: i64,
  /// Adaptivity flag.
  pub adpopt: i64,
  /// Thermal material ID.
  pub tmid: i64
}

/// The kinds of element we read.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash
)]
pub enum ElementKind {
  /// `*ELEMENT_SHELL`.
  Shell,
  /// `*ELEMENT_SOLID`.
  Solid,
  /// `*ELEMENT_BEAM`.
  Beam
}

impl ElementKind {
  /// Returns the number of node fields on this kind's card.
  pub const fn node_fields(&self) -> usize {
    return match self {
      Self::Shell => 8,
      Self::Solid => 8,
      Self::Beam => 3,
    };
  }
}

/// An element. Trailing zero node fields are not stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
  /// Element ID.
  pub eid: i64,
  /// Part ID.
  pub pid: i64,
  /// Node IDs, in card order.
  pub nodes: Vec<i64>,
  /// The kind of element.
  pub kind: ElementKind
}

/// The kinds of set we read.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash
)]
pub enum SetKind {
  /// `*SET_NODE_LIST`.
  NodeList,
  /// `*SET_PART_LIST`.
  PartList,
  /// `*SET_SEGMENT`.
  Segment,
  /// `*SET_SHELL_LIST`.
  Shell,
  /// `*SET_SOLID`.
  Solid
}

/// A set of IDs or of segments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Set {
  /// Set ID.
  pub sid: i64,
  /// The kind of set.
  pub kind: SetKind,
  /// The title, if the keyword had `_TITLE`.
  pub title: String,
  /// Member IDs (all but segment sets). Only positive values are kept.
  pub ids: Vec<i64>,
  /// Member segments (segment sets only).
  pub segments: Vec<[i64; 4]>,
  /// First attribute default value.
  pub da1: f64,
  /// Second attribute default value.
  pub da2: f64,
  /// Third attribute default value.
  pub da3: f64,
  /// Fourth attribute default value.
  pub da4: f64,
  /// Solver name.
  pub solver: String
}

impl Set {
  /// Makes an empty set of some kind.
  pub fn new(kind: SetKind) -> Self {
    return Self {
      sid: 0,
      kind,
      title: String::new(),
      ids: Vec::new(),
      segments: Vec::new(),
      da1: 0.0,
      da2: 0.0,
      da3: 0.0,
      da4: 0.0,
      solver: String::new()
    };
  }

  /// Returns the number of members, IDs or segments.
  pub fn len(&self) -> usize {
    return self.ids.len() + self.segments.len();
  }

  /// Returns true if the set has no members.
  pub fn is_empty(&self) -> bool {
    return self.len() == 0;
  }

  /// Returns true if the set is worth keeping: a positive ID and at least one
  /// member. Anything else is silently dropped.
  pub fn is_acceptable(&self) -> bool {
    return self.sid > 0 && !self.is_empty();
  }
}

/// The kinds of section we read.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash
)]
pub enum SectionKind {
  /// `*SECTION_SHELL`.
  Shell,
  /// `*SECTION_SOLID`.
  Solid,
  /// `*SECTION_BEAM`.
  Beam
}

impl SectionKind {
  /// Returns the number of data cards per section of this kind.
  pub const fn cards(&self) -> usize {
    return match self {
      Self::Shell => 2,
      Self::Solid => 1,
      Self::Beam => 2,
    };
  }
}

/// Shell section properties.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ShellSection {
  /// Shear correction factor.
  pub shrf: f64,
  /// Number of through-thickness integration points.
  pub nip: f64,
  /// Printout option.
  pub propt: f64,
  /// Quadrature rule or integration rule ID.
  pub qr_irid: i64,
  /// Composite flag.
  pub icomp: i64,
  /// Shell element type flag.
  pub setyp: i64,
  /// Thicknesses at the four nodes.
  pub thickness: [f64; 4],
  /// Reference surface location.
  pub nloc: f64,
  /// Non-structural mass per area.
  pub marea: f64,
  /// Thickness field option.
  pub idof: f64,
  /// Edge node set.
  pub edgset: i64
}

/// Solid section properties.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolidSection {
  /// Ambient element type.
  pub aet: i64
}

/// Beam section properties.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BeamSection {
  /// Shear correction factor.
  pub shrf: f64,
  /// Quadrature rule or integration rule ID.
  pub qr_irid: i64,
  /// Cross-section type.
  pub cst: f64,
  /// Local coordinate system option.
  pub scoor: f64,
  /// Non-structural mass per length.
  pub nsm: f64,
  /// Thicknesses in the s direction at nodes 1 and 2.
  pub ts: [f64; 2],
  /// Thicknesses in the t direction at nodes 1 and 2.
  pub tt: [f64; 2],
  /// Reference surface location, s direction.
  pub nsloc: f64,
  /// Reference surface location, t direction.
  pub ntloc: f64
}

/// Kind-specific section data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SectionData {
  /// Shell section.
  Shell(ShellSection),
  /// Solid section.
  Solid(SolidSection),
  /// Beam section.
  Beam(BeamSection)
}

/// A section.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Section {
  /// Section ID.
  pub secid: i64,
  /// The title, if the keyword had `_TITLE`.
  pub title: String,
  /// Element formulation.
  pub elform: i64,
  /// Kind-specific data.
  pub data: SectionData
}

impl Section {
  /// Makes an empty section of some kind.
  pub fn new(kind: SectionKind) -> Self {
    let data = match kind {
      SectionKind::Shell => SectionData::Shell(ShellSection::default()),
      SectionKind::Solid => SectionData::Solid(SolidSection::default()),
      SectionKind::Beam => SectionData::Beam(BeamSection::default()),
    };
    return Self { secid: 0, title: String::new(), elform: 0, data };
  }

  /// Returns the kind of section.
  pub fn kind(&self) -> SectionKind {
    return match self.data {
      SectionData::Shell(_) => SectionKind::Shell,
      SectionData::Solid(_) => SectionKind::Solid,
      SectionData::Beam(_) => SectionKind::Beam,
    };
  }

  /// Returns the shell data, if this is a shell section.
  pub fn shell(&self) -> Option<&ShellSection> {
    return match self.data {
      SectionData::Shell(ref s) => Some(s),
      _ => None
    };
  }

  /// Returns the solid data, if this is a solid section.
  pub fn solid(&self) -> Option<&SolidSection> {
    return match self.data {
      SectionData::Solid(ref s) => Some(s),
      _ => None
    };
  }

  /// Returns the beam data, if this is a beam section.
  pub fn beam(&self) -> Option<&BeamSection> {
    return match self.data {
      SectionData::Beam(ref s) => Some(s),
      _ => None
    };
  }
}

/// Generates the ContactKind enum.
macro_rules! gen_contacts {
  (
    $(($vn:ident, $pat:literal),)*
  ) => {
    /// Known contact types. Anything else is `Other`.
    #[derive(
      Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd,
      Ord, Hash
    )]
    #[allow(missing_docs)]
    #[non_exhaustive]
    pub enum ContactKind {
      $($vn,)*
      Other
    }

    impl ContactKind {
      /// Returns the keyword type token of this contact kind.
      pub const fn name(&self) -> &'static str {
        return match self {
          $(Self::$vn => $pat,)*
          Self::Other => "OTHER",
        };
      }

      /// Returns all known contact kinds, except `Other`.
      pub const fn known() -> &'static [Self] {
        return &[$(Self::$vn,)*];
      }
    }
  };
}

gen_contacts!(
  (AutomaticSurfaceToSurface, "AUTOMATIC_SURFACE_TO_SURFACE"),
  (AutomaticNodesToSurface, "AUTOMATIC_NODES_TO_SURFACE"),
  (AutomaticSingleSurface, "AUTOMATIC_SINGLE_SURFACE"),
  (AutomaticGeneral, "AUTOMATIC_GENERAL"),
  (TiedSurfaceToSurface, "TIED_SURFACE_TO_SURFACE"),
  (TiedNodesToSurface, "TIED_NODES_TO_SURFACE"),
  (TiedShellEdgeToSurface, "TIED_SHELL_EDGE_TO_SURFACE"),
  (ErodingSurfaceToSurface, "ERODING_SURFACE_TO_SURFACE"),
  (SurfaceToSurface, "SURFACE_TO_SURFACE"),
  (NodesToSurface, "NODES_TO_SURFACE"),
  (SingleSurface, "SINGLE_SURFACE"),
);

impl ContactKind {
  /// Looks up a contact type token. The longest known pattern that prefixes
  /// the token wins, so option suffixes like `_OFFSET` don't matter.
  pub fn lookup(token: &str) -> Self {
    return Self::known()
      .iter()
      .copied()
      .filter(|k| token.starts_with(k.name()))
      .max_by_key(|k| k.name().len())
      .unwrap_or(Self::Other);
  }
}

impl Display for ContactKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// A contact definition.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
  /// Slave segment/set ID, which identifies the contact here.
  pub ssid: i64,
  /// Contact ID, from the `_ID`/`_TITLE` card.
  pub cid: i64,
  /// Heading, from the `_ID`/`_TITLE` card.
  pub heading: String,
  /// The kind of contact.
  pub kind: ContactKind,
  /// The type token from the keyword (e.g. `AUTOMATIC_SINGLE_SURFACE`).
  pub type_token: String,
  /// Master segment/set ID.
  pub msid: i64,
  /// Slave set type.
  pub sstyp: i64,
  /// Master set type.
  pub mstyp: i64,
  /// Slave box ID.
  pub sboxid: i64,
  /// Master box ID.
  pub mboxid: i64,
  /// Slave print flag.
  pub spr: i64,
  /// Master print flag.
  pub mpr: i64,
  /// Static friction coefficient.
  pub fs: f64,
  /// Dynamic friction coefficient.
  pub fd: f64,
  /// Exponential decay coefficient.
  pub dc: f64,
  /// Viscous friction coefficient.
  pub vc: f64,
  /// Viscous damping coefficient.
  pub vdc: f64,
  /// Penetration check flag.
  pub penchk: i64,
  /// Birth time.
  pub bt: f64,
  /// Death time.
  pub dt: f64,
  /// Slave penalty scale factor.
  pub sfs: f64,
  /// Master penalty scale factor.
  pub sfm: f64,
  /// Slave thickness.
  pub sst: f64,
  /// Master thickness.
  pub mst: f64,
  /// Slave thickness scale factor.
  pub sfst: f64,
  /// Master thickness scale factor.
  pub sfmt: f64,
  /// Coulomb friction scale factor.
  pub fsf: f64,
  /// Viscous friction scale factor.
  pub vsf: f64,
  /// The number of data cards actually read.
  pub cards_parsed: usize
}

impl Contact {
  /// The number of data cards a contact has.
  pub const CARDS: usize = 3;

  /// Makes an empty contact of some kind.
  pub fn new(kind: ContactKind, type_token: &str) -> Self {
    return Self {
      ssid: 0,
      cid: 0,
      heading: String::new(),
      kind,
      type_token: type_token.to_string(),
      msid: 0,
      sstyp: 0,
      mstyp: 0,
      sboxid: 0,
      mboxid: 0,
      spr: 0,
      mpr: 0,
      fs: 0.0,
      fd: 0.0,
      dc: 0.0,
      vc: 0.0,
      vdc: 0.0,
      penchk: 0,
      bt: 0.0,
      dt: 0.0,
      sfs: 0.0,
      sfm: 0.0,
      sst: 0.0,
      mst: 0.0,
      sfst: 0.0,
      sfmt: 0.0,
      fsf: 0.0,
      vsf: 0.0,
      cards_parsed: 0
    };
  }
}

/// Any entity, tagged by category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, derive_more::From)]
pub enum Entity {
  /// A node.
  Node(Node),
  /// A part.
  Part(Part),
  /// An element.
  Element(Element),
  /// A set.
  Set(Set),
  /// A section.
  Section(Section),
  /// A contact.
  Contact(Contact),
  /// A material.
  Material(Material)
}

impl Entity {
  /// Returns the category of the entity.
  pub const fn category(&self) -> Category {
    return match self {
      Self::Node(_) => Category::Node,
      Self::Part(_) => Category::Part,
      Self::Element(_) => Category::Element,
      Self::Set(_) => Category::Set,
      Self::Section(_) => Category::Section,
      Self::Contact(_) => Category::Contact,
      Self::Material(_) => Category::Material,
    };
  }

  /// Returns the key of the entity within its category.
  pub fn id(&self) -> i64 {
    return match self {
      Self::Node(n) => n.nid,
      Self::Part(p) => p.pid,
      Self::Element(e) => e.eid,
      Self::Set(s) => s.sid,
      Self::Section(s) => s.secid,
      Self::Contact(c) => c.ssid,
      Self::Material(m) => m.mid,
    };
  }
}

/// A borrowed view of any entity, used when iterating a whole result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EntityRef<'a> {
  /// A node.
  Node(&'a Node),
  /// A part.
  Part(&'a Part),
  /// An element.
  Element(&'a Element),
  /// A set.
  Set(&'a Set),
  /// A section.
  Section(&'a Section),
  /// A contact.
  Contact(&'a Contact),
  /// A material.
  Material(&'a Material)
}

impl EntityRef<'_> {
  /// Returns the category of the entity.
  pub const fn category(&self) -> Category {
    return match self {
      Self::Node(_) => Category::Node,
      Self::Part(_) => Category::Part,
      Self::Element(_) => Category::Element,
      Self::Set(_) => Category::Set,
      Self::Section(_) => Category::Section,
      Self::Contact(_) => Category::Contact,
      Self::Material(_) => Category::Material,
    };
  }

  /// Returns the key of the entity within its category.
  pub fn id(&self) -> i64 {
    return match self {
      Self::Node(n) => n.nid,
      Self::Part(p) => p.pid,
      Self::Element(e) => e.eid,
      Self::Set(s) => s.sid,
      Self::Section(s) => s.secid,
      Self::Contact(c) => c.ssid,
      Self::Material(m) => m.mid,
    };
  }

  /// Clones the entity into an owned one.
  pub fn to_entity(&self) -> Entity {
    return match *self {
      Self::Node(n) => Entity::Node(n.clone()),
      Self::Part(p) => Entity::Part(p.clone()),
      Self::Element(e) => Entity::Element(e.clone()),
      Self::Set(s) => Entity::Set(s.clone()),
      Self::Section(s) => Entity::Section(s.clone()),
      Self::Contact(c) => Entity::Contact(c.clone()),
      Self::Material(m) => Entity::Material(m.clone()),
    };
  }
}
