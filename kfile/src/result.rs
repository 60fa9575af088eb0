//! This module implements the output of a parse: the entity vectors in file
//! order, the ID index built over them, and some statistics.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

use crate::backend::Backend;
use crate::entities::*;
use crate::materials::Material;

/// Statistics and diagnostics about a parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ParseStats {
  /// The number of entities per category.
  pub counts: BTreeMap<Category, usize>,
  /// The number of lines read.
  pub total_lines: usize,
  /// Wall-clock parse time, in milliseconds.
  pub parse_time_ms: f64,
  /// Non-fatal diagnostics. Producers append, never replace.
  pub warnings: Vec<String>,
  /// Errors reported by a backend. Producers append, never replace.
  pub errors: Vec<String>,
  /// The backend that produced the result.
  pub backend: Backend
}

impl ParseStats {
  /// Appends a warning.
  pub fn warn<S: Into<String>>(&mut self, msg: S) {
    self.warnings.push(msg.into());
  }

  /// Appends an error.
  pub fn error<S: Into<String>>(&mut self, msg: S) {
    self.errors.push(msg.into());
  }

  /// Returns the count for a category.
  pub fn count(&self, category: Category) -> usize {
    return self.counts.get(&category).copied().unwrap_or(0);
  }
}

/// Maps from entity key to position in the category's vector. If a key shows
/// up more than once, the first occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdIndex {
  /// One map per category.
  maps: BTreeMap<Category, HashMap<i64, usize>>
}

impl IdIndex {
  /// Builds a map from a sequence of keys.
  fn add<I: Iterator<Item = i64>>(&mut self, category: Category, keys: I) {
    let map = self.maps.entry(category).or_default();
    for (pos, key) in keys.enumerate() {
      map.entry(key).or_insert(pos);
    }
  }

  /// Returns the position of a key in a category, if present.
  pub fn position(&self, category: Category, key: i64) -> Option<usize> {
    return self.maps.get(&category).and_then(|m| m.get(&key)).copied();
  }

  /// Returns the number of distinct keys in a category.
  pub fn distinct(&self, category: Category) -> usize {
    return self.maps.get(&category).map_or(0, |m| m.len());
  }
}

/// The result of parsing a deck.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParsedResult {
  /// Nodes, in file order.
  pub nodes: Vec<Node>,
  /// Parts, in file order.
  pub parts: Vec<Part>,
  /// Elements, in file order.
  pub elements: Vec<Element>,
  /// Sets, in file order.
  pub sets: Vec<Set>,
  /// Sections, in file order.
  pub sections: Vec<Section>,
  /// Contacts, in file order.
  pub contacts: Vec<Contact>,
  /// Materials, in file order.
  pub materials: Vec<Material>,
  /// Statistics and diagnostics.
  pub stats: ParseStats,
  /// The ID index, if it was built.
  #[serde(skip)]
  index: Option<IdIndex>,
  /// Set by an editor when entities were changed in place.
  #[serde(skip)]
  dirty: bool
}

/// Generates the typed lookup functions.
macro_rules! gen_getters {
  (
    $(($fname:ident, $vec:ident, $ty:ty, $cat:ident, $key:ident),)*
  ) => {
    impl ParsedResult {
      $(
        #[doc = concat!(
          "Looks up a `", stringify!($ty), "` by its `", stringify!($key),
          "`. O(1) if the index was built, a linear scan otherwise."
        )]
        pub fn $fname(&self, id: i64) -> Option<&$ty> {
          if let Some(ref index) = self.index {
            return index.position(Category::$cat, id)
              .and_then(|pos| self.$vec.get(pos));
          }
          return self.$vec.iter().find(|x| x.$key == id);
        }
      )*

      /// Returns the keys of a category, in file order.
      pub fn ids(&self, category: Category) -> Vec<i64> {
        return match category {
          $(Category::$cat => self.$vec.iter().map(|x| x.$key).collect(),)*
        };
      }

      /// Returns the number of entities in a category.
      pub fn len_of(&self, category: Category) -> usize {
        return match category {
          $(Category::$cat => self.$vec.len(),)*
        };
      }

      /// Looks up any entity by category and key.
      pub fn get(&self, category: Category, id: i64) -> Option<EntityRef<'_>> {
        return match category {
          $(Category::$cat => self.$fname(id).map(EntityRef::$cat),)*
        };
      }

      /// Appends a completed entity to its category.
      pub(crate) fn push(&mut self, entity: Entity) {
        match entity {
          $(Entity::$cat(x) => self.$vec.push(x),)*
        };
      }

      /// Appends all entities of another result after ours, keeping order.
      pub(crate) fn append(&mut self, mut other: ParsedResult) {
        $(self.$vec.append(&mut other.$vec);)*
        self.stats.total_lines += other.stats.total_lines;
        self.stats.warnings.append(&mut other.stats.warnings);
        self.stats.errors.append(&mut other.stats.errors);
      }
    }
  };
}

gen_getters!(
  (get_node, nodes, Node, Node, nid),
  (get_part, parts, Part, Part, pid),
  (get_element, elements, Element, Element, eid),
  (get_set, sets, Set, Set, sid),
  (get_section, sections, Section, Section, secid),
  (get_contact, contacts, Contact, Contact, ssid),
  (get_material, materials, Material, Material, mid),
);

impl ParsedResult {
  /// Instantiates an empty result.
  pub fn new() -> Self {
    return Self::default();
  }

  /// Builds the ID index over every category. Calling this again rebuilds it
  /// from scratch.
  pub fn build_index(&mut self) {
    let mut index = IdIndex::default();
    for cat in Category::all() {
      index.add(*cat, self.ids(*cat).into_iter());
    }
    debug!(
      "Indexed {} nodes and {} elements.",
      index.distinct(Category::Node),
      index.distinct(Category::Element)
    );
    self.index = Some(index);
  }

  /// Returns true if the ID index was built.
  pub fn is_indexed(&self) -> bool {
    return self.index.is_some();
  }

  /// Refreshes the per-category counts in the stats.
  pub(crate) fn update_counts(&mut self) {
    self.stats.counts = Category::all()
      .iter()
      .map(|c| (*c, self.len_of(*c)))
      .collect();
  }

  /// Returns the total number of entities.
  pub fn total_entities(&self) -> usize {
    return Category::all().iter().map(|c| self.len_of(*c)).sum();
  }

  /// Iterates over every entity, category by category, in file order within
  /// each category.
  pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
    return self.nodes.iter().map(EntityRef::Node)
      .chain(self.parts.iter().map(EntityRef::Part))
      .chain(self.elements.iter().map(EntityRef::Element))
      .chain(self.sets.iter().map(EntityRef::Set))
      .chain(self.sections.iter().map(EntityRef::Section))
      .chain(self.contacts.iter().map(EntityRef::Contact))
      .chain(self.materials.iter().map(EntityRef::Material));
  }

  /// Returns the keys that occur more than once in a category, sorted. The
  /// index is not affected; it keeps pointing at the first occurrence.
  pub fn duplicate_ids(&self, category: Category) -> Vec<i64> {
    let mut seen: BTreeMap<i64, usize> = BTreeMap::new();
    for id in self.ids(category) {
      *seen.entry(id).or_default() += 1;
    }
    return seen.into_iter()
      .filter(|(_, n)| *n > 1)
      .map(|(id, _)| id)
      .collect();
  }

  /// Returns the elements belonging to a part, in file order.
  pub fn elements_of_part(&self, pid: i64) -> impl Iterator<Item = &Element> {
    return self.elements.iter().filter(move |e| e.pid == pid);
  }

  /// Returns the axis-aligned bounding box of all nodes, as (min, max).
  pub fn bounding_box(&self) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let first = self.nodes.first()?.position();
    return Some(self.nodes.iter().skip(1).fold(
      (first, first),
      |(lo, hi), n| {
        let p = n.position();
        (lo.inf(&p), hi.sup(&p))
      }
    ));
  }

  /// Marks the result as changed in place. The parser never calls this.
  pub fn mark_dirty(&mut self) {
    self.dirty = true;
  }

  /// Returns true if an editor changed the result in place.
  pub fn is_dirty(&self) -> bool {
    return self.dirty;
  }
}

impl PartialEq for ParsedResult {
  /// Two results are equal if their entities are; stats and index are not
  /// compared, since timing always differs.
  fn eq(&self, other: &Self) -> bool {
    return self.nodes == other.nodes
      && self.parts == other.parts
      && self.elements == other.elements
      && self.sets == other.sets
      && self.sections == other.sections
      && self.contacts == other.contacts
      && self.materials == other.materials;
  }
}
