//! This module implements the card decoders, one per keyword family. Each is
//! a small state machine that eats the data cards following a keyword and
//! spits out completed records.

use serde::{Serialize, Deserialize};

use crate::entities::*;
use crate::fields::*;
use crate::keywords::{Keyword, KeywordFamily, KeywordFlags};
use crate::materials::{Material, MaterialKind};

/// Layout of a node card.
const NODE_LAYOUT: [usize; 6] = [
  SMALL_FIELD, COORD_FIELD, COORD_FIELD, COORD_FIELD, SMALL_FIELD, SMALL_FIELD
];

/// Layout of a part data card.
const PART_LAYOUT: [usize; 8] = [LARGE_FIELD; 8];

/// Layout of a set header card.
const SET_HEADER_LAYOUT: [usize; 6] = [LARGE_FIELD; 6];

/// Number of IDs on a set data card.
const SET_IDS_PER_CARD: usize = 8;

/// Number of nodes on a segment card.
const SEGMENT_NODES: usize = 4;

/// Layout of an ID/heading card (contact `_ID` and `_TITLE`).
const ID_CARD_LAYOUT: [usize; 2] = [LARGE_FIELD, CARD_WIDTH - LARGE_FIELD];

/// What a card decoder did with a line, as reported by the parser.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardOutcome {
  /// The line was merged into the record under construction.
  Card,
  /// The line was skipped on purpose (e.g. an MPP card).
  Skipped,
  /// The line completed a record, and the keyword may carry more.
  Record,
  /// The line completed a record, and the keyword is done.
  Done,
  /// The line completed a record that isn't worth keeping.
  Abandoned
}

/// What a card decoder did with a line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CardResponse {
  /// The line was merged into the record under construction.
  Card,
  /// The line was skipped on purpose (e.g. an MPP card).
  Skipped,
  /// The line completed a record, and the keyword may carry more.
  Record(Entity),
  /// The line completed a record, and the keyword is done.
  Done(Entity),
  /// The line completed a record that isn't worth keeping, and the keyword
  /// is done.
  Abandoned
}

/// All card decoders implement this.
pub(crate) trait CardDecoder {
  /// The family this decoder is for.
  fn family(&self) -> KeywordFamily;

  /// Consumes a data line (never blank, never a comment, never a keyword).
  fn consume(&mut self, line: &str) -> CardResponse;

  /// Called at the next keyword or at the end of input. Returns whatever
  /// record was under construction, if it's worth keeping.
  fn finalise(self: Box<Self>) -> Option<Entity>;
}

/// Instantiates the decoder for a classified keyword.
pub(crate) fn init_decoder(kw: &Keyword) -> Box<dyn CardDecoder> {
  let family = kw.family;
  if let Some(kind) = family.element_kind() {
    return Box::new(ElementDecoder { kind, family });
  }
  if let Some(kind) = family.set_kind() {
    return Box::new(SetDecoder::new(kind, family, kw.flags));
  }
  if let Some(kind) = family.section_kind() {
    return Box::new(SectionDecoder::new(kind, family, kw.flags));
  }
  return match family {
    KeywordFamily::Parts => Box::new(PartDecoder::new()),
    KeywordFamily::Contacts => Box::new(ContactDecoder::new(kw)),
    KeywordFamily::Materials => Box::new(MaterialDecoder::new(kw)),
    _ => Box::new(NodeDecoder)
  };
}

/// Decodes a node card.
pub fn decode_node(line: &str) -> Node {
  let card = Card::new(line);
  return Node {
    nid: card.int(&NODE_LAYOUT, 0),
    x: card.real(&NODE_LAYOUT, 1),
    y: card.real(&NODE_LAYOUT, 2),
    z: card.real(&NODE_LAYOUT, 3),
    tc: card.int(&NODE_LAYOUT, 4),
    rc: card.int(&NODE_LAYOUT, 5)
  };
}

/// Decodes an element card of some kind. Trailing zero node fields are
/// dropped.
pub fn decode_element(line: &str, kind: ElementKind) -> Element {
  let card = Card::new(line);
  let mut nodes: Vec<i64> = (0..kind.node_fields())
    .map(|i| card.nth_int(SMALL_FIELD, 2 + i))
    .collect();
  while nodes.last() == Some(&0) {
    nodes.pop();
  }
  return Element {
    eid: card.nth_int(SMALL_FIELD, 0),
    pid: card.nth_int(SMALL_FIELD, 1),
    nodes,
    kind
  };
}

/// Decoder for `*NODE`: every card is a node.
struct NodeDecoder;

impl CardDecoder for NodeDecoder {
  fn family(&self) -> KeywordFamily {
    return KeywordFamily::Nodes;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    return CardResponse::Record(decode_node(line).into());
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    return None;
  }
}

/// Decoder for `*ELEMENT_SHELL`, `*ELEMENT_SOLID` and `*ELEMENT_BEAM`.
struct ElementDecoder {
  /// The kind of elements.
  kind: ElementKind,
  /// The family, for reporting.
  family: KeywordFamily
}

impl CardDecoder for ElementDecoder {
  fn family(&self) -> KeywordFamily {
    return self.family;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    return CardResponse::Record(decode_element(line, self.kind).into());
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    return None;
  }
}

/// Decoder for `*PART`: a title line, then a data line, repeated.
struct PartDecoder {
  /// The name read from the title line, if we're waiting for data.
  name: Option<String>
}

impl PartDecoder {
  /// Instantiates the decoder, waiting for a title.
  fn new() -> Self {
    return Self { name: None };
  }
}

impl CardDecoder for PartDecoder {
  fn family(&self) -> KeywordFamily {
    return KeywordFamily::Parts;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    let card = Card::new(line);
    let name = match self.name.take() {
      Some(name) => name,
      None => {
        self.name = Some(card.title());
        return CardResponse::Card;
      }
    };
    let l = &PART_LAYOUT;
    let part = Part {
      pid: card.int(l, 0),
      name,
      secid: card.int(l, 1),
      mid: card.int(l, 2),
      eosid: card.int(l, 3),
      hgid: card.int(l, 4),
      grav: card.int(l, 5),
      adpopt: card.int(l, 6),
      tmid: card.int(l, 7)
    };
    return CardResponse::Record(part.into());
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    return None;
  }
}

/// Where a set decoder is within its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SetState {
  /// Waiting for the title line.
  Title,
  /// Waiting for the header card.
  Header,
  /// Accumulating data cards until the next keyword.
  Data
}

/// Decoder for the `*SET_...` families. The record ends at the next keyword.
struct SetDecoder {
  /// The family, for reporting.
  family: KeywordFamily,
  /// Where we are.
  state: SetState,
  /// The set under construction.
  set: Set
}

impl SetDecoder {
  /// Instantiates a set decoder.
  fn new(kind: SetKind, family: KeywordFamily, flags: KeywordFlags) -> Self {
    let state = if flags.title { SetState::Title } else { SetState::Header };
    return Self { family, state, set: Set::new(kind) };
  }
}

impl CardDecoder for SetDecoder {
  fn family(&self) -> KeywordFamily {
    return self.family;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    let card = Card::new(line);
    match self.state {
      SetState::Title => {
        self.set.title = card.title();
        self.state = SetState::Header;
      },
      SetState::Header => {
        let l = &SET_HEADER_LAYOUT;
        self.set.sid = card.int(l, 0);
        self.set.da1 = card.real(l, 1);
        self.set.da2 = card.real(l, 2);
        self.set.da3 = card.real(l, 3);
        self.set.da4 = card.real(l, 4);
        self.set.solver = card.text(l, 5);
        self.state = SetState::Data;
      },
      SetState::Data if self.set.kind == SetKind::Segment => {
        let mut seg: [i64; SEGMENT_NODES] = card.ints(LARGE_FIELD);
        if seg[..3].iter().all(|&n| n > 0) {
          if seg[3] <= 0 {
            seg[3] = seg[2];
          }
          self.set.segments.push(seg);
        }
      },
      SetState::Data => {
        let ids: [i64; SET_IDS_PER_CARD] = card.ints(LARGE_FIELD);
        self.set.ids.extend(ids.iter().copied().filter(|&id| id > 0));
      }
    };
    return CardResponse::Card;
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    if self.set.is_acceptable() {
      return Some(self.set.into());
    }
    return None;
  }
}

/// Where a section decoder is within its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SectionState {
  /// Waiting for the title line.
  Title,
  /// Waiting for the header card.
  Header,
  /// Waiting for the data card.
  Data
}

/// Decoder for the `*SECTION_...` families: optional title, a header card and
/// possibly a data card, repeated.
struct SectionDecoder {
  /// The family, for reporting.
  family: KeywordFamily,
  /// The kind of section.
  kind: SectionKind,
  /// Whether each record starts with a title line.
  titled: bool,
  /// Where we are.
  state: SectionState,
  /// The section under construction.
  section: Section
}

impl SectionDecoder {
  /// Instantiates a section decoder.
  fn new(kind: SectionKind, family: KeywordFamily, flags: KeywordFlags) -> Self {
    let mut dec = Self {
      family,
      kind,
      titled: flags.title,
      state: SectionState::Header,
      section: Section::new(kind)
    };
    dec.restart();
    return dec;
  }

  /// Goes back to waiting for a new record.
  fn restart(&mut self) {
    self.state = if self.titled {
      SectionState::Title
    } else {
      SectionState::Header
    };
  }

  /// Takes the completed section and goes back to waiting for a new one.
  fn complete(&mut self) -> CardResponse {
    let done = std::mem::replace(&mut self.section, Section::new(self.kind));
    self.restart();
    return CardResponse::Record(done.into());
  }

  /// Decodes a header card.
  fn header(&mut self, card: &Card) {
    let l = &[LARGE_FIELD; 8];
    self.section.secid = card.int(l, 0);
    self.section.elform = card.int(l, 1);
    match self.section.data {
      SectionData::Shell(ref mut s) => {
        s.shrf = card.real(l, 2);
        s.nip = card.real(l, 3);
        s.propt = card.real(l, 4);
        s.qr_irid = card.int(l, 5);
        s.icomp = card.int(l, 6);
        s.setyp = card.int(l, 7);
      },
      SectionData::Solid(ref mut s) => {
        s.aet = card.int(l, 2);
      },
      SectionData::Beam(ref mut s) => {
        s.shrf = card.real(l, 2);
        s.qr_irid = card.int(l, 3);
        s.cst = card.real(l, 4);
        s.scoor = card.real(l, 5);
        s.nsm = card.real(l, 6);
      }
    };
  }

  /// Decodes a data card.
  fn data(&mut self, card: &Card) {
    let l = &[LARGE_FIELD; 8];
    match self.section.data {
      SectionData::Shell(ref mut s) => {
        s.thickness = card.reals(LARGE_FIELD);
        s.nloc = card.real(l, 4);
        s.marea = card.real(l, 5);
        s.idof = card.real(l, 6);
        s.edgset = card.int(l, 7);
      },
      SectionData::Beam(ref mut s) => {
        s.ts = [card.real(l, 0), card.real(l, 1)];
        s.tt = [card.real(l, 2), card.real(l, 3)];
        s.nsloc = card.real(l, 4);
        s.ntloc = card.real(l, 5);
      },
      SectionData::Solid(_) => {}
    };
  }
}

impl CardDecoder for SectionDecoder {
  fn family(&self) -> KeywordFamily {
    return self.family;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    let card = Card::new(line);
    match self.state {
      SectionState::Title => {
        self.section.title = card.title();
        self.state = SectionState::Header;
      },
      SectionState::Header => {
        self.header(&card);
        if self.kind.cards() == 1 {
          return self.complete();
        }
        self.state = SectionState::Data;
      },
      SectionState::Data => {
        self.data(&card);
        return self.complete();
      }
    };
    return CardResponse::Card;
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    return None;
  }
}

/// Where a contact decoder is within its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ContactState {
  /// Waiting for the `_ID`/`_TITLE` card.
  Id,
  /// Waiting for the first MPP card.
  Mpp,
  /// Waiting for the optional second MPP card, or card 1.
  MppOptional,
  /// Reading the data cards.
  Cards
}

/// Decoder for `*CONTACT_...`: an optional ID card, optional MPP cards, then
/// three data cards.
struct ContactDecoder {
  /// Whether MPP cards follow the ID card.
  mpp: bool,
  /// Where we are.
  state: ContactState,
  /// The contact under construction.
  contact: Contact
}

impl ContactDecoder {
  /// Instantiates a contact decoder for a keyword.
  fn new(kw: &Keyword) -> Self {
    let kind = kw.contact.unwrap_or(ContactKind::Other);
    let mut dec = Self {
      mpp: kw.flags.mpp,
      state: ContactState::Cards,
      contact: Contact::new(kind, &kw.type_token)
    };
    dec.state = if kw.flags.id || kw.flags.title {
      ContactState::Id
    } else {
      dec.after_id()
    };
    return dec;
  }

  /// The state that follows the ID card.
  fn after_id(&self) -> ContactState {
    return if self.mpp { ContactState::Mpp } else { ContactState::Cards };
  }

  /// Decodes the next data card.
  fn data(&mut self, card: &Card) -> CardResponse {
    let c = &mut self.contact;
    let w = LARGE_FIELD;
    match c.cards_parsed {
      0 => {
        let v: [i64; 8] = card.ints(w);
        c.ssid = v[0];
        c.msid = v[1];
        c.sstyp = v[2];
        c.mstyp = v[3];
        c.sboxid = v[4];
        c.mboxid = v[5];
        c.spr = v[6];
        c.mpr = v[7];
      },
      1 => {
        c.fs = card.nth_real(w, 0);
        c.fd = card.nth_real(w, 1);
        c.dc = card.nth_real(w, 2);
        c.vc = card.nth_real(w, 3);
        c.vdc = card.nth_real(w, 4);
        c.penchk = card.nth_int(w, 5);
        c.bt = card.nth_real(w, 6);
        c.dt = card.nth_real(w, 7);
      },
      _ => {
        let v: [f64; 8] = card.reals(w);
        c.sfs = v[0];
        c.sfm = v[1];
        c.sst = v[2];
        c.mst = v[3];
        c.sfst = v[4];
        c.sfmt = v[5];
        c.fsf = v[6];
        c.vsf = v[7];
      }
    };
    c.cards_parsed += 1;
    if c.cards_parsed == Contact::CARDS {
      let done = std::mem::replace(
        &mut self.contact,
        Contact::new(ContactKind::Other, "")
      );
      return CardResponse::Done(done.into());
    }
    return CardResponse::Card;
  }
}

impl CardDecoder for ContactDecoder {
  fn family(&self) -> KeywordFamily {
    return KeywordFamily::Contacts;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    let card = Card::new(line);
    match self.state {
      ContactState::Id => {
        // the heading is free text, so never split this one on commas
        let [cid_width, heading_width] = ID_CARD_LAYOUT;
        self.contact.cid = decode_int(line, 0, cid_width);
        self.contact.heading = decode_text(line, cid_width, heading_width);
        self.state = self.after_id();
        return CardResponse::Skipped;
      },
      ContactState::Mpp => {
        self.state = ContactState::MppOptional;
        return CardResponse::Skipped;
      },
      ContactState::MppOptional => {
        self.state = ContactState::Cards;
        if line.trim_start().starts_with('&') {
          return CardResponse::Skipped;
        }
        return self.data(&card);
      },
      ContactState::Cards => return self.data(&card)
    };
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    if self.contact.cards_parsed > 0 {
      return Some(self.contact.into());
    }
    return None;
  }
}

/// Decoder for `*MAT_...`: an optional title line, then as many cards as the
/// material kind calls for.
struct MaterialDecoder {
  /// Whether we're still waiting for the title line.
  awaiting_title: bool,
  /// The material under construction.
  material: Material
}

impl MaterialDecoder {
  /// Instantiates a material decoder for a keyword.
  fn new(kw: &Keyword) -> Self {
    let kind = kw.material.unwrap_or(MaterialKind::Other);
    return Self {
      awaiting_title: kw.flags.title,
      material: Material::new(kind, &kw.type_token)
    };
  }
}

impl CardDecoder for MaterialDecoder {
  fn family(&self) -> KeywordFamily {
    return KeywordFamily::Materials;
  }

  fn consume(&mut self, line: &str) -> CardResponse {
    let card = Card::new(line);
    if self.awaiting_title {
      self.awaiting_title = false;
      self.material.title = card.title();
      return CardResponse::Skipped;
    }
    self.material.push_card(&card);
    if self.material.is_complete() {
      if !self.material.is_acceptable() {
        return CardResponse::Abandoned;
      }
      let done = std::mem::replace(
        &mut self.material,
        Material::new(MaterialKind::Other, "")
      );
      return CardResponse::Done(done.into());
    }
    return CardResponse::Card;
  }

  fn finalise(self: Box<Self>) -> Option<Entity> {
    if self.material.is_acceptable() {
      return Some(self.material.into());
    }
    return None;
  }
}
