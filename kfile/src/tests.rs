use std::io::Write;

use crate::decoders::decode_node;
use crate::fields::*;
use crate::prelude::*;

/// Right-aligns values into fixed-width fields.
fn row(width: usize, values: &[&str]) -> String {
  return values.iter().map(|v| format!("{:>width$}", v)).collect();
}

/// Makes a 10-wide card.
fn card10(values: &[&str]) -> String {
  return row(10, values);
}

/// Makes an 8-wide card.
fn card8(values: &[&str]) -> String {
  return row(8, values);
}

/// Makes a node card.
fn node_line(nid: i64, x: f64, y: f64, z: f64) -> String {
  return format!("{:>8}{:>16}{:>16}{:>16}", nid, x, y, z);
}

/// Joins lines into a deck.
fn deck(lines: &[String]) -> String {
  let mut s = lines.join("\n");
  s.push('\n');
  return s;
}

/// Parses with the reference backend and default settings.
fn parse(content: &str) -> ParsedResult {
  return KFileParser::reference(ParserConfig::default()).parse_string(content);
}

/// A deck touching every family.
fn sample_deck() -> String {
  return deck(&[
    "$ a sample deck".into(),
    "*KEYWORD".into(),
    "*NODE".into(),
    node_line(1, 0.0, 0.0, 0.0),
    node_line(2, 1.0, 0.0, 0.0),
    node_line(3, 1.0, 1.0, 0.0),
    node_line(4, 0.0, 1.0, 0.0),
    node_line(5, 0.0, 0.0, 1.0),
    "*PART".into(),
    "Plate".into(),
    card10(&["1", "1", "1"]),
    "Beam".into(),
    card10(&["2", "2", "2"]),
    "*SECTION_SHELL".into(),
    card10(&["1", "16", "0.833", "5"]),
    card10(&["1.5", "1.5", "1.5", "1.5"]),
    "*SECTION_BEAM".into(),
    card10(&["2", "1", "1.0", "2", "1.0"]),
    card10(&["0.1", "0.1", "0.2", "0.2"]),
    "*ELEMENT_SHELL".into(),
    card8(&["10", "1", "1", "2", "3", "4"]),
    "*ELEMENT_BEAM".into(),
    card8(&["20", "2", "1", "5"]),
    "*SET_NODE_LIST".into(),
    card10(&["7"]),
    card10(&["1", "2", "3", "4", "5"]),
    "*MAT_ELASTIC".into(),
    card10(&["1", "7.85e-9", "210000.", "0.3"]),
    "*MAT_RIGID".into(),
    card10(&["2", "7.85e-9", "210000.", "0.3", "0.0", "0.0", "0.0"]),
    card10(&["1.0", "7", "7"]),
    "".into(),
    "*CONTACT_AUTOMATIC_SINGLE_SURFACE_ID".into(),
    card10(&["1"]) + "selfcontact",
    card10(&["7", "0", "2"]),
    card10(&["0.2", "0.1"]),
    card10(&["1.0", "1.0"]),
    "*END".into(),
  ]);
}

#[test]
fn test_decode_column_exactness() {
  let line = "12345678        1.5             2.5             3.5       0       1";
  assert_eq!(
    decode(line, 0, 8, FieldKind::Integer),
    FieldValue::Integer(12345678)
  );
  assert_eq!(decode(line, 8, 16, FieldKind::Real), FieldValue::Real(1.5));
  let node = decode_node(line);
  assert_eq!(node, Node { nid: 12345678, x: 1.5, y: 2.5, z: 3.5, tc: 0, rc: 1 });
}

#[test]
fn test_decode_silent_defaults() {
  // blanks
  assert_eq!(decode("        ", 0, 8, FieldKind::Integer), FieldValue::Integer(0));
  assert_eq!(decode("", 0, 8, FieldKind::Real), FieldValue::Real(0.0));
  assert_eq!(decode("", 0, 8, FieldKind::Text), FieldValue::Text(String::new()));
  // past the end of the line
  assert_eq!(decode_int("123", 10, 10), 0);
  assert_eq!(decode_int("       123", 0, 10), 123);
  assert_eq!(decode_int("  12", 0, 10), 12);
  // garbage
  assert_eq!(decode_int("     abc", 0, 8), 0);
  assert_eq!(decode_real("   1.0.0", 0, 8), 0.0);
  assert_eq!(decode_int("     1.0", 0, 8), 0);
  // numbers
  assert_eq!(decode_real("  -1.5e3", 0, 8), -1500.0);
  assert_eq!(decode_real("      5.", 0, 8), 5.0);
  assert_eq!(decode_text("  hello   world", 0, 10), "hello");
}

#[test]
fn test_column_counts_characters() {
  let line = "ÅÅÅÅ12345678";
  assert_eq!(column(line, 4, 8), "12345678");
  assert_eq!(column(line, 0, 2), "ÅÅ");
  assert_eq!(column(line, 10, 8), "78");
  assert_eq!(column(line, 20, 8), "");
}

#[test]
fn test_free_format_card() {
  let card = Card::new("1, 2.5,3.5 ,4.5,0,7");
  assert!(card.is_free_format());
  let node = decode_node("1, 2.5,3.5 ,4.5,0,7");
  assert_eq!(node, Node { nid: 1, x: 2.5, y: 3.5, z: 4.5, tc: 0, rc: 7 });
  assert_eq!(card.nth_int(8, 10), 0);
}

#[test]
fn test_short_node_line() {
  let line = node_line(42, 1.0, 2.0, 3.0);
  assert!(line.len() < 64);
  let node = decode_node(&line);
  assert_eq!(node, Node { nid: 42, x: 1.0, y: 2.0, z: 3.0, tc: 0, rc: 0 });
}

#[test]
fn test_classify_keywords() {
  let fam = |s: &str| classify(s).map(|k| k.family);
  assert_eq!(fam("*NODE"), Some(KeywordFamily::Nodes));
  assert_eq!(fam("  *node"), Some(KeywordFamily::Nodes));
  assert_eq!(fam("*NODE_SCALAR"), None);
  assert_eq!(fam("*ELEMENT_SOLID"), Some(KeywordFamily::ElementSolids));
  assert_eq!(fam("*ELEMENT_SHELL_THICKNESS"), None);
  assert_eq!(fam("*ELEMENT"), None);
  assert_eq!(fam("*PART"), Some(KeywordFamily::Parts));
  assert_eq!(fam("*PART_INERTIA"), None);
  assert_eq!(fam("*SET_NODE_LIST_TITLE"), Some(KeywordFamily::NodeSets));
  assert_eq!(fam("*SET_NODE_LIST_GENERATE"), None);
  assert_eq!(fam("*SET_SEGMENT"), Some(KeywordFamily::SegmentSets));
  assert_eq!(fam("*SECTION_SOLID_TITLE"), Some(KeywordFamily::SolidSections));
  assert_eq!(fam("*KEYWORD"), None);
  assert_eq!(fam("NODE"), None);
  let part = classify("*PART_TITLE").unwrap();
  assert!(part.flags.title);
  assert!(!classify("*PART").unwrap().flags.title);
}

#[test]
fn test_classify_contacts() {
  let kw = classify("*CONTACT_AUTOMATIC_SURFACE_TO_SURFACE_ID").unwrap();
  assert_eq!(kw.family, KeywordFamily::Contacts);
  assert!(kw.flags.id);
  assert!(!kw.flags.title);
  assert_eq!(kw.contact, Some(ContactKind::AutomaticSurfaceToSurface));
  assert_eq!(kw.type_token, "AUTOMATIC_SURFACE_TO_SURFACE");
  let kw = classify("*CONTACT_TIED_SURFACE_TO_SURFACE_OFFSET_TITLE").unwrap();
  assert!(kw.flags.title);
  assert!(!kw.flags.id);
  assert_eq!(kw.contact, Some(ContactKind::TiedSurfaceToSurface));
  let kw = classify("*CONTACT_SURFACE_TO_SURFACE").unwrap();
  assert_eq!(kw.contact, Some(ContactKind::SurfaceToSurface));
  let kw = classify("*CONTACT_AUTOMATIC_SINGLE_SURFACE_MPP_ID").unwrap();
  assert!(kw.flags.mpp && kw.flags.id);
  assert_eq!(kw.contact, Some(ContactKind::AutomaticSingleSurface));
  let kw = classify("*CONTACT_SPOTWELD").unwrap();
  assert_eq!(kw.contact, Some(ContactKind::Other));
}

#[test]
fn test_classify_materials() {
  let kind = |s: &str| classify(s).and_then(|k| k.material);
  assert_eq!(kind("*MAT_ELASTIC"), Some(MaterialKind::Elastic));
  assert_eq!(kind("*MAT_001"), Some(MaterialKind::Elastic));
  assert_eq!(kind("*MAT_ELASTIC_TITLE"), Some(MaterialKind::Elastic));
  assert_eq!(kind("*MAT_ORTHOTROPIC_ELASTIC"), Some(MaterialKind::OrthotropicElastic));
  assert_eq!(
    kind("*MAT_024_LOG_INTERPOLATION"),
    Some(MaterialKind::PiecewiseLinearPlasticity)
  );
  assert_eq!(kind("*MAT_055"), Some(MaterialKind::EnhancedCompositeDamage));
  assert_eq!(kind("*MAT_FOO"), Some(MaterialKind::Other));
  assert_eq!(kind("*MAT_ELASTIC_FLUID"), Some(MaterialKind::Elastic));
  assert_eq!(
    kind("*MAT_PIECEWISE_LINEAR_PLASTICITY_LOG_INTERPOLATION"),
    kind("*MAT_024_LOG_INTERPOLATION")
  );
  assert_eq!(
    kind("*MAT_PIECEWISE_LINEAR_PLASTICITY_STOCHASTIC_TITLE"),
    Some(MaterialKind::PiecewiseLinearPlasticity)
  );
  assert_eq!(kind("*MAT_RIGIDX"), Some(MaterialKind::Other));
  assert_eq!(kind("*MAT_SOIL_AND_FOAM"), Some(MaterialKind::Other));
  assert!(classify("*MAT_RIGID_TITLE").unwrap().flags.title);
}

#[test]
fn test_end_to_end_scenario() {
  let content = concat!(
    "*NODE\n",
    "$ comment\n",
    "       1             0.0             0.0             0.0       0       0\n",
    "*PART\n",
    "MyPart\n",
    "         1         2         3         0         0         0         0         0\n",
  );
  let res = parse(content);
  assert_eq!(res.nodes, vec![Node { nid: 1, ..Default::default() }]);
  assert_eq!(res.parts, vec![Part {
    pid: 1,
    name: "MyPart".into(),
    secid: 2,
    mid: 3,
    ..Default::default()
  }]);
  assert_eq!(res.stats.total_lines, 6);
  assert_eq!(res.stats.backend, Backend::Reference);
  assert!(res.stats.warnings.is_empty());
  assert!(res.stats.errors.is_empty());
}

#[test]
fn test_set_accumulation_and_termination() {
  let ids: Vec<String> = (1..=24).map(|i| i.to_string()).collect();
  let ids: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
  let mut parser = OnePassParser::default();
  for line in [
    "*SET_NODE_LIST".to_string(),
    card10(&["100", "1.0"]),
    card10(&ids[0..8]),
    card10(&ids[8..16]),
    card10(&ids[16..24]),
  ] {
    parser.consume(&line);
  }
  // still open, so not visible yet
  assert!(parser.result().sets.is_empty());
  assert_eq!(parser.consume("*PART"), ParserResponse::Keyword(KeywordFamily::Parts));
  assert_eq!(parser.result().sets.len(), 1);
  assert!(parser.result().parts.is_empty());
  parser.consume("Part one");
  parser.consume(&card10(&["5"]));
  let res = parser.finish();
  let set = &res.sets[0];
  assert_eq!(set.sid, 100);
  assert_eq!(set.kind, SetKind::NodeList);
  assert_eq!(set.da1, 1.0);
  assert_eq!(set.ids, (1..=24).collect::<Vec<i64>>());
  assert_eq!(res.parts.len(), 1);
}

#[test]
fn test_set_zero_ids_and_eof_flush() {
  let content = deck(&[
    "*SET_PART_LIST_TITLE".into(),
    "my parts".into(),
    card10(&["3"]),
    card10(&["1", "0", "2", "", "0", "3"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.sets.len(), 1);
  assert_eq!(res.sets[0].title, "my parts");
  assert_eq!(res.sets[0].kind, SetKind::PartList);
  assert_eq!(res.sets[0].ids, vec![1, 2, 3]);
}

#[test]
fn test_set_without_id_or_members_is_dropped() {
  let content = deck(&[
    "*SET_NODE_LIST".into(),
    card10(&["0"]),
    card10(&["1", "2", "3"]),
    "*SET_NODE_LIST".into(),
    card10(&["5"]),
    "*SET_SHELL_LIST".into(),
    card10(&["6"]),
    card10(&["10", "11"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.sets.len(), 1);
  assert_eq!(res.sets[0].sid, 6);
  assert_eq!(res.sets[0].kind, SetKind::Shell);
}

#[test]
fn test_segment_set() {
  let content = deck(&[
    "*SET_SEGMENT".into(),
    card10(&["9"]),
    card10(&["1", "2", "3", "4"]),
    card10(&["5", "6", "7"]),
    card10(&["0", "0", "0", "0"]),
    "*END".into(),
  ]);
  let res = parse(&content);
  let set = res.get_set(9).unwrap();
  assert_eq!(set.kind, SetKind::Segment);
  assert!(set.ids.is_empty());
  assert_eq!(set.segments, vec![[1, 2, 3, 4], [5, 6, 7, 7]]);
}

#[test]
fn test_elements() {
  let content = deck(&[
    "*ELEMENT_SOLID".into(),
    card8(&["1", "3", "1", "2", "3", "4", "5", "6", "7", "8"]),
    card8(&["2", "3", "1", "2", "3", "4", "5", "6", "0", "0"]),
    "*ELEMENT_SHELL".into(),
    card8(&["3", "4", "1", "0", "3", "4"]),
    "*ELEMENT_BEAM".into(),
    card8(&["4", "5", "1", "2", "9"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.elements.len(), 4);
  assert_eq!(res.elements[0].nodes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
  assert_eq!(res.elements[1].nodes, vec![1, 2, 3, 4, 5, 6]);
  assert_eq!(res.elements[2].kind, ElementKind::Shell);
  // only trailing zeros are dropped
  assert_eq!(res.elements[2].nodes, vec![1, 0, 3, 4]);
  assert_eq!(res.elements[3].kind, ElementKind::Beam);
  assert_eq!(res.elements[3].nodes, vec![1, 2, 9]);
  assert_eq!(res.elements_of_part(3).count(), 2);
}

#[test]
fn test_sections() {
  let content = deck(&[
    "*SECTION_SHELL_TITLE".into(),
    "thin".into(),
    card10(&["1", "2", "0.833", "3"]),
    card10(&["1.0", "1.1", "1.2", "1.3", "0.0", "0.5"]),
    "thick".into(),
    card10(&["2", "16"]),
    card10(&["2.0", "2.0", "2.0", "2.0"]),
    "*SECTION_SOLID".into(),
    card10(&["3", "1", "4"]),
    card10(&["4", "2"]),
    "*SECTION_BEAM".into(),
    card10(&["5", "1", "1.0", "2", "0.0", "0.0", "0.1"]),
    card10(&["0.1", "0.2", "0.3", "0.4", "0.0", "1.0"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.sections.len(), 5);
  let thin = res.get_section(1).unwrap();
  assert_eq!(thin.title, "thin");
  assert_eq!(thin.elform, 2);
  let shell = thin.shell().unwrap();
  assert_eq!(shell.shrf, 0.833);
  assert_eq!(shell.nip, 3.0);
  assert_eq!(shell.thickness, [1.0, 1.1, 1.2, 1.3]);
  assert_eq!(shell.marea, 0.5);
  assert_eq!(res.get_section(2).unwrap().title, "thick");
  let solid = res.get_section(3).unwrap();
  assert_eq!(solid.kind(), SectionKind::Solid);
  assert_eq!(solid.solid().unwrap().aet, 4);
  assert_eq!(res.get_section(4).unwrap().elform, 2);
  let beam = res.get_section(5).unwrap().beam().unwrap();
  assert_eq!(beam.qr_irid, 2);
  assert_eq!(beam.nsm, 0.1);
  assert_eq!(beam.ts, [0.1, 0.2]);
  assert_eq!(beam.tt, [0.3, 0.4]);
  assert_eq!(beam.ntloc, 1.0);
}

#[test]
fn test_contact_cards() {
  let res = parse(&sample_deck());
  assert_eq!(res.contacts.len(), 1);
  let c = &res.contacts[0];
  assert_eq!(c.kind, ContactKind::AutomaticSingleSurface);
  assert_eq!(c.cid, 1);
  assert_eq!(c.heading, "selfcontact");
  assert_eq!(c.ssid, 7);
  assert_eq!(c.sstyp, 2);
  assert_eq!(c.fs, 0.2);
  assert_eq!(c.fd, 0.1);
  assert_eq!(c.sfs, 1.0);
  assert_eq!(c.cards_parsed, 3);
  assert_eq!(res.get_contact(7), Some(c));
}

#[test]
fn test_contact_mpp_and_partial() {
  let content = deck(&[
    "*CONTACT_SURFACE_TO_SURFACE_MPP".into(),
    card10(&["1", "0"]),
    "&".into(),
    card10(&["3", "4", "0", "0"]),
    card10(&["0.3"]),
    "*CONTACT_NODES_TO_SURFACE".into(),
    card10(&["5", "6"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.contacts.len(), 2);
  assert_eq!(res.contacts[0].ssid, 3);
  assert_eq!(res.contacts[0].msid, 4);
  assert_eq!(res.contacts[0].fs, 0.3);
  assert_eq!(res.contacts[0].cards_parsed, 2);
  assert_eq!(res.contacts[1].kind, ContactKind::NodesToSurface);
  assert_eq!(res.contacts[1].cards_parsed, 1);
}

#[test]
fn test_contact_heading_keeps_commas() {
  let content = deck(&[
    "*CONTACT_AUTOMATIC_SURFACE_TO_SURFACE_ID".into(),
    format!("{:>10}door, left side", 12),
    card10(&["3", "4", "0", "0"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.contacts.len(), 1);
  let c = &res.contacts[0];
  assert_eq!(c.cid, 12);
  assert_eq!(c.heading, "door, left side");
  assert_eq!(c.ssid, 3);
  assert_eq!(c.msid, 4);
  assert_eq!(c.cards_parsed, 1);
}

#[test]
fn test_plastic_kinematic_card_count() {
  let content = deck(&[
    "*MAT_PLASTIC_KINEMATIC".into(),
    card10(&["3", "7.8e-9", "2.1e5", "0.3", "250.", "1000.", "0.2", "1e-6"]),
    card10(&["40.", "5.", "11", "12", "1."]),
    card10(&["99", "99", "99"]),
  ]);
  let mut parser = OnePassParser::default();
  let responses: Vec<ParserResponse> = content.lines()
    .map(|l| parser.consume(l))
    .collect();
  assert_eq!(
    responses[2],
    ParserResponse::PassedToDecoder(KeywordFamily::Materials, CardOutcome::Done)
  );
  // the machine is idle after two cards
  assert_eq!(responses[3], ParserResponse::Useless);
  let res = parser.finish();
  assert_eq!(res.materials.len(), 1);
  let m = &res.materials[0];
  assert_eq!(m.kind, MaterialKind::PlasticKinematic);
  assert_eq!(m.expected_cards(), 2);
  assert_eq!(m.cards_parsed, 2);
  assert_eq!((m.mid, m.ro, m.e, m.pr), (3, 7.8e-9, 2.1e5, 0.3));
  assert_eq!(m.get(MaterialField::Sigy), Some(250.0));
  assert_eq!(m.get(MaterialField::Etan), Some(1000.0));
  assert_eq!(m.get(MaterialField::Fail), Some(0.2));
  assert_eq!(m.get(MaterialField::Tdel), Some(1e-6));
  assert_eq!(m.get(MaterialField::C), Some(40.0));
  assert_eq!(m.get(MaterialField::P), Some(5.0));
  assert_eq!(m.get(MaterialField::Lcss), Some(11.0));
  assert_eq!(m.get(MaterialField::Lcsr), Some(12.0));
  assert_eq!(m.get(MaterialField::Vp), Some(1.0));
  assert_eq!(m.cards.len(), 2);
}

#[test]
fn test_unknown_material_defaults() {
  let content = deck(&[
    "*MAT_FOO".into(),
    card10(&["8", "1.0", "2.0", "0.25", "5.0", "6.0"]),
    card10(&["7.0", "8.0"]),
    card10(&["9.0"]),
  ]);
  let res = parse(&content);
  let m = res.get_material(8).unwrap();
  assert_eq!(m.kind, MaterialKind::Other);
  assert_eq!(m.type_token, "FOO");
  assert_eq!(m.expected_cards(), 2);
  assert_eq!(m.cards_parsed, 2);
  assert_eq!((m.ro, m.e, m.pr), (1.0, 2.0, 0.25));
  assert!(m.fields.is_empty());
  // unpromoted columns are still there
  assert_eq!(m.raw(0, 4), Some(5.0));
  assert_eq!(m.raw(1, 1), Some(8.0));
  assert_eq!(m.raw(2, 0), None);
}

#[test]
fn test_material_title_and_partial() {
  let content = deck(&[
    "*MAT_PIECEWISE_LINEAR_PLASTICITY_TITLE".into(),
    "steel".into(),
    card10(&["4", "7.8e-9", "2.1e5", "0.3", "300."]),
    card10(&["", "", "17"]),
    "*MAT_ORTHOTROPIC_ELASTIC".into(),
    card10(&["5", "1.5e-9", "1.4e5", "1e4", "1e4", "0.02", "0.02", "0.4"]),
    "*MAT_RIGID".into(),
    card10(&["0", "1.0"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.materials.len(), 2);
  let steel = res.get_material(4).unwrap();
  assert_eq!(steel.title, "steel");
  assert_eq!(steel.cards_parsed, 2);
  assert_eq!(steel.get(MaterialField::Sigy), Some(300.0));
  assert_eq!(steel.get(MaterialField::Lcss), Some(17.0));
  let ortho = res.get_material(5).unwrap();
  assert_eq!(ortho.get(MaterialField::Ea), Some(1.4e5));
  assert_eq!(ortho.get(MaterialField::Prcb), Some(0.4));
  assert_eq!(ortho.get(MaterialField::E), None);
  assert_eq!(ortho.get(MaterialField::Gab), None);
  assert_eq!(ortho.e, 0.0);
  // the rigid one had no MID
  assert!(res.get_material(0).is_none());
}

#[test]
fn test_null_and_rigid_mappings() {
  let res = parse(&deck(&[
    "*MAT_009".into(),
    card10(&["6", "1e-9", "-1.0", "0.001", "", "", "200.", "0.3"]),
  ]));
  let null = res.get_material(6).unwrap();
  assert_eq!(null.kind, MaterialKind::Null);
  assert_eq!((null.e, null.pr), (200.0, 0.3));
  assert_eq!(null.get(MaterialField::Pc), Some(-1.0));
  assert_eq!(null.get(MaterialField::Mu), Some(0.001));
  let res = parse(&sample_deck());
  let rigid = res.get_material(2).unwrap();
  assert_eq!(rigid.kind, MaterialKind::Rigid);
  assert_eq!(rigid.cards_parsed, 2);
  assert_eq!(rigid.get(MaterialField::Cmo), Some(1.0));
  assert_eq!(rigid.get(MaterialField::Con1), Some(7.0));
  assert_eq!(rigid.get(MaterialField::Con2), Some(7.0));
}

#[test]
fn test_rigid_first_card() {
  let res = parse(&deck(&[
    "*MAT_RIGID".into(),
    card10(&["20", "7.8e-9", "2.1e5", "0.3", "0.5", "1.", "2.", "3."]),
    card10(&["1.", "4", "7"]),
    card10(&["0"]),
    card10(&["99"]),
  ]));
  assert_eq!(res.materials.len(), 1);
  let m = res.get_material(20).unwrap();
  assert_eq!(m.cards_parsed, 3);
  assert_eq!(m.get(MaterialField::E), Some(2.1e5));
  assert_eq!(m.get(MaterialField::N), Some(0.5));
  assert_eq!(m.get(MaterialField::Couple), Some(1.0));
  assert_eq!(m.get(MaterialField::M), Some(2.0));
  assert_eq!(m.get(MaterialField::Alias), Some(3.0));
  assert_eq!(m.get(MaterialField::Con1), Some(4.0));
}

#[test]
fn test_composite_damage_cards() {
  let res = parse(&deck(&[
    "*MAT_COMPOSITE_DAMAGE".into(),
    card10(&["22", "1.6e-9", "1.4e5", "1e4", "1e4", "0.02", "0.3", "0.3"]),
    card10(&["5000.", "3000.", "5000.", "0", "2", "1"]),
    card10(&["0", "0", "0", "1", "0", "0"]),
    card10(&["0", "0", "0", "0", "1", "0", "30."]),
    card10(&["80.", "2000.", "50.", "200.", "0", "60.", "50.", "50."]),
    card10(&["99"]),
  ]));
  assert_eq!(res.materials.len(), 1);
  let m = &res.materials[0];
  assert_eq!(m.kind, MaterialKind::CompositeDamage);
  assert_eq!(m.mid, 22);
  assert_eq!(m.expected_cards(), 5);
  assert_eq!(m.cards_parsed, 5);
  assert_eq!(m.ro, 1.6e-9);
  assert_eq!(m.get(MaterialField::E), None);
  assert_eq!(m.get(MaterialField::Pr), None);
  assert_eq!(m.get(MaterialField::Ea), Some(1.4e5));
  assert_eq!(m.get(MaterialField::Prba), Some(0.02));
  assert_eq!(m.get(MaterialField::Gab), Some(5000.0));
  assert_eq!(m.get(MaterialField::Gbc), Some(3000.0));
  assert_eq!(m.get(MaterialField::Aopt), Some(2.0));
  assert_eq!(m.get(MaterialField::A1), Some(1.0));
  assert_eq!(m.get(MaterialField::Beta), Some(30.0));
  assert_eq!(m.get(MaterialField::Sc), Some(80.0));
  assert_eq!(m.get(MaterialField::Xt), Some(2000.0));
  assert_eq!(m.get(MaterialField::Yt), Some(50.0));
  assert_eq!(m.get(MaterialField::Yc), Some(200.0));
  assert_eq!(m.get(MaterialField::Xc), None);
}

#[test]
fn test_enhanced_composite_damage_cards() {
  let res = parse(&deck(&[
    "*MAT_054".into(),
    card10(&["54", "1.6e-9", "1.4e5", "1e4", "1e4", "0.02", "0.3", "0.3"]),
    card10(&["5000.", "3000.", "5000.", "", "2."]),
    card10(&["0", "0", "0", "1", "0", "0", "15."]),
    card10(&["0", "0", "0", "0", "0", "1", "0.1", "0.2"]),
    card10(&["0", "0", "1", "0.5", "2.", "0.3", "-0.4", "0"]),
    card10(&["1500.", "2500.", "200.", "50.", "70.", "54."]),
  ]));
  let m = res.get_material(54).unwrap();
  assert_eq!(m.kind, MaterialKind::EnhancedCompositeDamage);
  assert_eq!(m.expected_cards(), 6);
  assert_eq!(m.cards_parsed, 6);
  assert_eq!(m.get(MaterialField::E), None);
  assert_eq!(m.get(MaterialField::Gca), Some(5000.0));
  assert_eq!(m.get(MaterialField::Aopt), Some(2.0));
  assert_eq!(m.get(MaterialField::Mangle), Some(15.0));
  assert_eq!(m.get(MaterialField::Dfails), Some(0.2));
  assert_eq!(m.get(MaterialField::Fbrt), Some(0.5));
  assert_eq!(m.get(MaterialField::Dfailc), Some(-0.4));
  assert_eq!(m.get(MaterialField::Xc), Some(1500.0));
  assert_eq!(m.get(MaterialField::Xt), Some(2500.0));
  assert_eq!(m.get(MaterialField::Yc), Some(200.0));
  assert_eq!(m.get(MaterialField::Yt), Some(50.0));
  assert_eq!(m.get(MaterialField::Sc), Some(70.0));
  assert_eq!(m.get(MaterialField::Crit), Some(54.0));
  assert_eq!(m.raw(5, 0), Some(1500.0));
}

#[test]
fn test_index_correctness() {
  let content = sample_deck();
  let indexed = parse(&content);
  let scanned = KFileParser::reference(ParserConfig::default().with_index(false))
    .parse_string(&content);
  assert!(indexed.is_indexed());
  assert!(!scanned.is_indexed());
  assert_eq!(indexed.nodes.len(), 5);
  for node in indexed.nodes.iter() {
    assert_eq!(indexed.get_node(node.nid), Some(node));
    assert_eq!(scanned.get_node(node.nid), Some(node));
  }
  for part in indexed.parts.iter() {
    assert_eq!(indexed.get_part(part.pid), scanned.get_part(part.pid));
  }
  assert_eq!(indexed.get_element(20).unwrap().kind, ElementKind::Beam);
  assert_eq!(indexed.get_node(999), None);
  assert_eq!(scanned.get_node(999), None);
  assert_eq!(
    indexed.get(Category::Element, 10).map(|e| e.id()),
    Some(10)
  );
}

#[test]
fn test_duplicates_keep_first() {
  let content = deck(&[
    "*NODE".into(),
    node_line(1, 1.0, 0.0, 0.0),
    node_line(1, 2.0, 0.0, 0.0),
    node_line(2, 3.0, 0.0, 0.0),
  ]);
  let indexed = parse(&content);
  let scanned = KFileParser::reference(ParserConfig::default().with_index(false))
    .parse_string(&content);
  assert_eq!(indexed.nodes.len(), 3);
  assert_eq!(indexed.get_node(1).unwrap().x, 1.0);
  assert_eq!(scanned.get_node(1).unwrap().x, 1.0);
  assert_eq!(indexed.duplicate_ids(Category::Node), vec![1]);
  assert!(indexed.duplicate_ids(Category::Part).is_empty());
}

#[test]
fn test_category_gating() {
  let cfg = ParserConfig { parse_materials: false, ..Default::default() };
  let res = KFileParser::reference(cfg).parse_string(&sample_deck());
  assert!(res.materials.is_empty());
  assert_eq!(res.nodes.len(), 5);
  assert_eq!(res.contacts.len(), 1);
  let res = KFileParser::reference(ParserConfig::only(&[KeywordFamily::Nodes]))
    .parse_string(&sample_deck());
  assert_eq!(res.nodes.len(), 5);
  assert_eq!(res.total_entities(), 5);
}

#[test]
fn test_disabled_family_lines_are_not_decoded() {
  let mut parser = OnePassParser::new(ParserConfig::only(&[KeywordFamily::Nodes]));
  assert_eq!(
    parser.consume("*ELEMENT_SHELL"),
    ParserResponse::Disabled(KeywordFamily::ElementShells)
  );
  assert_eq!(parser.current_family(), None);
  assert_eq!(parser.consume(&card8(&["1", "1", "1", "2", "3", "4"])), ParserResponse::Useless);
  assert_eq!(parser.consume("*NODE"), ParserResponse::Keyword(KeywordFamily::Nodes));
  assert_eq!(
    parser.consume(&node_line(1, 0.0, 0.0, 0.0)),
    ParserResponse::PassedToDecoder(KeywordFamily::Nodes, CardOutcome::Record)
  );
  assert_eq!(parser.consume("*BOUNDARY_SPC_NODE"), ParserResponse::Unsupported);
  assert_eq!(parser.consume(&card10(&["1", "0", "1"])), ParserResponse::Useless);
  assert_eq!(parser.consume("   "), ParserResponse::Blank);
  assert_eq!(parser.consume("$ hi"), ParserResponse::Comment);
  let res = parser.finish();
  assert_eq!(res.nodes.len(), 1);
  assert!(res.elements.is_empty());
  assert_eq!(res.stats.total_lines, 8);
}

#[test]
fn test_unsupported_keyword_closes_set() {
  let content = deck(&[
    "*SET_SOLID".into(),
    card10(&["2"]),
    card10(&["1", "2"]),
    "*BOUNDARY_SPC_SET".into(),
    card10(&["3", "4"]),
  ]);
  let res = parse(&content);
  assert_eq!(res.sets.len(), 1);
  assert_eq!(res.sets[0].ids, vec![1, 2]);
}

#[test]
fn test_idempotence() {
  let content = sample_deck();
  let first = parse(&content);
  let second = parse(&content);
  assert_eq!(first, second);
  assert_eq!(first.stats.counts, second.stats.counts);
  assert_eq!(first.stats.count(Category::Material), 2);
}

#[test]
fn test_backends_are_equivalent() {
  let content = sample_deck() + &deck(&[
    "*SET_NODE_LIST".into(),
    card10(&["8"]),
    card10(&["4", "5"]),
  ]);
  for cfg in [
    ParserConfig::default(),
    ParserConfig::only(&[KeywordFamily::Nodes, KeywordFamily::Materials]),
    ParserConfig::default().with_index(false),
  ] {
    let reference = KFileParser::new(cfg, Backend::Reference).parse_string(&content);
    let native = KFileParser::new(cfg, Backend::Native).parse_string(&content);
    assert_eq!(reference, native);
    assert_eq!(reference.stats.total_lines, native.stats.total_lines);
    assert_eq!(reference.stats.counts, native.stats.counts);
    for node in native.nodes.iter() {
      assert_eq!(native.get_node(node.nid), reference.get_node(node.nid));
    }
  }
}

#[test]
fn test_backend_resolution() {
  let parser = KFileParser::new(ParserConfig::default(), Backend::Native);
  assert_eq!(parser.backend(), Backend::preferred());
  let res = parser.parse_string("*NODE\n");
  assert_eq!(res.stats.backend, parser.backend());
  assert_eq!(
    KFileParser::new(ParserConfig::default(), Backend::Reference).backend(),
    Backend::Reference
  );
}

#[test]
fn test_split_blocks() {
  let content = "junk\n*NODE\n1\n*PART\r\nx\n*END";
  let blocks = crate::backend::split_blocks(content);
  assert_eq!(blocks, vec!["junk\n", "*NODE\n1\n", "*PART\r\nx\n", "*END"]);
  let total: usize = blocks.iter().map(|b| b.lines().count()).sum();
  assert_eq!(total, content.lines().count());
}

#[test]
fn test_parse_missing_file() {
  let parser = KFileParser::default();
  match parser.parse("/definitely/not/here.k") {
    Err(KFileError::FileNotFound(p)) => assert!(p.ends_with("here.k")),
    other => panic!("expected FileNotFound, got {:?}", other.map(|r| r.stats)),
  }
}

#[test]
fn test_parse_file_with_bad_bytes() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(b"*PART\nCaf\xe9 part\n").unwrap();
  file.write_all(card10(&["1", "2", "3"]).as_bytes()).unwrap();
  file.write_all(b"\n").unwrap();
  file.flush().unwrap();
  let res = KFileParser::default().parse(file.path()).unwrap();
  assert_eq!(res.parts.len(), 1);
  assert_eq!(res.parts[0].name, "Caf\u{FFFD} part");
  assert_eq!(res.parts[0].mid, 3);
}

#[test]
fn test_parse_reader() {
  let content = sample_deck();
  let res = KFileParser::default().parse_reader(content.as_bytes()).unwrap();
  assert_eq!(res, parse(&content));
}

#[test]
fn test_config_from_partial_toml() {
  let cfg: ParserConfig = toml::from_str(
    "parse_materials = false\nbuild_index = false\n"
  ).unwrap();
  assert!(!cfg.parse_materials);
  assert!(!cfg.build_index);
  assert!(cfg.parse_nodes);
  assert!(cfg.enabled(KeywordFamily::Contacts));
  assert!(!cfg.enabled(KeywordFamily::Materials));
  assert_eq!(cfg.enabled_families().len(), KeywordFamily::all().len() - 1);
  assert_eq!(KeywordFamily::all().len(), 15);
  assert_eq!(KeywordFamily::ElementShells.snake_case_name(), "element_shells");
}

#[test]
fn test_entities_and_geometry() {
  let mut res = parse(&sample_deck());
  assert_eq!(res.entities().count(), res.total_entities());
  let first = res.entities().next().unwrap();
  assert_eq!(first.category(), Category::Node);
  assert_eq!(first.to_entity(), Entity::Node(res.nodes[0].clone()));
  let (lo, hi) = res.bounding_box().unwrap();
  assert_eq!((lo.x, lo.y, lo.z), (0.0, 0.0, 0.0));
  assert_eq!((hi.x, hi.y, hi.z), (1.0, 1.0, 1.0));
  assert!(!res.is_dirty());
  res.mark_dirty();
  assert!(res.is_dirty());
}

#[test]
fn test_result_serialises() {
  let res = parse(&sample_deck());
  let json = serde_json::to_value(&res).unwrap();
  assert_eq!(json["nodes"].as_array().map(|a| a.len()), Some(5));
  assert_eq!(json["parts"][1]["name"], "Beam");
  assert_eq!(json["stats"]["backend"], "Reference");
  assert_eq!(json["materials"][1]["kind"], "Rigid");
  assert_eq!(json["materials"][1]["fields"]["Con1"], 7.0);
}
