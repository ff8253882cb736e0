//! End-to-end scenarios over hand-written CDXML documents.

use cdxml::output::{CompoundEntry, ConditionEntry, LabelEntry, SchemeData};
use cdxml::{parse, CdxmlError, ParseRequest};

fn document(content: &str) -> String {
    format!(
        r#"<CDXML BoundingBox="0 0 540 720"><page id="1">{}</page></CDXML>"#,
        content
    )
}

fn fragment(id: u32, l: f64, t: f64, r: f64, b: f64) -> String {
    format!(
        r#"<fragment id="{id}" BoundingBox="{l} {t} {r} {b}"><n id="{n1}" p="{l} {t}"/><n id="{n2}" p="{r} {b}"/><b id="{bond}" B="{n1}" E="{n2}"/></fragment>"#,
        id = id,
        n1 = id * 10 + 1,
        n2 = id * 10 + 2,
        bond = id * 10 + 3,
    )
}

fn text(id: u32, l: f64, t: f64, r: f64, b: f64, content: &str) -> String {
    format!(
        r#"<t id="{id}" p="{l} {b}" BoundingBox="{l} {t} {r} {b}"><s font="3" size="10" color="0">{content}</s></t>"#,
    )
}

fn arrow_right(id: u32) -> String {
    format!(
        r#"<arrow id="{id}" BoundingBox="200 95 300 105" Head3D="300 100 0" Tail3D="200 100 0"/>"#,
    )
}

fn plus_graphic(id: u32, l: f64, t: f64, r: f64, b: f64) -> String {
    format!(
        r#"<graphic id="{id}" BoundingBox="{l} {t} {r} {b}" GraphicType="Symbol" SymbolType="Plus"/>"#,
    )
}

fn run(content: &str) -> SchemeData {
    let doc = document(content);
    let mut request = ParseRequest::new(&doc);
    request.with_position = true;
    request.with_cdxml = true;
    parse(request).unwrap().data
}

fn compound<'a>(data: &'a SchemeData, tag: &str) -> &'a CompoundEntry {
    data.compound
        .iter()
        .find(|c| c.tag == tag)
        .unwrap_or_else(|| panic!("no compound tagged {}", tag))
}

fn label<'a>(data: &'a SchemeData, tag: &str) -> &'a LabelEntry {
    data.label
        .iter()
        .find(|l| l.tag == tag)
        .unwrap_or_else(|| panic!("no label tagged {}", tag))
}

fn condition<'a>(data: &'a SchemeData, tag: &str) -> &'a ConditionEntry {
    data.condition
        .iter()
        .find(|c| c.tag == tag)
        .unwrap_or_else(|| panic!("no condition tagged {}", tag))
}

#[test]
fn empty_page_yields_empty_lists_and_the_canvas_size() {
    let data = run("");
    assert!(data.label.is_empty());
    assert!(data.compound.is_empty());
    assert!(data.reaction.is_empty());
    assert!(data.condition.is_empty());
    assert_eq!(data.graphic.size.w, 540.0);
    assert_eq!(data.graphic.size.h, 720.0);
}

#[test]
fn missing_page_is_an_error() {
    let result = parse(ParseRequest::new("<CDXML/>"));
    assert!(matches!(result, Err(CdxmlError::NoPage)));
}

#[test]
fn unknown_page_children_are_structural_errors() {
    let doc = document("<widget/>");
    let result = parse(ParseRequest::new(&doc));
    assert!(matches!(result, Err(CdxmlError::UnknownTag { .. })));
}

#[test]
fn single_reaction_classifies_reactant_and_product() {
    let content = format!(
        "{}{}{}",
        fragment(10, 140.0, 90.0, 160.0, 110.0),
        fragment(20, 340.0, 90.0, 360.0, 110.0),
        arrow_right(30),
    );
    let data = run(&content);

    assert_eq!(data.reaction.len(), 1);
    let reaction = &data.reaction[0];
    assert_eq!(reaction.tag, "reaction_1");
    assert_eq!(reaction.semantics, "reaction");
    assert_eq!(reaction.reactant, vec!["R1"]);
    assert_eq!(reaction.product, vec!["P1"]);
    assert!(reaction.reagent.is_empty());
    assert!(reaction.solvent.is_empty());
    assert!(reaction.condition.is_empty());

    let reactant = compound(&data, "R1");
    assert_eq!(reactant.semantics, "reactant");
    assert!(!reactant.is_collection);
    assert!(reactant.cdxml.starts_with("<fragment"));
    let position = reactant.position.unwrap();
    assert_eq!((position.l, position.t), (140.0, 90.0));

    assert_eq!(compound(&data, "P1").semantics, "product");
    assert_eq!(label(&data, "arrow_1").semantics, "arrow");
    assert_eq!(
        label(&data, "arrow_1").head_position.map(|p| (p.l, p.t)),
        Some((300.0, 100.0))
    );
}

#[test]
fn corner_compound_joins_every_matching_role() {
    // center (200, 60) sits on the shared edge of the tail and top regions
    let content = format!(
        "{}{}",
        fragment(10, 190.0, 50.0, 210.0, 70.0),
        arrow_right(30),
    );
    let data = run(&content);
    let reaction = &data.reaction[0];
    assert_eq!(reaction.reactant, vec!["R1"]);
    assert_eq!(reaction.reagent, vec!["R1"]);
}

#[test]
fn comma_text_splits_into_promoted_collections() {
    let content = format!(
        "{}{}",
        text(40, 220.0, 40.0, 280.0, 60.0, "A, B, C"),
        arrow_right(30),
    );
    let data = run(&content);

    let reaction = &data.reaction[0];
    assert_eq!(reaction.reagent, vec!["r1", "r2", "r3"]);

    // per-character width 60/7; chunk boxes slice the source box
    let r1 = compound(&data, "r1");
    assert!(r1.is_collection);
    assert_eq!(r1.text.as_deref(), Some("A"));
    assert_eq!(r1.cdxml, "");
    let p1 = r1.position.unwrap();
    assert_eq!((p1.l, p1.w), (220.0, 8.57));
    let p2 = compound(&data, "r2").position.unwrap();
    assert_eq!(p2.l, 245.71);
    let p3 = compound(&data, "r3").position.unwrap();
    assert_eq!(p3.l, 271.43);

    // the promoted texts stay in the label list under their role tags
    assert_eq!(label(&data, "r2").semantics, "reagent");
    assert_eq!(label(&data, "r2").text.as_deref(), Some("B"));
}

#[test]
fn plus_diffusion_propagates_the_role_across_chains() {
    // A is in the tail region; B and C are outside it, linked A—+—B—+—C
    let content = format!(
        "{}{}{}{}{}{}",
        fragment(10, 50.0, 90.0, 70.0, 110.0),    // A at center (60, 100)
        fragment(20, -60.0, 90.0, -40.0, 110.0),  // B at center (-50, 100)
        fragment(30, -170.0, 90.0, -150.0, 110.0), // C at center (-160, 100)
        fragment(40, 340.0, 90.0, 360.0, 110.0),  // product
        plus_graphic(50, -5.0, 95.0, 5.0, 105.0),
        plus_graphic(60, -105.0, 95.0, -95.0, 105.0),
    ) + &arrow_right(70);
    let data = run(&content);

    let reaction = &data.reaction[0];
    assert_eq!(reaction.reactant, vec!["R1", "R2", "R3"]);
    assert_eq!(reaction.product, vec!["P1"]);

    // renumbering reads left to right: C, B, A
    assert_eq!(compound(&data, "R1").position.unwrap().l, -170.0);
    assert_eq!(compound(&data, "R2").position.unwrap().l, -60.0);
    assert_eq!(compound(&data, "R3").position.unwrap().l, 50.0);
}

#[test]
fn condition_text_parses_temperature_time_and_gas() {
    let content = format!(
        "{}{}",
        text(40, 220.0, 140.0, 280.0, 160.0, "25 °C, 2h, N2"),
        arrow_right(30),
    );
    let data = run(&content);

    let reaction = &data.reaction[0];
    assert_eq!(reaction.condition, vec!["C1"]);

    let c1 = condition(&data, "C1");
    assert_eq!(c1.semantics, "condition");
    assert_eq!(c1.text_list, vec!["25 °C", "2h", "N2"]);
    assert_eq!(c1.temperature.as_deref(), Some("25 C"));
    assert_eq!(c1.reaction_time.as_deref(), Some("2 hr"));
    assert_eq!(c1.gas.as_deref(), Some("N2"));
    assert_eq!(c1.stir_speed, None);
    assert_eq!(c1.pressure, None);

    // the member texts are retagged under the condition
    assert_eq!(label(&data, "C1_1").text.as_deref(), Some("25 °C"));
    assert_eq!(label(&data, "C1_2").text.as_deref(), Some("2h"));
    assert_eq!(label(&data, "C1_3").text.as_deref(), Some("N2"));
    assert_eq!(label(&data, "C1_1").semantics, "condition");
}

#[test]
fn plain_solvent_text_below_the_arrow_is_promoted() {
    let content = format!(
        "{}{}",
        text(40, 230.0, 140.0, 270.0, 160.0, "DMF"),
        arrow_right(30),
    );
    let data = run(&content);

    let reaction = &data.reaction[0];
    assert_eq!(reaction.solvent, vec!["S1"]);
    let s1 = compound(&data, "S1");
    assert!(s1.is_collection);
    assert_eq!(s1.text.as_deref(), Some("DMF"));
    assert_eq!(label(&data, "S1").semantics, "solvent");
}

#[test]
fn leftover_text_links_to_the_nearest_compound() {
    let content = format!(
        "{}{}",
        fragment(10, 140.0, 90.0, 160.0, 110.0),
        text(40, 140.0, 130.0, 160.0, 150.0, "85%"),
    );
    let data = run(&content);

    let owner = compound(&data, "compound_1");
    assert_eq!(owner.child.b.as_deref(), Some(&["text_1".to_string()][..]));
    assert!(owner.child.t.is_none());

    let note = label(&data, "text_1");
    assert_eq!(note.semantics, "text");
    assert_eq!(note.father.as_deref(), Some("compound_1"));
}

#[test]
fn text_only_fragment_becomes_a_textual_compound() {
    let content = format!(
        r#"<fragment id="10" BoundingBox="140 90 160 110"><n id="11" p="150 100"><t id="12" p="150 105"><s font="3" size="10">NaOH</s></t></n></fragment>{}"#,
        arrow_right(30),
    );
    let data = run(&content);
    let reactant = compound(&data, "R1");
    assert_eq!(reactant.text.as_deref(), Some("NaOH"));
    assert_eq!(reactant.cdxml, "");
}

#[test]
fn plus_texts_are_retagged_not_promoted() {
    // a "+" between two reactants, written as a text block
    let content = format!(
        "{}{}{}{}",
        fragment(10, 20.0, 90.0, 40.0, 110.0),
        text(50, 55.0, 95.0, 65.0, 105.0, "+"),
        fragment(20, 80.0, 90.0, 100.0, 110.0),
        arrow_right(30),
    );
    let data = run(&content);

    let plus = label(&data, "plus_1");
    assert_eq!(plus.semantics, "plus");
    assert_eq!(plus.text.as_deref(), Some("+"));

    let reaction = &data.reaction[0];
    assert_eq!(reaction.reactant, vec!["R1", "R2"]);
    assert!(data.compound.iter().all(|c| c.tag != "plus_1"));
}

#[test]
fn tags_are_unique_within_each_entity_list() {
    let content = format!(
        "{}{}{}{}{}",
        fragment(10, 50.0, 90.0, 70.0, 110.0),
        fragment(20, 140.0, 90.0, 160.0, 110.0),
        fragment(40, 340.0, 90.0, 360.0, 110.0),
        text(60, 220.0, 140.0, 280.0, 160.0, "25 °C, 2h"),
        arrow_right(30),
    );
    let data = run(&content);

    for tags in [
        data.compound.iter().map(|c| c.tag.clone()).collect::<Vec<_>>(),
        data.label.iter().map(|l| l.tag.clone()).collect::<Vec<_>>(),
        data.condition.iter().map(|c| c.tag.clone()).collect::<Vec<_>>(),
    ] {
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), tags.len(), "duplicate tags in {:?}", tags);
    }
}

#[test]
fn reactants_renumber_left_to_right() {
    // two reactants discovered right-then-left must still read R1, R2
    let content = format!(
        "{}{}{}",
        fragment(10, 140.0, 90.0, 160.0, 110.0), // right one, discovered first
        fragment(20, 20.0, 90.0, 40.0, 110.0),   // left one
        arrow_right(30),
    );
    let data = run(&content);
    assert_eq!(compound(&data, "R1").position.unwrap().l, 20.0);
    assert_eq!(compound(&data, "R2").position.unwrap().l, 140.0);
    assert_eq!(data.reaction[0].reactant, vec!["R1", "R2"]);
}
