//! End-to-end scenarios for graph-dialect witnesses, from GraphML text to
//! the normalized automaton and replay tape.

use shrike_witness::{ErrorWitness, Property, WitnessError};

fn graphml(spec: &str, body: &str) -> String {
    format!(
        "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\"><graph edgedefault=\"directed\">\
         <data key=\"witness-type\">violation_witness</data>\
         <data key=\"sourcecodelang\">C</data>\
         <data key=\"producer\">shrike-tests</data>\
         <data key=\"specification\">{spec}</data>\
         <data key=\"programfile\">main.c</data>\
         {body}\
         </graph></graphml>"
    )
}

const UNREACH: &str = "CHECK( init(main()), LTL(G ! call(reach_error())) )";

#[test]
fn single_deterministic_path_with_replay_value() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"n1\"/>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"n1\"><data key=\"startline\">3</data></edge>\
         <edge source=\"n1\" target=\"err\">\
         <data key=\"assumption\">\\result == 42;</data>\
         <data key=\"assumption.resultfunction\">__VERIFIER_nondet_int</data>\
         <data key=\"startline\">7</data>\
         </edge>",
    );
    let (witness, diags) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();

    assert_eq!(witness.properties().len(), 1);
    assert!(witness.checks(Property::UnreachCall));
    assert_eq!(witness.error_function(), Some("reach_error"));
    assert!(diags.is_empty());

    let automaton = witness.automaton().unwrap();
    assert!(automaton.deterministic());
    let tape = automaton.tape();
    assert_eq!(tape.len(), 1);
    assert_eq!(tape[0].function, "__VERIFIER_nondet_int");
    assert_eq!(tape[0].line, 7);
    assert_eq!(tape[0].ordinal, 0);
    assert_eq!(tape[0].value.width, 32);
    assert_eq!(tape[0].value.bits, 42);
    assert!(tape[0].value.signed);
}

#[test]
fn sink_branches_are_pruned() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"n1\"/>\
         <node id=\"n2\"><data key=\"sink\">true</data></node>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"n1\"/>\
         <edge source=\"n1\" target=\"err\"/>\
         <edge source=\"entry\" target=\"n2\"/>",
    );
    let (witness, _) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    let automaton = witness.automaton().unwrap();

    assert_eq!(automaton.node_count(), 3);
    assert!(automaton.node_id("n2").is_none());
    assert_eq!(automaton.node(automaton.entry()).normal_edges.len(), 1);
}

#[test]
fn two_reachable_violations_downgrade_replay() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"v1\"><data key=\"violation\">true</data></node>\
         <node id=\"v2\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"v1\"/>\
         <edge source=\"entry\" target=\"v2\"/>",
    );
    let (witness, _) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    let automaton = witness.automaton().unwrap();

    assert!(!automaton.deterministic());
    assert!(automaton.tape().is_empty());
    assert_eq!(automaton.node_count(), 3);
}

#[test]
fn replay_tape_is_ordered_by_discovery() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"n1\"/>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"n1\">\
         <data key=\"assumption\">\\result == 1;</data>\
         <data key=\"assumption.resultfunction\">__VERIFIER_nondet_int</data>\
         <data key=\"startline\">4</data>\
         </edge>\
         <edge source=\"n1\" target=\"err\">\
         <data key=\"assumption\">\\result == 2;</data>\
         <data key=\"assumption.resultfunction\">__VERIFIER_nondet_int</data>\
         <data key=\"startline\">9</data>\
         </edge>",
    );
    let (witness, _) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    let tape = witness.automaton().unwrap().tape();

    assert_eq!(tape.len(), 2);
    assert!(tape[0].line < tape[1].line);
    assert_eq!(tape[0].value.bits, 1);
    assert_eq!(tape[1].value.bits, 2);
}

#[test]
fn offsets_disable_refutation_end_to_end() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"err\">\
         <data key=\"startoffset\">120</data>\
         <data key=\"endoffset\">140</data>\
         </edge>",
    );
    let (witness, _) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    assert!(!witness.automaton().unwrap().refutation_supported());
}

#[test]
fn unknown_nondet_function_downgrades_but_loads() {
    let source = graphml(
        UNREACH,
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"err\">\
         <data key=\"assumption\">\\result == 1;</data>\
         <data key=\"assumption.resultfunction\">__VERIFIER_nondet_quaternion</data>\
         <data key=\"startline\">4</data>\
         </edge>",
    );
    let (witness, diags) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    let automaton = witness.automaton().unwrap();
    assert!(!automaton.deterministic());
    assert!(automaton.tape().is_empty());
    assert!(diags.contains_code("shrike::witness::ambiguous_replay"));
}

#[test]
fn several_properties_can_be_checked_at_once() {
    let source = graphml(
        "CHECK( init(main()), LTL(G valid-free) )\
         CHECK( init(main()), LTL(G valid-deref) )\
         CHECK( init(main()), LTL(G ! overflow) )",
        "<node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         <edge source=\"entry\" target=\"err\"/>",
    );
    let (witness, _) = ErrorWitness::from_graphml(&source, Default::default()).unwrap();
    assert!(witness.checks(Property::ValidFree));
    assert!(witness.checks(Property::ValidDeref));
    assert!(witness.checks(Property::NoOverflow));
    assert_eq!(witness.error_function(), None);
}

#[test]
fn missing_specification_is_fatal() {
    let source = "<graphml><graph>\
         <data key=\"witness-type\">violation_witness</data>\
         <node id=\"entry\"><data key=\"entry\">true</data></node>\
         <node id=\"err\"><data key=\"violation\">true</data></node>\
         </graph></graphml>";
    let err = ErrorWitness::from_graphml(source, Default::default()).unwrap_err();
    assert!(matches!(err, WitnessError::MissingSpecification));
}
