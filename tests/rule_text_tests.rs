//! End-to-end: human rule text -> parsed rules -> lint -> canonical JSON, round-tripped through
//! the filesystem the way a converter-CLI invocation would see it.

use rules_engine::answer::Registry;
use rules_engine::linter::{lint, AnswerConstraint, LintSpec, NamedKind};
use rules_engine::parser::parse_rule_file;
use rules_engine::serialize::{decode_rules, encode_rules};

#[test]
fn rule_file_parses_lints_and_round_trips_through_a_file() {
    let source = "\
        // weekend beach rules\n\
        1: true => sky = blue\n\
        1: sky == \"blue\" => weather = sunny\n\
        0: true => beach = empty\n\
        2: weather == \"sunny\" => beach = full\n";

    let rules = parse_rule_file(source).unwrap();
    assert_eq!(rules.len(), 4);

    let mut spec = LintSpec::default();
    spec.rhs.insert("sky".into(), AnswerConstraint::Named(NamedKind::String));
    spec.rhs.insert("weather".into(), AnswerConstraint::Named(NamedKind::String));
    spec
        .rhs
        .insert("beach".into(), AnswerConstraint::Strings(vec!["empty".into(), "full".into()]));

    let numbered: Vec<_> = source
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim().starts_with("//"))
        .zip(rules.iter().cloned())
        .map(|((i, l), r)| (i + 1, l.trim().to_string(), r))
        .collect();
    let issues = lint(&numbered, Some(&spec));
    assert!(issues.is_empty(), "unexpected lint issues: {issues:?}");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let encoded = encode_rules(&rules);
    std::fs::write(&path, serde_json::to_string(&encoded).unwrap()).unwrap();

    let reloaded: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let registry = Registry::new();
    let decoded = decode_rules(&reloaded, &registry).unwrap();
    assert_eq!(decoded.len(), rules.len());
    for (original, round_tripped) in rules.iter().zip(decoded.iter()) {
        assert_eq!(original.question, round_tripped.question);
        assert_eq!(original.answer, round_tripped.answer);
        assert_eq!(original.priority, round_tripped.priority);
    }
}

#[test]
fn missing_fallback_rule_is_flagged_against_a_spec() {
    let source = "1: base == \"x\" => q = a\n";
    let rules = parse_rule_file(source).unwrap();
    let numbered = vec![(1usize, "1: base == \"x\" => q = a".to_string(), rules[0].clone())];

    let mut spec = LintSpec::default();
    spec.rhs.insert("q".into(), AnswerConstraint::Named(NamedKind::String));

    let issues = lint(&numbered, Some(&spec));
    assert!(issues.iter().any(|i| i.message.contains("no fallback rule")));
}
