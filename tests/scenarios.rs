//! The concrete worked scenarios a forward-chaining rule engine must reproduce literally.

use rules_engine::answer::{Answer, Registry};
use rules_engine::brain::Brain;
use rules_engine::error::{AnswerError, EvalError};
use rules_engine::facts::Facts;
use rules_engine::predicate::{Expr, Op, Predicate};
use rules_engine::rule::{Rule, SelectionStrategy};

fn beach_rules() -> Vec<Rule> {
    vec![
        Rule::new(1, Predicate::True, "sky", Answer::String("blue".into())),
        Rule::new(1, Predicate::True, "season", Answer::String("summer".into())),
        Rule::new(
            1,
            Predicate::Comparison(
                Expr::Question("sky".into()),
                Op::Eq,
                Expr::Answer(Answer::String("blue".into())),
            ),
            "weather",
            Answer::String("sunny".into()),
        ),
        Rule::new(0, Predicate::True, "beach", Answer::String("empty".into())),
        Rule::new(
            2,
            Predicate::And(vec![
                Predicate::Comparison(
                    Expr::Question("weather".into()),
                    Op::Eq,
                    Expr::Answer(Answer::String("sunny".into())),
                ),
                Predicate::Comparison(
                    Expr::Question("season".into()),
                    Op::Eq,
                    Expr::Answer(Answer::String("summer".into())),
                ),
            ]),
            "beach",
            Answer::String("full".into()),
        ),
    ]
}

#[test]
fn sunny_beach() {
    let mut brain = Brain::new(SelectionStrategy::Fail);
    brain.add(beach_rules());
    let mut facts = Facts::new(brain, Registry::new(), false);

    let beach = facts.ask("beach").unwrap();
    assert_eq!(beach.answer, Answer::String("full".into()));
    for dep in ["weather", "season", "sky"] {
        assert!(beach.dependencies.contains(dep), "missing dependency {dep}");
    }
}

#[test]
fn autumn_beach_falls_back() {
    let mut brain = Brain::new(SelectionStrategy::Fail);
    brain.add(beach_rules());
    let mut facts = Facts::new(brain, Registry::new(), false);
    facts.know("season", Answer::String("autumn".into()));

    let beach = facts.ask("beach").unwrap();
    assert_eq!(beach.answer, Answer::String("empty".into()));
    assert!(beach.dependencies.is_empty());
}

#[test]
fn ambiguity_under_fail_is_an_error() {
    let mut brain = Brain::new(SelectionStrategy::Fail);
    brain.add(vec![
        Rule::new(1, Predicate::True, "q", Answer::String("a".into())),
        Rule::new(1, Predicate::True, "q", Answer::String("b".into())),
    ]);
    let mut facts = Facts::new(brain, Registry::new(), false);

    let err = facts.ask("q").unwrap_err();
    assert_eq!(err, AnswerError::Ambiguous("q".to_string()));
}

#[test]
fn ambiguity_under_undefined_journals_both_candidates() {
    let mut brain = Brain::new(SelectionStrategy::Undefined);
    brain.add(vec![
        Rule::new(1, Predicate::True, "q", Answer::String("a".into())),
        Rule::new(1, Predicate::True, "q", Answer::String("b".into())),
    ]);
    let mut facts = Facts::new(brain, Registry::new(), false);

    let result = facts.ask("q").unwrap();
    assert_eq!(result.answer, Answer::String("a".into()));
    assert_eq!(result.ambiguous_rules.len(), 1);
    assert_eq!(result.ambiguous_rules[0].len(), 2);
}

#[test]
fn invalidation_forces_re_derivation_on_dependency_change() {
    let mut brain = Brain::new(SelectionStrategy::Fail);
    brain.add(vec![
        Rule::new(1, Predicate::True, "derived", Answer::String("x".into())),
        Rule::new(
            2,
            Predicate::Comparison(
                Expr::Question("base".into()),
                Op::Eq,
                Expr::Answer(Answer::String("yes".into())),
            ),
            "derived",
            Answer::String("y".into()),
        ),
    ]);
    let mut facts = Facts::new(brain, Registry::new(), true);
    facts.know("base", Answer::String("yes".into()));

    let first = facts.ask("derived").unwrap();
    assert_eq!(first.answer, Answer::String("y".into()));
    assert!(first.dependencies.contains("base"));

    facts.know("base", Answer::String("no".into()));
    let second = facts.ask("derived").unwrap();
    assert_eq!(second.answer, Answer::String("x".into()));
    assert!(second.dependencies.is_empty());
}

#[test]
fn type_mismatch_surfaces_through_candidate_evaluation() {
    let mut brain = Brain::new(SelectionStrategy::Fail);
    brain.add(vec![Rule::new(
        1,
        Predicate::Comparison(
            Expr::Question("n".into()),
            Op::Lt,
            Expr::Answer(Answer::String("x".into())),
        ),
        "target",
        Answer::String("unreachable".into()),
    )]);
    let mut facts = Facts::new(brain, Registry::new(), false);
    facts.know("n", Answer::Int(3));

    let err = facts.ask("target").unwrap_err();
    match err {
        AnswerError::CandidateEvaluationFailed(inner) => {
            assert_eq!(*inner, EvalError::TypeMismatch);
        }
        other => panic!("expected CandidateEvaluationFailed(TypeMismatch), got {other:?}"),
    }
}
