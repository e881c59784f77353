//! The predicate boolean algebra and its recursive, short-circuiting evaluator (SPEC_FULL §4.1).

use std::collections::HashSet;

use crate::answer::{Answer, Question};
use crate::error::{AnswerError, EvalError};
use crate::facts::Facts;
use crate::rule::Rule;

/// Comparison operators (SPEC_FULL §4.1, §11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Op {
    /// The operator obtained by swapping operand order (used when a literal appears on the
    /// left and a question on the right).
    pub fn swapped(self) -> Op {
        match self {
            Op::Eq => Op::Eq,
            Op::Ne => Op::Ne,
            Op::Lt => Op::Gt,
            Op::Gt => Op::Lt,
            Op::Le => Op::Ge,
            Op::Ge => Op::Le,
        }
    }
}

/// One side of a [`Predicate::Comparison`].
#[derive(Debug, Clone)]
pub enum Expr {
    Question(Question),
    Answer(Answer),
    Predicate(Box<Predicate>),
}

/// The predicate AST (SPEC_FULL §3, §4.1).
#[derive(Debug, Clone)]
pub enum Predicate {
    False,
    True,
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Comparison(Expr, Op, Expr),
}

impl Predicate {
    /// Structural specificity measure used to break priority ties (SPEC_FULL §3).
    pub fn size(&self) -> usize {
        match self {
            Predicate::False | Predicate::True => 0,
            Predicate::Not(p) => p.size(),
            Predicate::And(ps) => ps.len(),
            Predicate::Or(ps) => ps.iter().map(Predicate::size).max().unwrap_or(0),
            Predicate::Comparison(..) => 1,
        }
    }
}

/// The result of evaluating a predicate: its truth value, the questions it consulted, and any
/// rule pairs that tied for first place while resolving those questions.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: bool,
    pub dependencies: HashSet<Question>,
    pub ambiguous_rules: Vec<Vec<Rule>>,
}

impl Evaluation {
    fn leaf(value: bool) -> Self {
        Self {
            value,
            dependencies: HashSet::new(),
            ambiguous_rules: Vec::new(),
        }
    }

    fn invert(mut self) -> Self {
        self.value = !self.value;
        self
    }

    fn merge_from(&mut self, other: &Evaluation) {
        self.dependencies.extend(other.dependencies.iter().cloned());
        self.ambiguous_rules.extend(other.ambiguous_rules.iter().cloned());
    }
}

/// Evaluate a predicate against a fact store (SPEC_FULL §4.1).
pub fn evaluate(predicate: &Predicate, facts: &mut Facts) -> Result<Evaluation, EvalError> {
    match predicate {
        Predicate::False => Ok(Evaluation::leaf(false)),
        Predicate::True => Ok(Evaluation::leaf(true)),
        Predicate::Not(inner) => evaluate(inner, facts).map(Evaluation::invert),
        Predicate::And(parts) => {
            let mut acc = Evaluation::leaf(true);
            for part in parts {
                let step = evaluate(part, facts)?;
                acc.merge_from(&step);
                if !step.value {
                    acc.value = false;
                    return Ok(acc);
                }
            }
            Ok(acc)
        }
        Predicate::Or(parts) => {
            let mut acc = Evaluation::leaf(false);
            for part in parts {
                let step = evaluate(part, facts)?;
                acc.merge_from(&step);
                if step.value {
                    acc.value = true;
                    return Ok(acc);
                }
            }
            Ok(acc)
        }
        Predicate::Comparison(lhs, op, rhs) => evaluate_comparison(lhs, *op, rhs, facts),
    }
}

/// Resolved form of an [`Expr`] once questions have been looked up.
enum Resolved {
    Predicate(Predicate),
    Answer(Answer),
}

fn resolve(
    expr: &Expr,
    facts: &mut Facts,
    deps: &mut HashSet<Question>,
    ambiguous: &mut Vec<Vec<Rule>>,
) -> Result<Resolved, EvalError> {
    match expr {
        Expr::Predicate(p) => Ok(Resolved::Predicate((**p).clone())),
        Expr::Answer(a) => Ok(Resolved::Answer(a.clone())),
        Expr::Question(q) => {
            let resolved = facts
                .ask(q)
                .map_err(|e| EvalError::QuestionEvaluationFailed(Box::new(e)))?;
            deps.insert(q.clone());
            deps.extend(resolved.dependencies.iter().cloned());
            ambiguous.extend(resolved.ambiguous_rules.iter().cloned());
            Ok(Resolved::Answer(resolved.answer))
        }
    }
}

fn evaluate_comparison(
    lhs: &Expr,
    op: Op,
    rhs: &Expr,
    facts: &mut Facts,
) -> Result<Evaluation, EvalError> {
    let mut deps = HashSet::new();
    let mut ambiguous = Vec::new();
    let left = resolve(lhs, facts, &mut deps, &mut ambiguous)?;
    let right = resolve(rhs, facts, &mut deps, &mut ambiguous)?;

    // Ordering a predicate against anything is never meaningful; eq/ne are, since a predicate
    // is itself a boolean value once evaluated.
    let is_ordering = matches!(op, Op::Lt | Op::Gt | Op::Le | Op::Ge);
    if is_ordering && (matches!(left, Resolved::Predicate(_)) || matches!(right, Resolved::Predicate(_))) {
        return Err(EvalError::PredicatesNotComparable);
    }

    let left = resolve_to_answer(left, facts, &mut deps, &mut ambiguous)?;
    let right = resolve_to_answer(right, facts, &mut deps, &mut ambiguous)?;
    let value = compare_answers(&left, op, &right)?;

    Ok(Evaluation {
        value,
        dependencies: deps,
        ambiguous_rules: ambiguous,
    })
}

/// Collapse a resolved operand to its comparable `Answer`, evaluating a sub-predicate to its
/// boolean value and folding in whatever dependencies/ambiguity that evaluation produced.
fn resolve_to_answer(
    resolved: Resolved,
    facts: &mut Facts,
    deps: &mut HashSet<Question>,
    ambiguous: &mut Vec<Vec<Rule>>,
) -> Result<Answer, EvalError> {
    match resolved {
        Resolved::Answer(a) => Ok(a),
        Resolved::Predicate(p) => {
            let eval = evaluate(&p, facts)?;
            deps.extend(eval.dependencies);
            ambiguous.extend(eval.ambiguous_rules);
            Ok(Answer::Bool(eval.value))
        }
    }
}

fn compare_answers(a: &Answer, op: Op, b: &Answer) -> Result<bool, EvalError> {
    if !a.type_compatible(b) {
        return Err(EvalError::TypeMismatch);
    }
    if matches!(a, Answer::Bool(_)) {
        return match op {
            Op::Eq => Ok(a == b),
            Op::Ne => Ok(a != b),
            _ => Err(EvalError::PredicatesNotComparable),
        };
    }
    match op {
        Op::Eq => Ok(a == b),
        Op::Ne => Ok(a != b),
        Op::Lt | Op::Gt | Op::Le | Op::Ge => {
            let ordering = a.partial_cmp(b).ok_or(EvalError::TypeMismatch)?;
            Ok(match op {
                Op::Lt => ordering.is_lt(),
                Op::Gt => ordering.is_gt(),
                Op::Le => ordering.is_le(),
                Op::Ge => ordering.is_ge(),
                Op::Eq | Op::Ne => unreachable!(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Registry;
    use crate::brain::Brain;
    use crate::rule::SelectionStrategy;

    fn empty_facts() -> Facts {
        let brain = Brain::new(SelectionStrategy::Fail);
        Facts::new(brain, Registry::new(), false)
    }

    #[test]
    fn and_empty_is_true() {
        let mut facts = empty_facts();
        let eval = evaluate(&Predicate::And(vec![]), &mut facts).unwrap();
        assert!(eval.value);
    }

    #[test]
    fn or_empty_is_false() {
        let mut facts = empty_facts();
        let eval = evaluate(&Predicate::Or(vec![]), &mut facts).unwrap();
        assert!(!eval.value);
    }

    #[test]
    fn not_inverts() {
        let mut facts = empty_facts();
        let eval = evaluate(&Predicate::Not(Box::new(Predicate::True)), &mut facts).unwrap();
        assert!(!eval.value);
    }

    #[test]
    fn and_short_circuits_on_false() {
        let mut facts = empty_facts();
        let eval = evaluate(
            &Predicate::And(vec![Predicate::False, Predicate::True]),
            &mut facts,
        )
        .unwrap();
        assert!(!eval.value);
    }

    #[test]
    fn bool_rejects_ordering_operators() {
        let mut facts = empty_facts();
        let predicate = Predicate::Comparison(
            Expr::Answer(Answer::Bool(true)),
            Op::Lt,
            Expr::Answer(Answer::Bool(false)),
        );
        let err = evaluate(&predicate, &mut facts).unwrap_err();
        assert_eq!(err, EvalError::PredicatesNotComparable);
    }

    #[test]
    fn int_double_widen_for_comparison() {
        let mut facts = empty_facts();
        let predicate = Predicate::Comparison(
            Expr::Answer(Answer::Int(3)),
            Op::Lt,
            Expr::Answer(Answer::Double(3.5)),
        );
        let eval = evaluate(&predicate, &mut facts).unwrap();
        assert!(eval.value);
    }

    #[test]
    fn predicates_compare_equal_by_recursive_evaluation() {
        let mut facts = empty_facts();
        let predicate = Predicate::Comparison(
            Expr::Predicate(Box::new(Predicate::True)),
            Op::Eq,
            Expr::Predicate(Box::new(Predicate::Not(Box::new(Predicate::False)))),
        );
        let eval = evaluate(&predicate, &mut facts).unwrap();
        assert!(eval.value);
    }

    #[test]
    fn predicate_ordering_is_never_comparable() {
        let mut facts = empty_facts();
        let predicate = Predicate::Comparison(
            Expr::Predicate(Box::new(Predicate::True)),
            Op::Lt,
            Expr::Predicate(Box::new(Predicate::False)),
        );
        let err = evaluate(&predicate, &mut facts).unwrap_err();
        assert_eq!(err, EvalError::PredicatesNotComparable);
    }

    #[test]
    fn mismatched_types_are_rejected() {
        let mut facts = empty_facts();
        let predicate = Predicate::Comparison(
            Expr::Answer(Answer::Int(3)),
            Op::Lt,
            Expr::Answer(Answer::String("x".to_string())),
        );
        let err = evaluate(&predicate, &mut facts).unwrap_err();
        assert_eq!(err, EvalError::TypeMismatch);
    }
}
