//! Static checks over a parsed rule set (SPEC_FULL §4.6, §6).

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answer::{Answer, Question};
use crate::predicate::{Expr, Op, Predicate};
use crate::rule::Rule;

/// A constraint on the type an answer or question may carry (SPEC_FULL §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerConstraint {
    Strings(Vec<String>),
    Named(NamedKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedKind {
    String,
    Bool,
    Int,
    Double,
    Any,
}

impl AnswerConstraint {
    fn accepts(&self, answer: &Answer) -> bool {
        match self {
            AnswerConstraint::Strings(options) => match answer {
                Answer::String(s) => options.iter().any(|o| o == s),
                _ => false,
            },
            AnswerConstraint::Named(NamedKind::Any) => true,
            AnswerConstraint::Named(NamedKind::String) => matches!(answer, Answer::String(_)),
            AnswerConstraint::Named(NamedKind::Bool) => matches!(answer, Answer::Bool(_)),
            AnswerConstraint::Named(NamedKind::Int) => matches!(answer, Answer::Int(_)),
            AnswerConstraint::Named(NamedKind::Double) => matches!(answer, Answer::Double(_)),
        }
    }
}

/// The optional specification a rule file is linted against (SPEC_FULL §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintSpec {
    #[serde(default)]
    pub lhs: HashMap<Question, AnswerConstraint>,
    #[serde(default)]
    pub rhs: HashMap<Question, AnswerConstraint>,
}

/// A single diagnostic emitted by the linter. Ordered by `(line, message)` for deterministic
/// reporting, matching SPEC_FULL §6's converter CLI requirement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LintIssue {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Run every check against a parsed, line-numbered rule set (SPEC_FULL §4.6).
pub fn lint(rules: &[(usize, String, Rule)], spec: Option<&LintSpec>) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    check_duplicates(rules, &mut issues);
    check_well_formedness(rules, &mut issues);
    if let Some(spec) = spec {
        check_against_spec(rules, spec, &mut issues);
    }
    issues.sort();
    issues
}

fn check_duplicates(rules: &[(usize, String, Rule)], issues: &mut Vec<LintIssue>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (line, source, _) in rules {
        if let Some(first_line) = seen.get(source.as_str()) {
            issues.push(LintIssue {
                line: *line,
                message: format!("duplicate of line {first_line}: '{source}'"),
            });
        } else {
            seen.insert(source.as_str(), *line);
        }
    }
}

/// Rejects predicate shapes the evaluator would reject immediately: predicate-vs-predicate with
/// an ordering operator, and predicate-vs-answer comparisons of any kind (SPEC_FULL §4.1/§4.6).
fn check_well_formedness(rules: &[(usize, String, Rule)], issues: &mut Vec<LintIssue>) {
    for (line, _, rule) in rules {
        walk_predicate(&rule.predicate, *line, issues);
    }
}

fn walk_predicate(predicate: &Predicate, line: usize, issues: &mut Vec<LintIssue>) {
    match predicate {
        Predicate::False | Predicate::True => {}
        Predicate::Not(p) => walk_predicate(p, line, issues),
        Predicate::And(ps) | Predicate::Or(ps) => {
            for p in ps {
                walk_predicate(p, line, issues);
            }
        }
        Predicate::Comparison(lhs, op, rhs) => {
            if let (Expr::Predicate(_), Expr::Predicate(_)) = (lhs, rhs) {
                if !matches!(op, Op::Eq | Op::Ne) {
                    issues.push(LintIssue {
                        line,
                        message: "predicates are not comparable with an ordering operator".to_string(),
                    });
                }
            }
            if let (Expr::Predicate(_), Expr::Answer(a)) | (Expr::Answer(a), Expr::Predicate(_)) = (lhs, rhs) {
                if !matches!(op, Op::Eq | Op::Ne) {
                    issues.push(LintIssue {
                        line,
                        message: "predicates are not comparable with an ordering operator".to_string(),
                    });
                } else if !matches!(a, Answer::Bool(_)) {
                    issues.push(LintIssue {
                        line,
                        message: "a predicate can only be compared against a boolean answer".to_string(),
                    });
                }
            }
        }
    }
}

fn check_against_spec(rules: &[(usize, String, Rule)], spec: &LintSpec, issues: &mut Vec<LintIssue>) {
    let rhs_questions: HashSet<&str> = rules.iter().map(|(_, _, r)| r.question.as_str()).collect();

    for question in &rhs_questions {
        if !spec.rhs.contains_key(*question) {
            issues.push(LintIssue {
                line: 0,
                message: format!("question '{question}' has no entry in the spec's rhs section"),
            });
        }
    }

    let mut has_fallback: HashMap<&str, bool> = HashMap::new();
    for (_, _, rule) in rules {
        if matches!(rule.predicate, Predicate::True) && rule.priority == 0 {
            has_fallback.insert(rule.question.as_str(), true);
        } else {
            has_fallback.entry(rule.question.as_str()).or_insert(false);
        }
    }
    for question in &rhs_questions {
        if !has_fallback.get(question).copied().unwrap_or(false) {
            issues.push(LintIssue {
                line: 0,
                message: format!("question '{question}' has no fallback rule (priority 0, predicate true)"),
            });
        }
    }

    for (line, _, rule) in rules {
        if let Some(constraint) = spec.rhs.get(&rule.question) {
            if !constraint.accepts(&rule.answer) {
                issues.push(LintIssue {
                    line: *line,
                    message: format!(
                        "answer for '{}' does not satisfy its rhs constraint",
                        rule.question
                    ),
                });
            }
        }
        check_lhs_types(&rule.predicate, *line, spec, issues);
    }
}

fn check_lhs_types(predicate: &Predicate, line: usize, spec: &LintSpec, issues: &mut Vec<LintIssue>) {
    match predicate {
        Predicate::False | Predicate::True => {}
        Predicate::Not(p) => check_lhs_types(p, line, spec, issues),
        Predicate::And(ps) | Predicate::Or(ps) => {
            for p in ps {
                check_lhs_types(p, line, spec, issues);
            }
        }
        Predicate::Comparison(Expr::Question(q), op, Expr::Answer(literal)) => {
            check_lhs_comparison(q, *op, literal, line, spec, issues);
        }
        Predicate::Comparison(Expr::Answer(literal), op, Expr::Question(q)) => {
            check_lhs_comparison(q, op.swapped(), literal, line, spec, issues);
        }
        Predicate::Comparison(..) => {}
    }
}

fn check_lhs_comparison(
    question: &str,
    op: Op,
    literal: &Answer,
    line: usize,
    spec: &LintSpec,
    issues: &mut Vec<LintIssue>,
) {
    let Some(constraint) = spec.lhs.get(question) else {
        return;
    };
    if let AnswerConstraint::Named(NamedKind::Bool) = constraint {
        if !matches!(op, Op::Eq | Op::Ne) {
            issues.push(LintIssue {
                line,
                message: format!("question '{question}' is declared bool and only supports eq/ne"),
            });
        }
    }
    if !constraint.accepts(literal) {
        issues.push(LintIssue {
            line,
            message: format!(
                "question '{question}' is compared against a literal that does not satisfy its lhs constraint"
            ),
        });
    }
}
