//! Closed error sets for every fallible surface in the engine.
//!
//! Each enum mirrors a single responsibility boundary (answering, evaluating, firing an
//! assignment, parsing human rule text, converting a parsed predicate). Wrapping is deliberate
//! rather than via `#[from]`: the same inner error type is constructed into different outer
//! variants depending on the call site, and collapsing that into a blanket conversion would lose
//! which boundary failed.

use thiserror::Error;

use crate::answer::Answer;

/// Errors raised while answering a question through [`crate::facts::Facts::ask`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnswerError {
    #[error("no rule found for question '{0}'")]
    NoRuleFound(String),

    #[error("question '{0}' is ambiguous: multiple rules of equal priority and specificity matched")]
    Ambiguous(String),

    #[error("evaluating a candidate rule's predicate failed: {0}")]
    CandidateEvaluationFailed(Box<EvalError>),

    #[error("assignment failed: {0}")]
    AssignmentFailed(#[source] AssignmentError),

    #[error("answer for question did not match the requested type: {0:?}")]
    AnswerTypeDoesNotMatchAskType(Answer),
}

/// Errors raised while evaluating a [`crate::predicate::Predicate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("operands are not type-compatible for comparison")]
    TypeMismatch,

    #[error("predicates are not comparable with an ordering operator")]
    PredicatesNotComparable,

    #[error("evaluating a question referenced by the predicate failed: {0}")]
    QuestionEvaluationFailed(Box<AnswerError>),
}

/// Errors raised while firing a named assignment function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignmentError {
    #[error("no assignment registered under the name '{0}'")]
    AssignmentNotFound(String),

    #[error("assignment '{name}' failed: {detail}")]
    Failed { name: String, detail: String },

    #[error("assignment '{name}' produced an invalid answer: {detail} (raw: {raw})")]
    InvalidAnswer {
        name: String,
        detail: String,
        raw: String,
    },
}

/// Errors raised while parsing a human rule-text line (SPEC_FULL §4.6/§12).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: missing ':' separating priority from predicate")]
    MissingPriorityDelimiter { line: usize },

    #[error("line {line}: invalid priority '{text}'")]
    InvalidPriority { line: usize, text: String },

    #[error("line {line}: missing '=>' separating predicate from question")]
    MissingArrow { line: usize },

    #[error("line {line}: missing '=' separating question from answer")]
    MissingAnswerDelimiter { line: usize },

    #[error("line {line}: empty answer after assignment delimiter")]
    EmptyAnswerAfterAssignment { line: usize },

    #[error("line {line}: unknown typed-answer keyword '{keyword}'")]
    UnknownTypedAnswerKeyword { line: usize, keyword: String },

    #[error("line {line}: predicate text could not be parsed: {source}")]
    PredicateSyntax { line: usize, source: Box<ConversionError> },
}

/// Errors converting a generic parsed-predicate AST into the typed [`crate::predicate::Predicate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("a compound ('and'/'or') node had no sub-predicates")]
    CompoundHasNoSubpredicates,

    #[error("input text was not recognized as a predicate: {0}")]
    InputWasNotRecognized(String),

    #[error("operator '{0}' is not supported")]
    UnsupportedOperator(String),

    #[error("expression shape is not supported: {0}")]
    UnsupportedExpression(String),

    #[error("constant value could not be converted to an answer: {0}")]
    UnsupportedConstantValue(String),
}
