//! The typed answer model (SPEC_FULL §3, §9 "Extension answer types").
//!
//! An [`Answer`] is a small tagged union over the built-in scalar kinds plus two open extension
//! points, `Comparable` and `Equatable`, each identified by a stable `TypeName` and resolved
//! through an explicit, non-global [`Registry`] rather than a process-wide map — tests register
//! and drop types without fear of cross-test ordering hazards.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

pub type Question = String;
pub type TypeName = String;

/// An equatable extension value: opaque to the engine beyond equality and a type tag.
pub trait EquatableValue: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;
    fn equals(&self, other: &dyn EquatableValue) -> bool;
    fn encode(&self) -> serde_json::Value;
}

/// A comparable extension value: equatable, plus a total order.
pub trait ComparableValue: EquatableValue {
    fn compare(&self, other: &dyn ComparableValue) -> Ordering;
    fn as_equatable(&self) -> &dyn EquatableValue;
}

pub type DecodeEquatableFn =
    Arc<dyn Fn(&serde_json::Value) -> Result<Arc<dyn EquatableValue>, String> + Send + Sync>;
pub type DecodeComparableFn =
    Arc<dyn Fn(&serde_json::Value) -> Result<Arc<dyn ComparableValue>, String> + Send + Sync>;

/// Explicit, scoped registry of extension answer types (SPEC_FULL §9, §11).
#[derive(Clone, Default)]
pub struct Registry {
    equatable_decoders: HashMap<TypeName, DecodeEquatableFn>,
    comparable_decoders: HashMap<TypeName, DecodeComparableFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_equatable(&mut self, type_name: impl Into<TypeName>, decode: DecodeEquatableFn) {
        self.equatable_decoders.insert(type_name.into(), decode);
    }

    pub fn register_comparable(&mut self, type_name: impl Into<TypeName>, decode: DecodeComparableFn) {
        self.comparable_decoders.insert(type_name.into(), decode);
    }

    pub fn decode_equatable(
        &self,
        type_name: &str,
        payload: &serde_json::Value,
    ) -> Result<Arc<dyn EquatableValue>, String> {
        let decode = self
            .equatable_decoders
            .get(type_name)
            .ok_or_else(|| format!("no equatable type registered under '{type_name}'"))?;
        decode(payload)
    }

    pub fn decode_comparable(
        &self,
        type_name: &str,
        payload: &serde_json::Value,
    ) -> Result<Arc<dyn ComparableValue>, String> {
        let decode = self
            .comparable_decoders
            .get(type_name)
            .ok_or_else(|| format!("no comparable type registered under '{type_name}'"))?;
        decode(payload)
    }
}

/// A typed answer value (SPEC_FULL §3).
#[derive(Clone)]
pub enum Answer {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Comparable(Arc<dyn ComparableValue>),
    Equatable(Arc<dyn EquatableValue>),
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Bool(b) => write!(f, "Bool({b})"),
            Answer::Int(i) => write!(f, "Int({i})"),
            Answer::Double(d) => write!(f, "Double({d})"),
            Answer::String(s) => write!(f, "String({s:?})"),
            Answer::Comparable(c) => write!(f, "Comparable({}, {:?})", c.type_name(), c),
            Answer::Equatable(e) => write!(f, "Equatable({}, {:?})", e.type_name(), e),
        }
    }
}

impl PartialEq for Answer {
    fn eq(&self, other: &Self) -> bool {
        use Answer::{Bool, Comparable, Double, Equatable, Int, String as Str};
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Int(a), Double(b)) | (Double(b), Int(a)) => (*a as f64) == *b,
            (Str(a), Str(b)) => a == b,
            (Comparable(a), Comparable(b)) => {
                a.type_name() == b.type_name() && a.as_equatable().equals(b.as_equatable())
            }
            (Equatable(a), Equatable(b)) => a.type_name() == b.type_name() && a.equals(b.as_ref()),
            _ => false,
        }
    }
}

impl Answer {
    /// The scalar kind name, used in type-mismatch diagnostics and linting.
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Bool(_) => "bool",
            Answer::Int(_) => "int",
            Answer::Double(_) => "double",
            Answer::String(_) => "string",
            Answer::Comparable(_) => "comparable",
            Answer::Equatable(_) => "equatable",
        }
    }

    /// Numeric widening: an `Int` beside a `Double` compares as a `Double`. No other widening
    /// is ever performed (SPEC_FULL §9 Open Question).
    pub fn as_f64_if_numeric(&self) -> Option<f64> {
        match self {
            Answer::Int(i) => Some(*i as f64),
            Answer::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Are these two answers type-compatible for comparison at all (SPEC_FULL §3)?
    pub fn type_compatible(&self, other: &Answer) -> bool {
        use Answer::{Bool, Comparable, Double, Equatable, Int, String as Str};
        match (self, other) {
            (Bool(_), Bool(_)) | (Str(_), Str(_)) => true,
            (Int(_), Int(_)) | (Double(_), Double(_)) | (Int(_), Double(_)) | (Double(_), Int(_)) => true,
            (Comparable(a), Comparable(b)) => a.type_name() == b.type_name(),
            (Equatable(a), Equatable(b)) => a.type_name() == b.type_name(),
            _ => false,
        }
    }

    pub fn partial_cmp(&self, other: &Answer) -> Option<Ordering> {
        use Answer::{Bool, Comparable, Double, Int, String as Str};
        match (self, other) {
            (Bool(_), Bool(_)) => None,
            (Str(a), Str(b)) => Some(a.cmp(b)),
            (Int(_) | Double(_), Int(_) | Double(_)) => {
                let (a, b) = (self.as_f64_if_numeric()?, other.as_f64_if_numeric()?);
                a.partial_cmp(&b)
            }
            (Comparable(a), Comparable(b)) if a.type_name() == b.type_name() => {
                Some(a.compare(b.as_ref()))
            }
            _ => None,
        }
    }
}

/// An answer plus the dependency set that was consulted to derive it, plus any rules that tied
/// for first place at evaluation time under [`crate::rule::SelectionStrategy::Undefined`].
#[derive(Debug, Clone)]
pub struct AnswerWithDependencies {
    pub answer: Answer,
    pub dependencies: HashSet<Question>,
    pub ambiguous_rules: Vec<Vec<crate::rule::Rule>>,
}

impl AnswerWithDependencies {
    pub fn known(answer: Answer) -> Self {
        Self {
            answer,
            dependencies: HashSet::new(),
            ambiguous_rules: Vec::new(),
        }
    }

    pub fn with_dependencies(answer: Answer, dependencies: HashSet<Question>) -> Self {
        Self {
            answer,
            dependencies,
            ambiguous_rules: Vec::new(),
        }
    }
}
