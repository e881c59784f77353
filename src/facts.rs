//! The fact store: known/inferred maps, cache-on-read, and dependency-driven invalidation
//! (SPEC_FULL §4.4).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::answer::{Answer, AnswerWithDependencies, ComparableValue, EquatableValue, Question, Registry};
use crate::brain::Brain;
use crate::error::AnswerError;

/// The mutable question-to-answer store with cache and dependency tracking (SPEC_FULL §3).
///
/// `brain` is held behind an `Arc` rather than owned outright: SPEC_FULL §5/§9 note that a
/// single `Brain` may back several `Facts` instances, each with its own caches, and that the
/// `Brain` never holds a reference back to any `Facts` — ownership is one-directional.
pub struct Facts {
    brain: Arc<Brain>,
    registry: Registry,
    cache_answers: bool,
    known: HashMap<Question, AnswerWithDependencies>,
    inferred: HashMap<Question, AnswerWithDependencies>,
    dependents: HashMap<Question, HashSet<Question>>,
}

impl Facts {
    pub fn new(brain: Brain, registry: Registry, cache_answers: bool) -> Self {
        Self::from_shared_brain(Arc::new(brain), registry, cache_answers)
    }

    /// Construct a `Facts` sharing an existing `Brain` with other `Facts` instances.
    pub fn from_shared_brain(brain: Arc<Brain>, registry: Registry, cache_answers: bool) -> Self {
        Self {
            brain,
            registry,
            cache_answers,
            known: HashMap::new(),
            inferred: HashMap::new(),
            dependents: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Write a known answer, overwriting any prior known or inferred value and invalidating
    /// every inferred answer that directly depended on this question (SPEC_FULL §4.4).
    pub fn know(&mut self, question: impl Into<Question>, answer: Answer) {
        let question = question.into();
        self.known
            .insert(question.clone(), AnswerWithDependencies::known(answer));
        let invalidated = self.invalidate_dependents(&question);
        tracing::trace!(question = %question, invalidated, "fact known");
    }

    /// Remove a known answer, invalidating its dependents the same way `know` does.
    pub fn forget(&mut self, question: &str) {
        self.known.remove(question);
        let invalidated = self.invalidate_dependents(question);
        tracing::trace!(question, invalidated, "fact forgotten");
    }

    /// `Some(answer) -> know`, `None -> forget` (SPEC_FULL §4.4).
    pub fn set(&mut self, question: impl Into<Question>, answer: Option<Answer>) {
        match answer {
            Some(answer) => self.know(question, answer),
            None => self.forget(&question.into()),
        }
    }

    fn invalidate_dependents(&mut self, question: &str) -> usize {
        let Some(dependents) = self.dependents.remove(question) else {
            return 0;
        };
        for dependent in &dependents {
            self.inferred.remove(dependent);
        }
        dependents.len()
    }

    /// Resolve a question: known wins, then the cache (if enabled), then the brain.
    pub fn ask(&mut self, question: &str) -> Result<AnswerWithDependencies, AnswerError> {
        if let Some(answer) = self.known.get(question) {
            return Ok(answer.clone());
        }
        if self.cache_answers {
            if let Some(answer) = self.inferred.get(question) {
                return Ok(answer.clone());
            }
        }

        tracing::debug!(question, "fact cache miss, delegating to brain");
        let brain = Arc::clone(&self.brain);
        let result = brain.ask(question, self)?;

        if self.cache_answers {
            for dep in &result.dependencies {
                self.dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(question.to_string());
            }
            self.inferred.insert(question.to_string(), result.clone());
        }
        Ok(result)
    }

    /// Typed variant of [`Facts::ask`]: succeeds only if the resolved answer's kind matches `T`.
    pub fn ask_bool(&mut self, question: &str) -> Result<bool, AnswerError> {
        match self.ask(question)?.answer {
            Answer::Bool(b) => Ok(b),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }

    pub fn ask_int(&mut self, question: &str) -> Result<i64, AnswerError> {
        match self.ask(question)?.answer {
            Answer::Int(i) => Ok(i),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }

    pub fn ask_double(&mut self, question: &str) -> Result<f64, AnswerError> {
        match self.ask(question)?.answer {
            Answer::Double(d) => Ok(d),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }

    pub fn ask_string(&mut self, question: &str) -> Result<String, AnswerError> {
        match self.ask(question)?.answer {
            Answer::String(s) => Ok(s),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }

    /// Typed ask for a registered comparable extension type: succeeds only if the resolved
    /// answer is a `Comparable` whose type tag is `type_name`.
    pub fn ask_comparable(
        &mut self,
        question: &str,
        type_name: &str,
    ) -> Result<Arc<dyn ComparableValue>, AnswerError> {
        match self.ask(question)?.answer {
            Answer::Comparable(c) if c.type_name() == type_name => Ok(c),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }

    /// Typed ask for a registered equatable extension type: succeeds only if the resolved
    /// answer is an `Equatable` whose type tag is `type_name`.
    pub fn ask_equatable(
        &mut self,
        question: &str,
        type_name: &str,
    ) -> Result<Arc<dyn EquatableValue>, AnswerError> {
        match self.ask(question)?.answer {
            Answer::Equatable(e) if e.type_name() == type_name => Ok(e),
            other => Err(AnswerError::AnswerTypeDoesNotMatchAskType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Expr, Op, Predicate};
    use crate::rule::{Rule, SelectionStrategy};

    fn brain_with(rules: Vec<Rule>) -> Brain {
        let mut brain = Brain::new(SelectionStrategy::Fail);
        brain.add(rules);
        brain
    }

    #[test]
    fn known_fact_short_circuits_the_brain() {
        let mut facts = Facts::new(brain_with(vec![]), Registry::new(), false);
        facts.know("sky", Answer::String("blue".into()));
        let answer = facts.ask("sky").unwrap();
        assert_eq!(answer.answer, Answer::String("blue".into()));
        assert!(answer.dependencies.is_empty());
    }

    #[test]
    fn invalidation_forces_re_derivation() {
        let rules = vec![
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
        ];
        let mut facts = Facts::new(brain_with(rules), Registry::new(), true);
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
    fn forget_removes_known_and_falls_back_to_rules() {
        let rules = vec![Rule::new(0, Predicate::True, "q", Answer::String("fallback".into()))];
        let mut facts = Facts::new(brain_with(rules), Registry::new(), false);
        facts.know("q", Answer::String("override".into()));
        assert_eq!(facts.ask("q").unwrap().answer, Answer::String("override".into()));
        facts.forget("q");
        assert_eq!(facts.ask("q").unwrap().answer, Answer::String("fallback".into()));
    }

    #[test]
    fn typed_ask_rejects_mismatched_kind() {
        let mut facts = Facts::new(brain_with(vec![]), Registry::new(), false);
        facts.know("n", Answer::Int(3));
        let err = facts.ask_bool("n").unwrap_err();
        assert!(matches!(err, AnswerError::AnswerTypeDoesNotMatchAskType(_)));
    }

    #[derive(Debug, PartialEq)]
    struct Priority(u8);

    impl crate::answer::EquatableValue for Priority {
        fn type_name(&self) -> &str {
            "priority"
        }

        fn equals(&self, other: &dyn crate::answer::EquatableValue) -> bool {
            other.type_name() == self.type_name() && format!("{other:?}") == format!("{self:?}")
        }

        fn encode(&self) -> serde_json::Value {
            serde_json::json!(self.0)
        }
    }

    #[test]
    fn typed_ask_resolves_a_registered_equatable_extension_value() {
        let mut facts = Facts::new(brain_with(vec![]), Registry::new(), false);
        let value: std::sync::Arc<dyn crate::answer::EquatableValue> = std::sync::Arc::new(Priority(7));
        facts.know("level", Answer::Equatable(value));

        let resolved = facts.ask_equatable("level", "priority").unwrap();
        assert_eq!(resolved.type_name(), "priority");
    }

    #[test]
    fn typed_ask_rejects_an_equatable_value_under_the_wrong_type_name() {
        let mut facts = Facts::new(brain_with(vec![]), Registry::new(), false);
        let value: std::sync::Arc<dyn crate::answer::EquatableValue> = std::sync::Arc::new(Priority(7));
        facts.know("level", Answer::Equatable(value));

        let err = facts.ask_equatable("level", "not-priority").unwrap_err();
        assert!(matches!(err, AnswerError::AnswerTypeDoesNotMatchAskType(_)));
    }
}
