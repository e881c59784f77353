//! The rule index and assignment registry (SPEC_FULL §4.2, §4.3).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::answer::{AnswerWithDependencies, Question};
use crate::error::{AnswerError, AssignmentError};
use crate::facts::Facts;
use crate::predicate::evaluate;
use crate::rule::{Rule, SelectionStrategy};

/// A named assignment function: computes a rule's final answer from the rule, the facts, and
/// the dependency set the winning predicate evaluation accumulated (SPEC_FULL §4.2, §9).
pub type AssignmentFn =
    Arc<dyn Fn(&Rule, &mut Facts, &HashSet<Question>) -> Result<AnswerWithDependencies, AssignmentError> + Send + Sync>;

/// The rule index plus assignment registry (SPEC_FULL §3).
pub struct Brain {
    strategy: SelectionStrategy,
    rules: HashMap<Question, Vec<Rule>>,
    assignments: HashMap<String, AssignmentFn>,
    ambiguous_rules: HashMap<Question, Vec<(Rule, Rule)>>,
}

impl Brain {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            rules: HashMap::new(),
            assignments: HashMap::new(),
            ambiguous_rules: HashMap::new(),
        }
    }

    /// Insertion-time structural ambiguity audit: pairs of rules sharing both `priority` and
    /// `size` for the same question (SPEC_FULL §4.2, §8 property 6, §9).
    pub fn ambiguous_rules(&self, question: &str) -> &[(Rule, Rule)] {
        self.ambiguous_rules
            .get(question)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add(&mut self, rules: impl IntoIterator<Item = Rule>) {
        let mut touched: HashSet<Question> = HashSet::new();
        let mut added = 0usize;
        for rule in rules {
            touched.insert(rule.question.clone());
            self.rules.entry(rule.question.clone()).or_default().push(rule);
            added += 1;
        }
        let mut new_ambiguities = 0usize;
        for question in &touched {
            let entries = self.rules.get_mut(question).expect("question was just inserted");
            entries.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
            let pairs = self.ambiguous_rules.entry(question.clone()).or_default();
            for window in entries.windows(2) {
                let (a, b) = (&window[0], &window[1]);
                if a.ordering_key() == b.ordering_key() {
                    pairs.push((a.clone(), b.clone()));
                    new_ambiguities += 1;
                }
            }
        }
        tracing::debug!(added, new_ambiguities, "rules added to brain");
    }

    pub fn add_assignment(&mut self, name: impl Into<String>, f: AssignmentFn) {
        self.assignments.insert(name.into(), f);
    }

    /// Select and fire the winning candidate rule for `question` (SPEC_FULL §4.3).
    pub fn ask(&self, question: &str, facts: &mut Facts) -> Result<AnswerWithDependencies, AnswerError> {
        let span = tracing::debug_span!("brain_ask", question);
        let _enter = span.enter();

        let entries = self
            .rules
            .get(question)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AnswerError::NoRuleFound(question.to_string()))?;

        let mut candidates: Vec<(&Rule, HashSet<Question>, Vec<Vec<Rule>>)> = Vec::new();
        let mut floor: Option<(i64, usize)> = None;
        for rule in entries {
            let key = rule.ordering_key();
            if let Some(floor_key) = floor {
                if key < floor_key {
                    break;
                }
            }
            let evaluation = evaluate(&rule.predicate, facts)
                .map_err(|e| AnswerError::CandidateEvaluationFailed(Box::new(e)))?;
            if evaluation.value {
                floor = Some(key);
                candidates.push((rule, evaluation.dependencies, evaluation.ambiguous_rules));
            }
        }

        if candidates.is_empty() {
            return Err(AnswerError::NoRuleFound(question.to_string()));
        }

        if candidates.len() > 1 {
            match self.strategy {
                SelectionStrategy::Fail => return Err(AnswerError::Ambiguous(question.to_string())),
                SelectionStrategy::Undefined => {
                    tracing::warn!(question, ties = candidates.len(), "ambiguous candidates resolved arbitrarily");
                }
            }
        }

        let (winner, dependencies, nested_ambiguous) = candidates[0].clone();
        let mut result = self.fire(winner, facts, &dependencies)?;
        if candidates.len() > 1 {
            result
                .ambiguous_rules
                .push(candidates.iter().map(|(r, _, _)| (*r).clone()).collect());
        }
        result.ambiguous_rules.extend(nested_ambiguous);
        Ok(result)
    }

    fn fire(
        &self,
        rule: &Rule,
        facts: &mut Facts,
        dependencies: &HashSet<Question>,
    ) -> Result<AnswerWithDependencies, AnswerError> {
        match &rule.assignment {
            None => Ok(AnswerWithDependencies::with_dependencies(
                rule.answer.clone(),
                dependencies.clone(),
            )),
            Some(name) => {
                let f = self
                    .assignments
                    .get(name)
                    .ok_or_else(|| AssignmentError::AssignmentNotFound(name.clone()))
                    .map_err(AnswerError::AssignmentFailed)?;
                f(rule, facts, dependencies).map_err(AnswerError::AssignmentFailed)
            }
        }
    }
}
