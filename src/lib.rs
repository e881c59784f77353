//! # Rules — a forward-chaining inference engine
//!
//! A small core that answers typed questions by combining facts a client knows with rules a
//! client has loaded, selecting among matching rules by priority and predicate specificity, and
//! caching derived answers against the facts they depended on.
//!
//! ## Pipeline
//!
//! ```text
//! Facts::ask(question)
//!     ↓
//! known map hit?            → return immediately, no dependencies
//!     ↓ miss
//! inferred cache hit?       → return cached answer (if cache_answers is on)
//!     ↓ miss
//! [Brain::ask]              → walk the question's rule list, sorted by (priority, size)
//!     ↓
//! [predicate::evaluate]     → recursive, short-circuiting boolean evaluation
//!     ↓                        (may recurse back into Facts::ask for sub-questions)
//! winning rule fires         → literal answer, or a named assignment function's result
//!     ↓
//! Facts caches the answer and indexes its dependencies for future invalidation
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rules_engine::answer::{Answer, Registry};
//! use rules_engine::brain::Brain;
//! use rules_engine::facts::Facts;
//! use rules_engine::predicate::{Expr, Op, Predicate};
//! use rules_engine::rule::{Rule, SelectionStrategy};
//!
//! let mut brain = Brain::new(SelectionStrategy::Fail);
//! brain.add(vec![
//!     Rule::new(1, Predicate::True, "sky", Answer::String("blue".into())),
//!     Rule::new(
//!         1,
//!         Predicate::Comparison(
//!             Expr::Question("sky".into()),
//!             Op::Eq,
//!             Expr::Answer(Answer::String("blue".into())),
//!         ),
//!         "weather",
//!         Answer::String("sunny".into()),
//!     ),
//! ]);
//!
//! let mut facts = Facts::new(brain, Registry::new(), false);
//! let weather = facts.ask("weather").unwrap();
//! assert_eq!(weather.answer, Answer::String("sunny".into()));
//! ```
//!
//! ## Module organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `answer` | the typed `Answer` value model and extension-type `Registry` |
//! | `predicate` | the predicate boolean algebra and its evaluator |
//! | `rule` | the `Rule` record and `SelectionStrategy` |
//! | `brain` | the rule index, ambiguity journal, and candidate selection |
//! | `facts` | the mutable fact store with cache-on-read invalidation |
//! | `serialize` | the canonical JSON codec |
//! | `parser` | human rule-text parsing (pest predicate grammar + line grammar) |
//! | `linter` | static checks over a parsed rule set |
//! | `config` | hierarchical configuration for the binaries |
//! | `logging` | subscriber initialization for the binaries |
//! | `error` | the closed error sets for every fallible surface |

pub mod answer;
pub mod brain;
pub mod config;
pub mod error;
pub mod facts;
pub mod linter;
pub mod logging;
pub mod parser;
pub mod predicate;
pub mod rule;
pub mod serialize;

pub use answer::{Answer, AnswerWithDependencies, Registry};
pub use brain::Brain;
pub use error::{AnswerError, AssignmentError, ConversionError, EvalError, ParseError};
pub use facts::Facts;
pub use predicate::{Expr, Op, Predicate};
pub use rule::{Rule, SelectionStrategy};
