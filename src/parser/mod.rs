//! Human rule-text parsing (SPEC_FULL §4.6/§12).
//!
//! The predicate fragment of a rule line is parsed with a small `pest` grammar
//! (`predicate.pest`), the same tool the teacher crate uses for its own tokenizer
//! (`src/syntax/mod.rs`). The outer rule-line grammar — `<priority> ":" <predicate> "=>"
//! <question> "=" <answer-spec>` — is not recursive, so it is scanned by hand, the way the
//! teacher's own `statement` module parses its simpler line forms.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::answer::Answer;
use crate::error::{ConversionError, ParseError};
use crate::predicate::{Expr, Op, Predicate};
use crate::rule::Rule as RuleRecord;

#[derive(PestParser)]
#[grammar = "parser/predicate.pest"]
struct PredicateParser;

/// Parse predicate-format text into the typed [`Predicate`] AST (SPEC_FULL §12).
pub fn parse_predicate_text(text: &str) -> Result<Predicate, ConversionError> {
    let mut pairs = PredicateParser::parse(Rule::predicate, text)
        .map_err(|e| ConversionError::InputWasNotRecognized(e.to_string()))?;
    let predicate_pair = pairs
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized(text.to_string()))?;
    let or_expr = predicate_pair
        .into_inner()
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized(text.to_string()))?;
    convert_or_expr(or_expr)
}

fn convert_or_expr(pair: Pair<Rule>) -> Result<Predicate, ConversionError> {
    let mut parts = pair
        .into_inner()
        .map(convert_and_expr)
        .collect::<Result<Vec<_>, _>>()?;
    if parts.is_empty() {
        return Err(ConversionError::CompoundHasNoSubpredicates);
    }
    if parts.len() == 1 {
        return Ok(parts.remove(0));
    }
    Ok(Predicate::Or(parts))
}

fn convert_and_expr(pair: Pair<Rule>) -> Result<Predicate, ConversionError> {
    let mut parts = pair
        .into_inner()
        .map(convert_unary)
        .collect::<Result<Vec<_>, _>>()?;
    if parts.is_empty() {
        return Err(ConversionError::CompoundHasNoSubpredicates);
    }
    if parts.len() == 1 {
        return Ok(parts.remove(0));
    }
    Ok(Predicate::And(parts))
}

fn convert_unary(pair: Pair<Rule>) -> Result<Predicate, ConversionError> {
    let mut negated = false;
    let mut atom = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::not_op => negated = true,
            Rule::atom => atom = Some(inner),
            other => return Err(ConversionError::UnsupportedExpression(format!("{other:?}"))),
        }
    }
    let atom = atom.ok_or_else(|| ConversionError::InputWasNotRecognized("empty unary".into()))?;
    let predicate = convert_atom(atom)?;
    Ok(if negated {
        Predicate::Not(Box::new(predicate))
    } else {
        predicate
    })
}

fn convert_atom(pair: Pair<Rule>) -> Result<Predicate, ConversionError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized("empty atom".into()))?;
    match inner.as_rule() {
        Rule::or_expr => convert_or_expr(inner),
        Rule::bool_lit => Ok(if inner.as_str() == "true" {
            Predicate::True
        } else {
            Predicate::False
        }),
        Rule::comparison => convert_comparison(inner),
        other => Err(ConversionError::UnsupportedExpression(format!("{other:?}"))),
    }
}

fn convert_comparison(pair: Pair<Rule>) -> Result<Predicate, ConversionError> {
    let mut operands = pair.into_inner();
    let lhs = operands
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized("missing lhs".into()))?;
    let op_pair = operands
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized("missing operator".into()))?;
    let rhs = operands
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized("missing rhs".into()))?;
    let op = convert_op(op_pair.as_str())?;
    Ok(Predicate::Comparison(
        convert_operand(lhs)?,
        op,
        convert_operand(rhs)?,
    ))
}

fn convert_op(text: &str) -> Result<Op, ConversionError> {
    match text {
        "==" => Ok(Op::Eq),
        "!=" => Ok(Op::Ne),
        "<" => Ok(Op::Lt),
        ">" => Ok(Op::Gt),
        "<=" => Ok(Op::Le),
        ">=" => Ok(Op::Ge),
        other => Err(ConversionError::UnsupportedOperator(other.to_string())),
    }
}

fn convert_operand(pair: Pair<Rule>) -> Result<Expr, ConversionError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ConversionError::InputWasNotRecognized("empty operand".into()))?;
    match inner.as_rule() {
        Rule::question => Ok(Expr::Question(inner.as_str().to_string())),
        Rule::bool_lit => Ok(Expr::Answer(Answer::Bool(inner.as_str() == "true"))),
        Rule::number => {
            let text = inner.as_str();
            if text.contains('.') {
                text.parse::<f64>()
                    .map(|d| Expr::Answer(Answer::Double(d)))
                    .map_err(|_| ConversionError::UnsupportedConstantValue(text.to_string()))
            } else {
                text.parse::<i64>()
                    .map(|i| Expr::Answer(Answer::Int(i)))
                    .map_err(|_| ConversionError::UnsupportedConstantValue(text.to_string()))
            }
        }
        Rule::string_lit => {
            let raw = inner.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Expr::Answer(Answer::String(raw.to_string())))
        }
        other => Err(ConversionError::UnsupportedExpression(format!("{other:?}"))),
    }
}

/// Parse a single human rule-text line into a [`Rule`] (SPEC_FULL §4.6).
pub fn parse_rule_line(line_no: usize, line: &str) -> Result<RuleRecord, ParseError> {
    let (priority_text, rest) = line
        .split_once(':')
        .ok_or(ParseError::MissingPriorityDelimiter { line: line_no })?;
    let priority: i64 = priority_text
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidPriority {
            line: line_no,
            text: priority_text.trim().to_string(),
        })?;

    let (predicate_text, after_arrow) =
        rest.split_once("=>")
            .ok_or(ParseError::MissingArrow { line: line_no })?;

    let (question_text, answer_spec_text) = after_arrow
        .split_once('=')
        .ok_or(ParseError::MissingAnswerDelimiter { line: line_no })?;

    let predicate = parse_predicate_text(predicate_text.trim()).map_err(|e| ParseError::PredicateSyntax {
        line: line_no,
        source: Box::new(e),
    })?;

    let (answer, assignment) = parse_answer_spec(line_no, answer_spec_text.trim())?;

    Ok(RuleRecord {
        priority,
        predicate,
        question: question_text.trim().to_string(),
        answer,
        assignment,
    })
}

fn parse_answer_spec(line_no: usize, text: &str) -> Result<(Answer, Option<String>), ParseError> {
    if let Some(rest) = text.strip_prefix('(') {
        let (keyword, remainder) = rest
            .split_once(')')
            .ok_or(ParseError::MissingAnswerDelimiter { line: line_no })?;
        let value_text = remainder.trim();
        if value_text.is_empty() {
            return Err(ParseError::EmptyAnswerAfterAssignment { line: line_no });
        }
        // Malformed literals under a built-in typed keyword share the "unknown typed-answer
        // keyword" diagnostic: both signal that this `(keyword)value` form isn't well-formed.
        return match keyword {
            "bool" => match value_text {
                "true" => Ok((Answer::Bool(true), None)),
                "false" => Ok((Answer::Bool(false), None)),
                _ => Err(ParseError::UnknownTypedAnswerKeyword {
                    line: line_no,
                    keyword: format!("bool({value_text})"),
                }),
            },
            "int" => value_text
                .parse::<i64>()
                .map(|i| (Answer::Int(i), None))
                .map_err(|_| ParseError::UnknownTypedAnswerKeyword {
                    line: line_no,
                    keyword: format!("int({value_text})"),
                }),
            "double" => value_text
                .parse::<f64>()
                .map(|d| (Answer::Double(d), None))
                .map_err(|_| ParseError::UnknownTypedAnswerKeyword {
                    line: line_no,
                    keyword: format!("double({value_text})"),
                }),
            "string" => Ok((Answer::String(value_text.to_string()), None)),
            assignment => Ok((Answer::String(value_text.to_string()), Some(assignment.to_string()))),
        };
    }
    if text.is_empty() {
        return Err(ParseError::EmptyAnswerAfterAssignment { line: line_no });
    }
    Ok((Answer::String(text.to_string()), None))
}

/// Parse a whole human rule file: blank lines and `//` comments are skipped (SPEC_FULL §6).
pub fn parse_rule_file(source: &str) -> Result<Vec<RuleRecord>, ParseError> {
    let mut rules = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim().to_string();
        if line.is_empty() {
            continue;
        }
        rules.push(parse_rule_line(line_no, &line)?);
    }
    Ok(rules)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_true_predicate_rule() {
        let rule = parse_rule_line(1, "1 : true => sky = blue").unwrap();
        assert_eq!(rule.priority, 1);
        assert!(matches!(rule.predicate, Predicate::True));
        assert_eq!(rule.question, "sky");
        assert_eq!(rule.answer, Answer::String("blue".to_string()));
    }

    #[test]
    fn parses_comparison_and_typed_answer() {
        let rule = parse_rule_line(1, r#"2: sky == "blue" => weather = (bool)true"#).unwrap();
        assert_eq!(rule.answer, Answer::Bool(true));
        assert!(matches!(rule.predicate, Predicate::Comparison(..)));
    }

    #[test]
    fn parses_and_or_not() {
        let rule =
            parse_rule_line(1, r#"1: weather == "sunny" && season == "summer" => beach = full"#).unwrap();
        assert!(matches!(rule.predicate, Predicate::And(_)));
    }

    #[test]
    fn assignment_name_is_captured() {
        let rule = parse_rule_line(1, "1: true => total = (sum_of_items)ignored").unwrap();
        assert_eq!(rule.assignment, Some("sum_of_items".to_string()));
    }

    #[test]
    fn missing_delimiter_is_reported() {
        let err = parse_rule_line(3, "no colon here").unwrap_err();
        assert_eq!(err, ParseError::MissingPriorityDelimiter { line: 3 });
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let source = "// a comment\n\n1 : true => q = a\n";
        let rules = parse_rule_file(source).unwrap();
        assert_eq!(rules.len(), 1);
    }
}
