//! The canonical JSON codec for `Predicate`, `Expr`, `Op`, `Answer`, and `Rule` (SPEC_FULL §4.5,
//! §11). Round-trip-stable for every value whose extension types are registered.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::answer::{Answer, Registry};
use crate::predicate::{Expr, Op, Predicate};
use crate::rule::Rule;

/// Errors converting between the in-memory model and its canonical JSON form.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("malformed JSON for {what}: {detail}")]
    Malformed { what: &'static str, detail: String },
    #[error("unknown discriminator '{0}'")]
    UnknownTag(String),
    #[error("extension type error: {0}")]
    Extension(String),
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "isEqualTo",
            Op::Ne => "isNotEqualTo",
            Op::Lt => "isLessThan",
            Op::Gt => "isGreaterThan",
            Op::Le => "isLessThanOrEqualTo",
            Op::Ge => "isGreaterThanOrEqualTo",
        }
    }

    fn from_str(s: &str) -> Result<Self, CodecError> {
        match s {
            "isEqualTo" => Ok(Op::Eq),
            "isNotEqualTo" => Ok(Op::Ne),
            "isLessThan" => Ok(Op::Lt),
            "isGreaterThan" => Ok(Op::Gt),
            "isLessThanOrEqualTo" => Ok(Op::Le),
            "isGreaterThanOrEqualTo" => Ok(Op::Ge),
            other => Err(CodecError::UnknownTag(other.to_string())),
        }
    }
}

impl Serialize for Op {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Op::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Encode an [`Answer`] into its single-field canonical form (SPEC_FULL §4.5).
pub fn encode_answer(answer: &Answer) -> Value {
    match answer {
        Answer::Bool(b) => json!({ "bool": b }),
        Answer::Int(i) => json!({ "int": i }),
        Answer::Double(d) => json!({ "double": d }),
        Answer::String(s) => json!({ "string": s }),
        Answer::Comparable(c) => json!({
            "comparableType": c.type_name(),
            "comparable": [c.as_equatable().encode()],
        }),
        Answer::Equatable(e) => json!({
            "equatableType": e.type_name(),
            "equatable": [e.encode()],
        }),
    }
}

/// Decode an [`Answer`] from its canonical form, consulting `registry` for extension types.
pub fn decode_answer(value: &Value, registry: &Registry) -> Result<Answer, CodecError> {
    let obj = value.as_object().ok_or_else(|| CodecError::Malformed {
        what: "Answer",
        detail: "expected an object".into(),
    })?;
    if let Some(v) = obj.get("bool") {
        return Ok(Answer::Bool(v.as_bool().ok_or_else(|| CodecError::Malformed {
            what: "Answer.bool",
            detail: "expected a JSON boolean".into(),
        })?));
    }
    if let Some(v) = obj.get("int") {
        return Ok(Answer::Int(v.as_i64().ok_or_else(|| CodecError::Malformed {
            what: "Answer.int",
            detail: "expected a JSON integer".into(),
        })?));
    }
    if let Some(v) = obj.get("double") {
        return Ok(Answer::Double(v.as_f64().ok_or_else(|| CodecError::Malformed {
            what: "Answer.double",
            detail: "expected a JSON number".into(),
        })?));
    }
    if let Some(v) = obj.get("string") {
        return Ok(Answer::String(
            v.as_str()
                .ok_or_else(|| CodecError::Malformed {
                    what: "Answer.string",
                    detail: "expected a JSON string".into(),
                })?
                .to_string(),
        ));
    }
    if let Some(type_name) = obj.get("comparableType").and_then(Value::as_str) {
        let payload = obj
            .get("comparable")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .ok_or_else(|| CodecError::Malformed {
                what: "Answer.comparable",
                detail: "expected a one-element payload array".into(),
            })?;
        let value = registry
            .decode_comparable(type_name, payload)
            .map_err(CodecError::Extension)?;
        return Ok(Answer::Comparable(value));
    }
    if let Some(type_name) = obj.get("equatableType").and_then(Value::as_str) {
        let payload = obj
            .get("equatable")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .ok_or_else(|| CodecError::Malformed {
                what: "Answer.equatable",
                detail: "expected a one-element payload array".into(),
            })?;
        let value = registry
            .decode_equatable(type_name, payload)
            .map_err(CodecError::Extension)?;
        return Ok(Answer::Equatable(value));
    }
    Err(CodecError::Malformed {
        what: "Answer",
        detail: "no recognized field".into(),
    })
}

fn encode_expr(expr: &Expr) -> Value {
    match expr {
        Expr::Question(q) => json!({ "question": q }),
        Expr::Answer(a) => json!({ "answer": encode_answer(a) }),
        Expr::Predicate(p) => json!({ "predicate": encode_predicate(p) }),
    }
}

fn decode_expr(value: &Value, registry: &Registry) -> Result<Expr, CodecError> {
    let obj = value.as_object().ok_or_else(|| CodecError::Malformed {
        what: "Expr",
        detail: "expected an object".into(),
    })?;
    if let Some(q) = obj.get("question").and_then(Value::as_str) {
        return Ok(Expr::Question(q.to_string()));
    }
    if let Some(a) = obj.get("answer") {
        return Ok(Expr::Answer(decode_answer(a, registry)?));
    }
    if let Some(p) = obj.get("predicate") {
        return Ok(Expr::Predicate(Box::new(decode_predicate(p, registry)?)));
    }
    Err(CodecError::Malformed {
        what: "Expr",
        detail: "expected one of question/answer/predicate".into(),
    })
}

/// Encode a [`Predicate`] into its tagged canonical form (SPEC_FULL §4.5).
pub fn encode_predicate(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::False => json!({ "type": "false" }),
        Predicate::True => json!({ "type": "true" }),
        Predicate::Not(p) => json!({ "type": "not", "operand": encode_predicate(p) }),
        Predicate::And(ps) => json!({
            "type": "and",
            "operands": ps.iter().map(encode_predicate).collect::<Vec<_>>(),
        }),
        Predicate::Or(ps) => json!({
            "type": "or",
            "operands": ps.iter().map(encode_predicate).collect::<Vec<_>>(),
        }),
        Predicate::Comparison(lhs, op, rhs) => json!({
            "type": "comparison",
            "lhs": encode_expr(lhs),
            "op": op,
            "rhs": encode_expr(rhs),
        }),
    }
}

/// Decode a [`Predicate`] from its canonical form.
pub fn decode_predicate(value: &Value, registry: &Registry) -> Result<Predicate, CodecError> {
    let obj = value.as_object().ok_or_else(|| CodecError::Malformed {
        what: "Predicate",
        detail: "expected an object".into(),
    })?;
    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::Malformed {
            what: "Predicate.type",
            detail: "missing discriminator".into(),
        })?;
    match tag {
        "false" => Ok(Predicate::False),
        "true" => Ok(Predicate::True),
        "not" => {
            let operand = obj.get("operand").ok_or_else(|| CodecError::Malformed {
                what: "Predicate.not.operand",
                detail: "missing".into(),
            })?;
            Ok(Predicate::Not(Box::new(decode_predicate(operand, registry)?)))
        }
        "and" | "or" => {
            let operands = obj
                .get("operands")
                .and_then(Value::as_array)
                .ok_or_else(|| CodecError::Malformed {
                    what: "Predicate.operands",
                    detail: "expected an array".into(),
                })?
                .iter()
                .map(|v| decode_predicate(v, registry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if tag == "and" {
                Predicate::And(operands)
            } else {
                Predicate::Or(operands)
            })
        }
        "comparison" => {
            let lhs = obj.get("lhs").ok_or_else(|| CodecError::Malformed {
                what: "Predicate.comparison.lhs",
                detail: "missing".into(),
            })?;
            let rhs = obj.get("rhs").ok_or_else(|| CodecError::Malformed {
                what: "Predicate.comparison.rhs",
                detail: "missing".into(),
            })?;
            let op = obj.get("op").ok_or_else(|| CodecError::Malformed {
                what: "Predicate.comparison.op",
                detail: "missing".into(),
            })?;
            let op: Op = serde_json::from_value(op.clone()).map_err(|e| CodecError::Malformed {
                what: "Predicate.comparison.op",
                detail: e.to_string(),
            })?;
            Ok(Predicate::Comparison(
                decode_expr(lhs, registry)?,
                op,
                decode_expr(rhs, registry)?,
            ))
        }
        other => Err(CodecError::UnknownTag(other.to_string())),
    }
}

/// Encode a [`Rule`] into its canonical object form (SPEC_FULL §4.5).
pub fn encode_rule(rule: &Rule) -> Value {
    let mut value = json!({
        "priority": rule.priority,
        "predicate": encode_predicate(&rule.predicate),
        "question": rule.question,
        "answer": encode_answer(&rule.answer),
    });
    if let Some(assignment) = &rule.assignment {
        value["assignment"] = json!(assignment);
    }
    value
}

/// Decode a [`Rule`] from its canonical object form.
pub fn decode_rule(value: &Value, registry: &Registry) -> Result<Rule, CodecError> {
    let obj = value.as_object().ok_or_else(|| CodecError::Malformed {
        what: "Rule",
        detail: "expected an object".into(),
    })?;
    let priority = obj
        .get("priority")
        .and_then(Value::as_i64)
        .ok_or_else(|| CodecError::Malformed {
            what: "Rule.priority",
            detail: "expected a JSON integer".into(),
        })?;
    let predicate = decode_predicate(
        obj.get("predicate").ok_or_else(|| CodecError::Malformed {
            what: "Rule.predicate",
            detail: "missing".into(),
        })?,
        registry,
    )?;
    let question = obj
        .get("question")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::Malformed {
            what: "Rule.question",
            detail: "expected a JSON string".into(),
        })?
        .to_string();
    let answer = decode_answer(
        obj.get("answer").ok_or_else(|| CodecError::Malformed {
            what: "Rule.answer",
            detail: "missing".into(),
        })?,
        registry,
    )?;
    let assignment = obj
        .get("assignment")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Rule {
        priority,
        predicate,
        question,
        answer,
        assignment,
    })
}

/// Encode a full rule set as the canonical rule file array (SPEC_FULL §6).
pub fn encode_rules(rules: &[Rule]) -> Value {
    Value::Array(rules.iter().map(encode_rule).collect())
}

/// Decode a full rule set from the canonical rule file array.
pub fn decode_rules(value: &Value, registry: &Registry) -> Result<Vec<Rule>, CodecError> {
    value
        .as_array()
        .ok_or_else(|| CodecError::Malformed {
            what: "rule file",
            detail: "expected a JSON array".into(),
        })?
        .iter()
        .map(|v| decode_rule(v, registry))
        .collect()
}
