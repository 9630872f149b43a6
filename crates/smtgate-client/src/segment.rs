//! Segment conflict constraints
//!
//! A segment matches a user when any of its rules matches; a rule matches
//! when all of its conditions hold. [`compose_constraint`] declares every
//! attribute once and asserts that all segments match at the same time:
//!
//! ```text
//! (declare-const age Int)
//! (declare-const country String)
//! (assert (and (or (and (= country "VN") (>= age 18)) ...) ...))
//! ```
//!
//! `sat` means some user falls into every segment, i.e. the segments
//! overlap.

use crate::error::ComposeError;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    String,
    Number,
    Enum,
}

impl DataType {
    /// SMT-LIB sort used to declare attributes of this type
    pub fn sort(&self) -> &'static str {
        match self {
            DataType::Boolean => "Bool",
            DataType::String | DataType::Enum => "String",
            DataType::Number => "Int",
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, DataType::String | DataType::Enum)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Enum => "enum",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    /// Comma-separated list of accepted values
    In,
    /// Comma-separated list of rejected values
    NotIn,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "not_contains",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::GreaterThanOrEqual => "greater_than_or_equal",
            ConditionOperator::LessThanOrEqual => "less_than_or_equal",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not_in",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User attribute referenced by a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// One test of an attribute against a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: Attribute,
    pub operator: ConditionOperator,
    /// Raw value; `in` and `not_in` take a comma-separated list
    pub value: String,
}

impl Condition {
    pub fn new(attribute: Attribute, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            attribute,
            operator,
            value: value.into(),
        }
    }
}

/// Conditions that must all hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl SegmentRule {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            name: String::new(),
            conditions,
        }
    }
}

/// Rules of which at least one must hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: Vec<SegmentRule>,
}

impl Segment {
    pub fn new(rules: Vec<SegmentRule>) -> Self {
        Self {
            name: String::new(),
            rules,
        }
    }
}

/// Build the constraint asserting that every segment matches at once
///
/// Attributes are declared once each, in name order, so the same segments
/// always compose to the same text.
pub fn compose_constraint(segments: &[Segment]) -> Result<String, ComposeError> {
    let attributes = collect_attributes(segments)?;

    let mut script = String::new();
    for (name, data_type) in &attributes {
        script.push_str(&format!("(declare-const {} {})\n", name, data_type.sort()));
    }

    let segment_terms = segments
        .iter()
        .map(|segment| {
            let rule_terms = segment
                .rules
                .iter()
                .map(rule_term)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(disjunction(rule_terms))
        })
        .collect::<Result<Vec<_>, ComposeError>>()?;

    script.push_str(&format!("(assert {})\n", conjunction(segment_terms)));
    Ok(script)
}

/// Attribute symbols mapped to their data types
fn collect_attributes(segments: &[Segment]) -> Result<BTreeMap<String, DataType>, ComposeError> {
    let mut attributes = BTreeMap::new();
    let conditions = segments
        .iter()
        .flat_map(|segment| &segment.rules)
        .flat_map(|rule| &rule.conditions);

    for condition in conditions {
        let Attribute { name, data_type } = &condition.attribute;
        match attributes.entry(symbol(name)?) {
            Entry::Vacant(entry) => {
                entry.insert(*data_type);
            }
            Entry::Occupied(entry) if entry.get().sort() != data_type.sort() => {
                return Err(ComposeError::ConflictingDataType {
                    name: name.clone(),
                    first: *entry.get(),
                    second: *data_type,
                });
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok(attributes)
}

fn rule_term(rule: &SegmentRule) -> Result<String, ComposeError> {
    let terms = rule
        .conditions
        .iter()
        .map(condition_term)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(conjunction(terms))
}

/// SMT-LIB term for one condition
pub fn condition_term(condition: &Condition) -> Result<String, ComposeError> {
    let attribute = &condition.attribute;
    let name = symbol(&attribute.name)?;
    let unsupported = || ComposeError::UnsupportedOperator {
        attribute: attribute.name.clone(),
        operator: condition.operator,
        data_type: attribute.data_type,
    };

    let term = match condition.operator {
        ConditionOperator::Equals => {
            format!("(= {} {})", name, literal(attribute, &condition.value)?)
        }
        ConditionOperator::NotEquals => {
            format!("(not (= {} {}))", name, literal(attribute, &condition.value)?)
        }
        ConditionOperator::GreaterThan
        | ConditionOperator::LessThan
        | ConditionOperator::GreaterThanOrEqual
        | ConditionOperator::LessThanOrEqual => {
            if attribute.data_type != DataType::Number {
                return Err(unsupported());
            }
            let op = match condition.operator {
                ConditionOperator::GreaterThan => ">",
                ConditionOperator::LessThan => "<",
                ConditionOperator::GreaterThanOrEqual => ">=",
                _ => "<=",
            };
            format!("({} {} {})", op, name, literal(attribute, &condition.value)?)
        }
        ConditionOperator::Contains | ConditionOperator::NotContains => {
            if !attribute.data_type.is_textual() {
                return Err(unsupported());
            }
            let contains = format!("(str.contains {} {})", name, string_literal(&condition.value));
            if condition.operator == ConditionOperator::Contains {
                contains
            } else {
                format!("(not {})", contains)
            }
        }
        ConditionOperator::In | ConditionOperator::NotIn => {
            let values = list_values(attribute, &condition.value)?;
            if condition.operator == ConditionOperator::In {
                disjunction(
                    values
                        .iter()
                        .map(|value| format!("(= {} {})", name, value))
                        .collect(),
                )
            } else {
                conjunction(
                    values
                        .iter()
                        .map(|value| format!("(not (= {} {}))", name, value))
                        .collect(),
                )
            }
        }
    };
    Ok(term)
}

/// Literals of a comma-separated value list
fn list_values(attribute: &Attribute, value: &str) -> Result<Vec<String>, ComposeError> {
    let values = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| literal(attribute, item))
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err(invalid_value(attribute, value));
    }
    Ok(values)
}

/// Value written in the attribute's sort
fn literal(attribute: &Attribute, value: &str) -> Result<String, ComposeError> {
    match attribute.data_type {
        DataType::String | DataType::Enum => Ok(string_literal(value)),
        DataType::Number => {
            let number: i64 = value
                .trim()
                .parse()
                .map_err(|_| invalid_value(attribute, value))?;
            if number < 0 {
                Ok(format!("(- {})", number.unsigned_abs()))
            } else {
                Ok(number.to_string())
            }
        }
        DataType::Boolean => match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok("true".to_string()),
            "false" => Ok("false".to_string()),
            _ => Err(invalid_value(attribute, value)),
        },
    }
}

fn invalid_value(attribute: &Attribute, value: &str) -> ComposeError {
    ComposeError::InvalidValue {
        attribute: attribute.name.clone(),
        data_type: attribute.data_type,
        value: value.to_string(),
    }
}

/// String literal with SMT-LIB quote doubling
fn string_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Reserved words and the core, integer and string theory names a constant
/// cannot shadow; `|and|` names the same symbol as `and`, so quoting does
/// not help
const RESERVED_NAMES: &[&str] = &[
    "!", "_", "as", "BINARY", "DECIMAL", "exists", "forall", "HEXADECIMAL", "let", "match",
    "NUMERAL", "par", "STRING", "true", "false", "not", "and", "or", "xor", "=>", "=",
    "distinct", "ite", "Bool", "Int", "Real", "String", "RegLan", "+", "-", "*", "/", "div",
    "mod", "abs", "<", "<=", ">", ">=", "to_real", "to_int", "is_int",
];

/// Attribute name as an SMT-LIB symbol
///
/// Simple symbols are written as is; anything else is quoted with `|...|`,
/// which cannot itself contain `|` or `\`. Reserved and built-in names, and
/// names in the solver-private `@`/`.` namespaces, are rejected.
fn symbol(name: &str) -> Result<String, ComposeError> {
    const SYMBOL_PUNCTUATION: &str = "~!@$%^&*_-+=<>.?/";
    if RESERVED_NAMES.contains(&name)
        || name.starts_with(['@', '.'])
        || name.starts_with("str.")
        || name.starts_with("re.")
    {
        return Err(ComposeError::InvalidAttributeName(name.to_string()));
    }
    let is_simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SYMBOL_PUNCTUATION.contains(c));

    if is_simple {
        Ok(name.to_string())
    } else if name.is_empty() || name.contains(['|', '\\']) {
        Err(ComposeError::InvalidAttributeName(name.to_string()))
    } else {
        Ok(format!("|{}|", name))
    }
}

fn conjunction(terms: Vec<String>) -> String {
    match terms.len() {
        0 => "true".to_string(),
        1 => terms.into_iter().collect(),
        _ => format!("(and {})", terms.join(" ")),
    }
}

fn disjunction(terms: Vec<String>) -> String {
    match terms.len() {
        0 => "false".to_string(),
        1 => terms.into_iter().collect(),
        _ => format!("(or {})", terms.join(" ")),
    }
}
