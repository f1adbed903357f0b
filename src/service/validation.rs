//! Declarative request validation: per-field pipe-delimited rules, message overrides and sanitizers.

use crate::service::Sanitizer;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Required,
    String,
    Integer,
    Max(usize),
    In(Vec<String>),
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(n) = s.strip_prefix("max:") {
            return n
                .trim()
                .parse()
                .map(Rule::Max)
                .map_err(|_| format!("invalid max length: {}", n));
        }
        if let Some(list) = s.strip_prefix("in:") {
            return Ok(Rule::In(list.split(',').map(|v| v.trim().to_string()).collect()));
        }
        match s {
            "required" => Ok(Rule::Required),
            "string" => Ok(Rule::String),
            "integer" => Ok(Rule::Integer),
            other => Err(format!("unknown rule: {}", other)),
        }
    }
}

impl Rule {
    /// Parse `required|string|max:255`. Unknown or malformed rules are skipped.
    pub fn parse_list(field: &str, list: &str) -> Vec<Rule> {
        list.split('|')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| match s.parse() {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!(field = %field, rule = %s, error = %e, "skipping validation rule");
                    None
                }
            })
            .collect()
    }

    /// Suffix used for message overrides (`name.max`).
    pub fn key(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::Integer => "integer",
            Rule::Max(_) => "max",
            Rule::In(_) => "in",
        }
    }

    pub fn passes(&self, value: Option<&Value>) -> bool {
        match self {
            Rule::Required => !is_blank(value),
            Rule::String => matches!(value, Some(Value::String(_))),
            Rule::Integer => match value {
                Some(Value::Number(n)) => n.is_i64() || n.is_u64(),
                Some(Value::String(s)) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Rule::Max(max) => is_blank(value) || text_of(value).chars().count() <= *max,
            Rule::In(allowed) => {
                let text = text_of(value);
                allowed.iter().any(|a| *a == text)
            }
        }
    }

    pub fn default_message(&self, field: &str) -> String {
        match self {
            Rule::Required => format!("{} is required.", field),
            Rule::String => format!("{} must be a string.", field),
            Rule::Integer => format!("{} must be an integer.", field),
            Rule::Max(max) => format!("{} must not exceed {} characters.", field, max),
            Rule::In(allowed) => format!("{} must be one of: {}", field, allowed.join(", ")),
        }
    }
}

/// Missing, null, "", "0", 0, false and empty arrays/objects count as blank.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "1".to_string(),
        Some(Value::Bool(false)) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Field -> messages, in rule declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A request shape: rules per field, optional messages keyed `field.rule`, optional sanitizers.
pub trait FormRequest: Send + 'static {
    fn rules() -> Vec<(&'static str, &'static str)>;

    fn messages() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    fn sanitizers() -> Vec<(&'static str, Sanitizer)> {
        Vec::new()
    }
}

/// Validate `input` against `R`. All rules of every field are checked; a field with no
/// violations is sanitized into the output, a field with any violation is left out.
pub fn validate<R: FormRequest>(input: &Map<String, Value>) -> Result<Map<String, Value>, ValidationErrors> {
    RequestValidator::new(R::rules(), R::messages(), R::sanitizers()).validate(input)
}

pub struct RequestValidator {
    rules: Vec<(String, Vec<Rule>)>,
    messages: HashMap<String, String>,
    sanitizers: HashMap<String, Sanitizer>,
}

impl RequestValidator {
    pub fn new(
        rules: Vec<(&str, &str)>,
        messages: Vec<(&str, &str)>,
        sanitizers: Vec<(&str, Sanitizer)>,
    ) -> Self {
        RequestValidator {
            rules: rules
                .into_iter()
                .map(|(field, list)| (field.to_string(), Rule::parse_list(field, list)))
                .collect(),
            messages: messages
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            sanitizers: sanitizers.into_iter().map(|(k, s)| (k.to_string(), s)).collect(),
        }
    }

    pub fn validate(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut validated = Map::new();
        for (field, rules) in &self.rules {
            let value = input.get(field);
            let mut clean = true;
            for rule in rules {
                if !rule.passes(value) {
                    clean = false;
                    let message = self
                        .messages
                        .get(&format!("{}.{}", field, rule.key()))
                        .cloned()
                        .unwrap_or_else(|| rule.default_message(field));
                    errors.add(field, message);
                }
            }
            if clean {
                if let Some(v) = value {
                    let sanitizer = self.sanitizers.get(field).copied().unwrap_or_default();
                    validated.insert(field.clone(), sanitizer.apply(v));
                }
            }
        }
        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn validator(rules: Vec<(&str, &str)>) -> RequestValidator {
        RequestValidator::new(rules, Vec::new(), Vec::new())
    }

    #[test]
    fn max_length_violation_is_the_only_error() {
        let v = validator(vec![("name", "required|string|max:5")]);
        let errors = v.validate(&input(json!({"name": "toolong"}))).unwrap_err();
        assert_eq!(errors.get("name").unwrap(), ["name must not exceed 5 characters.".to_string()]);
    }

    #[test]
    fn all_violations_for_a_field_are_collected() {
        let v = validator(vec![("name", "required|string|max:5"), ("kind", "in:food,drink")]);
        let errors = v.validate(&input(json!({}))).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            ["name is required.".to_string(), "name must be a string.".to_string()]
        );
        assert_eq!(errors.get("kind").unwrap(), ["kind must be one of: food, drink".to_string()]);
    }

    #[test]
    fn clean_fields_are_sanitized_into_output() {
        let v = RequestValidator::new(
            vec![("name", "required|string"), ("note", "string")],
            Vec::new(),
            vec![("note", Sanitizer::Raw)],
        );
        let out = v
            .validate(&input(json!({"name": " <b>Drinks</b> ", "note": "<i>x</i>", "extra": 1})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"name": "Drinks", "note": "<i>x</i>"}));
    }

    #[test]
    fn message_overrides_use_field_dot_rule() {
        let v = RequestValidator::new(
            vec![("name", "required")],
            vec![("name.required", "Category name is required.")],
            Vec::new(),
        );
        let errors = v.validate(&input(json!({"name": ""}))).unwrap_err();
        assert_eq!(errors.get("name").unwrap(), ["Category name is required.".to_string()]);
    }

    #[test]
    fn required_treats_zero_like_values_as_blank() {
        let required = Rule::Required;
        assert!(!required.passes(None));
        assert!(!required.passes(Some(&json!(null))));
        assert!(!required.passes(Some(&json!("0"))));
        assert!(!required.passes(Some(&json!(0))));
        assert!(!required.passes(Some(&json!(false))));
        assert!(!required.passes(Some(&json!([]))));
        assert!(required.passes(Some(&json!("x"))));
    }

    #[test]
    fn integer_accepts_numeric_strings() {
        assert!(Rule::Integer.passes(Some(&json!(3))));
        assert!(Rule::Integer.passes(Some(&json!("12"))));
        assert!(Rule::Integer.passes(Some(&json!("0"))));
        assert!(!Rule::Integer.passes(Some(&json!("1.5"))));
        assert!(!Rule::Integer.passes(Some(&json!(1.5))));
        assert!(!Rule::Integer.passes(None));
    }

    #[test]
    fn max_counts_characters() {
        assert!(Rule::Max(3).passes(Some(&json!("äöü"))));
        assert!(!Rule::Max(3).passes(Some(&json!(1234))));
        assert!(Rule::Max(3).passes(None));
    }

    #[test]
    fn unknown_and_malformed_rules_are_skipped() {
        assert_eq!(Rule::parse_list("f", "required|email|max:x|max:4"), vec![Rule::Required, Rule::Max(4)]);
    }
}
