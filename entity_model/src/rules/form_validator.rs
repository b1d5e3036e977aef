//! Pipe separated rule expressions, e.g. `trim|required|min_length[3]|alpha_dash`
//!
//! Each field stops at its first failing rule. Rules other than `required` are
//! skipped when the value is blank, so optional fields only get checked once
//! something was submitted.

use super::{FieldError, RuleEngine};
use crate::errors::ModelError;
use crate::input::InputSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9+_\-]+(\.[a-z0-9+_\-]+)*@([a-z0-9\-]+\.)+[a-z]{2,}$")
        .expect("email pattern is valid")
});

static NUMERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\-+]?[0-9]*\.?[0-9]+$").expect("numeric pattern is valid"));

static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\-+]?[0-9]+$").expect("integer pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
enum Rule {
    Trim,
    Required,
    Matches(String),
    MinLength(usize),
    MaxLength(usize),
    ExactLength(usize),
    GreaterThan(f64),
    LessThan(f64),
    Alpha,
    AlphaNumeric,
    AlphaDash,
    Numeric,
    Integer,
    IsNatural,
    IsNaturalNoZero,
    ValidEmail,
    ValidEmails,
}

impl Rule {
    fn parse(field: &str, token: &str) -> Result<Self, ModelError> {
        let (name, arg) = match token.split_once('[') {
            Some((name, rest)) => {
                let arg = rest
                    .strip_suffix(']')
                    .ok_or_else(|| ModelError::invalid_rule(field, token, "missing closing bracket"))?;
                (name, Some(arg))
            }
            None => (token, None),
        };

        let rule = match (name, arg) {
            ("trim", None) => Rule::Trim,
            ("required", None) => Rule::Required,
            ("alpha", None) => Rule::Alpha,
            ("alpha_numeric", None) => Rule::AlphaNumeric,
            ("alpha_dash", None) => Rule::AlphaDash,
            ("numeric", None) => Rule::Numeric,
            ("integer", None) => Rule::Integer,
            ("is_natural", None) => Rule::IsNatural,
            ("is_natural_no_zero", None) => Rule::IsNaturalNoZero,
            ("valid_email", None) => Rule::ValidEmail,
            ("valid_emails", None) => Rule::ValidEmails,
            ("matches", Some(other)) if !other.is_empty() => Rule::Matches(other.to_string()),
            ("min_length", Some(n)) => Rule::MinLength(parse_arg(field, token, n)?),
            ("max_length", Some(n)) => Rule::MaxLength(parse_arg(field, token, n)?),
            ("exact_length", Some(n)) => Rule::ExactLength(parse_arg(field, token, n)?),
            ("greater_than", Some(n)) => Rule::GreaterThan(parse_arg(field, token, n)?),
            ("less_than", Some(n)) => Rule::LessThan(parse_arg(field, token, n)?),
            _ => return Err(ModelError::invalid_rule(field, token, "unknown rule or wrong argument")),
        };

        Ok(rule)
    }

    fn name(&self) -> &'static str {
        match self {
            Rule::Trim => "trim",
            Rule::Required => "required",
            Rule::Matches(_) => "matches",
            Rule::MinLength(_) => "min_length",
            Rule::MaxLength(_) => "max_length",
            Rule::ExactLength(_) => "exact_length",
            Rule::GreaterThan(_) => "greater_than",
            Rule::LessThan(_) => "less_than",
            Rule::Alpha => "alpha",
            Rule::AlphaNumeric => "alpha_numeric",
            Rule::AlphaDash => "alpha_dash",
            Rule::Numeric => "numeric",
            Rule::Integer => "integer",
            Rule::IsNatural => "is_natural",
            Rule::IsNaturalNoZero => "is_natural_no_zero",
            Rule::ValidEmail => "valid_email",
            Rule::ValidEmails => "valid_emails",
        }
    }

    fn check(&self, value: &str, input: &dyn InputSource) -> bool {
        match self {
            Rule::Trim => true,
            Rule::Required => !value.trim().is_empty(),
            Rule::Matches(other) => input.get(other).map(value_text).as_deref() == Some(value),
            Rule::MinLength(n) => value.chars().count() >= *n,
            Rule::MaxLength(n) => value.chars().count() <= *n,
            Rule::ExactLength(n) => value.chars().count() == *n,
            Rule::GreaterThan(n) => value.parse::<f64>().map(|v| v > *n).unwrap_or(false),
            Rule::LessThan(n) => value.parse::<f64>().map(|v| v < *n).unwrap_or(false),
            Rule::Alpha => value.chars().all(|c| c.is_ascii_alphabetic()),
            Rule::AlphaNumeric => value.chars().all(|c| c.is_ascii_alphanumeric()),
            Rule::AlphaDash => value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            Rule::Numeric => NUMERIC_PATTERN.is_match(value),
            Rule::Integer => INTEGER_PATTERN.is_match(value),
            Rule::IsNatural => value.chars().all(|c| c.is_ascii_digit()),
            Rule::IsNaturalNoZero => {
                value.chars().all(|c| c.is_ascii_digit()) && !value.trim_start_matches('0').is_empty()
            }
            Rule::ValidEmail => EMAIL_PATTERN.is_match(value),
            Rule::ValidEmails => value
                .split(',')
                .all(|email| EMAIL_PATTERN.is_match(email.trim())),
        }
    }

    fn message(&self, label: &str, other_label: Option<&str>) -> String {
        match self {
            Rule::Trim => String::new(),
            Rule::Required => format!("The {} field is required.", label),
            Rule::Matches(other) => format!(
                "The {} field does not match the {} field.",
                label,
                other_label.unwrap_or(other)
            ),
            Rule::MinLength(n) => {
                format!("The {} field must be at least {} characters in length.", label, n)
            }
            Rule::MaxLength(n) => {
                format!("The {} field can not exceed {} characters in length.", label, n)
            }
            Rule::ExactLength(n) => {
                format!("The {} field must be exactly {} characters in length.", label, n)
            }
            Rule::GreaterThan(n) => {
                format!("The {} field must contain a number greater than {}.", label, n)
            }
            Rule::LessThan(n) => {
                format!("The {} field must contain a number less than {}.", label, n)
            }
            Rule::Alpha => format!("The {} field may only contain alphabetical characters.", label),
            Rule::AlphaNumeric => {
                format!("The {} field may only contain alpha-numeric characters.", label)
            }
            Rule::AlphaDash => format!(
                "The {} field may only contain alpha-numeric characters, underscores, and dashes.",
                label
            ),
            Rule::Numeric => format!("The {} field must contain only numbers.", label),
            Rule::Integer => format!("The {} field must contain an integer.", label),
            Rule::IsNatural => format!("The {} field must contain only positive numbers.", label),
            Rule::IsNaturalNoZero => {
                format!("The {} field must contain a number greater than zero.", label)
            }
            Rule::ValidEmail => format!("The {} field must contain a valid email address.", label),
            Rule::ValidEmails => {
                format!("The {} field must contain all valid email addresses.", label)
            }
        }
    }
}

fn parse_arg<T: std::str::FromStr>(field: &str, token: &str, arg: &str) -> Result<T, ModelError> {
    arg.trim()
        .parse()
        .map_err(|_| ModelError::invalid_rule(field, token, format!("'{}' is not a valid argument", arg)))
}

/// Text form of a submitted value; absent and null are blank
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    field: String,
    label: String,
    rules: Vec<Rule>,
}

/// Rule engine for pipe separated rule expressions
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    pending: Vec<FieldRules>,
    errors: Vec<FieldError>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields registered and waiting for the next run
    pub fn pending_fields(&self) -> Vec<&str> {
        self.pending.iter().map(|entry| entry.field.as_str()).collect()
    }

    fn check_field(&self, entry: &FieldRules, input: &dyn InputSource) -> Option<FieldError> {
        let mut value = input.get(&entry.field).map(value_text).unwrap_or_default();
        let required = entry.rules.contains(&Rule::Required);

        for rule in &entry.rules {
            if *rule == Rule::Trim {
                value = value.trim().to_string();
                continue;
            }
            if !required && value.trim().is_empty() {
                return None;
            }
            if !rule.check(&value, input) {
                let other_label = match rule {
                    Rule::Matches(other) => self
                        .pending
                        .iter()
                        .find(|candidate| &candidate.field == other)
                        .map(|candidate| candidate.label.as_str()),
                    _ => None,
                };

                return Some(FieldError {
                    field: entry.field.clone(),
                    label: entry.label.clone(),
                    rule: rule.name().to_string(),
                    message: rule.message(&entry.label, other_label),
                });
            }
        }

        None
    }
}

impl RuleEngine for FormValidator {
    fn set_rule(&mut self, field: &str, label: &str, expression: &str) -> Result<(), ModelError> {
        let rules = expression
            .split('|')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Rule::parse(field, token))
            .collect::<Result<Vec<_>, _>>()?;

        let entry = FieldRules {
            field: field.to_string(),
            label: label.to_string(),
            rules,
        };

        match self.pending.iter_mut().find(|existing| existing.field == field) {
            Some(existing) => *existing = entry,
            None => self.pending.push(entry),
        }

        Ok(())
    }

    fn run(&mut self, input: &dyn InputSource) -> bool {
        // Nothing registered or nothing submitted means nothing was validated
        if self.pending.is_empty() || input.is_empty() {
            self.pending.clear();
            self.errors.clear();
            return false;
        }

        let errors: Vec<FieldError> = self
            .pending
            .iter()
            .filter_map(|entry| self.check_field(entry, input))
            .collect();

        self.pending.clear();
        self.errors = errors;
        self.errors.is_empty()
    }

    fn clear_rules(&mut self) {
        self.pending.clear();
    }

    fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RequestInput;

    fn run_one(expression: &str, value: &str) -> Option<FieldError> {
        let mut validator = FormValidator::new();
        validator.set_rule("field", "Field", expression).unwrap();
        let input = RequestInput::from_pairs([("field", value)]);
        validator.run(&input);
        validator.error("field").cloned()
    }

    #[test]
    fn test_required() {
        assert!(run_one("required", "x").is_none());
        let error = run_one("required", "   ").unwrap();
        assert_eq!(error.rule, "required");
        assert_eq!(error.message, "The Field field is required.");
    }

    #[test]
    fn test_required_fails_for_absent_field() {
        let mut validator = FormValidator::new();
        validator.set_rule("username", "Username", "required").unwrap();

        let input = RequestInput::from_pairs([("email", "eve@example.com")]);
        assert!(!validator.run(&input));
        assert_eq!(validator.errors().len(), 1);
    }

    #[test]
    fn test_empty_submission_is_not_validated() {
        let mut validator = FormValidator::new();
        validator.set_rule("title", "Title", "max_length[10]").unwrap();

        assert!(!validator.run(&RequestInput::new()));
        assert!(validator.errors().is_empty());

        // The rules were dropped with the empty run
        let input = RequestInput::from_pairs([("title", "a title far too long")]);
        assert!(!validator.run(&input));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_optional_blank_values_skip_other_rules() {
        assert!(run_one("valid_email|min_length[5]", "").is_none());
        assert!(run_one("valid_email", "nope").is_some());
    }

    #[test]
    fn test_lengths_count_characters() {
        assert!(run_one("min_length[3]", "ab").is_some());
        assert!(run_one("max_length[3]", "äöü").is_none());
        assert!(run_one("exact_length[2]", "abc").is_some());
    }

    #[test]
    fn test_character_classes() {
        assert!(run_one("alpha", "abcXYZ").is_none());
        assert!(run_one("alpha", "abc1").is_some());
        assert!(run_one("alpha_numeric", "abc1").is_none());
        assert!(run_one("alpha_dash", "a_b-c1").is_none());
        assert!(run_one("alpha_dash", "a b").is_some());
    }

    #[test]
    fn test_numbers() {
        assert!(run_one("numeric", "-1.5").is_none());
        assert!(run_one("numeric", "1e5").is_some());
        assert!(run_one("integer", "+12").is_none());
        assert!(run_one("integer", "1.0").is_some());
        assert!(run_one("is_natural", "0").is_none());
        assert!(run_one("is_natural_no_zero", "000").is_some());
        assert!(run_one("is_natural_no_zero", "010").is_none());
        assert!(run_one("greater_than[10]", "11").is_none());
        assert!(run_one("greater_than[10]", "abc").is_some());
        assert!(run_one("less_than[10]", "10").is_some());
    }

    #[test]
    fn test_emails() {
        assert!(run_one("valid_email", "jane.doe+tag@example.co.uk").is_none());
        assert!(run_one("valid_email", "jane@localhost").is_some());
        assert!(run_one("valid_emails", "a@b.co, c@d.org").is_none());
        assert!(run_one("valid_emails", "a@b.co, nope").is_some());
    }

    #[test]
    fn test_trim_applies_to_later_rules() {
        assert!(run_one("trim|exact_length[3]", "  abc ").is_none());
        assert!(run_one("exact_length[3]", "  abc ").is_some());
    }

    #[test]
    fn test_matches_uses_other_label() {
        let mut validator = FormValidator::new();
        validator.set_rule("password", "Password", "required").unwrap();
        validator
            .set_rule("password_confirm", "Password Confirmation", "required|matches[password]")
            .unwrap();

        let input = RequestInput::from_pairs([("password", "secret"), ("password_confirm", "other")]);
        assert!(!validator.run(&input));
        assert_eq!(
            validator.error("password_confirm").unwrap().message,
            "The Password Confirmation field does not match the Password field."
        );
    }

    #[test]
    fn test_first_failure_per_field_only() {
        let error = run_one("required|min_length[5]|alpha", "a1").unwrap();
        assert_eq!(error.rule, "min_length");
    }

    #[test]
    fn test_bad_expressions_are_configuration_errors() {
        let mut validator = FormValidator::new();
        for expression in ["required|shiny", "min_length[x]", "max_length[3", "matches[]", "alpha[1]"] {
            let err = validator.set_rule("field", "Field", expression).unwrap_err();
            assert!(matches!(err, ModelError::InvalidRule { .. }), "{}", expression);
        }
    }

    #[test]
    fn test_run_consumes_rules() {
        let mut validator = FormValidator::new();
        validator.set_rule("username", "Username", "required").unwrap();
        assert_eq!(validator.pending_fields(), vec!["username"]);

        assert!(!validator.run(&RequestInput::new()));
        assert!(validator.pending_fields().is_empty());

        // Nothing registered, nothing validated
        assert!(!validator.run(&RequestInput::new()));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_set_rule_replaces_previous_registration() {
        let mut validator = FormValidator::new();
        validator.set_rule("age", "Age", "required").unwrap();
        validator.set_rule("age", "Age", "integer").unwrap();

        assert_eq!(validator.pending_fields(), vec!["age"]);
        assert!(validator.run(&RequestInput::new()));
    }
}
