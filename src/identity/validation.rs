// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration input validation.
//!
//! Each field carries a [`FieldRules`] set. Rules are always evaluated in the
//! same order, whatever order they were declared in:
//!
//! 1. required (value present)
//! 2. not blank
//! 3. pattern
//! 4. length (in characters, after trimming)
//! 5. domain-specific checks, in declaration order
//!
//! The first violated rule is returned.

use serde::Serialize;
use validator::ValidateEmail;

/// Which rule a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    NotBlank,
    Pattern,
    Length,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub rule: RuleKind,
    pub message: String,
}

type Check = fn(&str) -> bool;

/// Rules for a single field.
#[derive(Clone, Copy)]
pub struct FieldRules {
    field: &'static str,
    pattern: Option<(Check, &'static str)>,
    length: Option<(usize, usize)>,
    domain: &'static [(Check, &'static str)],
}

impl FieldRules {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            pattern: None,
            length: None,
            domain: &[],
        }
    }

    pub const fn pattern(mut self, check: Check, message: &'static str) -> Self {
        self.pattern = Some((check, message));
        self
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    pub const fn domain(mut self, checks: &'static [(Check, &'static str)]) -> Self {
        self.domain = checks;
        self
    }

    /// Validate `value`, returning it trimmed.
    pub fn validate<'v>(&self, value: Option<&'v str>) -> Result<&'v str, ValidationError> {
        let value = value.ok_or_else(|| self.violation(RuleKind::Required, "is required".to_string()))?;

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(self.violation(RuleKind::NotBlank, "must not be blank".to_string()));
        }

        if let Some((check, message)) = self.pattern {
            if !check(trimmed) {
                return Err(self.violation(RuleKind::Pattern, message.to_string()));
            }
        }

        if let Some((min, max)) = self.length {
            let len = trimmed.chars().count();
            if len < min || len > max {
                return Err(self.violation(
                    RuleKind::Length,
                    format!("must be between {min} and {max} characters"),
                ));
            }
        }

        for (check, message) in self.domain {
            if !check(trimmed) {
                return Err(self.violation(RuleKind::Domain, message.to_string()));
            }
        }

        Ok(trimmed)
    }

    fn violation(&self, rule: RuleKind, message: String) -> ValidationError {
        ValidationError {
            field: self.field,
            rule,
            message,
        }
    }
}

pub const NAME_RULES: FieldRules = FieldRules::new("name").length(2, 100);

pub const EMAIL_RULES: FieldRules = FieldRules::new("email")
    .pattern(is_email_address, "must be a valid email address")
    .length(3, 254);

pub const DOCUMENT_ID_RULES: FieldRules = FieldRules::new("document_id")
    .pattern(is_document_shaped, "may only contain digits, '.' and '-'")
    .length(5, 20)
    .domain(&[(has_varied_digits as Check, "must not be a repeated single digit")]);

pub const PASSWORD_RULES: FieldRules = FieldRules::new("password")
    .length(8, 128)
    .domain(&[
        (has_letter as Check, "must contain at least one letter"),
        (has_digit as Check, "must contain at least one digit"),
    ]);

/// Validated, normalized registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    /// Lowercased.
    pub email: String,
    /// Digits only; separators are formatting.
    pub document_id: String,
    /// Not trimmed; whitespace in passwords is significant.
    pub password: String,
}

/// Validate registration fields in the order name, email, document id, password.
pub fn validate_registration(
    name: Option<&str>,
    email: Option<&str>,
    document_id: Option<&str>,
    password: Option<&str>,
) -> Result<ValidRegistration, ValidationError> {
    let name = NAME_RULES.validate(name)?;
    let email = EMAIL_RULES.validate(email)?;
    let document_id = DOCUMENT_ID_RULES.validate(document_id)?;
    PASSWORD_RULES.validate(password)?;

    Ok(ValidRegistration {
        name: name.to_string(),
        email: normalize_email(email),
        document_id: normalize_document_id(document_id),
        password: password.unwrap_or_default().to_string(),
    })
}

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Canonical document id: the digits, without `.` or `-` separators.
pub fn normalize_document_id(document_id: &str) -> String {
    document_id.chars().filter(char::is_ascii_digit).collect()
}

fn is_email_address(value: &str) -> bool {
    value.validate_email()
}

fn is_document_shaped(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        && value.chars().any(|c| c.is_ascii_digit())
}

fn has_varied_digits(value: &str) -> bool {
    let mut digits = value.chars().filter(char::is_ascii_digit);
    match digits.next() {
        Some(first) => digits.any(|d| d != first),
        None => false,
    }
}

fn has_letter(value: &str) -> bool {
    value.chars().any(char::is_alphabetic)
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}
