use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
                .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Padding stripped from form values. Only ASCII blanks and NUL; a
/// full-width space counts as content.
pub(crate) const BLANK: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Accumulating form validator.
///
/// Every rule runs and appends its own message to the field's list, so
/// `required` and `email` on the same empty field report separately.
/// Fields keep the order in which they first failed.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    input: HashMap<String, String>,
    errors: Vec<(String, Vec<String>)>,
}

impl Validator {
    pub fn new(input: HashMap<String, String>) -> Self {
        Self {
            input,
            errors: Vec::new(),
        }
    }

    /// Swap in new input. Errors are kept until [`Validator::clear_errors`].
    pub fn with_input(&mut self, input: HashMap<String, String>) -> &mut Self {
        self.input = input;
        self
    }

    pub fn required(&mut self, field: &str, message: Option<&str>) -> &mut Self {
        let missing = self
            .input
            .get(field)
            .map_or(true, |v| v.trim_matches(BLANK).is_empty());
        if missing {
            let message = pick(message, || format!("{field} is required."));
            self.add_error(field, message);
        }
        self
    }

    /// Absent fields pass; pair with `required` when the field must exist.
    pub fn min_length(&mut self, field: &str, min: usize, message: Option<&str>) -> &mut Self {
        if self.char_count(field).is_some_and(|n| n < min) {
            let message = pick(message, || {
                format!("{field} must be at least {min} characters.")
            });
            self.add_error(field, message);
        }
        self
    }

    pub fn max_length(&mut self, field: &str, max: usize, message: Option<&str>) -> &mut Self {
        if self.char_count(field).is_some_and(|n| n > max) {
            let message = pick(message, || format!("{field} must be at most {max} characters."));
            self.add_error(field, message);
        }
        self
    }

    pub fn email(&mut self, field: &str, message: Option<&str>) -> &mut Self {
        if self.input.get(field).is_some_and(|v| !is_valid_email(v)) {
            let message = pick(message, || format!("{field} is not a valid email address."));
            self.add_error(field, message);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[(String, Vec<String>)] {
        &self.errors
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or_default()
    }

    pub fn first_error(&self) -> &str {
        self.errors
            .iter()
            .find_map(|(_, messages)| messages.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn char_count(&self, field: &str) -> Option<usize> {
        self.input.get(field).map(|v| v.chars().count())
    }

    fn add_error(&mut self, field: &str, message: String) {
        match self.errors.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.errors.push((field.to_string(), vec![message])),
        }
    }
}

fn pick(custom: Option<&str>, default: impl FnOnce() -> String) -> String {
    match custom {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn required_rejects_missing_and_blank() {
        let mut v = Validator::new(input(&[]));
        v.required("name", None);
        assert_eq!(v.field_errors("name"), ["name is required."]);

        let mut v = Validator::new(input(&[("name", "   ")]));
        v.required("name", None);
        assert!(!v.is_valid());

        let mut v = Validator::new(input(&[("name", "a")]));
        v.required("name", None);
        assert!(v.is_valid());
    }

    #[test]
    fn required_strips_only_ascii_blanks() {
        let mut v = Validator::new(input(&[("name", " \t\r\n\0\x0B")]));
        v.required("name", None);
        assert!(!v.is_valid());

        // U+3000 ideographic space is content, not padding
        let mut v = Validator::new(input(&[("name", "\u{3000}")]));
        v.required("name", None);
        assert!(v.is_valid());
    }

    #[test]
    fn min_length_counts_characters() {
        let mut v = Validator::new(input(&[("name", "ab")]));
        v.min_length("name", 3, None);
        assert_eq!(v.first_error(), "name must be at least 3 characters.");

        let mut v = Validator::new(input(&[("name", "abc")]));
        v.min_length("name", 3, None);
        assert!(v.is_valid());

        // three characters, nine bytes
        let mut v = Validator::new(input(&[("name", "日本語")]));
        v.min_length("name", 3, None).max_length("name", 3, None);
        assert!(v.is_valid());
    }

    #[test]
    fn length_rules_skip_absent_fields() {
        let mut v = Validator::new(input(&[]));
        v.min_length("name", 3, None).max_length("name", 1, None);
        assert!(v.is_valid());
    }

    #[test]
    fn max_length_rejects_long_values() {
        let mut v = Validator::new(input(&[("name", "abcd")]));
        v.max_length("name", 3, Some("too long"));
        assert_eq!(v.field_errors("name"), ["too long"]);
    }

    #[test]
    fn chained_rules_all_report() {
        let mut v = Validator::new(input(&[("e", "not-an-email")]));
        v.required("e", None).email("e", None).min_length("e", 100, None);
        assert_eq!(v.field_errors("e").len(), 2);
        assert_eq!(
            v.field_errors("e"),
            [
                "e is not a valid email address.",
                "e must be at least 100 characters.",
            ]
        );

        let mut v = Validator::new(input(&[("e", "")]));
        v.required("e", None).email("e", None);
        assert_eq!(v.field_errors("e").len(), 2);
    }

    #[test]
    fn email_accepts_ordinary_addresses() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.jp"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@-example.com"));
    }

    #[test]
    fn first_error_follows_failure_order() {
        let mut v = Validator::new(input(&[("password", "x")]));
        v.required("username", None)
            .min_length("password", 8, Some("short"))
            .required("username", Some("again"));
        assert_eq!(v.first_error(), "username is required.");
        assert_eq!(v.errors()[0].0, "username");
        assert_eq!(v.errors()[1].0, "password");
        assert_eq!(v.field_errors("username"), ["username is required.", "again"]);
        assert!(v.field_errors("other").is_empty());
    }

    #[test]
    fn empty_custom_message_falls_back_to_default() {
        let mut v = Validator::new(input(&[]));
        v.required("name", Some(""));
        assert_eq!(v.first_error(), "name is required.");
    }

    #[test]
    fn clear_errors_resets_for_reuse() {
        let mut v = Validator::new(input(&[]));
        v.required("name", None);
        assert!(!v.is_valid());
        v.clear_errors();
        assert!(v.is_valid());
        assert_eq!(v.first_error(), "");

        v.with_input(input(&[("name", "ok")])).required("name", None);
        assert!(v.is_valid());
    }
}
