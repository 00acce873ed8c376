//! Contact form validation.
//!
//! The generated site ships a contact form; during `folio serve` its
//! submissions come back to the dev server, which runs them through
//! [`ContactForm`] before handing them to a [`SubmissionTransport`].
//! The same rules drive the inline messages rendered next to each
//! field.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ContactConfig;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// The three fields of the contact form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Description,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Description];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Description => "description",
        }
    }

    /// Rules run in order; a field reports only its first failure.
    fn rules(&self) -> &'static [Rule] {
        match self {
            Field::Name | Field::Description => &[Rule::Required],
            Field::Email => &[Rule::Required, Rule::Email],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Required,
    Email,
}

impl Rule {
    fn check(&self, field: Field, value: &str) -> Option<String> {
        match self {
            Rule::Required if value.trim().is_empty() => {
                Some(format!("{} is required", field.name()))
            }
            Rule::Email if !EMAIL_RE.is_match(value.trim()) => {
                Some(format!("{} must be a valid email", field.name()))
            }
            _ => None,
        }
    }
}

/// Per-field validation messages. At most one message per field, the
/// first rule that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Description => self.description.as_deref(),
        }
    }

    fn set(&mut self, field: Field, message: Option<String>) {
        match field {
            Field::Name => self.name = message,
            Field::Email => self.email = message,
            Field::Description => self.description = message,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.description.is_none()
    }

    /// All messages in field order, for flat display.
    pub fn messages(&self) -> Vec<&str> {
        Field::ALL.iter().filter_map(|f| self.get(*f)).collect()
    }
}

/// Where the form sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Untouched, mid-edit, or back from a delivered submission.
    Idle,
    /// A submit is checking the fields.
    Validating,
    /// Last submit passed every rule.
    Valid,
    /// Last submit failed; `errors()` says where.
    Invalid,
}

/// A validated submission handed over for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub description: String,
}

/// Delivery backend for valid submissions. A valid submit hands over
/// exactly one [`Submission`]; an invalid one hands over nothing.
pub trait SubmissionTransport {
    fn deliver(&mut self, submission: Submission) -> Result<()>;
}

/// Transport used by the dev server: logs the submission.
#[derive(Debug, Default)]
pub struct LoggingTransport;

impl SubmissionTransport for LoggingTransport {
    fn deliver(&mut self, submission: Submission) -> Result<()> {
        info!(
            "contact submission from {} <{}>: {}",
            submission.name, submission.email, submission.description
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submission passed validation and was handed to the transport.
    Delivered,
    /// Validation failed; nothing was handed over.
    Rejected(FieldErrors),
}

/// The contact form state machine.
///
/// Fields are checked independently, so one submit reports every
/// broken field at once rather than stopping at the first.
#[derive(Debug)]
pub struct ContactForm {
    name: String,
    email: String,
    description: String,
    errors: FieldErrors,
    state: FormState,
    reset_on_success: bool,
}

impl ContactForm {
    pub fn new(reset_on_success: bool) -> Self {
        ContactForm {
            name: String::new(),
            email: String::new(),
            description: String::new(),
            errors: FieldErrors::default(),
            state: FormState::Idle,
            reset_on_success,
        }
    }

    pub fn from_config(config: &ContactConfig) -> Self {
        Self::new(config.reset_on_success)
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Description => &self.description,
        }
    }

    /// Records an edit. The edited field's stale message is dropped
    /// and the form returns to `Idle`; other fields keep their
    /// messages until the next validation touches them.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Description => self.description = value,
        }
        self.errors.set(field, None);
        self.state = FormState::Idle;
    }

    fn check(&self, field: Field) -> Option<String> {
        let value = self.value(field);
        field.rules().iter().find_map(|rule| rule.check(field, value))
    }

    /// On-blur check of one field. Updates that field's message only;
    /// the overall state is untouched.
    pub fn validate_field(&mut self, field: Field) -> Option<&str> {
        let message = self.check(field);
        self.errors.set(field, message);
        self.errors.get(field)
    }

    /// Full validation pass over every field.
    pub fn validate(&mut self) -> bool {
        self.state = FormState::Validating;
        for field in Field::ALL {
            let message = self.check(field);
            self.errors.set(field, message);
        }
        if self.errors.is_empty() {
            self.state = FormState::Valid;
            true
        } else {
            self.state = FormState::Invalid;
            false
        }
    }

    /// Validates and, if everything passes, hands the submission to
    /// `transport` exactly once, then returns to `Idle`. Field values
    /// are cleared only under the `reset_on_success` policy. A
    /// transport failure surfaces as `Err` and leaves the form `Valid`
    /// so the submit can be retried.
    pub fn submit(&mut self, transport: &mut dyn SubmissionTransport) -> Result<SubmitOutcome> {
        if !self.validate() {
            return Ok(SubmitOutcome::Rejected(self.errors.clone()));
        }

        transport.deliver(Submission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            description: self.description.trim().to_string(),
        })?;

        if self.reset_on_success {
            self.reset();
        } else {
            self.state = FormState::Idle;
        }
        Ok(SubmitOutcome::Delivered)
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.description.clear();
        self.errors = FieldErrors::default();
        self.state = FormState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Default)]
    struct RecordingTransport {
        delivered: Vec<Submission>,
    }

    impl SubmissionTransport for RecordingTransport {
        fn deliver(&mut self, submission: Submission) -> Result<()> {
            self.delivered.push(submission);
            Ok(())
        }
    }

    struct FailingTransport;

    impl SubmissionTransport for FailingTransport {
        fn deliver(&mut self, _submission: Submission) -> Result<()> {
            Err(anyhow!("endpoint unreachable"))
        }
    }

    fn filled_form() -> ContactForm {
        let mut form = ContactForm::new(true);
        form.set(Field::Name, "Rolwin");
        form.set(Field::Email, "rolwin@example.com");
        form.set(Field::Description, "Hello there");
        form
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let mut form = ContactForm::new(true);
        assert!(!form.validate());
        assert_eq!(form.state(), FormState::Invalid);
        assert_eq!(
            form.errors().messages(),
            vec!["name is required", "email is required", "description is required"]
        );
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let mut form = ContactForm::new(true);
        form.set(Field::Name, "   ");
        form.validate();
        assert_eq!(form.errors().get(Field::Name), Some("name is required"));
    }

    #[test]
    fn test_required_wins_over_email_format() {
        let mut form = ContactForm::new(true);
        form.validate();
        assert_eq!(form.errors().get(Field::Email), Some("email is required"));
    }

    #[test]
    fn test_malformed_email_message() {
        let mut form = filled_form();
        form.set(Field::Email, "not-an-email");
        assert!(!form.validate());
        assert_eq!(
            form.errors().messages(),
            vec!["email must be a valid email"]
        );
    }

    #[test]
    fn test_email_shapes() {
        let mut form = filled_form();
        for bad in ["a@b", "a b@c.d", "@c.d", "a@", "plain"] {
            form.set(Field::Email, bad);
            assert!(!form.validate(), "{bad:?} should be rejected");
        }
        for good in ["a@b.c", "first.last@sub.example.org", " padded@mail.io "] {
            form.set(Field::Email, good);
            assert!(form.validate(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn test_valid_submit_delivers_exactly_once() {
        let mut form = filled_form();
        let mut transport = RecordingTransport::default();

        let outcome = form.submit(&mut transport).unwrap();
        assert_eq!(outcome, SubmitOutcome::Delivered);
        assert_eq!(transport.delivered.len(), 1);
        assert_eq!(transport.delivered[0].name, "Rolwin");
        assert_eq!(transport.delivered[0].email, "rolwin@example.com");
    }

    #[test]
    fn test_invalid_submit_delivers_nothing() {
        let mut form = ContactForm::new(true);
        let mut transport = RecordingTransport::default();

        let outcome = form.submit(&mut transport).unwrap();
        match outcome {
            SubmitOutcome::Rejected(errors) => assert_eq!(errors.messages().len(), 3),
            SubmitOutcome::Delivered => panic!("empty form must not deliver"),
        }
        assert!(transport.delivered.is_empty());
        assert_eq!(form.state(), FormState::Invalid);
    }

    #[test]
    fn test_reset_on_success_clears_form() {
        let mut form = filled_form();
        let mut transport = RecordingTransport::default();

        form.submit(&mut transport).unwrap();
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.value(Field::Name), "");
        assert_eq!(form.value(Field::Email), "");
        assert_eq!(form.value(Field::Description), "");
    }

    #[test]
    fn test_without_reset_values_survive() {
        let mut form = ContactForm::new(false);
        form.set(Field::Name, "Rolwin");
        form.set(Field::Email, "rolwin@example.com");
        form.set(Field::Description, "Hi");
        let mut transport = RecordingTransport::default();

        form.submit(&mut transport).unwrap();
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.value(Field::Name), "Rolwin");
    }

    #[test]
    fn test_blur_checks_only_that_field() {
        let mut form = ContactForm::new(true);
        form.set(Field::Email, "broken");

        let message = form.validate_field(Field::Email).map(str::to_string);
        assert_eq!(message.as_deref(), Some("email must be a valid email"));
        assert_eq!(form.errors().get(Field::Name), None);
        assert_eq!(form.errors().get(Field::Description), None);
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_editing_clears_only_that_error() {
        let mut form = ContactForm::new(true);
        form.validate();

        form.set(Field::Name, "Rolwin");
        assert_eq!(form.errors().get(Field::Name), None);
        assert_eq!(form.errors().get(Field::Email), Some("email is required"));
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_transport_failure_keeps_form_valid() {
        let mut form = filled_form();
        let err = form.submit(&mut FailingTransport).unwrap_err();
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(form.state(), FormState::Valid);
        assert_eq!(form.value(Field::Name), "Rolwin");
    }
}
