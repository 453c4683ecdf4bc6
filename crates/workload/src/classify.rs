//! Response classification.
//!
//! The service reports business-rule failures as free text, so recognised
//! rejections are found by substring match on the raw body. All matching goes
//! through [`RejectionPolicy`].

use smallbank_core::TransportError;
use smallbank_types::Response;
use std::fmt;

/// Body text the service returns when a withdrawal exceeds the savings balance.
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Not enough money in savings account";

/// Body text the service returns when creating an account that already exists.
pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "Account already exists in accounts table";

/// Expected business-rule failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionKind {
    /// Insufficient funds in savings.
    InsufficientFunds,
    /// Account already exists.
    DuplicateAccount,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::InsufficientFunds => f.write_str("insufficient funds"),
            RejectionKind::DuplicateAccount => f.write_str("duplicate account"),
        }
    }
}

/// Outcome of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Success status.
    Accepted,
    /// Failure status with a recognised business-rule message.
    RecognizedRejection(RejectionKind),
    /// Any other failure. Carries the response body verbatim.
    Fatal(String),
}

impl Classification {
    /// Whether this outcome must abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Classification::Fatal(_))
    }
}

/// The set of body substrings that mark a failure as expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionPolicy {
    patterns: Vec<(String, RejectionKind)>,
}

impl RejectionPolicy {
    /// A policy that recognises nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Recognise `pattern` (case-sensitive substring) as `kind`.
    pub fn with_pattern(mut self, pattern: impl Into<String>, kind: RejectionKind) -> Self {
        self.patterns.push((pattern.into(), kind));
        self
    }

    /// The first rejection kind whose pattern occurs in `body`.
    pub fn match_body(&self, body: &str) -> Option<RejectionKind> {
        self.patterns
            .iter()
            .find(|(pattern, _)| body.contains(pattern.as_str()))
            .map(|(_, kind)| *kind)
    }
}

impl Default for RejectionPolicy {
    fn default() -> Self {
        Self::empty()
            .with_pattern(INSUFFICIENT_FUNDS_MESSAGE, RejectionKind::InsufficientFunds)
            .with_pattern(DUPLICATE_ACCOUNT_MESSAGE, RejectionKind::DuplicateAccount)
    }
}

/// Classifies responses as accepted, recognised rejection or fatal.
#[derive(Debug, Clone, Default)]
pub struct ResponseClassifier {
    policy: RejectionPolicy,
}

impl ResponseClassifier {
    /// Create a classifier with the given rejection policy.
    pub fn new(policy: RejectionPolicy) -> Self {
        Self { policy }
    }

    /// Classify a response. Depends only on status and body.
    pub fn classify(&self, response: &Response) -> Classification {
        if response.is_success() {
            return Classification::Accepted;
        }

        let body = response.body_text();
        match self.policy.match_body(&body) {
            Some(kind) => Classification::RecognizedRejection(kind),
            None => Classification::Fatal(body),
        }
    }

    /// Classify the outcome of a submission, treating a transport failure as fatal.
    pub fn classify_result(&self, result: &Result<Response, TransportError>) -> Classification {
        match result {
            Ok(response) => self.classify(response),
            Err(e) => Classification::Fatal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> Classification {
        ResponseClassifier::default().classify(&Response::new(status, body))
    }

    #[test]
    fn test_success_is_accepted() {
        assert_eq!(classify(200, ""), Classification::Accepted);
        // Body text is irrelevant on success.
        assert_eq!(
            classify(200, INSUFFICIENT_FUNDS_MESSAGE),
            Classification::Accepted
        );
    }

    #[test]
    fn test_recognized_rejections() {
        assert_eq!(
            classify(400, "Error: Not enough money in savings account (balance 3)"),
            Classification::RecognizedRejection(RejectionKind::InsufficientFunds)
        );
        assert_eq!(
            classify(500, "Account already exists in accounts table"),
            Classification::RecognizedRejection(RejectionKind::DuplicateAccount)
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(
            classify(400, "not enough money in savings account"),
            Classification::Fatal("not enough money in savings account".to_string())
        );
    }

    #[test]
    fn test_other_failures_are_fatal_with_verbatim_body() {
        let body = "Unknown method SmallBank_overdraft";
        assert_eq!(classify(404, body), Classification::Fatal(body.to_string()));
        assert!(classify(500, "").is_fatal());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = ResponseClassifier::default();
        for response in [
            Response::new(200, "{}"),
            Response::new(400, INSUFFICIENT_FUNDS_MESSAGE),
            Response::new(400, DUPLICATE_ACCOUNT_MESSAGE),
            Response::new(503, "busy"),
        ] {
            assert_eq!(classifier.classify(&response), classifier.classify(&response));
        }
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let classifier = ResponseClassifier::default();
        let result = Err(TransportError::Connection("refused".to_string()));
        assert_eq!(
            classifier.classify_result(&result),
            Classification::Fatal("Connection error: refused".to_string())
        );
    }

    #[test]
    fn test_custom_policy() {
        let classifier = ResponseClassifier::new(
            RejectionPolicy::empty().with_pattern("overdrawn", RejectionKind::InsufficientFunds),
        );
        assert_eq!(
            classifier.classify(&Response::new(400, "account overdrawn")),
            Classification::RecognizedRejection(RejectionKind::InsufficientFunds)
        );
        assert!(classifier
            .classify(&Response::new(400, INSUFFICIENT_FUNDS_MESSAGE))
            .is_fatal());
    }
}
