/*!
 * Mock classifier implementations for testing.
 *
 * This module provides mock classifiers that simulate different behaviors:
 * - `MockClassifier::scripted(...)` - Replays canned raw model outputs
 * - `MockClassifier::fixed(...)` - Always returns the same descriptor
 * - `MockClassifier::failing()` - Always fails with a provider error
 * - `MockClassifier::malformed()` - Returns unparseable model output
 */

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::classifier::{parse_descriptor, ActionClassifier, ActionDescriptor, ClassifyContext};
use crate::errors::ClassifierError;

/// Behavior mode for the mock classifier
#[derive(Debug)]
enum MockBehavior {
    /// Pop raw model outputs from a script, in order; repeats the last one
    Scripted(Mutex<Vec<String>>),
    /// Always return the same descriptor
    Fixed(ActionDescriptor),
    /// Always fail with a request error
    Failing,
    /// Return output that cannot be parsed as a descriptor
    Malformed,
}

/// Mock classifier for testing controller behavior
#[derive(Debug)]
pub struct MockClassifier {
    behavior: MockBehavior,
}

impl MockClassifier {
    /// Replay the given raw model outputs in order.
    ///
    /// Each output goes through the real descriptor parser, so scripted
    /// tests exercise parsing as well. When the script runs out the last
    /// output repeats.
    pub fn scripted<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script: Vec<String> = outputs.into_iter().map(Into::into).collect();
        script.reverse();
        Self {
            behavior: MockBehavior::Scripted(Mutex::new(script)),
        }
    }

    /// Always return the same descriptor
    pub fn fixed(descriptor: ActionDescriptor) -> Self {
        Self {
            behavior: MockBehavior::Fixed(descriptor),
        }
    }

    /// Always fail with a request error
    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::Failing,
        }
    }

    /// Return unparseable model output
    pub fn malformed() -> Self {
        Self {
            behavior: MockBehavior::Malformed,
        }
    }
}

#[async_trait]
impl ActionClassifier for MockClassifier {
    async fn classify(
        &self,
        _prompt: &str,
        _context: &ClassifyContext,
    ) -> Result<ActionDescriptor, ClassifierError> {
        match &self.behavior {
            MockBehavior::Scripted(script) => {
                let mut script = script.lock();
                let raw = match script.len() {
                    0 => String::new(),
                    1 => script[0].clone(),
                    _ => script.pop().expect("script checked non-empty"),
                };
                Ok(parse_descriptor(&raw))
            }
            MockBehavior::Fixed(descriptor) => Ok(descriptor.clone()),
            MockBehavior::Failing => Err(ClassifierError::RequestFailed(
                "mock classifier configured to fail".to_string(),
            )),
            MockBehavior::Malformed => Ok(parse_descriptor("this is not json")),
        }
    }

    async fn test_connection(&self) -> Result<(), ClassifierError> {
        match self.behavior {
            MockBehavior::Failing => Err(ClassifierError::ConnectionError(
                "mock classifier configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
