//! Deterministic advisor stubs for unit and behavioural tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ReviewError;

use super::{InteractionAdvisor, RiskAdvisor};

/// Advisor stub that answers from a fixed script and records every call.
///
/// Answers are keyed by the joined medication list (`"A,B"`); unknown lists
/// get the default answer. Lists registered with [`StubAdvisor::failing_for`]
/// return an advisor error instead.
#[derive(Debug, Default)]
pub struct StubAdvisor {
    default_answer: String,
    answers: HashMap<String, String>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubAdvisor {
    /// Creates a stub that answers every call with `answer`.
    #[must_use]
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            default_answer: answer.into(),
            ..Self::default()
        }
    }

    /// Returns `answer` when called with exactly `medications`.
    #[must_use]
    pub fn with_answer(mut self, medications: &[&str], answer: impl Into<String>) -> Self {
        self.answers.insert(medications.join(","), answer.into());
        self
    }

    /// Fails with `message` when called with exactly `medications`.
    #[must_use]
    pub fn failing_for(mut self, medications: &[&str], message: impl Into<String>) -> Self {
        self.failures.insert(medications.join(","), message.into());
        self
    }

    /// Medication lists this stub was called with, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn answer(&self, medications: &[String]) -> Result<String, ReviewError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(medications.to_vec());
        }

        let key = medications.join(",");
        if let Some(message) = self.failures.get(&key) {
            return Err(ReviewError::Advisor {
                message: message.clone(),
            });
        }
        Ok(self
            .answers
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default_answer.clone()))
    }
}

impl RiskAdvisor for StubAdvisor {
    fn summarize_risk(&self, medications: &[String]) -> Result<String, ReviewError> {
        self.answer(medications)
    }
}

impl InteractionAdvisor for StubAdvisor {
    fn summarize_interactions(&self, medications: &[String]) -> Result<String, ReviewError> {
        self.answer(medications)
    }
}
