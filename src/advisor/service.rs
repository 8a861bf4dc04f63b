//! Advisor contracts and the call guards shared by every implementation.

use std::fmt;

use crate::error::ReviewError;

/// Answers that mean "no interaction found".
const NO_INTERACTION_ANSWERS: [&str; 5] = ["無", "无", "none", "no interaction", "no interactions"];

/// Summarizes the risks of a resident's medication list.
#[cfg_attr(test, mockall::automock)]
pub trait RiskAdvisor: Send + Sync {
    /// Produce a free-text risk summary for a non-empty medication list.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] when the provider call fails.
    fn summarize_risk(&self, medications: &[String]) -> Result<String, ReviewError>;
}

/// Summarizes interactions between the drugs in a medication list.
#[cfg_attr(test, mockall::automock)]
pub trait InteractionAdvisor: Send + Sync {
    /// Produce a free-text interaction summary for two or more medications.
    ///
    /// The literal answer `無` means no interaction was found.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] when the provider call fails.
    fn summarize_interactions(&self, medications: &[String]) -> Result<String, ReviewError>;
}

/// Which advisor produced a result or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisorKind {
    /// The risk advisor.
    Risk,
    /// The interaction advisor.
    Interaction,
}

impl AdvisorKind {
    /// Label used in logs and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Risk => "risk",
            Self::Interaction => "interaction",
        }
    }
}

impl fmt::Display for AdvisorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Asks the risk advisor about a medication list.
///
/// An empty list yields an empty summary without calling the advisor.
///
/// # Errors
///
/// Propagates the advisor's error.
pub fn assess_risk(
    advisor: &dyn RiskAdvisor,
    medications: &[String],
) -> Result<String, ReviewError> {
    if medications.is_empty() {
        return Ok(String::new());
    }
    advisor
        .summarize_risk(medications)
        .map(|summary| summary.trim().to_owned())
}

/// Asks the interaction advisor about a medication list.
///
/// Fewer than two medications yield an empty summary without calling the
/// advisor. A "no interaction" answer is normalized to an empty summary so
/// reports only flag residents with real findings.
///
/// # Errors
///
/// Propagates the advisor's error.
pub fn check_interactions(
    advisor: &dyn InteractionAdvisor,
    medications: &[String],
) -> Result<String, ReviewError> {
    if medications.len() < 2 {
        return Ok(String::new());
    }
    advisor
        .summarize_interactions(medications)
        .map(|summary| normalize_interaction_answer(&summary))
}

/// Maps a "no interaction" answer to an empty string and trims the rest.
#[must_use]
pub fn normalize_interaction_answer(answer: &str) -> String {
    let trimmed = answer.trim().trim_end_matches(['。', '.']);
    let lowered = trimmed.to_lowercase();
    if NO_INTERACTION_ANSWERS.contains(&lowered.as_str()) {
        return String::new();
    }
    answer.trim().to_owned()
}
