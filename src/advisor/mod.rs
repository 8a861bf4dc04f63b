//! Language-model advisors that annotate residents with risk and interaction
//! summaries.

mod openai;
mod service;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use openai::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiAdvisor, OpenAiAdvisorConfig,
};
#[cfg(test)]
pub use service::{MockInteractionAdvisor, MockRiskAdvisor};
pub use service::{
    AdvisorKind, InteractionAdvisor, RiskAdvisor, assess_risk,
    check_interactions, normalize_interaction_answer,
};
