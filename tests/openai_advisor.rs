//! Integration tests for the OpenAI-compatible advisor against a mock
//! chat-completions endpoint.

mod support;

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;
use smartmeds::advisor::{InteractionAdvisor, OpenAiAdvisor, OpenAiAdvisorConfig, RiskAdvisor};
use smartmeds::store::MemoryStore;
use smartmeds::{ReviewError, ReviewStatus, ReviewWorkflow};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::roster_row;
use support::runtime::{SharedRuntime, start_mock_server};

const RISK_MARKER: &str = "Summarize the main risks";
const INTERACTION_MARKER: &str = "drug-drug interactions";

struct MockAdvisor {
    runtime: SharedRuntime,
    server: MockServer,
}

impl MockAdvisor {
    fn advisor(&self) -> OpenAiAdvisor {
        OpenAiAdvisor::new(OpenAiAdvisorConfig::new(
            format!("{}/v1", self.server.uri()),
            "gpt-test",
            Some("sk-test".to_owned()),
            Duration::from_secs(5),
        ))
        .expect("advisor should build")
    }

    fn answer(&self, marker: &str, status: u16, body: serde_json::Value) {
        self.runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .and(header("authorization", "Bearer sk-test"))
                .and(body_partial_json(json!({ "model": "gpt-test" })))
                .and(body_string_contains(marker))
                .respond_with(ResponseTemplate::new(status).set_body_json(body))
                .mount(&self.server),
        );
    }
}

#[fixture]
fn mock_advisor() -> MockAdvisor {
    let (runtime, server) = start_mock_server().expect("mock server should start");
    MockAdvisor { runtime, server }
}

fn completion(text: &str) -> serde_json::Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": text } }] })
}

fn medications(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

#[rstest]
fn risk_summary_is_trimmed_assistant_text(mock_advisor: MockAdvisor) {
    mock_advisor.answer(RISK_MARKER, 200, completion("  高風險：出血風險增加  \n"));

    let summary = mock_advisor
        .advisor()
        .summarize_risk(&medications(&["Aspirin", "Warfarin"]))
        .expect("risk call should succeed");

    assert_eq!(summary, "高風險：出血風險增加");
}

#[rstest]
fn content_parts_are_accepted(mock_advisor: MockAdvisor) {
    mock_advisor.answer(
        INTERACTION_MARKER,
        200,
        json!({ "choices": [{ "message": { "content": [{ "type": "text", "text": "A+B" }] } }] }),
    );

    let summary = mock_advisor
        .advisor()
        .summarize_interactions(&medications(&["A", "B"]))
        .expect("interaction call should succeed");

    assert_eq!(summary, "A+B");
}

#[rstest]
#[case::server_error(500, json!({ "error": "overloaded" }), "status 500")]
#[case::no_choices(200, json!({ "choices": [] }), "did not contain assistant text")]
#[case::blank_text(200, completion("   "), "did not contain assistant text")]
fn failed_calls_are_advisor_errors(
    mock_advisor: MockAdvisor,
    #[case] status: u16,
    #[case] body: serde_json::Value,
    #[case] expected: &str,
) {
    mock_advisor.answer(RISK_MARKER, status, body);

    let result = mock_advisor.advisor().summarize_risk(&medications(&["A"]));

    assert!(
        matches!(&result, Err(ReviewError::Advisor { message }) if message.contains(expected)),
        "expected advisor error mentioning {expected:?}, got {result:?}"
    );
}

#[rstest]
fn workflow_annotates_through_http_advisor(mock_advisor: MockAdvisor) {
    mock_advisor.answer(RISK_MARKER, 200, completion("中風險"));
    mock_advisor.answer(INTERACTION_MARKER, 200, completion("無"));
    let advisor = Arc::new(mock_advisor.advisor());
    let store = MemoryStore::with_rows(vec![
        roster_row("Chen", "80", "Aspirin, Warfarin"),
        roster_row("Wang", "72", ""),
    ]);
    let mut workflow = ReviewWorkflow::new(
        Box::new(store.clone()),
        Arc::clone(&advisor) as Arc<dyn RiskAdvisor>,
        advisor,
    );
    workflow.load().expect("load");

    let report = workflow.annotate_all().expect("annotate");

    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);
    let roster = workflow.roster().expect("roster");
    let chen = roster.get("Chen").expect("Chen");
    assert_eq!(chen.ai_risk, "中風險");
    assert_eq!(chen.ai_interactions, "", "a no-interaction answer is stored empty");
    assert_eq!(chen.status, ReviewStatus::Annotated);
    let wang = roster.get("Wang").expect("Wang");
    assert_eq!(wang.ai_risk, "");
    assert!(store.appended().is_empty());

    let requests = mock_advisor
        .runtime
        .block_on(mock_advisor.server.received_requests())
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 2, "Wang has no medications and needs no call");
}
