use super::fakes::*;
use crate::rag::deal_flow::match_score;
use crate::rag::synthesize::{DEAL_FLOW_INSTRUCTION, NO_STARTUPS_MATCHED};
use crate::rag::{run_deal_flow_pipeline, Stage, CRITERIA_LIMIT};
use crate::types::{Chunk, DealCriteria, TicketRange};
use std::sync::Arc;
use venturegraph_core::AppError;

fn fintech_seed() -> DealCriteria {
    DealCriteria {
        sector: vec!["FinTech".to_string()],
        stage: "Seed".to_string(),
        ticket_size: TicketRange::new(100_000.0, 5_000_000.0),
    }
}

fn startup(id: &str, file_name: &str, content: &str) -> Chunk {
    Chunk::new(id, content)
        .with_file_name(file_name)
        .with_page(1)
        .with_sector(vec!["FinTech".to_string()])
        .with_stage("Seed")
        .with_ticket_size(1_000_000.0)
}

fn startups(n: usize) -> Vec<Chunk> {
    (0..n)
        .map(|i| startup(&format!("s{}", i), &format!("startup-{}.pdf", i), &format!("Startup {} pitch", i)))
        .collect()
}

#[tokio::test]
async fn test_fintech_seed_matches_ranked_with_descending_scores() {
    let harness = Harness {
        store: Arc::new(FakeStore::criteria(vec![
            startup("s0", "PayFlow.pdf", "PayFlow builds payment rails for SMEs."),
            startup("s1", "LendLoop.pdf", "LendLoop offers invoice financing."),
            startup("s2", "Coinly.pdf", "Coinly runs a crypto savings app."),
            startup("s3", "Ledgerly.pdf", "Ledgerly automates bookkeeping."),
        ])),
        reranker: Arc::new(FakeReranker::ordering(&[3, 1, 0, 2])),
        ..Harness::new()
    };

    let state = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap();

    let names: Vec<&str> = state.matches.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ledgerly", "LendLoop", "PayFlow", "Coinly"]);

    for (i, m) in state.matches.iter().enumerate() {
        assert!((m.score - (0.8 - 0.05 * i as f64)).abs() < 1e-9);
        assert_eq!(m.sector, "FinTech");
        assert_eq!(m.stage, "Seed");
        assert_eq!(m.citations, vec![state.citations()[i].clone()]);
    }
    assert!(state
        .matches
        .windows(2)
        .all(|pair| pair[0].score > pair[1].score));

    assert_eq!(state.report, "Grounded answer [1] [2] [3] [4]");
    assert!(state.degradations.is_empty());

    let response = state.to_response();
    assert_eq!(response.matches.len(), 4);
    assert_eq!(response.citations.len(), 4);
    assert_eq!(response.citations[0].source, "Ledgerly.pdf");
}

#[tokio::test]
async fn test_collaborators_receive_criteria_query_and_instruction() {
    let store = Arc::new(FakeStore::criteria(startups(3)));
    let harness = Harness {
        store: store.clone(),
        ..Harness::new()
    };

    run_deal_flow_pipeline(&harness.deps(), fintech_seed()).await.unwrap();

    let criteria_calls = store.criteria_calls.lock().unwrap().clone();
    assert_eq!(criteria_calls, vec![(fintech_seed(), CRITERIA_LIMIT)]);

    let rerank_calls = harness.reranker.calls.lock().unwrap().clone();
    assert_eq!(rerank_calls, vec![("FinTech Seed startup".to_string(), 3, 10)]);

    let generation = harness.generator.last_call().unwrap();
    assert_eq!(generation.query, DEAL_FLOW_INSTRUCTION);
    assert!(generation.context.starts_with("Startup 1:\nStartup 0 pitch"));
    assert!(generation.context.contains("\n\nStartup 3:\nStartup 2 pitch"));

    // Deal flow never consults web search or the translator
    assert_eq!(harness.web_search.call_count(), 0);
    assert!(harness.translator.calls().is_empty());
}

#[tokio::test]
async fn test_no_match_yields_literal_report() {
    let harness = Harness::new();

    let state = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap();

    assert_eq!(state.report, NO_STARTUPS_MATCHED);
    assert!(state.matches.is_empty());
    assert!(state.citations().is_empty());
    assert_eq!(harness.reranker.call_count(), 0);
    assert_eq!(harness.generator.call_count(), 0);

    let response = state.to_response();
    assert_eq!(response.report, "No startups matched the given criteria.");
    assert!(response.matches.is_empty());
}

#[tokio::test]
async fn test_rerank_failure_keeps_first_five_matches() {
    let harness = Harness {
        store: Arc::new(FakeStore::criteria(startups(8))),
        reranker: Arc::new(FakeReranker::failing()),
        ..Harness::new()
    };

    let state = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap();

    let ids: Vec<&str> = state.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s1", "s2", "s3", "s4"]);
    assert_eq!(state.matches[4].score, match_score(4));
    assert_eq!(state.degradations.len(), 1);
    assert_eq!(state.degradations[0].stage, Stage::Rerank);
}

#[tokio::test]
async fn test_report_failure_returns_context_fallback() {
    let harness = Harness {
        store: Arc::new(FakeStore::criteria(startups(2))),
        generator: Arc::new(FakeGenerator::failing()),
        ..Harness::new()
    };

    let state = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap();

    assert!(state.report.starts_with("AI report generation unavailable"));
    assert!(state.report.contains("Startup 1:\nStartup 0 pitch"));
    assert_eq!(state.matches.len(), 2);
    assert_eq!(state.degradations[0].stage, Stage::Synthesis);
}

#[tokio::test]
async fn test_scores_never_negative() {
    let harness = Harness {
        store: Arc::new(FakeStore::criteria(startups(25))),
        reranker: Arc::new(FakeReranker::ordering(&(0..25).collect::<Vec<_>>())),
        ..Harness::new()
    };

    let state = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap();

    // The reranker caps the list at ten
    assert_eq!(state.matches.len(), 10);
    assert!(state.matches.iter().all(|m| m.score >= 0.0));
}

#[tokio::test]
async fn test_store_failure_fails_the_run() {
    let harness = Harness {
        store: Arc::new(FakeStore::failing()),
        ..Harness::new()
    };

    let err = run_deal_flow_pipeline(&harness.deps(), fintech_seed())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}
