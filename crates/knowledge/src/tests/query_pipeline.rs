use super::fakes::*;
use crate::language::Language;
use crate::rag::synthesize::NO_RELEVANT_INFORMATION;
use crate::rag::{run_query_pipeline, Stage, EXCERPT_CHARS, RETRIEVAL_LIMIT};
use crate::types::Chunk;
use std::sync::Arc;
use venturegraph_core::AppError;

const QUERY: &str = "What is the total funding ask?";
const QUERY_HI: &str = "कुल फंडिंग की मांग क्या है?";

fn funding_chunks() -> Vec<Chunk> {
    vec![
        deck_chunk("c1", "acme-deck.pdf", 3, "We are raising a total funding round of $2M to expand sales."),
        deck_chunk("c2", "acme-deck.pdf", 4, "Use of funding: 40% engineering, 30% marketing, 30% runway."),
        Chunk::new("c3", "The team has raised prior funding twice before this round."),
    ]
}

fn numbered_chunks(n: usize) -> Vec<Chunk> {
    (0..n)
        .map(|i| deck_chunk(&format!("c{}", i), "deck.pdf", i as u32 + 1, &format!("Slide {} content", i)))
        .collect()
}

fn ids(chunks: &[Chunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test]
async fn test_english_query_end_to_end() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["Acme closes total funding of $2M"])),
        reranker: Arc::new(FakeReranker::ordering(&[2, 0, 1])),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    assert_eq!(state.header.original_language, Language::En);
    assert_eq!(state.header.translated_query, QUERY);
    assert_eq!(ids(state.ranked.chunks()), vec!["c3", "c1", "c2"]);
    assert_eq!(state.response, "Grounded answer [1] [2] [3]");
    assert!(!state.response.contains("[4]"));
    assert!(state.degradations.is_empty());

    // Baseline-language queries never reach the translator, in either direction
    assert!(harness.translator.calls().is_empty());

    let response = state.to_response();
    assert_eq!(response.original_language, Language::En);
    assert_eq!(response.citations.len(), 3);
    assert_eq!(response.citations[0].source, "Document");
    assert_eq!(response.citations[1].source, "acme-deck.pdf");
    assert_eq!(response.citations[1].page, Some(3));
}

#[tokio::test]
async fn test_collaborators_receive_translated_query_and_limits() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["total funding news"])),
        ..Harness::new()
    };

    run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    let web_queries = harness.web_search.queries.lock().unwrap().clone();
    assert_eq!(web_queries, vec![(QUERY.to_string(), 3)]);

    let rerank_calls = harness.reranker.calls.lock().unwrap().clone();
    assert_eq!(rerank_calls, vec![(QUERY.to_string(), 3, 10)]);

    let generation = harness.generator.last_call().unwrap();
    assert_eq!(generation.query, QUERY);
    assert_eq!(generation.citations.len(), 3);
    assert!(generation.context.contains("\n\n"));
}

#[tokio::test]
async fn test_store_receives_retrieval_limit() {
    let store = Arc::new(FakeStore::hybrid(numbered_chunks(30)));
    let harness = Harness {
        store: store.clone(),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), "slide content").await.unwrap();

    assert_eq!(state.retrieved.len(), RETRIEVAL_LIMIT);
    let calls = store.hybrid_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("slide content".to_string(), RETRIEVAL_LIMIT)]);
}

#[tokio::test]
async fn test_hindi_query_translates_forward_and_back_once() {
    let harness = Harness {
        translator: Arc::new(FakeTranslator::default().with_entry(QUERY_HI, QUERY)),
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["total funding"])),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY_HI).await.unwrap();

    assert_eq!(state.header.original_language, Language::Hi);
    assert_eq!(state.header.query, QUERY_HI);
    assert_eq!(state.header.translated_query, QUERY);

    // Every later stage saw the baseline rendering
    assert_eq!(harness.generator.last_call().unwrap().query, QUERY);

    let answer = "Grounded answer [1] [2] [3]";
    assert_eq!(
        harness.translator.calls(),
        vec![
            (QUERY_HI.to_string(), Language::En),
            (answer.to_string(), Language::Hi),
        ]
    );
    assert_eq!(state.response, format!("[hi] {}", answer));
    assert_eq!(state.to_response().original_language, Language::Hi);
}

#[tokio::test]
async fn test_tamil_query_reports_tamil() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), "மொத்த நிதி கோரிக்கை என்ன?")
        .await
        .unwrap();

    assert_eq!(state.header.original_language, Language::Ta);
    assert!(state.response.starts_with("[ta] "));
    assert_eq!(harness.translator.calls().len(), 2);
}

#[tokio::test]
async fn test_citations_align_with_context_chunks() {
    let long = "Revenue grew 3x year over year. ".repeat(20);
    let mut chunks = funding_chunks();
    chunks.push(deck_chunk("c4", "financials.pdf", 9, &long));

    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(chunks)),
        reranker: Arc::new(FakeReranker::ordering(&[3, 1, 99, 0])),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    // Index 99 resolves to nothing and is dropped
    assert_eq!(ids(state.ranked.chunks()), vec!["c4", "c2", "c1"]);
    assert!(state.ranked.is_aligned());
    assert_eq!(state.citations().len(), state.ranked.len());

    for (chunk, citation) in state.ranked.chunks().iter().zip(state.citations()) {
        assert!(citation.excerpt.chars().count() <= EXCERPT_CHARS);
        assert!(chunk.content.starts_with(&citation.excerpt));
    }
    assert_eq!(state.citations()[0].excerpt.chars().count(), EXCERPT_CHARS);

    let generation = harness.generator.last_call().unwrap();
    assert_eq!(generation.citations, state.citations().to_vec());
    assert!(generation.context.starts_with("Revenue grew 3x"));
}

#[tokio::test]
async fn test_uncorroborated_chunks_fall_back_to_retrieved_set() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["Monsoon arrives early this year"])),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    assert_eq!(state.validated, state.retrieved);
    assert_eq!(state.degradations.len(), 1);
    assert_eq!(state.degradations[0].stage, Stage::Validation);
}

#[tokio::test]
async fn test_web_search_outage_keeps_retrieved_set() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::failing()),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    assert_eq!(state.validated, state.retrieved);
    assert_eq!(state.ranked.len(), 3);
    assert!(state.degradations[0].reason.contains("connection refused"));
}

#[tokio::test]
async fn test_partial_corroboration_filters() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["Acme plans to expand sales"])),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), "expand sales team").await.unwrap();

    assert_eq!(ids(&state.validated), vec!["c1"]);
    assert_eq!(ids(state.ranked.chunks()), vec!["c1"]);
    assert!(state.degradations.is_empty());
}

#[tokio::test]
async fn test_rerank_failure_keeps_first_five_in_retrieval_order() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(numbered_chunks(7))),
        web_search: Arc::new(FakeWebSearch::failing()),
        reranker: Arc::new(FakeReranker::failing()),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), "slide content").await.unwrap();

    assert_eq!(ids(state.ranked.chunks()), vec!["c0", "c1", "c2", "c3", "c4"]);
    assert_eq!(state.citations().len(), 5);
    let stages: Vec<Stage> = state.degradations.iter().map(|d| d.stage).collect();
    assert_eq!(stages, vec![Stage::Validation, Stage::Rerank]);
    assert_eq!(state.response, "Grounded answer [1] [2] [3] [4] [5]");
}

#[tokio::test]
async fn test_rerank_failure_with_fewer_than_five() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(numbered_chunks(2))),
        reranker: Arc::new(FakeReranker::failing()),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), "slide content").await.unwrap();
    assert_eq!(ids(state.ranked.chunks()), vec!["c0", "c1"]);
}

#[tokio::test]
async fn test_empty_retrieval_skips_every_provider() {
    let harness = Harness::new();

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    assert_eq!(state.response, NO_RELEVANT_INFORMATION);
    assert!(state.ranked.is_empty());
    assert!(state.citations().is_empty());
    assert!(state.degradations.is_empty());
    assert_eq!(harness.web_search.call_count(), 0);
    assert_eq!(harness.reranker.call_count(), 0);
    assert_eq!(harness.generator.call_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_returns_context_fallback() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        generator: Arc::new(FakeGenerator::failing()),
        ..Harness::new()
    };

    let state = run_query_pipeline(&harness.deps(), QUERY).await.unwrap();

    assert!(state
        .response
        .starts_with("AI reasoning is temporarily unavailable"));
    assert!(state.response.contains("We are raising a total funding round"));
    assert_eq!(state.citations().len(), 3);
    assert!(state
        .degradations
        .iter()
        .any(|d| d.stage == Stage::Synthesis));
}

#[tokio::test]
async fn test_embedder_failure_fails_the_run() {
    let harness = Harness {
        embedder: Arc::new(FailingEmbedder),
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        ..Harness::new()
    };

    let err = run_query_pipeline(&harness.deps(), QUERY).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream { .. }));
    assert_eq!(harness.generator.call_count(), 0);
}

#[tokio::test]
async fn test_store_failure_fails_the_run() {
    let harness = Harness {
        store: Arc::new(FakeStore::failing()),
        ..Harness::new()
    };

    let err = run_query_pipeline(&harness.deps(), QUERY).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}

#[tokio::test]
async fn test_translator_failure_fails_non_baseline_runs_only() {
    let harness = Harness {
        translator: Arc::new(FakeTranslator::failing()),
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        ..Harness::new()
    };

    assert!(run_query_pipeline(&harness.deps(), QUERY_HI).await.is_err());
    assert!(run_query_pipeline(&harness.deps(), QUERY).await.is_ok());
}

#[tokio::test]
async fn test_blank_query_rejected_before_any_call() {
    let harness = Harness::new();

    let err = run_query_pipeline(&harness.deps(), "  ").await.unwrap_err();
    assert!(matches!(err, AppError::Request(_)));
    assert!(harness.translator.calls().is_empty());
}

#[tokio::test]
async fn test_identical_queries_repeat_every_call() {
    let harness = Harness {
        store: Arc::new(FakeStore::hybrid(funding_chunks())),
        web_search: Arc::new(FakeWebSearch::returning(&["total funding"])),
        ..Harness::new()
    };
    let deps = harness.deps();

    let first = run_query_pipeline(&deps, QUERY).await.unwrap();
    let second = run_query_pipeline(&deps, QUERY).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.web_search.call_count(), 2);
    assert_eq!(harness.generator.call_count(), 2);
}
