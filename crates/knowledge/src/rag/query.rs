//! Query-answering pipeline.

use super::outcome::Stage;
use super::rank::rerank_candidates;
use super::state::{
    AnsweredQuery, DetectedQuery, EmbeddedQuery, QueryHeader, QueryState, RankedQuery, RetrievedQuery,
    TranslatedQuery, ValidatedQuery,
};
use super::synthesize::{answer_context, synthesize, Synthesis};
use super::validate::corroborate;
use crate::deps::Collaborators;
use crate::embeddings::EmbeddingProvider;
use crate::generation::GenerationProvider;
use crate::language::{Language, LanguageGate};
use crate::rerank::RerankProvider;
use crate::store::VectorStore;
use crate::websearch::WebSearchProvider;
use tracing::Instrument;
use venturegraph_core::{AppError, AppResult};

/// Maximum chunks pulled from the store per query.
pub const RETRIEVAL_LIMIT: usize = 20;

/// Answer `query` from the stored documents.
///
/// Runs detect, translate, embed, retrieve, validate, rerank, synthesize
/// and back-translate, in that order. Validation, reranking and synthesis
/// degrade instead of failing; translation, embedding and retrieval errors
/// fail the whole run.
pub async fn run_query_pipeline(deps: &Collaborators, query: &str) -> AppResult<QueryState> {
    if query.trim().is_empty() {
        return Err(AppError::Request("Query is required".to_string()));
    }

    let span = tracing::info_span!("query_pipeline");
    async move {
        let gate = deps.language_gate();

        let detected = detect(&gate, query);
        let translated = translate_query(&gate, detected).await?;
        let embedded = embed(deps.embedder.as_ref(), translated).await?;
        let retrieved = retrieve(deps.store.as_ref(), embedded).await?;
        let validated = validate(deps.web_search.as_ref(), retrieved).await;
        let ranked = rank(deps.reranker.as_ref(), validated).await;
        let answered = answer(deps.generator.as_ref(), ranked).await;
        let state = respond(&gate, answered).await?;

        tracing::info!(
            language = %state.header.original_language,
            citations = state.citations().len(),
            degraded = state.degradations.len(),
            "Query answered"
        );
        Ok::<_, AppError>(state)
    }
    .instrument(span)
    .await
}

fn detect(gate: &LanguageGate, query: &str) -> DetectedQuery {
    let original_language = gate.detect(query);
    tracing::debug!(language = %original_language, "Detected query language");
    DetectedQuery {
        query: query.to_string(),
        original_language,
    }
}

async fn translate_query(gate: &LanguageGate, detected: DetectedQuery) -> AppResult<TranslatedQuery> {
    let translated_query = gate
        .translate(&detected.query, detected.original_language, Language::BASELINE)
        .await?;

    Ok(TranslatedQuery {
        header: QueryHeader {
            query: detected.query,
            original_language: detected.original_language,
            translated_query,
        },
    })
}

async fn embed(embedder: &dyn EmbeddingProvider, translated: TranslatedQuery) -> AppResult<EmbeddedQuery> {
    let query_vector = embedder.embed(&translated.header.translated_query).await?;
    if query_vector.is_empty() {
        return Err(AppError::upstream(
            embedder.provider_name(),
            "Embedding provider returned an empty vector",
        ));
    }

    Ok(EmbeddedQuery {
        header: translated.header,
        query_vector,
    })
}

async fn retrieve(store: &dyn VectorStore, embedded: EmbeddedQuery) -> AppResult<RetrievedQuery> {
    let retrieved = store
        .hybrid_search(
            &embedded.header.translated_query,
            &embedded.query_vector,
            RETRIEVAL_LIMIT,
        )
        .await?;
    tracing::info!("Retrieved {} chunks", retrieved.len());

    Ok(RetrievedQuery {
        header: embedded.header,
        retrieved,
    })
}

async fn validate(web_search: &dyn WebSearchProvider, retrieved: RetrievedQuery) -> ValidatedQuery {
    let (validated, degradation) = corroborate(
        web_search,
        &retrieved.header.translated_query,
        &retrieved.retrieved,
    )
    .await
    .settle(Stage::Validation);

    ValidatedQuery {
        header: retrieved.header,
        retrieved: retrieved.retrieved,
        validated,
        degradations: degradation.into_iter().collect(),
    }
}

async fn rank(reranker: &dyn RerankProvider, validated: ValidatedQuery) -> RankedQuery {
    let (ranked, degradation) = rerank_candidates(
        reranker,
        &validated.header.translated_query,
        &validated.validated,
    )
    .await
    .settle(Stage::Rerank);

    let mut degradations = validated.degradations;
    degradations.extend(degradation);

    RankedQuery {
        header: validated.header,
        retrieved: validated.retrieved,
        validated: validated.validated,
        ranked,
        degradations,
    }
}

async fn answer(generator: &dyn GenerationProvider, ranked: RankedQuery) -> AnsweredQuery {
    let context = answer_context(ranked.ranked.chunks());
    let (answer, degradation) = synthesize(
        generator,
        Synthesis::Answer,
        &ranked.header.translated_query,
        &context,
        ranked.ranked.citations(),
    )
    .await
    .settle(Stage::Synthesis);

    let mut degradations = ranked.degradations;
    degradations.extend(degradation);

    AnsweredQuery {
        header: ranked.header,
        retrieved: ranked.retrieved,
        validated: ranked.validated,
        ranked: ranked.ranked,
        answer,
        degradations,
    }
}

async fn respond(gate: &LanguageGate, answered: AnsweredQuery) -> AppResult<QueryState> {
    let response = gate
        .translate(
            &answered.answer,
            Language::BASELINE,
            answered.header.original_language,
        )
        .await?;

    Ok(QueryState {
        header: answered.header,
        retrieved: answered.retrieved,
        validated: answered.validated,
        ranked: answered.ranked,
        response,
        degradations: answered.degradations,
    })
}
