//! Deal-flow matching pipeline.

use super::citations::RankedChunks;
use super::outcome::Stage;
use super::rank::rerank_candidates;
use super::state::{CriteriaMatched, DealFlowState, RankedMatches};
use super::synthesize::{report_context, synthesize, Synthesis, DEAL_FLOW_INSTRUCTION, NO_STARTUPS_MATCHED};
use crate::deps::Collaborators;
use crate::generation::GenerationProvider;
use crate::rerank::RerankProvider;
use crate::store::VectorStore;
use crate::types::{char_prefix, DealCriteria, StartupMatch};
use tracing::Instrument;
use venturegraph_core::{AppError, AppResult};

/// Maximum chunks pulled from the store per criteria search.
pub const CRITERIA_LIMIT: usize = 30;

/// Score of the top-ranked match.
pub const TOP_SCORE: f64 = 0.8;

/// Score lost per rank position.
pub const SCORE_STEP: f64 = 0.05;

/// Characters of chunk content kept as a match description.
pub const DESCRIPTION_CHARS: usize = 500;

const UNKNOWN: &str = "Unknown";
const PDF_SUFFIX: &str = ".pdf";

/// Match `criteria` against the stored documents and write a report.
///
/// An empty criteria search short-circuits to a literal report with no
/// matches. Reranking and report synthesis degrade instead of failing;
/// store errors fail the run.
pub async fn run_deal_flow_pipeline(deps: &Collaborators, criteria: DealCriteria) -> AppResult<DealFlowState> {
    let span = tracing::info_span!("deal_flow_pipeline", stage = %criteria.stage);
    async move {
        let matched = retrieve(deps.store.as_ref(), criteria).await?;

        if matched.matched.is_empty() {
            tracing::info!("No stored chunk matched the criteria");
            return Ok(DealFlowState {
                criteria: matched.criteria,
                matched: Vec::new(),
                ranked: RankedChunks::empty(),
                report: NO_STARTUPS_MATCHED.to_string(),
                matches: Vec::new(),
                degradations: Vec::new(),
            });
        }

        let ranked = rank(deps.reranker.as_ref(), matched).await;
        let state = report(deps.generator.as_ref(), ranked).await;

        tracing::info!(
            matches = state.matches.len(),
            degraded = state.degradations.len(),
            "Deal flow report ready"
        );
        Ok::<_, AppError>(state)
    }
    .instrument(span)
    .await
}

async fn retrieve(store: &dyn VectorStore, criteria: DealCriteria) -> AppResult<CriteriaMatched> {
    let matched = store.criteria_search(&criteria, CRITERIA_LIMIT).await?;
    tracing::info!("Criteria search matched {} chunks", matched.len());
    Ok(CriteriaMatched { criteria, matched })
}

async fn rank(reranker: &dyn RerankProvider, matched: CriteriaMatched) -> RankedMatches {
    let query = matched.criteria.rerank_query();
    let (ranked, degradation) = rerank_candidates(reranker, &query, &matched.matched)
        .await
        .settle(Stage::Rerank);

    RankedMatches {
        criteria: matched.criteria,
        matched: matched.matched,
        ranked,
        degradations: degradation.into_iter().collect(),
    }
}

async fn report(generator: &dyn GenerationProvider, ranked: RankedMatches) -> DealFlowState {
    let context = report_context(ranked.ranked.chunks());
    let (report, degradation) = synthesize(
        generator,
        Synthesis::Report,
        DEAL_FLOW_INSTRUCTION,
        &context,
        ranked.ranked.citations(),
    )
    .await
    .settle(Stage::Synthesis);

    let mut degradations = ranked.degradations;
    degradations.extend(degradation);

    DealFlowState {
        matches: startup_matches(&ranked.ranked),
        criteria: ranked.criteria,
        matched: ranked.matched,
        ranked: ranked.ranked,
        report,
        degradations,
    }
}

/// Score for the match at zero-based `rank`, floored at zero.
pub fn match_score(rank: usize) -> f64 {
    (TOP_SCORE - SCORE_STEP * rank as f64).max(0.0)
}

/// One match per ranked chunk, in rank order, each carrying that chunk's
/// citation.
pub fn startup_matches(ranked: &RankedChunks) -> Vec<StartupMatch> {
    ranked
        .chunks()
        .iter()
        .zip(ranked.citations())
        .enumerate()
        .map(|(i, (chunk, citation))| {
            let name = match &chunk.metadata.file_name {
                Some(file_name) => startup_name(file_name).to_string(),
                None => format!("Startup {}", i + 1),
            };
            let sector = match &chunk.metadata.sector {
                Some(tags) if !tags.is_empty() => tags.join(", "),
                _ => UNKNOWN.to_string(),
            };

            StartupMatch {
                id: chunk.id.clone(),
                name,
                sector,
                stage: chunk
                    .metadata
                    .stage
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                score: match_score(i),
                description: char_prefix(&chunk.content, DESCRIPTION_CHARS).to_string(),
                citations: vec![citation.clone()],
            }
        })
        .collect()
}

/// File name without a trailing `.pdf`, in any letter case.
fn startup_name(file_name: &str) -> &str {
    let stem_len = file_name.len().saturating_sub(PDF_SUFFIX.len());
    match file_name.get(stem_len..) {
        Some(suffix) if stem_len > 0 && suffix.eq_ignore_ascii_case(PDF_SUFFIX) => &file_name[..stem_len],
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    #[test]
    fn test_match_score_descends_and_floors() {
        assert_eq!(match_score(0), 0.8);
        assert!((match_score(3) - 0.65).abs() < 1e-9);
        assert_eq!(match_score(16), 0.0);
        assert_eq!(match_score(40), 0.0);
    }

    #[test]
    fn test_startup_name_strips_pdf_in_any_case() {
        assert_eq!(startup_name("PayFlow.pdf"), "PayFlow");
        assert_eq!(startup_name("Deck.PDF"), "Deck");
        assert_eq!(startup_name("Ledgerly.Pdf"), "Ledgerly");
        assert_eq!(startup_name("memo.txt"), "memo.txt");
        assert_eq!(startup_name(".pdf"), ".pdf");
        assert_eq!(startup_name("Café"), "Café");
    }

    #[test]
    fn test_startup_matches_fields() {
        let ranked = RankedChunks::new(vec![
            Chunk::new("c1", "PayFlow builds payment rails")
                .with_file_name("PayFlow.pdf")
                .with_sector(vec!["FinTech".to_string(), "SaaS".to_string()])
                .with_stage("Seed")
                .with_page(3),
            Chunk::new("c2", "x".repeat(800)),
        ]);

        let matches = startup_matches(&ranked);
        assert_eq!(matches.len(), 2);

        assert_eq!(matches[0].name, "PayFlow");
        assert_eq!(matches[0].sector, "FinTech, SaaS");
        assert_eq!(matches[0].stage, "Seed");
        assert_eq!(matches[0].citations, vec![ranked.citations()[0].clone()]);
        assert_eq!(matches[0].citations[0].page, Some(3));

        assert_eq!(matches[1].name, "Startup 2");
        assert_eq!(matches[1].sector, "Unknown");
        assert_eq!(matches[1].stage, "Unknown");
        assert_eq!(matches[1].description.chars().count(), 500);
        assert!((matches[1].score - 0.75).abs() < 1e-9);
    }
}
