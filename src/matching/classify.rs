use crate::config::MatchingConfig;
use crate::core::model::{Classification, ClassificationOrigin, MatchReport, RowKind};
use crate::matching::ReferenceSet;

/// Links a row when the best rating clears the link threshold; otherwise the
/// raw identifier stands on its own and the row is flagged for review.
pub fn classify(raw_identifier: &str, report: &MatchReport, config: &MatchingConfig) -> Classification {
    let best = &report.best_match;
    if best.rating > config.link_threshold {
        Classification {
            kind: RowKind::Linked,
            matched_reference: best.target.clone(),
            needs_review: best.rating < config.review_threshold,
            similarity: best.rating,
            origin: ClassificationOrigin::Auto,
        }
    } else {
        Classification {
            kind: RowKind::Unlinked,
            matched_reference: raw_identifier.trim().to_string(),
            needs_review: true,
            similarity: best.rating,
            origin: ClassificationOrigin::Auto,
        }
    }
}

pub fn classify_identifier(
    raw_identifier: &str,
    references: &ReferenceSet,
    config: &MatchingConfig,
) -> Classification {
    let report = references.rank(raw_identifier, config.scorer);
    classify(raw_identifier, &report, config)
}
