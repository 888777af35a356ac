//! Scoring a caption selection against a meme's correct captions.

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{CorrectCaption, ScoreOutcome};

/// Score a selection. Stateless; the full correct set is always returned.
pub async fn score(
    repo: &Repository,
    meme_id: i64,
    selected_caption_id: i64,
) -> Result<ScoreOutcome, AppError> {
    if repo.get_meme(meme_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Meme {} not found", meme_id)));
    }

    let correct = repo.correct_captions(meme_id).await?;
    let outcome = evaluate(&correct, selected_caption_id);

    tracing::debug!(
        meme_id,
        selected_caption_id,
        points = outcome.points,
        "Scored selection"
    );

    Ok(outcome)
}

/// Points for `selected` given the meme's correct captions.
pub fn evaluate(correct: &[CorrectCaption], selected: i64) -> ScoreOutcome {
    let points = correct
        .iter()
        .find(|c| c.id == selected)
        .map(|c| c.points)
        .unwrap_or(0);

    ScoreOutcome {
        points,
        correct_caption_ids: correct.iter().map(|c| c.id).collect(),
        correct_captions: correct.iter().map(CorrectCaption::caption).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct_set() -> Vec<CorrectCaption> {
        vec![
            CorrectCaption {
                id: 11,
                text: "c1".into(),
                points: 3,
            },
            CorrectCaption {
                id: 12,
                text: "c2".into(),
                points: 2,
            },
            CorrectCaption {
                id: 13,
                text: "c3".into(),
                points: 1,
            },
        ]
    }

    #[test]
    fn test_correct_selection_earns_association_points() {
        let correct = correct_set();
        assert_eq!(evaluate(&correct, 11).points, 3);
        assert_eq!(evaluate(&correct, 12).points, 2);
        assert_eq!(evaluate(&correct, 13).points, 1);
    }

    #[test]
    fn test_wrong_selection_still_reveals_answers() {
        let outcome = evaluate(&correct_set(), 99);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.correct_caption_ids, vec![11, 12, 13]);
        assert_eq!(outcome.correct_captions.len(), 3);
        assert_eq!(outcome.correct_captions[0].text, "c1");
    }

    #[test]
    fn test_evaluate_is_pure() {
        let correct = correct_set();
        assert_eq!(evaluate(&correct, 12), evaluate(&correct, 12));
    }

    #[test]
    fn test_meme_without_answers() {
        let outcome = evaluate(&[], 5);
        assert_eq!(outcome.points, 0);
        assert!(outcome.correct_caption_ids.is_empty());
    }
}
