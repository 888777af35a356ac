//! Round generation.
//!
//! A round is one meme plus up to [`ROUND_SIZE`] caption options: every correct
//! caption for the meme, topped up with random distractors, then shuffled.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Caption, CorrectCaption, Round};

/// Total number of caption options offered per round.
pub const ROUND_SIZE: usize = 7;

/// Pick an unused meme and assemble its caption options.
///
/// Read-only: the caller records the returned meme id into the exclusion set.
pub async fn next_round(repo: &Repository, excluded: &[i64]) -> Result<Round, AppError> {
    let ids = repo.list_meme_ids().await?;
    let meme_id = {
        let mut rng = rand::thread_rng();
        pick_meme(&ids, excluded, &mut rng)?
    };

    let meme = repo
        .get_meme(meme_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Meme {} not found", meme_id)))?;

    let correct = repo.correct_captions(meme_id).await?;
    let wanted = ROUND_SIZE.saturating_sub(correct.len());
    let distractors = repo.random_distractors(meme_id, wanted).await?;

    let captions = {
        let mut rng = rand::thread_rng();
        assemble_options(&correct, distractors, &mut rng)
    };

    tracing::debug!(
        meme_id,
        correct = correct.len(),
        options = captions.len(),
        "Generated round"
    );

    Ok(Round { meme, captions })
}

/// Choose uniformly among memes not in `excluded`.
pub fn pick_meme<R: Rng + ?Sized>(
    ids: &[i64],
    excluded: &[i64],
    rng: &mut R,
) -> Result<i64, AppError> {
    let excluded: HashSet<i64> = excluded.iter().copied().collect();
    let candidates: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|id| !excluded.contains(id))
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or(AppError::ContentExhausted)
}

/// Merge correct captions and distractors into a shuffled, duplicate-free option list.
///
/// Correct captions are always kept; distractors fill the remaining slots up to
/// [`ROUND_SIZE`]. Fewer options are returned when content is sparse.
pub fn assemble_options<R: Rng + ?Sized>(
    correct: &[CorrectCaption],
    distractors: Vec<Caption>,
    rng: &mut R,
) -> Vec<Caption> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut options: Vec<Caption> = Vec::with_capacity(ROUND_SIZE);

    for caption in correct {
        if seen.insert(caption.id) {
            options.push(caption.caption());
        }
    }

    for caption in distractors {
        if options.len() >= ROUND_SIZE {
            break;
        }
        if seen.insert(caption.id) {
            options.push(caption);
        }
    }

    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn correct(id: i64, points: i64) -> CorrectCaption {
        CorrectCaption {
            id,
            text: format!("correct {}", id),
            points,
        }
    }

    fn caption(id: i64) -> Caption {
        Caption {
            id,
            text: format!("caption {}", id),
        }
    }

    #[test]
    fn test_pick_meme_skips_excluded() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = [1, 2, 3, 4];
        for _ in 0..100 {
            let id = pick_meme(&ids, &[1, 3], &mut rng).unwrap();
            assert!(id == 2 || id == 4);
        }
    }

    #[test]
    fn test_pick_meme_exhausted() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = pick_meme(&[1, 2], &[2, 1], &mut rng).unwrap_err();
        assert!(matches!(err, AppError::ContentExhausted));

        let err = pick_meme(&[], &[], &mut rng).unwrap_err();
        assert!(matches!(err, AppError::ContentExhausted));
    }

    #[test]
    fn test_assemble_full_round() {
        let mut rng = StdRng::seed_from_u64(1);
        let correct = vec![correct(1, 3), correct(2, 2), correct(3, 1)];
        let distractors = (10..20).map(caption).collect();

        let options = assemble_options(&correct, distractors, &mut rng);

        assert_eq!(options.len(), ROUND_SIZE);
        for id in [1, 2, 3] {
            assert!(options.iter().any(|c| c.id == id));
        }
        let unique: HashSet<i64> = options.iter().map(|c| c.id).collect();
        assert_eq!(unique.len(), options.len());
    }

    #[test]
    fn test_assemble_sparse_content() {
        let mut rng = StdRng::seed_from_u64(2);
        let correct = vec![correct(1, 3), correct(2, 2)];
        let distractors = vec![caption(10)];

        let options = assemble_options(&correct, distractors, &mut rng);

        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_assemble_without_correct_captions() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = assemble_options(&[], (1..=9).map(caption).collect(), &mut rng);
        assert_eq!(options.len(), ROUND_SIZE);
    }

    #[test]
    fn test_assemble_drops_duplicate_distractor() {
        let mut rng = StdRng::seed_from_u64(4);
        let correct = vec![correct(1, 3)];
        let distractors = vec![caption(1), caption(5), caption(5)];

        let options = assemble_options(&correct, distractors, &mut rng);

        let mut ids: Vec<i64> = options.iter().map(|c| c.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_assemble_order_varies() {
        let correct = vec![correct(1, 3), correct(2, 2), correct(3, 1)];
        let orders: HashSet<Vec<i64>> = (0..20)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let distractors = (10..14).map(caption).collect();
                assemble_options(&correct, distractors, &mut rng)
                    .iter()
                    .map(|c| c.id)
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
