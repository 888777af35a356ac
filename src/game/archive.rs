//! Match archive: write-once history of completed matches.
//!
//! Round records are stored whole as a JSON blob. Their shape is owned by the client
//! and never queried structurally.

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{MatchDetail, MatchSummary};

/// Persists and retrieves completed matches.
#[derive(Clone)]
pub struct MatchArchive {
    repo: Repository,
}

impl MatchArchive {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Store a completed match under its session-issued id and credit its total
    /// to the user.
    pub async fn archive(
        &self,
        match_id: &str,
        user_id: &str,
        rounds: &[serde_json::Value],
        total_points: i64,
    ) -> Result<(), AppError> {
        let rounds_json = serde_json::to_string(rounds)?;
        self.repo
            .insert_match(match_id, user_id, &rounds_json, total_points)
            .await?;

        tracing::info!(%user_id, %match_id, total_points, "Archived match");
        Ok(())
    }

    /// A user's matches, most recent first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MatchSummary>, AppError> {
        self.repo.list_matches(user_id).await
    }

    /// Full detail of a match owned by `user_id`, with every round.
    ///
    /// Matches belonging to other users are reported as not found.
    pub async fn get_detail(&self, user_id: &str, match_id: &str) -> Result<MatchDetail, AppError> {
        match self.repo.get_match(match_id).await? {
            Some(detail) if detail.user_id == user_id => Ok(detail),
            _ => Err(AppError::NotFound(format!("Match {} not found", match_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;
    use tempfile::TempDir;

    fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    async fn archive_fixture() -> (MatchArchive, Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        let repo = Repository::new(pool);
        (MatchArchive::new(repo.clone()), repo, temp_dir)
    }

    #[tokio::test]
    async fn test_archive_credits_user_points() {
        let (archive, repo, _dir) = archive_fixture().await;
        let user = repo.create_user("Ann", "ann", "hash").await.unwrap();

        let rounds = vec![json!({"points": 3}), json!({"points": 0}), json!({"points": 1})];
        let match_id = new_id();
        archive.archive(&match_id, &user.id, &rounds, 4).await.unwrap();

        let detail = archive.get_detail(&user.id, &match_id).await.unwrap();
        assert_eq!(detail.total_points, 4);
        assert_eq!(detail.rounds, rounds);

        let refreshed = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.points, 4);

        archive.archive(&new_id(), &user.id, &rounds, 2).await.unwrap();
        let refreshed = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.points, 6);
    }

    #[tokio::test]
    async fn test_history_most_recent_first() {
        let (archive, repo, _dir) = archive_fixture().await;
        let user = repo.create_user("Bo", "bo", "hash").await.unwrap();

        let (first, second) = (new_id(), new_id());
        archive.archive(&first, &user.id, &[], 1).await.unwrap();
        archive.archive(&second, &user.id, &[], 2).await.unwrap();

        let list = archive.list_for_user(&user.id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second);
        assert_eq!(list[1].id, first);
    }

    #[tokio::test]
    async fn test_detail_hidden_from_other_users() {
        let (archive, repo, _dir) = archive_fixture().await;
        let owner = repo.create_user("Cy", "cy", "hash").await.unwrap();
        let other = repo.create_user("Di", "di", "hash").await.unwrap();

        let match_id = new_id();
        archive.archive(&match_id, &owner.id, &[], 3).await.unwrap();

        let err = archive.get_detail(&other.id, &match_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_archive_unknown_user() {
        let (archive, _repo, _dir) = archive_fixture().await;
        let err = archive
            .archive(&new_id(), "nobody", &[], 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_match_archived_once() {
        let (archive, repo, _dir) = archive_fixture().await;
        let user = repo.create_user("Ed", "ed", "hash").await.unwrap();
        let match_id = new_id();

        archive.archive(&match_id, &user.id, &[], 5).await.unwrap();
        let err = archive
            .archive(&match_id, &user.id, &[], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let refreshed = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.points, 5);
        assert_eq!(archive.list_for_user(&user.id).await.unwrap().len(), 1);
    }
}
