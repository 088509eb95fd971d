//! Donation-to-request reconciliation.
//!
//! A donation fulfils at most one outstanding request: the oldest pending
//! high-priority request for the same resource type at the same camp.
//! Quantities are not compared or consumed; the match is a status flip.
//!
//! The lookup and the flip are one conditional `UPDATE`, so two donations
//! racing for the same request cannot both fulfil it. The second one sees no
//! pending row and does nothing.

use sqlx::SqliteConnection;

use crate::db::{resource_from_row, RESOURCE_COLUMNS};
use crate::errors::AppError;
use crate::models::{Priority, ResourceRecord, ResourceStatus, ResourceType};

/// Result of recording a donation.
#[derive(Debug, Clone)]
pub struct DonationOutcome {
    pub donation: ResourceRecord,
    /// The request this donation fulfilled, if any
    pub fulfilled: Option<ResourceRecord>,
}

/// What a pending request must share with a donation to be fulfilled by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriteria {
    pub resource_type: ResourceType,
    /// Camp identity resolved from the name at write time
    pub camp_id: String,
}

impl MatchCriteria {
    pub fn for_donation(donation: &ResourceRecord) -> Self {
        Self {
            resource_type: donation.resource_type,
            camp_id: donation.camp_id.clone(),
        }
    }
}

/// Mark the oldest matching pending request fulfilled and return it.
///
/// Ties on `created_at` go to the smallest id.
pub async fn fulfill_oldest_match(
    conn: &mut SqliteConnection,
    criteria: &MatchCriteria,
    fulfilled_at: &str,
) -> Result<Option<ResourceRecord>, AppError> {
    let sql = format!(
        r#"
        UPDATE resources
        SET status = ?, fulfilled_at = ?
        WHERE id = (
            SELECT id FROM resources
            WHERE status = ? AND priority = ? AND resource_type = ? AND camp_id = ?
            ORDER BY created_at ASC, id ASC
            LIMIT 1
        )
        AND status = ?
        RETURNING {RESOURCE_COLUMNS}
        "#
    );

    let row = sqlx::query(&sql)
        .bind(ResourceStatus::Fulfilled.as_str())
        .bind(fulfilled_at)
        .bind(ResourceStatus::Requested.as_str())
        .bind(Priority::High.as_str())
        .bind(criteria.resource_type.as_str())
        .bind(&criteria.camp_id)
        .bind(ResourceStatus::Requested.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Some(resource_from_row(&row)?)),
        None => {
            tracing::debug!(
                resource_type = criteria.resource_type.as_str(),
                camp_id = %criteria.camp_id,
                "No pending high priority request to fulfil"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::test_support::{camp_request, insert_pending_request, repo};
    use crate::db::Repository;
    use crate::models::{CreateResourceRequest, NewResource, ResourceKind};

    fn resource(kind: ResourceKind, rtype: &str, priority: &str, camp: &str) -> NewResource {
        CreateResourceRequest {
            name: Some("Ravi".to_string()),
            contact_number: Some("1234567890".to_string()),
            resource_type: Some(rtype.to_string()),
            quantity: Some(50),
            priority: Some(priority.to_string()),
            camp_name: Some(camp.to_string()),
            can_deliver_to_camp: Some(false),
        }
        .validate(kind)
        .unwrap()
    }

    async fn seed_camp(repo: &Repository, name: &str) {
        let camp = camp_request(name, 12.0, 77.0).validate().unwrap();
        repo.create_camp(&camp).await.unwrap();
    }

    #[tokio::test]
    async fn test_oldest_matching_request_is_fulfilled() {
        let (repo, _dir) = repo().await;
        seed_camp(&repo, "Central Relief Camp").await;
        seed_camp(&repo, "East Side Shelter").await;

        let request = |rtype: &str, priority: &str, camp: &str| {
            resource(ResourceKind::Request, rtype, priority, camp)
        };

        let oldest = repo
            .create_request(&request("food", "high", "Central Relief Camp"))
            .await
            .unwrap();
        let newer = repo
            .create_request(&request("food", "high", "Central Relief Camp"))
            .await
            .unwrap();
        let medium = repo
            .create_request(&request("food", "medium", "Central Relief Camp"))
            .await
            .unwrap();
        let other_camp = repo
            .create_request(&request("food", "high", "East Side Shelter"))
            .await
            .unwrap();
        let other_type = repo
            .create_request(&request("medicine", "high", "Central Relief Camp"))
            .await
            .unwrap();

        let outcome = repo
            .create_donation(&resource(
                ResourceKind::Donation,
                "food",
                "high",
                "Central Relief Camp",
            ))
            .await
            .unwrap();

        assert_eq!(outcome.donation.status, ResourceStatus::Donated);
        assert_eq!(outcome.donation.priority, Priority::Low);
        let fulfilled = outcome.fulfilled.expect("a request should be fulfilled");
        assert_eq!(fulfilled.id, oldest.id);
        assert!(fulfilled.fulfilled_at.is_some());

        let status_of = |id: String| {
            let repo = repo.clone();
            async move { repo.get_resource(&id).await.unwrap().unwrap().status }
        };
        assert_eq!(status_of(oldest.id).await, ResourceStatus::Fulfilled);
        for pending in [newer.id, medium.id, other_camp.id, other_type.id] {
            assert_eq!(status_of(pending).await, ResourceStatus::Requested);
        }
    }

    #[tokio::test]
    async fn test_donation_without_match_is_a_no_op() {
        let (repo, _dir) = repo().await;
        seed_camp(&repo, "Central Relief Camp").await;
        repo.create_request(&resource(
            ResourceKind::Request,
            "clothes",
            "high",
            "Central Relief Camp",
        ))
        .await
        .unwrap();

        let outcome = repo
            .create_donation(&resource(
                ResourceKind::Donation,
                "food",
                "low",
                "Central Relief Camp",
            ))
            .await
            .unwrap();

        assert!(outcome.fulfilled.is_none());
        let records = repo.list_resources().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.status != ResourceStatus::Fulfilled));
        assert_eq!(repo.inventory().await.unwrap().food, 50);
    }

    #[tokio::test]
    async fn test_each_request_fulfilled_at_most_once() {
        let (repo, _dir) = repo().await;
        seed_camp(&repo, "Central Relief Camp").await;
        let only = repo
            .create_request(&resource(
                ResourceKind::Request,
                "shelter",
                "high",
                "Central Relief Camp",
            ))
            .await
            .unwrap();

        let donation = resource(ResourceKind::Donation, "shelter", "low", "Central Relief Camp");
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let donation = donation.clone();
                tokio::spawn(async move { repo.create_donation(&donation).await.unwrap() })
            })
            .collect();

        let mut fulfilled = Vec::new();
        for task in tasks {
            if let Some(request) = task.await.unwrap().fulfilled {
                fulfilled.push(request.id);
            }
        }

        assert_eq!(fulfilled, vec![only.id]);
        assert_eq!(repo.inventory().await.unwrap().shelter, 200);
    }

    #[tokio::test]
    async fn test_unknown_camp_is_reference_error() {
        let (repo, _dir) = repo().await;
        let err = repo
            .create_donation(&resource(ResourceKind::Donation, "food", "low", "Nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reference(_)));
        assert!(repo.list_resources().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_go_to_smallest_id() {
        let (repo, _dir) = repo().await;
        seed_camp(&repo, "Central Relief Camp").await;
        let camp = repo.resolve_camp("Central Relief Camp").await.unwrap();

        // Inserted in reverse id order so rowid order disagrees with id order
        let created_at = "2024-05-01T10:00:00.000000Z";
        for id in ["req-b", "req-a"] {
            insert_pending_request(&repo, id, created_at, ResourceType::Food, &camp).await;
        }

        let donation = resource(ResourceKind::Donation, "food", "low", "Central Relief Camp");
        let first = repo.create_donation(&donation).await.unwrap();
        assert_eq!(first.fulfilled.map(|r| r.id).as_deref(), Some("req-a"));

        let second = repo.create_donation(&donation).await.unwrap();
        assert_eq!(second.fulfilled.map(|r| r.id).as_deref(), Some("req-b"));

        let third = repo.create_donation(&donation).await.unwrap();
        assert!(third.fulfilled.is_none());
    }

    #[tokio::test]
    async fn test_request_stays_with_the_camp_it_was_filed_against() {
        let (repo, _dir) = repo().await;
        let old_camp = repo
            .create_camp(&camp_request("Central Relief Camp", 12.0, 77.0).validate().unwrap())
            .await
            .unwrap();
        let orphaned = repo
            .create_request(&resource(
                ResourceKind::Request,
                "food",
                "high",
                "Central Relief Camp",
            ))
            .await
            .unwrap();

        repo.delete_camp(&old_camp.id).await.unwrap();
        seed_camp(&repo, "Central Relief Camp").await;

        let donation = resource(ResourceKind::Donation, "food", "low", "Central Relief Camp");
        let outcome = repo.create_donation(&donation).await.unwrap();
        assert!(outcome.fulfilled.is_none());
        assert_ne!(outcome.donation.camp_id, old_camp.id);

        let orphaned = repo.get_resource(&orphaned.id).await.unwrap().unwrap();
        assert_eq!(orphaned.status, ResourceStatus::Requested);
        assert_eq!(orphaned.camp_id, old_camp.id);

        let current = repo
            .create_request(&resource(
                ResourceKind::Request,
                "food",
                "high",
                "Central Relief Camp",
            ))
            .await
            .unwrap();
        let outcome = repo.create_donation(&donation).await.unwrap();
        assert_eq!(outcome.fulfilled.map(|r| r.id), Some(current.id));
    }
}
