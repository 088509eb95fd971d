//! Resource request/donation store and inventory counters.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::activities::append_activity;
use super::repository::enum_column;
use super::{now_timestamp, Repository};
use crate::errors::AppError;
use crate::models::{
    ActivityType, CampName, NewActivity, NewResource, Priority, ResourceRecord, ResourceStatus,
    ResourceType, TypeTotals,
};
use crate::reconcile::{self, DonationOutcome, MatchCriteria};

pub(crate) const RESOURCE_COLUMNS: &str = "id, name, contact_number, resource_type, quantity, priority, camp_id, camp_name, can_deliver_to_camp, status, created_at, fulfilled_at";

impl Repository {
    /// List all resource records, newest first.
    pub async fn list_resources(&self) -> Result<Vec<ResourceRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(resource_from_row).collect()
    }

    /// Get a resource record by ID.
    pub async fn get_resource(&self, id: &str) -> Result<Option<ResourceRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(resource_from_row).transpose()
    }

    /// Record a resource request (status `requested`).
    pub async fn create_request(&self, request: &NewResource) -> Result<ResourceRecord, AppError> {
        let camp = self.resolve_camp(&request.camp_name).await?;
        let record = build_record(request, ResourceStatus::Requested, &camp);

        let mut tx = self.pool.begin().await?;
        insert_record(&mut *tx, &record).await?;

        if record.priority == Priority::High {
            append_activity(
                &mut *tx,
                &NewActivity::new(
                    ActivityType::Resource,
                    format!(
                        "New high priority request: {} for {}",
                        record.resource_type.as_str(),
                        record.camp_name
                    ),
                )
                .with_details(&record),
                self.activity_cap,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            resource_id = %record.id,
            resource_type = record.resource_type.as_str(),
            priority = record.priority.as_str(),
            camp = %record.camp_name,
            "Resource requested"
        );
        Ok(record)
    }

    /// Record a donation and fulfil the oldest matching high-priority request.
    ///
    /// Everything runs in one transaction: the donation, the inventory bump,
    /// the conditional fulfilment and the feed entries commit together.
    pub async fn create_donation(&self, donation: &NewResource) -> Result<DonationOutcome, AppError> {
        let camp = self.resolve_camp(&donation.camp_name).await?;
        let record = build_record(donation, ResourceStatus::Donated, &camp);

        let mut tx = self.pool.begin().await?;
        insert_record(&mut *tx, &record).await?;

        sqlx::query(
            "INSERT INTO inventory (resource_type, quantity) VALUES (?, ?) ON CONFLICT(resource_type) DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(record.resource_type.as_str())
        .bind(record.quantity)
        .execute(&mut *tx)
        .await?;

        append_activity(
            &mut *tx,
            &NewActivity::new(
                ActivityType::Resource,
                format!(
                    "New donation: {} {} items for {}",
                    record.quantity,
                    record.resource_type.as_str(),
                    record.camp_name
                ),
            )
            .with_details(&record),
            self.activity_cap,
        )
        .await?;

        let criteria = MatchCriteria::for_donation(&record);
        let fulfilled = reconcile::fulfill_oldest_match(&mut *tx, &criteria, &now_timestamp()).await?;

        if let Some(request) = &fulfilled {
            append_activity(
                &mut *tx,
                &NewActivity::new(
                    ActivityType::Resource,
                    format!(
                        "Request fulfilled: {} for {}",
                        request.resource_type.as_str(),
                        request.camp_name
                    ),
                )
                .with_details(request),
                self.activity_cap,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            resource_id = %record.id,
            resource_type = record.resource_type.as_str(),
            quantity = record.quantity,
            camp = %record.camp_name,
            "Resource donated"
        );
        Ok(DonationOutcome {
            donation: record,
            fulfilled,
        })
    }

    /// Running donated totals per resource type.
    pub async fn inventory(&self) -> Result<TypeTotals, AppError> {
        let rows = sqlx::query("SELECT resource_type, quantity FROM inventory")
            .fetch_all(&self.pool)
            .await?;

        let mut totals = TypeTotals::default();
        for row in &rows {
            let resource_type = enum_column(row, "resource_type", ResourceType::from_str)?;
            totals.add(resource_type, row.try_get("quantity")?);
        }
        Ok(totals)
    }
}

fn build_record(resource: &NewResource, status: ResourceStatus, camp: &CampName) -> ResourceRecord {
    ResourceRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: resource.name.clone(),
        contact_number: resource.contact_number.clone(),
        resource_type: resource.resource_type,
        quantity: resource.quantity,
        priority: resource.priority,
        camp_id: camp.id.clone(),
        camp_name: camp.name.clone(),
        can_deliver_to_camp: resource.can_deliver_to_camp,
        status,
        created_at: now_timestamp(),
        fulfilled_at: None,
    }
}

async fn insert_record(conn: &mut SqliteConnection, record: &ResourceRecord) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO resources (id, name, contact_number, resource_type, quantity, priority, camp_id, camp_name, can_deliver_to_camp, status, created_at, fulfilled_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.contact_number)
    .bind(record.resource_type.as_str())
    .bind(record.quantity)
    .bind(record.priority.as_str())
    .bind(&record.camp_id)
    .bind(&record.camp_name)
    .bind(record.can_deliver_to_camp as i32)
    .bind(record.status.as_str())
    .bind(&record.created_at)
    .bind(&record.fulfilled_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) fn resource_from_row(row: &SqliteRow) -> Result<ResourceRecord, AppError> {
    let can_deliver: i32 = row.try_get("can_deliver_to_camp")?;
    Ok(ResourceRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        contact_number: row.try_get("contact_number")?,
        resource_type: enum_column(row, "resource_type", ResourceType::from_str)?,
        quantity: row.try_get("quantity")?,
        priority: enum_column(row, "priority", Priority::from_str)?,
        camp_id: row.try_get("camp_id")?,
        camp_name: row.try_get("camp_name")?,
        can_deliver_to_camp: can_deliver != 0,
        status: enum_column(row, "status", ResourceStatus::from_str)?,
        created_at: row.try_get("created_at")?,
        fulfilled_at: row.try_get("fulfilled_at")?,
    })
}
