//! Client database queries

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{CleanedClient, ImportActor};

/// Find a client id by phone number
pub async fn find_client_id_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Uuid>> {
    let id: Option<Uuid> = sqlx::query_scalar(
        r#"SELECT id FROM clients WHERE phone = $1"#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// Create a new client from an imported row
pub async fn create_client_from_import(
    pool: &PgPool,
    record: &CleanedClient,
    actor: &ImportActor,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO clients (
            id, user_id, assigned_employee_id,
            name, phone, status, call_response, notes, course,
            hostel_fee, course_fee, total_fee,
            course_fee_paid, hostel_fee_paid, total_fee_paid,
            created_at, updated_at
        )
        VALUES (
            $1, $2, $3,
            $4, $5, $6, $7, $8, $9,
            $10, $11, $12,
            $13, $14, $15,
            NOW(), NOW()
        )
        "#,
    )
    .bind(id)
    .bind(actor.user_id)
    .bind(actor.assigned_employee_id)
    .bind(&record.name)
    .bind(&record.phone)
    .bind(record.status)
    .bind(record.call_response)
    .bind(&record.notes)
    .bind(&record.course)
    .bind(record.hostel_fee)
    .bind(record.course_fee)
    .bind(record.total_fee)
    .bind(record.course_fee_paid)
    .bind(record.hostel_fee_paid)
    .bind(record.total_fee_paid)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Overwrite an existing client's imported fields.
///
/// `name` is only replaced when the sheet provided one; every other imported
/// field is written as-is, including NULLs. Ownership columns are restamped
/// unconditionally — the most recent upload owns the record.
pub async fn update_client_from_import(
    pool: &PgPool,
    id: Uuid,
    record: &CleanedClient,
    actor: &ImportActor,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE clients SET
            name = COALESCE($2, name),
            status = $3,
            call_response = $4,
            notes = $5,
            course = $6,
            hostel_fee = $7,
            course_fee = $8,
            total_fee = $9,
            course_fee_paid = $10,
            hostel_fee_paid = $11,
            total_fee_paid = $12,
            user_id = $13,
            assigned_employee_id = $14,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&record.name)
    .bind(record.status)
    .bind(record.call_response)
    .bind(&record.notes)
    .bind(&record.course)
    .bind(record.hostel_fee)
    .bind(record.course_fee)
    .bind(record.total_fee)
    .bind(record.course_fee_paid)
    .bind(record.hostel_fee_paid)
    .bind(record.total_fee_paid)
    .bind(actor.user_id)
    .bind(actor.assigned_employee_id)
    .execute(pool)
    .await?;

    Ok(())
}
