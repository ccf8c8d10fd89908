//! Panel persistence in `PostgreSQL`.
//!
//! The aggregate is spread over five tables (see the migration in
//! `migrations/`). [`PanelStore::save`] replaces all of them in one
//! transaction; [`PanelStore::load`] reassembles the aggregate.
//!
//! Queries are built at runtime (not compile-time checked), so no live
//! database is needed to build. All queries are parameterized.

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;
use yardline_types::{
    Carrier, CarrierId, DaySlot, Load, PanelState, QueueRecord, RecordStatus, ScheduleEntry,
};

use crate::error::DbError;

/// The panel tables behind a connection pool.
#[derive(Clone)]
pub struct PanelStore {
    pool: PgPool,
}

impl PanelStore {
    /// Open a pool of at most `max_connections` and apply pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed,
    /// [`DbError::Postgres`] if the connection fails, or
    /// [`DbError::Migration`] if a migration fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DbError> {
        let options: PgConnectOptions = url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections, "Connected to PostgreSQL, migrations applied");

        Ok(Self { pool })
    }

    /// Read the whole panel.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails, or
    /// [`DbError::Corrupt`] if a row cannot be mapped back.
    pub async fn load(&self) -> Result<PanelState, DbError> {
        let carriers = sqlx::query_as::<_, CarrierRow>(
            r"SELECT id, name, driver_name, driver_contact, responsible_name, responsible_contact
              FROM carriers
              ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let loads = sqlx::query_as::<_, LoadRow>(
            r"SELECT sequence, carrier FROM loads ORDER BY sequence",
        )
        .fetch_all(&self.pool)
        .await?;

        let schedule = sqlx::query_as::<_, ScheduleRow>(
            r"SELECT carrier, slots FROM schedule_entries ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let queue = sqlx::query_as::<_, QueueRow>(
            r"SELECT sequence, carrier, driver_name, time, date, status
              FROM queue_records
              ORDER BY sequence",
        )
        .fetch_all(&self.pool)
        .await?;

        let pointer: Option<(Option<i32>,)> =
            sqlx::query_as(r"SELECT pointer FROM queue_pointer WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        let panel = PanelState {
            carriers: carriers.into_iter().map(Carrier::from).collect(),
            loads: loads
                .into_iter()
                .map(Load::try_from)
                .collect::<Result<_, _>>()?,
            schedule: schedule
                .into_iter()
                .map(ScheduleEntry::try_from)
                .collect::<Result<_, _>>()?,
            queue: queue
                .into_iter()
                .map(QueueRecord::try_from)
                .collect::<Result<_, _>>()?,
            pointer: match pointer {
                // No row yet: fresh database.
                None => Some(1),
                Some((value,)) => value.map(from_db_sequence).transpose()?,
            },
        };

        tracing::debug!(
            carriers = panel.carriers.len(),
            loads = panel.loads.len(),
            records = panel.queue.len(),
            "Loaded panel from PostgreSQL"
        );

        Ok(panel)
    }

    /// Replace the stored panel with `panel`.
    ///
    /// Either every table is rewritten or none is.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any statement fails (the
    /// transaction is rolled back), or [`DbError::Serialization`] if a
    /// schedule entry cannot be encoded.
    pub async fn save(&self, panel: &PanelState) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r"DELETE FROM carriers").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM loads").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM schedule_entries")
            .execute(&mut *tx)
            .await?;
        sqlx::query(r"DELETE FROM queue_records")
            .execute(&mut *tx)
            .await?;

        if !panel.carriers.is_empty() {
            let len = panel.carriers.len();
            let mut ids = Vec::with_capacity(len);
            let mut positions = Vec::with_capacity(len);
            let mut names = Vec::with_capacity(len);
            let mut drivers = Vec::with_capacity(len);
            let mut contacts = Vec::with_capacity(len);
            let mut responsibles = Vec::with_capacity(len);
            let mut responsible_contacts = Vec::with_capacity(len);

            for (index, carrier) in panel.carriers.iter().enumerate() {
                ids.push(carrier.id.into_inner());
                positions.push(to_db_position(index));
                names.push(carrier.name.clone());
                drivers.push(carrier.driver_name.clone());
                contacts.push(carrier.driver_contact.clone());
                responsibles.push(carrier.responsible_name.clone());
                responsible_contacts.push(carrier.responsible_contact.clone());
            }

            sqlx::query(
                r"INSERT INTO carriers (id, position, name, driver_name, driver_contact, responsible_name, responsible_contact)
                  SELECT * FROM UNNEST($1::UUID[], $2::INTEGER[], $3::TEXT[], $4::TEXT[], $5::TEXT[], $6::TEXT[], $7::TEXT[])",
            )
            .bind(&ids)
            .bind(&positions)
            .bind(&names)
            .bind(&drivers)
            .bind(&contacts)
            .bind(&responsibles)
            .bind(&responsible_contacts)
            .execute(&mut *tx)
            .await?;
        }

        if !panel.loads.is_empty() {
            let sequences: Vec<i32> = panel
                .loads
                .iter()
                .map(|l| to_db_sequence(l.sequence))
                .collect();
            let carriers: Vec<String> = panel.loads.iter().map(|l| l.carrier.clone()).collect();

            sqlx::query(
                r"INSERT INTO loads (sequence, carrier)
                  SELECT * FROM UNNEST($1::INTEGER[], $2::TEXT[])",
            )
            .bind(&sequences)
            .bind(&carriers)
            .execute(&mut *tx)
            .await?;
        }

        if !panel.schedule.is_empty() {
            let len = panel.schedule.len();
            let mut carriers = Vec::with_capacity(len);
            let mut positions = Vec::with_capacity(len);
            let mut slots = Vec::with_capacity(len);

            for (index, entry) in panel.schedule.iter().enumerate() {
                carriers.push(entry.carrier.clone());
                positions.push(to_db_position(index));
                slots.push(serde_json::to_value(&entry.slots)?);
            }

            sqlx::query(
                r"INSERT INTO schedule_entries (carrier, position, slots)
                  SELECT * FROM UNNEST($1::TEXT[], $2::INTEGER[], $3::JSONB[])",
            )
            .bind(&carriers)
            .bind(&positions)
            .bind(&slots)
            .execute(&mut *tx)
            .await?;
        }

        if !panel.queue.is_empty() {
            let len = panel.queue.len();
            let mut sequences = Vec::with_capacity(len);
            let mut carriers = Vec::with_capacity(len);
            let mut drivers = Vec::with_capacity(len);
            let mut times = Vec::with_capacity(len);
            let mut dates = Vec::with_capacity(len);
            let mut statuses = Vec::with_capacity(len);

            for record in &panel.queue {
                sequences.push(to_db_sequence(record.sequence));
                carriers.push(record.carrier.clone());
                drivers.push(record.driver_name.clone());
                times.push(record.time.clone());
                dates.push(record.date.clone());
                statuses.push(status_to_db(record.status).to_owned());
            }

            sqlx::query(
                r"INSERT INTO queue_records (sequence, carrier, driver_name, time, date, status)
                  SELECT * FROM UNNEST($1::INTEGER[], $2::TEXT[], $3::TEXT[], $4::TEXT[], $5::TEXT[], $6::TEXT[])",
            )
            .bind(&sequences)
            .bind(&carriers)
            .bind(&drivers)
            .bind(&times)
            .bind(&dates)
            .bind(&statuses)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"INSERT INTO queue_pointer (id, pointer) VALUES (1, $1)
              ON CONFLICT (id) DO UPDATE SET pointer = EXCLUDED.pointer",
        )
        .bind(panel.pointer.map(to_db_sequence))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            carriers = panel.carriers.len(),
            loads = panel.loads.len(),
            records = panel.queue.len(),
            pointer = ?panel.pointer,
            "Saved panel to PostgreSQL"
        );
        Ok(())
    }
}

// =============================================================================
// Rows
// =============================================================================

/// A row from the `carriers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CarrierRow {
    /// Carrier id.
    pub id: Uuid,
    /// Company name.
    pub name: String,
    /// Driver name.
    pub driver_name: String,
    /// Driver contact.
    pub driver_contact: String,
    /// Responsible person.
    pub responsible_name: String,
    /// Responsible contact.
    pub responsible_contact: String,
}

impl From<CarrierRow> for Carrier {
    fn from(row: CarrierRow) -> Self {
        Self {
            id: CarrierId::from(row.id),
            name: row.name,
            driver_name: row.driver_name,
            driver_contact: row.driver_contact,
            responsible_name: row.responsible_name,
            responsible_contact: row.responsible_contact,
        }
    }
}

/// A row from the `loads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoadRow {
    /// Sequence number.
    pub sequence: i32,
    /// Carrier name.
    pub carrier: String,
}

impl TryFrom<LoadRow> for Load {
    type Error = DbError;

    fn try_from(row: LoadRow) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence: from_db_sequence(row.sequence)?,
            carrier: row.carrier,
        })
    }
}

/// A row from the `schedule_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRow {
    /// Carrier name.
    pub carrier: String,
    /// Seven `{time, status}` objects, Sunday first.
    pub slots: serde_json::Value,
}

impl TryFrom<ScheduleRow> for ScheduleEntry {
    type Error = DbError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let slots: [DaySlot; 7] = serde_json::from_value(row.slots)?;
        Ok(Self {
            carrier: row.carrier,
            slots,
        })
    }
}

/// A row from the `queue_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueueRow {
    /// Sequence number.
    pub sequence: i32,
    /// Carrier name.
    pub carrier: String,
    /// Driver name.
    pub driver_name: String,
    /// Departure time.
    pub time: String,
    /// Departure date.
    pub date: String,
    /// Status as stored (`pending`, `departed`, `skipped`).
    pub status: String,
}

impl TryFrom<QueueRow> for QueueRecord {
    type Error = DbError;

    fn try_from(row: QueueRow) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence: from_db_sequence(row.sequence)?,
            carrier: row.carrier,
            driver_name: row.driver_name,
            time: row.time,
            date: row.date,
            status: status_from_db(&row.status)?,
        })
    }
}

// =============================================================================
// Column conversions
// =============================================================================

const fn status_to_db(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Pending => "pending",
        RecordStatus::Departed => "departed",
        RecordStatus::Skipped => "skipped",
    }
}

fn status_from_db(value: &str) -> Result<RecordStatus, DbError> {
    match value {
        "pending" => Ok(RecordStatus::Pending),
        "departed" => Ok(RecordStatus::Departed),
        "skipped" => Ok(RecordStatus::Skipped),
        other => Err(DbError::Corrupt(format!("unknown record status {other:?}"))),
    }
}

fn to_db_sequence(sequence: u32) -> i32 {
    i32::try_from(sequence).unwrap_or(i32::MAX)
}

fn from_db_sequence(value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|e| DbError::Corrupt(format!("sequence {value}: {e}")))
}

fn to_db_position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_column_text() {
        for status in [
            RecordStatus::Pending,
            RecordStatus::Departed,
            RecordStatus::Skipped,
        ] {
            assert_eq!(status_from_db(status_to_db(status)).unwrap(), status);
        }
        assert!(matches!(status_from_db("gone"), Err(DbError::Corrupt(_))));
    }

    #[test]
    fn negative_sequence_is_corrupt() {
        assert!(from_db_sequence(-1).is_err());
        assert_eq!(from_db_sequence(3).unwrap(), 3);
    }

    #[test]
    fn schedule_row_requires_seven_slots() {
        let row = ScheduleRow {
            carrier: String::from("Acme"),
            slots: serde_json::json!([{"time": "07:00", "status": "confirmed"}]),
        };
        assert!(ScheduleEntry::try_from(row).is_err());
    }
}
