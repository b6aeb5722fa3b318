use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::entity::DataSource;
use crate::error::DashboardError;
use crate::models::{EntityKind, EventCount, FeatureRow, Note, Selectable};

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to open SQLite database")
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &SqlitePool) -> anyhow::Result<()> {
    let teams = vec![
        (1, "Atlas", "Day", "Morgan Hale"),
        (2, "Beacon", "Night", "Priya Raman"),
    ];

    for (team_id, team_name, shift, manager_name) in teams {
        sqlx::query(
            r#"
            INSERT INTO team (team_id, team_name, shift, manager_name)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (team_id) DO UPDATE
            SET team_name = excluded.team_name,
                shift = excluded.shift,
                manager_name = excluded.manager_name
            "#,
        )
        .bind(team_id)
        .bind(team_name)
        .bind(shift)
        .bind(manager_name)
        .execute(pool)
        .await?;
    }

    let employees = vec![
        (1, "Avery", "Lee", 1),
        (2, "Jules", "Moreno", 1),
        (3, "Kiara", "Patel", 2),
        (4, "Dana", "Okafor", 2),
    ];

    for (employee_id, first_name, last_name, team_id) in employees {
        sqlx::query(
            r#"
            INSERT INTO employee (employee_id, first_name, last_name, team_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (employee_id) DO UPDATE
            SET first_name = excluded.first_name,
                last_name = excluded.last_name,
                team_id = excluded.team_id
            "#,
        )
        .bind(employee_id)
        .bind(first_name)
        .bind(last_name)
        .bind(team_id)
        .execute(pool)
        .await?;
    }

    // Day 4 is left out on purpose to exercise gap filling.
    let events: Vec<(i64, u32, Option<i64>, Option<i64>)> = vec![
        (1, 1, Some(2), Some(0)),
        (1, 2, Some(1), Some(1)),
        (1, 5, Some(3), None),
        (2, 1, Some(0), Some(2)),
        (2, 3, None, Some(1)),
        (2, 6, Some(1), Some(0)),
        (3, 2, Some(4), Some(0)),
        (3, 3, Some(2), Some(1)),
        (4, 1, Some(0), Some(3)),
        (4, 5, Some(1), Some(2)),
    ];

    for (employee_id, day, positive, negative) in events {
        let event_date = NaiveDate::from_ymd_opt(2023, 6, day).context("invalid date")?;
        insert_event(pool, event_date, employee_id, positive, negative).await?;
    }

    let notes = vec![
        (1, "Led onboarding for two new hires", 2),
        (2, "Requested schedule change", 3),
        (3, "Raised concerns about workload", 2),
        (4, "Missed weekly check-in", 5),
    ];

    for (employee_id, note, day) in notes {
        let note_date = NaiveDate::from_ymd_opt(2023, 6, day).context("invalid date")?;
        sqlx::query(
            r#"
            INSERT INTO notes (employee_id, team_id, note, note_date)
            SELECT employee_id, team_id, ?, ?
            FROM employee
            WHERE employee_id = ?
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(note)
        .bind(note_date)
        .bind(employee_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn insert_event(
    pool: &SqlitePool,
    event_date: NaiveDate,
    employee_id: i64,
    positive_events: Option<i64>,
    negative_events: Option<i64>,
) -> Result<u64, sqlx::Error> {
    // The team is copied from the employee row; unknown employees insert nothing.
    let result = sqlx::query(
        r#"
        INSERT INTO employee_events
        (event_date, employee_id, team_id, positive_events, negative_events)
        SELECT ?, employee_id, team_id, ?, ?
        FROM employee
        WHERE employee_id = ?
        ON CONFLICT (event_date, employee_id) DO NOTHING
        "#,
    )
    .bind(event_date)
    .bind(positive_events)
    .bind(negative_events)
    .bind(employee_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn import_csv(pool: &SqlitePool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        event_date: NaiveDate,
        employee_id: i64,
        positive_events: Option<i64>,
        negative_events: Option<i64>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let affected = insert_event(
            pool,
            row.event_date,
            row.employee_id,
            row.positive_events,
            row.negative_events,
        )
        .await?;

        if affected > 0 {
            inserted += 1;
        } else {
            tracing::debug!(
                employee_id = row.employee_id,
                event_date = %row.event_date,
                "skipped duplicate or unknown-employee event row"
            );
        }
    }

    Ok(inserted)
}

#[derive(Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_exists(&self, kind: EntityKind, id: i64) -> Result<(), DashboardError> {
        let query = format!(
            "SELECT 1 FROM {} WHERE {} = ?",
            kind.table(),
            kind.id_column()
        );
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(_) => Ok(()),
            None => Err(DashboardError::NotFound { kind, id }),
        }
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    async fn selectable(&self, kind: EntityKind) -> Result<Vec<Selectable>, DashboardError> {
        let query = match kind {
            EntityKind::Employee => {
                "SELECT employee_id AS id, first_name || ' ' || last_name AS label \
                 FROM employee ORDER BY employee_id"
            }
            EntityKind::Team => {
                "SELECT team_id AS id, team_name AS label FROM team ORDER BY team_id"
            }
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let mut items = Vec::new();
        for row in rows {
            items.push(Selectable {
                id: row.try_get("id")?,
                label: row.try_get("label")?,
            });
        }
        Ok(items)
    }

    async fn event_counts(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Vec<EventCount>, DashboardError> {
        self.ensure_exists(kind, id).await?;

        let query = format!(
            "SELECT event_date, SUM(positive_events) AS positive_events, \
             SUM(negative_events) AS negative_events \
             FROM employee_events WHERE {} = ? \
             GROUP BY event_date ORDER BY event_date",
            kind.id_column()
        );
        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(EventCount {
                event_date: row.try_get("event_date")?,
                positive_events: row.try_get("positive_events")?,
                negative_events: row.try_get("negative_events")?,
            });
        }
        Ok(counts)
    }

    async fn feature_rows(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Vec<FeatureRow>, DashboardError> {
        self.ensure_exists(kind, id).await?;

        let query = format!(
            "SELECT COALESCE(SUM(positive_events), 0) AS positive_events, \
             COALESCE(SUM(negative_events), 0) AS negative_events \
             FROM employee_events WHERE {} = ? \
             GROUP BY employee_id ORDER BY employee_id",
            kind.id_column()
        );
        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;
        let mut features = Vec::new();
        for row in rows {
            let positive: i64 = row.try_get("positive_events")?;
            let negative: i64 = row.try_get("negative_events")?;
            features.push(FeatureRow {
                positive_events: positive as f64,
                negative_events: negative as f64,
            });
        }
        Ok(features)
    }

    async fn notes(&self, kind: EntityKind, id: i64) -> Result<Vec<Note>, DashboardError> {
        self.ensure_exists(kind, id).await?;

        let query = format!(
            "SELECT note_date, note FROM notes WHERE {} = ? ORDER BY note_date, rowid",
            kind.id_column()
        );
        let rows = sqlx::query(&query).bind(id).fetch_all(&self.pool).await?;
        let mut notes = Vec::new();
        for row in rows {
            notes.push(Note {
                note_date: row.try_get("note_date")?,
                content: row.try_get("note")?,
            });
        }
        Ok(notes)
    }
}

/// Migrated and seeded in-memory database for tests.
#[cfg(test)]
pub(crate) async fn seeded_pool() -> SqlitePool {
    // One connection: every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_db(&pool).await.unwrap();
    seed(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, day).unwrap()
    }

    #[tokio::test]
    async fn lists_employees_and_teams() {
        let source = SqliteSource::new(seeded_pool().await);

        let employees = source.selectable(EntityKind::Employee).await.unwrap();
        assert_eq!(employees.len(), 4);
        assert_eq!(
            employees[0],
            Selectable {
                id: 1,
                label: "Avery Lee".to_string()
            }
        );

        let teams = source.selectable(EntityKind::Team).await.unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(names, vec!["Atlas", "Beacon"]);
    }

    #[tokio::test]
    async fn event_counts_are_grouped_by_date() {
        let source = SqliteSource::new(seeded_pool().await);

        let counts = source.event_counts(EntityKind::Team, 1).await.unwrap();
        let dates: Vec<NaiveDate> = counts.iter().map(|c| c.event_date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3), date(5), date(6)]);
        assert_eq!(counts[0].positive_events, Some(2));
        assert_eq!(counts[0].negative_events, Some(2));
        // Only employee 2 has a row on day 3, with no positive count.
        assert_eq!(counts[2].positive_events, None);
    }

    #[tokio::test]
    async fn team_features_have_one_row_per_member() {
        let source = SqliteSource::new(seeded_pool().await);

        let team = source.feature_rows(EntityKind::Team, 2).await.unwrap();
        assert_eq!(team.len(), 2);
        assert_eq!(
            team[0],
            FeatureRow {
                positive_events: 6.0,
                negative_events: 1.0
            }
        );

        let employee = source.feature_rows(EntityKind::Employee, 1).await.unwrap();
        assert_eq!(employee.len(), 1);
    }

    #[tokio::test]
    async fn notes_follow_the_entity_kind() {
        let source = SqliteSource::new(seeded_pool().await);

        let team_notes = source.notes(EntityKind::Team, 1).await.unwrap();
        assert_eq!(team_notes.len(), 2);
        assert_eq!(team_notes[0].content, "Led onboarding for two new hires");

        let employee_notes = source.notes(EntityKind::Employee, 4).await.unwrap();
        assert_eq!(employee_notes.len(), 1);
        assert_eq!(employee_notes[0].note_date, date(5));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let source = SqliteSource::new(seeded_pool().await);

        let err = source.event_counts(EntityKind::Employee, 99).await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::NotFound {
                kind: EntityKind::Employee,
                id: 99
            }
        ));
        assert!(source.notes(EntityKind::Team, 3).await.is_err());
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let pool = seeded_pool().await;
        seed(&pool).await.unwrap();

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM employee_events")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("n");
        assert_eq!(count, 10);
    }

    #[tokio::test]
    async fn import_skips_duplicates_and_unknown_employees() {
        let pool = seeded_pool().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event_date,employee_id,positive_events,negative_events").unwrap();
        writeln!(file, "2023-06-10,1,2,1").unwrap();
        writeln!(file, "2023-06-11,3,,4").unwrap();
        writeln!(file, "2023-06-01,1,9,9").unwrap();
        writeln!(file, "2023-06-10,42,1,1").unwrap();
        file.flush().unwrap();

        let inserted = import_csv(&pool, file.path()).await.unwrap();
        assert_eq!(inserted, 2);

        let source = SqliteSource::new(pool);
        let counts = source.event_counts(EntityKind::Employee, 3).await.unwrap();
        let imported = counts.iter().find(|c| c.event_date == date(11)).unwrap();
        assert_eq!(imported.positive_events, None);
        assert_eq!(imported.negative_events, Some(4));
    }
}
