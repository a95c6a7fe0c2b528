//! PostgreSQL record store
//!
//! Statements are assembled from schema descriptors with `QueryBuilder`;
//! every value is bound, never interpolated. Identifiers are quoted since
//! several table names (`character`, `object`, `action`) collide with SQL
//! keywords.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row as _, Transaction};
use uuid::Uuid;

use crate::application::ports::outbound::{
    row_id, Field, FieldKind, Filter, InstanceCapacity, LockMode, Row, Schema, StoreError,
    StorePort, TransactionPort,
};
use crate::application::repositories::records::ALL_SCHEMAS;
use crate::domain::value_objects::{DungeonId, DungeonInstanceId};

const UNIQUE_VIOLATION: &str = "23505";
const LOCK_NOT_AVAILABLE: &str = "55P03";

const CAPACITY_VIEW: &str = r#"
    CREATE OR REPLACE VIEW dungeon_instance_capacity AS
    SELECT
        di.id AS dungeon_instance_id,
        di.dungeon_id,
        di.created_at,
        (SELECT COUNT(*) FROM "location" l WHERE l.dungeon_id = di.dungeon_id) AS location_count,
        (SELECT COUNT(*) FROM "character_instance" ci WHERE ci.dungeon_instance_id = di.id) AS character_count
    FROM "dungeon_instance" di
"#;

const ACTION_TURN_INDEXES: [&str; 2] = [
    r#"CREATE UNIQUE INDEX IF NOT EXISTS action_character_turn
       ON "action" (dungeon_instance_id, character_instance_id, turn_number)
       WHERE character_instance_id IS NOT NULL"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS action_monster_turn
       ON "action" (dungeon_instance_id, monster_instance_id, turn_number)
       WHERE monster_instance_id IS NOT NULL"#,
];

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(database_error)?;
        Ok(Self { pool })
    }

    /// Create every table, the capacity view and the turn indexes
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        for schema in ALL_SCHEMAS {
            sqlx::query(&create_table(schema))
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
        }
        sqlx::query(CAPACITY_VIEW)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        for index in ACTION_TURN_INDEXES {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
        }
        tracing::info!(tables = ALL_SCHEMAS.len(), "Database schema initialized");
        Ok(())
    }
}

#[async_trait]
impl StorePort for PostgresStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(database_error)?;
        Ok(PostgresTransaction { tx })
    }
}

pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TransactionPort for PostgresTransaction {
    async fn get_one(
        &mut self,
        schema: &'static Schema,
        id: Uuid,
        lock: LockMode,
    ) -> Result<Option<Row>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE \"id\" = ",
            column_list(schema),
            quote(schema.table)
        ));
        query.push_bind(id);
        match lock {
            LockMode::None => {}
            LockMode::ForUpdate => {
                query.push(" FOR UPDATE NOWAIT");
            }
            LockMode::ForUpdateSkipLocked => {
                query.push(" FOR UPDATE SKIP LOCKED");
            }
        }

        let row = query
            .build()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| statement_error(schema, id, e))?;
        row.map(|r| decode_row(schema, &r)).transpose()
    }

    async fn get_many(
        &mut self,
        schema: &'static Schema,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            column_list(schema),
            quote(schema.table)
        ));
        for filter in filters {
            let field = schema_field(schema, filter.field())?;
            query.push(" AND ");
            match filter {
                Filter::Eq(name, value) => {
                    query.push(quote(name)).push(" = ");
                    push_value(&mut query, schema, field, value)?;
                }
                Filter::In(_, values) if values.is_empty() => {
                    query.push("FALSE");
                }
                Filter::In(name, values) => {
                    query.push(quote(name)).push(" IN (");
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            query.push(", ");
                        }
                        push_value(&mut query, schema, field, value)?;
                    }
                    query.push(")");
                }
            }
        }
        query.push(" ORDER BY \"created_at\", \"id\"");

        let rows = query
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(database_error)?;
        rows.iter().map(|r| decode_row(schema, r)).collect()
    }

    async fn create_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        let id = row_id(schema.table, &row)?;
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            quote(schema.table),
            column_list(schema)
        ));
        for (i, field) in schema.fields.iter().enumerate() {
            if i > 0 {
                query.push(", ");
            }
            push_value(&mut query, schema, field, row.get(field.name).unwrap_or(&Value::Null))?;
        }
        query.push(format!(") RETURNING {}", column_list(schema)));

        let created = query
            .build()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| statement_error(schema, id, e))?;
        decode_row(schema, &created)
    }

    async fn update_one(&mut self, schema: &'static Schema, row: Row) -> Result<Row, StoreError> {
        let id = row_id(schema.table, &row)?;
        let mut query = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", quote(schema.table)));
        let mut first = true;
        for field in schema.fields.iter().filter(|f| f.name != "id") {
            if !first {
                query.push(", ");
            }
            first = false;
            query.push(quote(field.name)).push(" = ");
            push_value(&mut query, schema, field, row.get(field.name).unwrap_or(&Value::Null))?;
        }
        query.push(" WHERE \"id\" = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", column_list(schema)));

        let updated = query
            .build()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| statement_error(schema, id, e))?
            .ok_or(StoreError::NotFound {
                table: schema.table,
                id,
            })?;
        decode_row(schema, &updated)
    }

    async fn delete_one(&mut self, schema: &'static Schema, id: Uuid) -> Result<(), StoreError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("DELETE FROM {} WHERE \"id\" = ", quote(schema.table)));
        query.push_bind(id);
        let result = query
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| statement_error(schema, id, e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: schema.table,
                id,
            });
        }
        Ok(())
    }

    async fn instance_capacities(
        &mut self,
        dungeon_id: DungeonId,
    ) -> Result<Vec<InstanceCapacity>, StoreError> {
        let rows = sqlx::query(
            "SELECT dungeon_instance_id, location_count, character_count \
             FROM dungeon_instance_capacity WHERE dungeon_id = $1 \
             ORDER BY created_at, dungeon_instance_id",
        )
        .bind(Uuid::from(dungeon_id))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(database_error)?;

        rows.iter()
            .map(|r| {
                Ok(InstanceCapacity {
                    dungeon_instance_id: DungeonInstanceId::from_uuid(
                        r.try_get("dungeon_instance_id").map_err(database_error)?,
                    ),
                    dungeon_id,
                    location_count: r.try_get("location_count").map_err(database_error)?,
                    character_count: r.try_get("character_count").map_err(database_error)?,
                })
            })
            .collect()
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(database_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(database_error)
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn column_list(schema: &Schema) -> String {
    schema
        .field_names()
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table(schema: &Schema) -> String {
    let columns = schema
        .fields
        .iter()
        .map(|field| {
            let kind = match field.kind {
                FieldKind::Uuid => "UUID",
                FieldKind::Text => "TEXT",
                FieldKind::Integer => "BIGINT",
                FieldKind::Boolean => "BOOLEAN",
                FieldKind::Timestamp => "TIMESTAMPTZ",
            };
            let constraint = if field.name == "id" {
                " PRIMARY KEY"
            } else if field.nullable {
                ""
            } else {
                " NOT NULL"
            };
            format!("{} {}{}", quote(field.name), kind, constraint)
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quote(schema.table), columns)
}

fn schema_field(schema: &'static Schema, name: &str) -> Result<&'static Field, StoreError> {
    schema
        .fields
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| StoreError::InvalidRow {
            table: schema.table,
            message: format!("unknown field {}", name),
        })
}

/// Bind a JSON value as the column type the field declares
fn push_value(
    query: &mut QueryBuilder<'static, Postgres>,
    schema: &Schema,
    field: &Field,
    value: &Value,
) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidRow {
        table: schema.table,
        message: format!("{} is not a valid {:?}", field.name, field.kind),
    };
    if value.is_null() && !field.nullable {
        return Err(StoreError::InvalidRow {
            table: schema.table,
            message: format!("{} is required", field.name),
        });
    }

    match field.kind {
        FieldKind::Uuid => {
            let uuid = match value.as_str() {
                Some(s) => Some(Uuid::parse_str(s).map_err(|_| invalid())?),
                None if value.is_null() => None,
                None => return Err(invalid()),
            };
            query.push_bind(uuid);
        }
        FieldKind::Text => {
            let text = match value {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                _ => return Err(invalid()),
            };
            query.push_bind(text);
        }
        FieldKind::Integer => {
            let number = match value {
                Value::Null => None,
                other => Some(other.as_i64().ok_or_else(invalid)?),
            };
            query.push_bind(number);
        }
        FieldKind::Boolean => {
            let flag = match value {
                Value::Null => None,
                other => Some(other.as_bool().ok_or_else(invalid)?),
            };
            query.push_bind(flag);
        }
        FieldKind::Timestamp => {
            let timestamp = match value.as_str() {
                Some(s) => Some(
                    DateTime::parse_from_rfc3339(s)
                        .map_err(|_| invalid())?
                        .with_timezone(&Utc),
                ),
                None if value.is_null() => None,
                None => return Err(invalid()),
            };
            query.push_bind(timestamp);
        }
    }
    Ok(())
}

/// Read a result row back into the JSON shape entities deserialize from
fn decode_row(schema: &Schema, row: &PgRow) -> Result<Row, StoreError> {
    let mut decoded = Row::new();
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Uuid => row
                .try_get::<Option<Uuid>, _>(field.name)
                .map_err(database_error)?
                .map(|u| Value::String(u.to_string())),
            FieldKind::Text => row
                .try_get::<Option<String>, _>(field.name)
                .map_err(database_error)?
                .map(Value::String),
            FieldKind::Integer => row
                .try_get::<Option<i64>, _>(field.name)
                .map_err(database_error)?
                .map(Value::from),
            FieldKind::Boolean => row
                .try_get::<Option<bool>, _>(field.name)
                .map_err(database_error)?
                .map(Value::Bool),
            FieldKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(field.name)
                .map_err(database_error)?
                .map(serde_json::to_value)
                .transpose()?,
        };
        decoded.insert(field.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(decoded)
}

fn database_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

/// Map constraint and lock failures on a single row to their store errors
fn statement_error(schema: &Schema, id: Uuid, err: sqlx::Error) -> StoreError {
    let code = err
        .as_database_error()
        .and_then(|e| e.code())
        .map(|c| c.into_owned());
    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => StoreError::Conflict {
            table: schema.table,
            id,
        },
        Some(LOCK_NOT_AVAILABLE) => StoreError::Locked {
            table: schema.table,
            id,
        },
        _ => database_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repositories::records::{ACTION, CHARACTER};

    #[test]
    fn test_create_table_quotes_and_types_columns() {
        let ddl = create_table(&CHARACTER);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"character\" ("));
        assert!(ddl.contains("\"id\" UUID PRIMARY KEY"));
        assert!(ddl.contains("\"strength\" BIGINT NOT NULL"));
        assert!(ddl.contains("\"created_at\" TIMESTAMPTZ NOT NULL"));

        let ddl = create_table(&ACTION);
        assert!(ddl.contains("\"target_location_direction\" TEXT,"));
        assert!(ddl.contains("\"character_instance_id\" UUID,"));
    }

    #[test]
    fn test_column_list_follows_schema_order() {
        let columns = column_list(&ACTION);
        assert!(columns.starts_with("\"id\", \"dungeon_instance_id\", \"location_instance_id\""));
        assert!(columns.ends_with("\"created_at\""));
    }
}
