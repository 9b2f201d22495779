use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlDatabaseError;

use crate::error::ApiError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Only keys listed in `allowed_columns` may appear in the payload; keys are
/// interpolated into the statement, so anything else is rejected.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed_columns: &[&str],
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::validation("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ApiError::validation("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed_columns.contains(&k.as_str())) {
        return Err(ApiError::validation(format!("Field '{unknown}' cannot be updated")));
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ApiError::validation("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// MySQL server error numbers translated into client errors.
pub const ER_DUP_ENTRY: u16 = 1062;
pub const ER_NO_REFERENCED_ROW: u16 = 1452;

/// Server error number and message when `e` came from MySQL.
pub fn mysql_error(e: &sqlx::Error) -> Option<(u16, &str)> {
    let sqlx::Error::Database(db_err) = e else {
        return None;
    };
    let mysql = db_err.try_downcast_ref::<MySqlDatabaseError>()?;
    Some((mysql.number(), mysql.message()))
}

// SQLSTATE 23000 covers every integrity violation, so match the error
// number and the constraint named in the message instead.
fn error_matches(number: u16, message: &str, expected: u16, constraint: &str) -> bool {
    number == expected && message.contains(constraint)
}

/// Duplicate entry on the unique key `key`.
pub fn is_duplicate_key(e: &sqlx::Error, key: &str) -> bool {
    mysql_error(e).is_some_and(|(number, message)| {
        error_matches(number, message, ER_DUP_ENTRY, key)
    })
}

/// Foreign-key failure on the constraint `constraint` (referenced row missing).
pub fn is_missing_reference(e: &sqlx::Error, constraint: &str) -> bool {
    mysql_error(e).is_some_and(|(number, message)| {
        error_matches(number, message, ER_NO_REFERENCED_ROW, constraint)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["department", "date_of_birth", "attendance_required"];

    #[test]
    fn builds_statement_for_allowed_columns() {
        let payload = json!({ "attendance_required": false, "date_of_birth": "1990-04-12" });
        let update =
            build_update_sql("employee_profiles", &payload, COLUMNS, "user_id", 7).unwrap();

        assert!(update.sql.starts_with("UPDATE employee_profiles SET "));
        assert!(update.sql.ends_with(" WHERE user_id = ?"));
        assert_eq!(update.values.len(), 3);
        assert!(update.values.contains(&SqlValue::Bool(false)));
        assert!(
            update
                .values
                .contains(&SqlValue::Date("1990-04-12".parse().unwrap()))
        );
        assert_eq!(update.values.last(), Some(&SqlValue::U64(7)));
    }

    #[test]
    fn rejects_unknown_columns() {
        let payload = json!({ "role_id = 1, department": "x" });
        assert!(build_update_sql("employee_profiles", &payload, COLUMNS, "user_id", 7).is_err());
    }

    #[test]
    fn integrity_errors_match_number_and_constraint() {
        let dup = "Duplicate entry '7' for key 'attendance_records.uq_attendance_open_session'";
        assert!(error_matches(1062, dup, ER_DUP_ENTRY, "uq_attendance_open_session"));

        let fk = "Cannot add or update a child row: a foreign key constraint fails \
                  (`opsdesk`.`attendance_records`, CONSTRAINT `fk_attendance_user` \
                  FOREIGN KEY (`user_id`) REFERENCES `users` (`id`))";
        // a missing user is not a second open session
        assert!(!error_matches(1452, fk, ER_DUP_ENTRY, "uq_attendance_open_session"));
        assert!(!error_matches(1452, fk, ER_NO_REFERENCED_ROW, "fk_leave_type"));
        assert!(error_matches(1452, fk, ER_NO_REFERENCED_ROW, "fk_attendance_user"));
    }

    #[test]
    fn non_database_errors_are_not_classified() {
        let e = sqlx::Error::RowNotFound;
        assert_eq!(mysql_error(&e), None);
        assert!(!is_duplicate_key(&e, "uq_attendance_open_session"));
        assert!(!is_missing_reference(&e, "fk_leave_type"));
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_update_sql("t", &json!({}), COLUMNS, "id", 1).is_err());
        assert!(build_update_sql("t", &json!([1, 2]), COLUMNS, "id", 1).is_err());
    }
}
