//! School model
//!
//! Schools known to the store, keyed by their directory school code.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A school whose meals are stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub school_code: String,
    pub school_name: String,
    pub office_code: Option<String>,
    pub office_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for inserting or refreshing a school
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolUpsert {
    pub school_code: String,
    pub school_name: String,
    pub office_code: Option<String>,
    pub office_name: Option<String>,
}

impl School {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            school_code: row.get("school_code")?,
            school_name: row.get("school_name")?,
            office_code: row.get("office_code")?,
            office_name: row.get("office_name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a school or refresh its names (upsert on school_code)
    pub fn upsert(conn: &Connection, data: &SchoolUpsert) -> DbResult<Self> {
        if data.school_code.trim().is_empty() {
            return Err(DbError::InvalidRecord("school_code cannot be empty".to_string()));
        }

        conn.execute(
            r#"
            INSERT INTO schools (school_code, school_name, office_code, office_name)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(school_code) DO UPDATE SET
                school_name = excluded.school_name,
                office_code = excluded.office_code,
                office_name = excluded.office_name,
                updated_at = datetime('now')
            "#,
            params![data.school_code, data.school_name, data.office_code, data.office_name],
        )?;

        Self::get(conn, &data.school_code)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a school by code
    pub fn get(conn: &Connection, school_code: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM schools WHERE school_code = ?1")?;

        match stmt.query_row([school_code], Self::from_row) {
            Ok(school) => Ok(Some(school)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Substring search on school name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", super::escape_like(query.trim()));
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM schools
            WHERE school_name LIKE ?1 ESCAPE '\'
            ORDER BY school_name ASC
            LIMIT ?2
            "#,
        )?;

        let schools = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schools)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM schools", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn school(code: &str, name: &str) -> SchoolUpsert {
        SchoolUpsert {
            school_code: code.to_string(),
            school_name: name.to_string(),
            office_code: Some("B10".to_string()),
            office_name: Some("서울특별시교육청".to_string()),
        }
    }

    #[test]
    fn test_upsert_refreshes_existing_school() {
        let conn = conn();
        School::upsert(&conn, &school("7010057", "서울고등학교")).unwrap();
        let updated = School::upsert(&conn, &school("7010057", "서울고")).unwrap();

        assert_eq!(updated.school_name, "서울고");
        assert_eq!(School::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_empty_code_rejected() {
        let conn = conn();
        assert!(matches!(
            School::upsert(&conn, &school(" ", "이름없음")),
            Err(DbError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_search_by_substring() {
        let conn = conn();
        School::upsert(&conn, &school("1", "한빛초등학교")).unwrap();
        School::upsert(&conn, &school("2", "한빛중학교")).unwrap();
        School::upsert(&conn, &school("3", "새솔고등학교")).unwrap();

        let found = School::search(&conn, "한빛", 10).unwrap();
        assert_eq!(found.len(), 2);
        assert!(School::search(&conn, "100%", 10).unwrap().is_empty());
        assert!(School::get(&conn, "9").unwrap().is_none());
    }
}
