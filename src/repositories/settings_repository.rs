//! Settings Repository for WinWork.
//!
//! A string key/value store in `app_settings`. Typed access goes through
//! [`SettingValue`]: values are written in canonical form and coerced on
//! read, with unparseable text reported as absent.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::database::now_millis;
use crate::types::errors::SettingsError;
use crate::types::settings::{AppSetting, SettingKind, SettingValue};

/// Trait defining settings store operations.
pub trait SettingsRepositoryTrait {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn get_setting(&self, key: &str) -> Result<Option<AppSetting>, SettingsError>;
    fn get_all(&self) -> Result<Vec<AppSetting>, SettingsError>;
    fn set(&mut self, key: &str, value: &str, description: Option<&str>) -> Result<(), SettingsError>;
    fn delete(&mut self, key: &str) -> Result<bool, SettingsError>;
    fn get_typed(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError>;
    fn set_typed(&mut self, key: &str, value: &SettingValue) -> Result<(), SettingsError>;
}

/// Settings repository backed by a SQLite connection.
pub struct SettingsRepository<'a> {
    conn: &'a Connection,
}

fn db_err(e: rusqlite::Error) -> SettingsError {
    SettingsError::DatabaseError(e.to_string())
}

fn check_key(key: &str) -> Result<(), SettingsError> {
    if key.trim().is_empty() {
        return Err(SettingsError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl<'a> SettingsRepository<'a> {
    /// Creates a new `SettingsRepository` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_setting(row: &rusqlite::Row) -> rusqlite::Result<AppSetting> {
        Ok(AppSetting {
            key: row.get(0)?,
            value: row.get(1)?,
            description: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        Ok(self
            .get_typed(key, SettingKind::Bool)?
            .and_then(|v| v.as_bool()))
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>, SettingsError> {
        Ok(self
            .get_typed(key, SettingKind::Int)?
            .and_then(|v| v.as_int()))
    }

    pub fn get_double(&self, key: &str) -> Result<Option<f64>, SettingsError> {
        Ok(self
            .get_typed(key, SettingKind::Double)?
            .and_then(|v| v.as_double()))
    }

    pub fn get_datetime(&self, key: &str) -> Result<Option<DateTime<Utc>>, SettingsError> {
        Ok(self
            .get_typed(key, SettingKind::DateTime)?
            .and_then(|v| v.as_datetime()))
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set_typed(key, &SettingValue::Bool(value))
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.set_typed(key, &SettingValue::Int(value))
    }

    pub fn set_double(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        self.set_typed(key, &SettingValue::Double(value))
    }

    pub fn set_datetime(&mut self, key: &str, value: DateTime<Utc>) -> Result<(), SettingsError> {
        self.set_typed(key, &SettingValue::DateTime(value))
    }
}

impl<'a> SettingsRepositoryTrait for SettingsRepository<'a> {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.get_setting(key)?.map(|s| s.value))
    }

    fn get_setting(&self, key: &str) -> Result<Option<AppSetting>, SettingsError> {
        let result = self.conn.query_row(
            "SELECT key, value, description, updated_at FROM app_settings WHERE key = ?1",
            params![key],
            Self::row_to_setting,
        );
        match result {
            Ok(setting) => Ok(Some(setting)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    fn get_all(&self) -> Result<Vec<AppSetting>, SettingsError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, description, updated_at FROM app_settings ORDER BY key")
            .map_err(db_err)?;
        let rows = stmt.query_map([], Self::row_to_setting).map_err(db_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(db_err)?);
        }
        Ok(results)
    }

    /// Inserts or replaces a value. A `None` description keeps the stored one.
    fn set(&mut self, key: &str, value: &str, description: Option<&str>) -> Result<(), SettingsError> {
        check_key(key)?;
        self.conn
            .execute(
                "INSERT INTO app_settings (key, value, description, updated_at) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                 description = COALESCE(excluded.description, app_settings.description), \
                 updated_at = excluded.updated_at",
                params![key, value, description, now_millis()],
            )
            .map_err(db_err)?;
        tracing::debug!(key, "setting stored");
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, SettingsError> {
        let affected = self
            .conn
            .execute("DELETE FROM app_settings WHERE key = ?1", params![key])
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    /// Reads `key` as `kind`. A stored value that does not parse reads as `None`.
    fn get_typed(&self, key: &str, kind: SettingKind) -> Result<Option<SettingValue>, SettingsError> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        let value = SettingValue::parse(kind, &raw);
        if value.is_none() {
            tracing::warn!(key, ?kind, raw = %raw, "setting value does not parse");
        }
        Ok(value)
    }

    fn set_typed(&mut self, key: &str, value: &SettingValue) -> Result<(), SettingsError> {
        self.set(key, &value.to_canonical(), None)
    }
}
