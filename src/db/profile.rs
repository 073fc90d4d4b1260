// src/db/profile.rs

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, error, info, warn};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::error::{Result, StoreError};
use crate::db::format::{
    blank_to_none, datetime_format, earliest_birth_date, format_date, opt_date_format,
    require_non_empty, today,
};
use crate::db::monitoring::measure_db_operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(StoreError::InvalidValue(format!("unknown gender '{other}'"))),
        }
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StoreError| FromSqlError::Other(e.to_string().into()))
    }
}

/// The stored profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub name: String,
    pub gender: Option<Gender>,
    #[serde(with = "opt_date_format", default)]
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(with = "datetime_format")]
    pub registered_at: NaiveDateTime,
}

/// Everything the profile form submits. `registered_at` is not part of it,
/// the database stamps it once on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(with = "opt_date_format", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ProfileFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        if let Some(birth) = self.birth_date {
            let (min, max) = (earliest_birth_date(), today());
            if birth < min || birth > max {
                return Err(StoreError::validation(format!(
                    "birth_date {} must be between {} and {}",
                    format_date(birth),
                    format_date(min),
                    format_date(max)
                )));
            }
        }
        Ok(())
    }
}

impl From<&UserProfile> for ProfileFields {
    fn from(p: &UserProfile) -> Self {
        Self {
            name: p.name.clone(),
            gender: p.gender,
            birth_date: p.birth_date,
            email: p.email.clone(),
            phone: p.phone.clone(),
            address: p.address.clone(),
        }
    }
}

const SELECT_PROFILE: &str = r#"
    SELECT user_id, name, gender, birth_date, email, phone, address, register_time
    FROM user_basic
    WHERE user_id = ?1
"#;

pub struct ProfileRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Point lookup; a missing profile is `Ok(None)`.
    pub fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        measure_db_operation("get_profile", || -> Result<Option<UserProfile>> {
            debug!("get_profile user_id={user_id}");
            let profile = self
                .conn
                .query_row(SELECT_PROFILE, params![user_id], Self::row_to_profile)
                .optional()?;
            Ok(profile)
        })
    }

    /// Inserts the profile under `user_id` when absent, otherwise rewrites every
    /// mutable column. Lookup and write share one transaction.
    pub fn save_profile(&self, user_id: i64, fields: &ProfileFields) -> Result<()> {
        measure_db_operation("save_profile", || -> Result<()> {
            if let Err(e) = fields.validate() {
                warn!("save_profile rejected for user_id={user_id}: {e}");
                return Err(e);
            }

            let email = blank_to_none(fields.email.clone());
            let phone = blank_to_none(fields.phone.clone());
            let address = blank_to_none(fields.address.clone());
            let birth_date = fields.birth_date.map(format_date);

            let tx = self.conn.unchecked_transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM user_basic WHERE user_id = ?1",
                    params![user_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            let written = if exists {
                tx.execute(
                    r#"
                    UPDATE user_basic SET
                        name = ?1, gender = ?2, birth_date = ?3,
                        email = ?4, phone = ?5, address = ?6
                    WHERE user_id = ?7
                    "#,
                    params![
                        fields.name,
                        fields.gender,
                        birth_date,
                        email,
                        phone,
                        address,
                        user_id
                    ],
                )
            } else {
                tx.execute(
                    r#"
                    INSERT INTO user_basic
                        (user_id, name, gender, birth_date, email, phone, address)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        user_id,
                        fields.name,
                        fields.gender,
                        birth_date,
                        email,
                        phone,
                        address
                    ],
                )
            };

            if let Err(e) = written {
                error!("save_profile failed for user_id={user_id}: {e}");
                return Err(e.into());
            }
            tx.commit()?;

            info!(
                "profile user_id={user_id} {}",
                if exists { "updated" } else { "created" }
            );
            Ok(())
        })
    }

    /// Same as `save_profile` but takes the form as JSON and answers with the
    /// stored profile as JSON.
    pub fn save_profile_json(&self, user_id: i64, json_input: &str) -> Result<String> {
        let fields: ProfileFields = serde_json::from_str(json_input)?;
        self.save_profile(user_id, &fields)?;
        self.get_profile_json(user_id)
    }

    /// `null` when the profile does not exist yet.
    pub fn get_profile_json(&self, user_id: i64) -> Result<String> {
        let profile = self.get_profile(user_id)?;
        Ok(serde_json::to_string(&profile)?)
    }

    fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
        Ok(UserProfile {
            user_id: row.get(0)?,
            name: row.get(1)?,
            gender: row.get(2)?,
            birth_date: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            address: row.get(6)?,
            registered_at: row.get(7)?,
        })
    }
}
