// src/db/schedule.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error, info, warn};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::error::{Result, StoreError};
use crate::db::format::{
    blank_to_none, combine_date_time, combine_optional, datetime_format, format_datetime,
    opt_datetime_format, require_non_empty,
};
use crate::db::monitoring::measure_db_operation;

// ---------------------- Enumerations ----------------------

/// Item status. Any value may replace any other through `update_item`; the
/// store never checks transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 4] = [
        ScheduleStatus::Pending,
        ScheduleStatus::InProgress,
        ScheduleStatus::Completed,
        ScheduleStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::InProgress => "in_progress",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    /// Advisory: true for pending -> in_progress -> completed and for
    /// cancelling an unfinished item. Staying put counts as forward.
    pub fn is_forward_transition(self, next: ScheduleStatus) -> bool {
        use ScheduleStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (InProgress, InProgress)
                | (Completed, Completed)
                | (Cancelled, Cancelled)
                | (Pending, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "not important")]
    NotImportant,
    #[serde(rename = "not so important")]
    NotSoImportant,
    #[serde(rename = "a little important")]
    ALittleImportant,
    #[serde(rename = "important")]
    Important,
    #[serde(rename = "very important")]
    VeryImportant,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::NotImportant,
        Priority::NotSoImportant,
        Priority::ALittleImportant,
        Priority::Important,
        Priority::VeryImportant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::NotImportant => "not important",
            Priority::NotSoImportant => "not so important",
            Priority::ALittleImportant => "a little important",
            Priority::Important => "important",
            Priority::VeryImportant => "very important",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Study,
    Life,
    Health,
    Social,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Study,
        Category::Life,
        Category::Health,
        Category::Social,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Study => "study",
            Category::Life => "life",
            Category::Health => "health",
            Category::Social => "social",
            Category::Other => "other",
        }
    }
}

// The three enums share their text mapping: Display/FromStr for callers,
// ToSql/FromSql for the CHECK-constrained TEXT columns.
macro_rules! text_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| StoreError::InvalidValue(format!("unknown {} '{}'", $what, s)))
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: StoreError| FromSqlError::Other(e.to_string().into()))
            }
        }
    };
}

text_enum!(ScheduleStatus, "status");
text_enum!(Priority, "priority");
text_enum!(Category, "category");

// ---------------------- Entities ----------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(with = "datetime_format")]
    pub start_at: NaiveDateTime,
    #[serde(with = "opt_datetime_format", default)]
    pub end_at: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: ScheduleStatus,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
}

impl ScheduleItem {
    /// Start split back into the date and time an edit form shows.
    pub fn start_date_time_parts(&self) -> (NaiveDate, NaiveTime) {
        (self.start_at.date(), self.start_at.time())
    }

    pub fn end_date_time_parts(&self) -> Option<(NaiveDate, NaiveTime)> {
        self.end_at.map(|e| (e.date(), e.time()))
    }
}

/// Form payload for add and update. Date and time arrive as separate inputs;
/// the end is kept only when both of its halves are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub title: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl ItemFields {
    pub fn new(title: impl Into<String>, start_at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start_date: start_at.date(),
            start_time: start_at.time(),
            end_date: None,
            end_time: None,
            location: None,
            description: None,
            status: ScheduleStatus::default(),
            priority: None,
            category: None,
        }
    }

    pub fn with_end(mut self, end_at: NaiveDateTime) -> Self {
        self.end_date = Some(end_at.date());
        self.end_time = Some(end_at.time());
        self
    }

    pub fn start_at(&self) -> NaiveDateTime {
        combine_date_time(self.start_date, self.start_time)
    }

    pub fn end_at(&self) -> Option<NaiveDateTime> {
        combine_optional(self.end_date, self.end_time)
    }

    pub fn validate(&self) -> Result<()> {
        require_non_empty("title", &self.title)?;
        if let Some(end) = self.end_at() {
            let start = self.start_at();
            if end < start {
                return Err(StoreError::validation(format!(
                    "end {} precedes start {}",
                    format_datetime(end),
                    format_datetime(start)
                )));
            }
        }
        Ok(())
    }
}

impl From<&ScheduleItem> for ItemFields {
    fn from(item: &ScheduleItem) -> Self {
        let (start_date, start_time) = item.start_date_time_parts();
        let end = item.end_date_time_parts();
        Self {
            title: item.title.clone(),
            start_date,
            start_time,
            end_date: end.map(|(d, _)| d),
            end_time: end.map(|(_, t)| t),
            location: item.location.clone(),
            description: item.description.clone(),
            status: item.status,
            priority: item.priority,
            category: item.category,
        }
    }
}

/// The read-query variants behind the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ItemFilter {
    All,
    ByStatus(ScheduleStatus),
    ByCategory(Category),
    ByPriority(Priority),
}

impl ItemFilter {
    pub fn pending() -> Self {
        ItemFilter::ByStatus(ScheduleStatus::Pending)
    }

    pub fn in_progress() -> Self {
        ItemFilter::ByStatus(ScheduleStatus::InProgress)
    }

    pub fn completed() -> Self {
        ItemFilter::ByStatus(ScheduleStatus::Completed)
    }

    /// Finished work is listed most recent first; every other view is
    /// chronological.
    pub fn descending(&self) -> bool {
        matches!(self, ItemFilter::ByStatus(ScheduleStatus::Completed))
    }

    fn condition(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ItemFilter::All => None,
            ItemFilter::ByStatus(s) => Some(("status", s.as_str())),
            ItemFilter::ByCategory(c) => Some(("category", c.as_str())),
            ItemFilter::ByPriority(p) => Some(("priority", p.as_str())),
        }
    }

    fn query(&self) -> (String, Option<&'static str>) {
        let dir = if self.descending() { "DESC" } else { "ASC" };
        let (clause, value) = match self.condition() {
            Some((column, value)) => (format!(" AND {column} = ?2"), Some(value)),
            None => (String::new(), None),
        };
        let sql = format!(
            "{SELECT_ITEMS} WHERE user_id = ?1{clause} ORDER BY start_time {dir}, event_id {dir}"
        );
        (sql, value)
    }
}

/// `(id, title)` pair for pick lists. Displays as "id: title"; callers pass
/// `id` back, the text is for people only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLabel {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.title)
    }
}

// ---------------------- Repository ----------------------

const SELECT_ITEMS: &str = "SELECT event_id, user_id, title, start_time, end_time, location, \
     description, status, priority, category FROM personal_schedule";

pub struct ScheduleRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ScheduleRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list_items(&self, user_id: i64, filter: ItemFilter) -> Result<Vec<ScheduleItem>> {
        measure_db_operation("list_items", || -> Result<Vec<ScheduleItem>> {
            let (sql, value) = filter.query();
            debug!("list_items user_id={user_id} filter={filter:?}");

            let mut stmt = self.conn.prepare(&sql)?;
            let rows = match value {
                Some(v) => stmt.query_map(params![user_id, v], Self::row_to_item)?,
                None => stmt.query_map(params![user_id], Self::row_to_item)?,
            };

            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            Ok(items)
        })
    }

    /// Edit-form prefill.
    pub fn get_item(&self, item_id: i64) -> Result<Option<ScheduleItem>> {
        measure_db_operation("get_item", || -> Result<Option<ScheduleItem>> {
            let sql = format!("{SELECT_ITEMS} WHERE event_id = ?1");
            let item = self
                .conn
                .query_row(&sql, params![item_id], Self::row_to_item)
                .optional()?;
            Ok(item)
        })
    }

    /// Inserts a new item for `user_id` and returns its generated id.
    pub fn add_item(&self, user_id: i64, fields: &ItemFields) -> Result<i64> {
        measure_db_operation("add_item", || -> Result<i64> {
            if let Err(e) = fields.validate() {
                warn!("add_item rejected for user_id={user_id}: {e}");
                return Err(e);
            }

            let tx = self.conn.unchecked_transaction()?;
            let inserted = tx.execute(
                r#"
                INSERT INTO personal_schedule
                    (user_id, title, start_time, end_time, location,
                     description, status, priority, category)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    user_id,
                    fields.title,
                    format_datetime(fields.start_at()),
                    fields.end_at().map(format_datetime),
                    blank_to_none(fields.location.clone()),
                    blank_to_none(fields.description.clone()),
                    fields.status,
                    fields.priority,
                    fields.category
                ],
            );
            if let Err(e) = inserted {
                error!("add_item failed for user_id={user_id}: {e}");
                return Err(e.into());
            }
            let id = tx.last_insert_rowid();
            tx.commit()?;

            info!("schedule item {id} added for user_id={user_id}");
            Ok(id)
        })
    }

    /// Replaces every editable column of `item_id`. Ownership is not checked
    /// and a missing id changes nothing.
    pub fn update_item(&self, item_id: i64, fields: &ItemFields) -> Result<()> {
        measure_db_operation("update_item", || -> Result<()> {
            if let Err(e) = fields.validate() {
                warn!("update_item rejected for event_id={item_id}: {e}");
                return Err(e);
            }

            let tx = self.conn.unchecked_transaction()?;
            let updated = tx.execute(
                r#"
                UPDATE personal_schedule SET
                    title = ?1, start_time = ?2, end_time = ?3,
                    location = ?4, description = ?5, status = ?6,
                    priority = ?7, category = ?8
                WHERE event_id = ?9
                "#,
                params![
                    fields.title,
                    format_datetime(fields.start_at()),
                    fields.end_at().map(format_datetime),
                    blank_to_none(fields.location.clone()),
                    blank_to_none(fields.description.clone()),
                    fields.status,
                    fields.priority,
                    fields.category,
                    item_id
                ],
            );
            let changed = match updated {
                Ok(n) => n,
                Err(e) => {
                    error!("update_item failed for event_id={item_id}: {e}");
                    return Err(e.into());
                }
            };
            tx.commit()?;

            if changed == 0 {
                warn!("update_item: no schedule item with event_id={item_id}");
            } else {
                info!("schedule item {item_id} updated");
            }
            Ok(())
        })
    }

    /// Unconditional delete; deleting a missing id is not an error.
    pub fn delete_item(&self, item_id: i64) -> Result<()> {
        measure_db_operation("delete_item", || -> Result<()> {
            let tx = self.conn.unchecked_transaction()?;
            let removed = tx.execute(
                "DELETE FROM personal_schedule WHERE event_id = ?1",
                params![item_id],
            )?;
            tx.commit()?;
            debug!("delete_item event_id={item_id} removed={removed}");
            Ok(())
        })
    }

    pub fn list_item_labels(&self, user_id: i64) -> Result<Vec<ItemLabel>> {
        measure_db_operation("list_item_labels", || -> Result<Vec<ItemLabel>> {
            let mut stmt = self.conn.prepare(
                "SELECT event_id, title FROM personal_schedule
                 WHERE user_id = ?1
                 ORDER BY start_time ASC, event_id ASC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok(ItemLabel {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?;

            let mut labels = Vec::new();
            for row in rows {
                labels.push(row?);
            }
            Ok(labels)
        })
    }

    /// JSON front for `add_item`; answers with the stored item.
    pub fn add_item_json(&self, user_id: i64, json_input: &str) -> Result<String> {
        let fields: ItemFields = serde_json::from_str(json_input)?;
        let id = self.add_item(user_id, &fields)?;
        let item = self.get_item(id)?;
        Ok(serde_json::to_string(&item)?)
    }

    pub fn update_item_json(&self, item_id: i64, json_input: &str) -> Result<String> {
        let fields: ItemFields = serde_json::from_str(json_input)?;
        self.update_item(item_id, &fields)?;
        let item = self.get_item(item_id)?;
        Ok(serde_json::to_string(&item)?)
    }

    pub fn list_items_json(&self, user_id: i64, filter: ItemFilter) -> Result<String> {
        let items = self.list_items(user_id, filter)?;
        Ok(serde_json::to_string(&items)?)
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ScheduleItem> {
        let status: Option<ScheduleStatus> = row.get(7)?;
        Ok(ScheduleItem {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            start_at: row.get(3)?,
            end_at: row.get(4)?,
            location: row.get(5)?,
            description: row.get(6)?,
            status: status.unwrap_or_default(),
            priority: row.get(8)?,
            category: row.get(9)?,
        })
    }
}
