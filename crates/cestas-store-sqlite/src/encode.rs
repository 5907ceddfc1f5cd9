//! Decoding helpers between SQLite column values and domain types.
//!
//! `TIMESTAMP DEFAULT CURRENT_TIMESTAMP` stores `YYYY-MM-DD HH:MM:SS` text in
//! UTC. Values written by other clients may use any of SQLite's time-value
//! forms: fractional seconds, no seconds, an ISO 8601 `T` separator, or a bare
//! date (read as midnight).

use cestas_core::{Error as CoreError, person::PersonListing};
use chrono::{NaiveDate, NaiveDateTime};

use crate::Result;

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

const TIMESTAMP_FORMATS: [&str; 4] = [
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M",
];

pub fn decode_timestamp(s: &str) -> Result<NaiveDateTime> {
  TIMESTAMP_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .or_else(|| {
      NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
    .ok_or_else(|| CoreError::Timestamp(s.to_owned()).into())
}

fn decode_opt_timestamp(s: Option<String>) -> Result<Option<NaiveDateTime>> {
  s.as_deref().map(decode_timestamp).transpose()
}

// ─── Raw row ─────────────────────────────────────────────────────────────────

/// One row of the listing query as read straight off the connection, before
/// timestamp parsing. Parsing happens outside the database thread.
#[derive(Debug)]
pub struct RawListing {
  pub id:                  i64,
  pub name:                String,
  pub address:             String,
  pub member_count:        i32,
  pub cpf:                 String,
  pub contact:             Option<String>,
  pub registered_at:       Option<String>,
  pub distributed_at:      Option<String>,
  pub baskets_received:    Option<i32>,
  pub distributed_food:    Option<String>,
  pub responsible_name:    Option<String>,
  pub responsible_cpf:     Option<String>,
  pub responsible_contact: Option<String>,
}

impl RawListing {
  /// Column order matches `schema::LIST_PEOPLE`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      name:                row.get(1)?,
      address:             row.get(2)?,
      member_count:        row.get(3)?,
      cpf:                 row.get(4)?,
      contact:             row.get(5)?,
      registered_at:       row.get(6)?,
      distributed_at:      row.get(7)?,
      baskets_received:    row.get(8)?,
      distributed_food:    row.get(9)?,
      responsible_name:    row.get(10)?,
      responsible_cpf:     row.get(11)?,
      responsible_contact: row.get(12)?,
    })
  }

  pub fn into_listing(self) -> Result<PersonListing> {
    Ok(PersonListing {
      id:                  self.id,
      name:                self.name,
      address:             self.address,
      member_count:        self.member_count,
      cpf:                 self.cpf,
      contact:             self.contact,
      responsible_name:    self.responsible_name,
      responsible_cpf:     self.responsible_cpf,
      responsible_contact: self.responsible_contact,
      registered_at:       decode_opt_timestamp(self.registered_at)?,
      distributed_at:      decode_opt_timestamp(self.distributed_at)?,
      baskets_received:    self.baskets_received,
      distributed_food:    self.distributed_food,
    })
  }
}
