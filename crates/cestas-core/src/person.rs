//! [`PersonListing`], the read model served by both listing entry points,
//! and its text rendering.

use std::fmt;

use chrono::{NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};

// ─── Listing ─────────────────────────────────────────────────────────────────

/// A person left-joined with its responsible party.
///
/// The responsible-party fields are `None` when the person has no
/// `id_responsavel`. Serialised field names are the public JSON contract of
/// `GET /listar-pessoas` and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonListing {
  #[serde(rename = "ID")]
  pub id:                  i64,
  #[serde(rename = "Nome")]
  pub name:                String,
  #[serde(rename = "Endereço")]
  pub address:             String,
  #[serde(rename = "Membros da Família")]
  pub member_count:        i32,
  #[serde(rename = "CPF")]
  pub cpf:                 String,
  #[serde(rename = "Contato")]
  pub contact:             Option<String>,
  #[serde(rename = "Responsável")]
  pub responsible_name:    Option<String>,
  #[serde(rename = "CPF Responsável")]
  pub responsible_cpf:     Option<String>,
  #[serde(rename = "Contato Responsável")]
  pub responsible_contact: Option<String>,
  #[serde(rename = "Data Registro")]
  pub registered_at:       Option<NaiveDateTime>,
  #[serde(rename = "Data Distribuição")]
  pub distributed_at:      Option<NaiveDateTime>,
  #[serde(rename = "Cestas Recebidas")]
  pub baskets_received:    Option<i32>,
  #[serde(rename = "Alimentos Distribuídos")]
  pub distributed_food:    Option<String>,
}

impl PersonListing {
  /// Whether the person is linked to a responsible party.
  pub fn has_responsible(&self) -> bool {
    self.responsible_name.is_some()
      || self.responsible_cpf.is_some()
      || self.responsible_contact.is_some()
  }
}

/// Placeholder printed for absent values in the text listing. Existing
/// consumers of the text variant match on it.
const ABSENT: &str = "None";

struct Opt<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Opt<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0 {
      Some(v) => fmt::Display::fmt(v, f),
      None    => f.write_str(ABSENT),
    }
  }
}

/// Timestamp in the text listing: whole seconds, or six fractional digits
/// when there is a sub-second part.
struct Stamp(NaiveDateTime);

impl fmt::Display for Stamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let format = if self.0.nanosecond() == 0 {
      "%Y-%m-%d %H:%M:%S"
    } else {
      "%Y-%m-%d %H:%M:%S%.6f"
    };
    write!(f, "{}", self.0.format(format))
  }
}

/// One line of the text listing served by the function-style entry point.
impl fmt::Display for PersonListing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "ID: {}, Nome: {}, Endereço: {}, Membros da Família: {}, CPF: {}, Contato: {}, \
       Responsável: {} (CPF: {}, Contato: {}), Data Registro: {}, \
       Data Distribuição: {}, Cestas Recebidas: {}, Alimentos Distribuídos: {}",
      self.id,
      self.name,
      self.address,
      self.member_count,
      self.cpf,
      Opt(&self.contact),
      Opt(&self.responsible_name),
      Opt(&self.responsible_cpf),
      Opt(&self.responsible_contact),
      Opt(&self.registered_at.map(Stamp)),
      Opt(&self.distributed_at.map(Stamp)),
      Opt(&self.baskets_received),
      Opt(&self.distributed_food),
    )
  }
}

/// Join listings into the newline-separated block returned by the text
/// entry point. An empty slice yields an empty string.
pub fn render_text(listings: &[PersonListing]) -> String {
  listings
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("\n")
}
