//! SQL schema for the Cestas SQLite store.
//!
//! Every statement is safe to re-run: tables use `CREATE TABLE IF NOT EXISTS`
//! and legacy columns are added only after checking `pragma_table_info`.

use cestas_core::Error as CoreError;

/// Applied to every new connection. Foreign keys are off by default in
/// SQLite and the `pessoa -> pessoa_responsavel` reference relies on them.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Table DDL in creation order; see [`cestas_core::schema::TABLES`].
pub const TABLE_DDL: [&str; 4] = [
  "CREATE TABLE IF NOT EXISTS pessoa_responsavel (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    nome          VARCHAR(255) NOT NULL,
    cpf           VARCHAR(14) UNIQUE NOT NULL,
    contato       VARCHAR(20) NOT NULL,
    data_registro TIMESTAMP DEFAULT CURRENT_TIMESTAMP
  )",
  // cestas_recebidas and alimentos_distribuidos are also back-filled on
  // older databases by `ensure_legacy_columns`.
  "CREATE TABLE IF NOT EXISTS pessoa (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    nome                   VARCHAR(255) NOT NULL,
    endereco               TEXT NOT NULL,
    num_membros            INT NOT NULL,
    cpf                    VARCHAR(14) NOT NULL,
    contato                VARCHAR(20),
    id_responsavel         INT REFERENCES pessoa_responsavel(id),
    data_registro          TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    data_distribuicao      TIMESTAMP,
    cestas_recebidas       INT DEFAULT 0,
    alimentos_distribuidos TEXT
  )",
  "CREATE TABLE IF NOT EXISTS estoque (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    alimento   VARCHAR(255) NOT NULL,
    quantidade INT NOT NULL
  )",
  "CREATE TABLE IF NOT EXISTS distribuicao_cestas (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    pessoa_id         INT REFERENCES pessoa(id),
    data_distribuicao TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    alimentos         TEXT NOT NULL
  )",
];

/// Does `table` have a column named `column`? SQLite column names compare
/// case-insensitively.
pub const COLUMN_EXISTS: &str =
  "SELECT COUNT(*) > 0 FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE";

pub const LIST_PEOPLE: &str = "
SELECT p.id, p.nome, p.endereco, p.num_membros, p.cpf, p.contato,
       p.data_registro, p.data_distribuicao, p.cestas_recebidas,
       p.alimentos_distribuidos,
       r.nome    AS nome_responsavel,
       r.cpf     AS cpf_responsavel,
       r.contato AS contato_responsavel
FROM pessoa p
LEFT JOIN pessoa_responsavel r ON p.id_responsavel = r.id
";

/// Quote `name` as an SQLite identifier: wrap in double quotes and double any
/// embedded quote.
pub fn quote_identifier(name: &str) -> Result<String, CoreError> {
  if name.is_empty() || name.contains('\0') {
    return Err(CoreError::InvalidIdentifier(name.to_owned()));
  }
  Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// `ALTER TABLE .. ADD COLUMN ..` with quoted identifiers and a trusted type
/// declaration.
pub fn add_column_sql(table: &str, column: &str, type_decl: &str) -> Result<String, CoreError> {
  Ok(format!(
    "ALTER TABLE {} ADD COLUMN {} {type_decl}",
    quote_identifier(table)?,
    quote_identifier(column)?,
  ))
}
