//! Backend-neutral description of the registry schema.

/// Tables created by `ensure_tables`, in creation order. Each table only
/// references tables earlier in the list.
pub const TABLES: [&str; 4] = [
  "pessoa_responsavel",
  "pessoa",
  "estoque",
  "distribuicao_cestas",
];

/// A column that must exist on a table, with its trusted type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
  pub table:     &'static str,
  pub column:    &'static str,
  pub type_decl: &'static str,
}

/// Columns that older deployments of `pessoa` were created without.
pub const LEGACY_COLUMNS: [ColumnSpec; 2] = [
  ColumnSpec {
    table:     "pessoa",
    column:    "cestas_recebidas",
    type_decl: "INT DEFAULT 0",
  },
  ColumnSpec {
    table:     "pessoa",
    column:    "alimentos_distribuidos",
    type_decl: "TEXT",
  },
];

/// What `ensure_column` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChange {
  Added,
  AlreadyPresent,
}
