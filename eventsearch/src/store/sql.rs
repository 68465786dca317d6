//! SQL rendering for store queries
//!
//! Values are always bound as parameters; only static column and table
//! names and the integer limit appear in the statement text.

use crate::events::{columns, EventRecord};
use crate::filter::{Order, Predicate, Value};

use super::StoreQuery;

/// Placeholder style of the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `$1, $2, ...`
    Postgres,
    /// `?`
    MySql,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::MySql => "?".to_string(),
        }
    }
}

/// A statement and its parameters in bind order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Render the select statement for a record type
///
/// Nullable columns are selected as `COALESCE(col, zero) AS col` so rows
/// written before a column existed decode like any other row.
pub fn compile_select<E: EventRecord>(dialect: Dialect, query: &StoreQuery) -> CompiledQuery {
    let select: Vec<String> = query
        .selected_columns::<E>()
        .into_iter()
        .map(|column| match E::null_as(column) {
            Some(null_as) => format!("COALESCE({column}, {}) AS {column}", null_as.as_sql()),
            None => column.to_string(),
        })
        .collect();
    let select: Vec<&str> = select.iter().map(String::as_str).collect();
    compile(dialect, E::TABLE, &select, query)
}

/// Render `SELECT .. FROM table WHERE .. ORDER BY .. LIMIT ..`
pub fn compile(
    dialect: Dialect,
    table: &str,
    select: &[&str],
    query: &StoreQuery,
) -> CompiledQuery {
    let mut writer = Writer {
        dialect,
        binds: Vec::new(),
    };

    let conditions: Vec<String> = query
        .predicates
        .iter()
        .flat_map(|predicate| writer.predicate(predicate))
        .collect();

    let mut sql = format!("SELECT {} FROM {}", select.join(", "), table);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    let direction = query.order.as_sql();
    sql.push_str(&format!(
        " ORDER BY {} {}, {} {} LIMIT {}",
        columns::TIMESTAMP,
        direction,
        columns::ID,
        direction,
        query.limit
    ));

    CompiledQuery {
        sql,
        binds: writer.binds,
    }
}

struct Writer {
    dialect: Dialect,
    binds: Vec<Value>,
}

impl Writer {
    fn bind(&mut self, value: Value) -> String {
        self.binds.push(value);
        self.dialect.placeholder(self.binds.len())
    }

    fn bind_list(&mut self, values: &[Value]) -> String {
        values
            .iter()
            .map(|value| self.bind(value.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn predicate(&mut self, predicate: &Predicate) -> Vec<String> {
        match predicate {
            Predicate::Equals { column, value } => {
                vec![format!("{} = {}", column, self.bind(value.clone()))]
            }
            Predicate::InSet { values, .. } | Predicate::ExcludeSet { values, .. }
                if values.is_empty() =>
            {
                Vec::new()
            }
            Predicate::InSet { column, values } => {
                vec![format!("{} IN ({})", column, self.bind_list(values))]
            }
            Predicate::ExcludeSet { column, values } => {
                vec![format!("{} NOT IN ({})", column, self.bind_list(values))]
            }
            Predicate::Range {
                column,
                lower,
                upper,
            } => {
                let mut parts = Vec::with_capacity(2);
                if let Some(lower) = lower {
                    parts.push(format!("{} >= {}", column, self.bind(Value::from(*lower))));
                }
                if let Some(upper) = upper {
                    parts.push(format!("{} <= {}", column, self.bind(Value::from(*upper))));
                }
                parts
            }
            Predicate::Seek {
                order,
                timestamp,
                id,
            } => {
                let op = match order {
                    Order::Ascending => ">",
                    Order::Descending => "<",
                };
                let ts_cmp = self.bind(Value::from(*timestamp));
                let ts_eq = self.bind(Value::from(*timestamp));
                let id_cmp = self.bind(Value::from(id.as_str()));
                vec![format!(
                    "({ts} {op} {ts_cmp} OR ({ts} = {ts_eq} AND {id} {op} {id_cmp}))",
                    ts = columns::TIMESTAMP,
                    id = columns::ID,
                )]
            }
        }
    }
}
