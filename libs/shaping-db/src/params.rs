//! Named parameter bag for hand-written SQL, bound through SeaORM.
//!
//! Raw fragments reference parameters as `@name`. [`ParamBag::to_statement`]
//! rewrites them into the backend's positional placeholders and collects the
//! values in order.

use sea_orm::{DbBackend, Statement, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("parameter '@{0}' is referenced but not bound")]
    UnboundParameter(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(Value),
    /// Expands to a parenthesised placeholder list.
    List(Vec<Value>),
}

/// Ordered name → value collection. Names match case-insensitively; adding
/// an existing name replaces its value in place and keeps the first spelling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamBag {
    entries: Vec<(String, ParamValue)>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn add_scalar(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.add(name, ParamValue::Scalar(value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find_map(|(n, v)| n.eq_ignore_ascii_case(name).then_some(v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Rewrite every `@name` in `sql` into a positional placeholder for
    /// `backend` and bind the values in order.
    ///
    /// Text inside `'...'` literals, `"..."`/`` `...` `` identifiers, `--` line
    /// comments and `/* */` block comments is copied through untouched, as is
    /// `@@name`. An empty list renders as `(NULL)`, which matches nothing.
    pub fn to_statement(&self, sql: &str, backend: DbBackend) -> Result<Statement, BindError> {
        let mut out = String::with_capacity(sql.len());
        let mut values = Vec::new();
        let mut rest = sql;

        while let Some(pos) = rest.find(['\'', '"', '`', '-', '/', '@']) {
            let (head, tail) = rest.split_at(pos);
            out.push_str(head);

            let skip = match tail.as_bytes() {
                [b'\'', ..] => quoted_len(tail, '\''),
                [b'"', ..] => quoted_len(tail, '"'),
                [b'`', ..] => quoted_len(tail, '`'),
                [b'-', b'-', ..] => tail.find('\n').unwrap_or(tail.len()),
                [b'/', b'*', ..] => tail[2..].find("*/").map_or(tail.len(), |i| i + 4),
                [b'@', b'@', ..] => 2,
                [b'@', ..] => match param_name(&tail[1..]) {
                    "" => 1,
                    name => {
                        self.bind(name, backend, &mut out, &mut values)?;
                        rest = &tail[1 + name.len()..];
                        continue;
                    }
                },
                _ => 1,
            };
            out.push_str(&tail[..skip]);
            rest = &tail[skip..];
        }
        out.push_str(rest);

        tracing::trace!(params = values.len(), "bound raw statement");
        Ok(Statement::from_sql_and_values(backend, &out, values))
    }

    fn bind(
        &self,
        name: &str,
        backend: DbBackend,
        out: &mut String,
        values: &mut Vec<Value>,
    ) -> Result<(), BindError> {
        match self.get(name) {
            Some(ParamValue::Scalar(v)) => {
                values.push(v.clone());
                push_placeholder(out, backend, values.len());
            }
            Some(ParamValue::List(items)) if items.is_empty() => out.push_str("(NULL)"),
            Some(ParamValue::List(items)) => {
                out.push('(');
                for (k, v) in items.iter().enumerate() {
                    if k > 0 {
                        out.push_str(", ");
                    }
                    values.push(v.clone());
                    push_placeholder(out, backend, values.len());
                }
                out.push(')');
            }
            None => return Err(BindError::UnboundParameter(name.to_owned())),
        }
        Ok(())
    }
}

/// Length of a quoted run starting at `s[0]`, closing quote included. An
/// unterminated run takes the rest of the input.
fn quoted_len(s: &str, quote: char) -> usize {
    s[1..].find(quote).map_or(s.len(), |i| i + 2)
}

fn param_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn push_placeholder(out: &mut String, backend: DbBackend, n: usize) {
    match backend {
        DbBackend::Postgres => {
            out.push('$');
            out.push_str(&n.to_string());
        }
        _ => out.push('?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> ParamBag {
        let mut bag = ParamBag::new();
        bag.add_scalar("Name", "Ada");
        bag.add(
            "Status",
            ParamValue::List(vec!["active".into(), "leave".into()]),
        );
        bag
    }

    #[test]
    fn test_rewrites_for_sqlite() {
        let stmt = bag()
            .to_statement("WHERE name = @Name AND status IN @Status", DbBackend::Sqlite)
            .unwrap();
        assert_eq!(stmt.sql, "WHERE name = ? AND status IN (?, ?)");
        let values = stmt.values.expect("values").0;
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Value::from("Ada"));
    }

    #[test]
    fn test_rewrites_for_postgres_with_numbered_placeholders() {
        let stmt = bag()
            .to_statement("WHERE status IN @Status AND name = @Name", DbBackend::Postgres)
            .unwrap();
        assert_eq!(stmt.sql, "WHERE status IN ($1, $2) AND name = $3");
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let mut bag = ParamBag::new();
        bag.add("Ids", ParamValue::List(Vec::new()));
        let stmt = bag.to_statement("WHERE id IN @Ids", DbBackend::Sqlite).unwrap();
        assert_eq!(stmt.sql, "WHERE id IN (NULL)");
    }

    #[test]
    fn test_literals_and_system_vars_are_untouched() {
        let stmt = bag()
            .to_statement("SELECT '@Name', @@version, @Name", DbBackend::MySql)
            .unwrap();
        assert_eq!(stmt.sql, "SELECT '@Name', @@version, ?");
    }

    #[test]
    fn test_unbound_parameter_is_reported() {
        let err = bag()
            .to_statement("WHERE x = @Missing", DbBackend::Sqlite)
            .unwrap_err();
        assert_eq!(err, BindError::UnboundParameter("Missing".into()));
    }

    #[test]
    fn test_add_replaces_existing_name_in_place() {
        let mut bag = bag();
        bag.add_scalar("Name", "Grace");
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.iter().next().map(|(n, _)| n), Some("Name"));
        assert_eq!(bag.get("Name"), Some(&ParamValue::Scalar("Grace".into())));
    }

    #[test]
    fn test_apostrophe_in_line_comment_does_not_hide_parameters() {
        let stmt = bag()
            .to_statement(
                "SELECT name FROM employee -- don't return deleted rows\nWHERE name = @Name",
                DbBackend::Sqlite,
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT name FROM employee -- don't return deleted rows\nWHERE name = ?"
        );
        assert_eq!(stmt.values.expect("values").0.len(), 1);
    }

    #[test]
    fn test_comments_and_quoted_identifiers_are_copied_through() {
        let stmt = bag()
            .to_statement(
                "SELECT \"it's\" /* @Name isn't bound here */ FROM t WHERE a = @Name -- @Status\n AND b IN @Status",
                DbBackend::Postgres,
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"it's\" /* @Name isn't bound here */ FROM t WHERE a = $1 -- @Status\n AND b IN ($2, $3)"
        );
    }

    #[test]
    fn test_unbound_parameter_after_comment_is_reported() {
        let err = bag()
            .to_statement("SELECT 1 -- it's fine\nWHERE x = @Missing", DbBackend::Sqlite)
            .unwrap_err();
        assert_eq!(err, BindError::UnboundParameter("Missing".into()));
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let stmt = bag()
            .to_statement("WHERE note = 'it''s @Name' AND name = @Name", DbBackend::Sqlite)
            .unwrap();
        assert_eq!(stmt.sql, "WHERE note = 'it''s @Name' AND name = ?");
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let mut bag = bag();
        let stmt = bag
            .to_statement("WHERE name = @name", DbBackend::Sqlite)
            .unwrap();
        assert_eq!(stmt.sql, "WHERE name = ?");

        bag.add_scalar("NAME", "Grace");
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.iter().next().map(|(n, _)| n), Some("Name"));
        assert_eq!(bag.get("name"), Some(&ParamValue::Scalar("Grace".into())));
    }
}
