//! Per-statement parameter state.
//!
//! A [`Binder`] is created fresh for every statement build and threaded by
//! `&mut` through the filter, join and assignment compilers. It owns the
//! [`ParameterCursor`] used by numbered placeholders and collects the bound
//! parameters in the order their placeholders appear in the SQL text.

use std::collections::HashSet;

use polysql_core::{SqlError, SqlResult};

use super::dialect::PlaceholderStyle;
use super::params::{QueryParams, SqlParameter, TypedValue};
use crate::value::Value;

/// Monotonic counter for numbered placeholders (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterCursor {
    next: usize,
}

impl Default for ParameterCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterCursor {
    /// Creates a cursor positioned at 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next number and advances.
    pub fn advance(&mut self) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }

    /// Returns the number the next call to [`advance`](Self::advance) yields.
    pub const fn peek(&self) -> usize {
        self.next
    }
}

/// Collects the bound parameters of one statement.
#[derive(Debug)]
pub struct Binder {
    cursor: ParameterCursor,
    params: QueryParams,
    names: HashSet<String>,
}

impl Binder {
    /// Creates an empty binder for the given placeholder style.
    pub fn new(style: PlaceholderStyle) -> Self {
        let params = match style {
            PlaceholderStyle::Named => QueryParams::Parameters(Vec::new()),
            PlaceholderStyle::PositionalAnonymous | PlaceholderStyle::PositionalNumbered => {
                QueryParams::Values(Vec::new())
            }
        };
        Self {
            cursor: ParameterCursor::new(),
            params,
            names: HashSet::new(),
        }
    }

    /// Returns the cursor for numbered placeholders.
    pub fn cursor_mut(&mut self) -> &mut ParameterCursor {
        &mut self.cursor
    }

    /// Appends a positional value.
    pub fn push_value(&mut self, value: Value) -> SqlResult<()> {
        match &mut self.params {
            QueryParams::Values(values) => {
                values.push(value);
                Ok(())
            }
            QueryParams::Parameters(_) => Err(SqlError::InvalidValue(
                "positional value bound on a named-parameter statement".to_string(),
            )),
        }
    }

    /// Appends a named parameter and returns the name actually used.
    ///
    /// Names are unique within a statement: a repeated name gets a numeric
    /// suffix (`id`, `id_2`, `id_3`).
    pub fn push_parameter(&mut self, name: &str, value: TypedValue) -> SqlResult<String> {
        let QueryParams::Parameters(parameters) = &mut self.params else {
            return Err(SqlError::InvalidValue(
                "named parameter bound on a positional statement".to_string(),
            ));
        };
        let unique = unique_name(&mut self.names, name);
        parameters.push(SqlParameter {
            name: unique.clone(),
            value,
        });
        Ok(unique)
    }

    /// Returns the number of parameters bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if nothing has been bound yet.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Consumes the binder and returns the collected parameters.
    pub fn into_params(self) -> QueryParams {
        self.params
    }
}

fn unique_name(used: &mut HashSet<String>, base: &str) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
