//! Business filtering: criteria, typed predicate clauses and SQL rendering
//!
//! A [`Predicate`] is a list of typed clauses. It is rendered to SQL only at
//! the end, through a [`SqlWriter`] that turns every value into a positional
//! `$n` placeholder. Column names come from the closed [`Column`] enum, so no
//! request input ever reaches the statement text.
//!
//! # Example
//!
//! ```rust,ignore
//! let criteria = FilterCriteria {
//!     category: Some("Food".into()),
//!     search: Some("jollof".into()),
//!     ..Default::default()
//! };
//! let (sql, params) = Predicate::from_criteria(&criteria).render();
//! // sql    = "b.is_active = true AND b.category = $1 AND (b.name ILIKE $2 OR b.description ILIKE $2)"
//! // params = [Text("Food"), Text("%jollof%")]
//! ```

use crate::core::model::Business;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional filters accepted by listing and search endpoints
///
/// All present criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

impl FilterCriteria {
    /// Drop blank values so that `?category=` behaves like no category at all
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            category: clean(self.category),
            location: clean(self.location),
            search: clean(self.search),
        }
    }

    /// The free-text term, if any
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Uuid(Uuid),
}

/// Columns of the `businesses` table (aliased `b`) that predicates may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Description,
    Category,
    Location,
}

impl Column {
    pub fn qualified(&self) -> &'static str {
        match self {
            Column::Id => "b.id",
            Column::Name => "b.name",
            Column::Description => "b.description",
            Column::Category => "b.category",
            Column::Location => "b.location",
        }
    }

    fn text_of<'a>(&self, business: &'a Business) -> Option<&'a str> {
        match self {
            Column::Name => Some(&business.name),
            Column::Description => Some(&business.description),
            Column::Category => Some(&business.category),
            Column::Location => Some(&business.location),
            Column::Id => None,
        }
    }
}

/// One condition of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `b.is_active = true`
    Active,
    /// Exact, case-sensitive equality on a text column
    Equals { column: Column, value: String },
    /// Case-insensitive substring match on any of the columns
    Contains { columns: Vec<Column>, term: String },
    /// Identity match
    IdEquals(Uuid),
}

/// Accumulates SQL text and bound values with consistent `$n` numbering
#[derive(Debug, Default)]
pub struct SqlWriter {
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append trusted statement text
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Bind a value and append its placeholder; returns the placeholder index
    pub fn push_bind(&mut self, value: SqlValue) -> usize {
        self.params.push(value);
        let index = self.params.len();
        self.sql.push('$');
        self.sql.push_str(&index.to_string());
        index
    }

    /// Append a placeholder that was already bound earlier
    pub fn push_placeholder(&mut self, index: usize) -> &mut Self {
        self.sql.push('$');
        self.sql.push_str(&index.to_string());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

/// Placeholder indices assigned while writing a predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct WrittenPredicate {
    /// Placeholder holding the `%term%` pattern of the search clause
    pub search_placeholder: Option<usize>,
}

/// Escape LIKE metacharacters and wrap the term for substring matching
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring containment, the in-memory twin of `ILIKE '%term%'`
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A filter over businesses: the base `Active` clause plus optional criteria
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Build the predicate for listing and search endpoints
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut builder = PredicateBuilder::active();
        if let Some(category) = &criteria.category {
            builder = builder.equals(Column::Category, category);
        }
        if let Some(location) = &criteria.location {
            builder = builder.equals(Column::Location, location);
        }
        if let Some(term) = &criteria.search {
            builder = builder.contains(&[Column::Name, Column::Description], term);
        }
        builder.build()
    }

    /// Predicate selecting one active business
    pub fn active_business(id: Uuid) -> Self {
        PredicateBuilder::active().id(id).build()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The free-text term of the first `Contains` clause, if any
    pub fn search_term(&self) -> Option<&str> {
        self.clauses.iter().find_map(|clause| match clause {
            Clause::Contains { term, .. } => Some(term.as_str()),
            _ => None,
        })
    }

    /// Write the predicate (without `WHERE`) into a statement under construction
    pub fn write_to(&self, writer: &mut SqlWriter) -> WrittenPredicate {
        let mut written = WrittenPredicate::default();

        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                writer.push(" AND ");
            }
            match clause {
                Clause::Active => {
                    writer.push("b.is_active = true");
                }
                Clause::Equals { column, value } => {
                    writer.push(column.qualified()).push(" = ");
                    writer.push_bind(SqlValue::Text(value.clone()));
                }
                Clause::Contains { columns, term } => {
                    // One bound pattern shared by every column
                    let mut placeholder = None;
                    writer.push("(");
                    for (j, column) in columns.iter().enumerate() {
                        if j > 0 {
                            writer.push(" OR ");
                        }
                        writer.push(column.qualified()).push(" ILIKE ");
                        match placeholder {
                            Some(index) => {
                                writer.push_placeholder(index);
                            }
                            None => {
                                placeholder =
                                    Some(writer.push_bind(SqlValue::Text(contains_pattern(term))));
                            }
                        }
                    }
                    writer.push(")");
                    if written.search_placeholder.is_none() {
                        written.search_placeholder = placeholder;
                    }
                }
                Clause::IdEquals(id) => {
                    writer.push(Column::Id.qualified()).push(" = ");
                    writer.push_bind(SqlValue::Uuid(*id));
                }
            }
        }

        written
    }

    /// Render the predicate on its own, numbering placeholders from `$1`
    pub fn render(&self) -> (String, Vec<SqlValue>) {
        let mut writer = SqlWriter::new();
        self.write_to(&mut writer);
        writer.finish()
    }

    /// Evaluate the predicate against an in-memory business
    pub fn matches(&self, business: &Business) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Active => business.is_active,
            Clause::Equals { column, value } => column.text_of(business) == Some(value.as_str()),
            Clause::Contains { columns, term } => columns.iter().any(|column| {
                column
                    .text_of(business)
                    .is_some_and(|text| contains_ignore_case(text, term))
            }),
            Clause::IdEquals(id) => business.id == *id,
        })
    }
}

/// Accumulates typed clauses; nothing is rendered until [`Predicate::write_to`]
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    clauses: Vec<Clause>,
}

impl PredicateBuilder {
    /// Start from the base condition every query shares
    pub fn active() -> Self {
        Self {
            clauses: vec![Clause::Active],
        }
    }

    pub fn equals(mut self, column: Column, value: &str) -> Self {
        self.clauses.push(Clause::Equals {
            column,
            value: value.to_string(),
        });
        self
    }

    pub fn contains(mut self, columns: &[Column], term: &str) -> Self {
        self.clauses.push(Clause::Contains {
            columns: columns.to_vec(),
            term: term.to_string(),
        });
        self
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.clauses.push(Clause::IdEquals(id));
        self
    }

    pub fn build(self) -> Predicate {
        Predicate {
            clauses: self.clauses,
        }
    }
}
