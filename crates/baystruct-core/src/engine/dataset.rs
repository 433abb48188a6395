//! Categorical training table.
//!
//! A [`Dataset`] holds an ordered list of attribute names, a name → column
//! index map and the rows of categorical values aligned to those columns.
//! Values compare by exact string equality. The table is immutable once built,
//! so it can be shared read-only across concurrent restarts.

use rustc_hash::FxHashMap;

use crate::engine::errors::{BayesError, Result};

/// An immutable, validated categorical table.
#[derive(Debug, Clone)]
pub struct Dataset {
    attributes: Vec<String>,
    columns: FxHashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Builds a dataset from attribute names and positionally aligned rows.
    ///
    /// Fails with [`BayesError::InvalidArgument`] when there are no
    /// attributes, an attribute name repeats, a row has the wrong width, or
    /// there are no rows at all. The last check keeps every smoothed estimate
    /// away from a zero denominator.
    pub fn new<A, R, V>(attributes: A, rows: R) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(BayesError::invalid("dataset needs at least one attribute"));
        }

        let mut columns = FxHashMap::default();
        for (idx, name) in attributes.iter().enumerate() {
            if columns.insert(name.clone(), idx).is_some() {
                return Err(BayesError::invalid(format!(
                    "duplicate attribute '{}'",
                    name
                )));
            }
        }

        let mut table = Vec::new();
        for (line, row) in rows.into_iter().enumerate() {
            let row: Vec<String> = row.into_iter().map(Into::into).collect();
            if row.len() != attributes.len() {
                return Err(BayesError::invalid(format!(
                    "row {} has {} values, expected {}",
                    line,
                    row.len(),
                    attributes.len()
                )));
            }
            table.push(row);
        }

        if table.is_empty() {
            return Err(BayesError::invalid("dataset has no rows"));
        }

        Ok(Self {
            attributes,
            columns,
            rows: table,
        })
    }

    /// Attribute names in column order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw rows in load order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Column index of `attribute`.
    pub fn column(&self, attribute: &str) -> Result<usize> {
        self.columns
            .get(attribute)
            .copied()
            .ok_or_else(|| BayesError::invalid(format!("unknown attribute '{}'", attribute)))
    }

    /// Whether `attribute` names a column.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.columns.contains_key(attribute)
    }

    /// Row `index` viewed as an attribute → value mapping.
    pub fn observation(&self, index: usize) -> Option<Observation<'_>> {
        self.rows.get(index).map(|row| Observation { dataset: self, row })
    }

    /// Every row viewed as an attribute → value mapping.
    pub fn observations(&self) -> impl ExactSizeIterator<Item = Observation<'_>> + '_ {
        self.rows.iter().map(move |row| Observation { dataset: self, row })
    }

    /// Distinct values of `attribute` in first-seen order.
    pub fn distinct_values(&self, attribute: &str) -> Result<Vec<&str>> {
        let col = self.column(attribute)?;
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            let value = row[col].as_str();
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        Ok(seen)
    }

    /// Counts rows whose values match every `(column, value)` constraint.
    ///
    /// An empty constraint list matches every row.
    pub(crate) fn count_matching(&self, constraints: &[(usize, &str)]) -> usize {
        self.rows
            .iter()
            .filter(|row| constraints.iter().all(|(col, value)| row[*col] == *value))
            .count()
    }
}

/// Borrowed view of one row, addressable by attribute name.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    dataset: &'a Dataset,
    row: &'a [String],
}

impl<'a> Observation<'a> {
    /// Value observed for `attribute`.
    pub fn get(&self, attribute: &str) -> Result<&'a str> {
        let col = self.dataset.column(attribute)?;
        Ok(self.row[col].as_str())
    }

    /// Value observed in column `col`, if in range.
    pub fn get_column(&self, col: usize) -> Option<&'a str> {
        self.row.get(col).map(String::as_str)
    }

    /// `(attribute, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let dataset = self.dataset;
        dataset
            .attributes
            .iter()
            .map(String::as_str)
            .zip(self.row.iter().map(String::as_str))
    }
}
