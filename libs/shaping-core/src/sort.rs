//! Sort specification strings: `"-created_at,department.code,id"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ShapingError, ShapingResult};

/// Upper bound on the raw sort string, checked before any splitting.
pub const MAX_SORT_SPEC_LEN: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// One (field path, direction) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortTerm {
    pub path: Vec<String>,
    pub dir: SortDir,
}

impl SortTerm {
    /// The path joined back with dots, e.g. `department.code`.
    pub fn key(&self) -> String {
        self.path.join(".")
    }

    pub fn is_descending(&self) -> bool {
        self.dir == SortDir::Desc
    }
}

/// Ordered, non-empty list of sort terms. The first term is the primary key,
/// the rest are tiebreakers in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec(Vec<SortTerm>);

impl SortSpec {
    /// Parse a comma separated sort string. A leading `-` marks a descending
    /// term; dots separate nested path segments.
    pub fn parse(raw: &str) -> ShapingResult<Self> {
        if raw.trim().is_empty() {
            return Err(ShapingError::invalid_sort("sort specification is empty"));
        }
        if raw.len() > MAX_SORT_SPEC_LEN {
            return Err(ShapingError::invalid_sort("sort specification is too long"));
        }

        let mut terms = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (dir, path) = match part.strip_prefix('-') {
                Some(rest) => (SortDir::Desc, rest),
                None => (SortDir::Asc, part),
            };
            terms.push(SortTerm {
                path: path.split('.').map(str::to_owned).collect(),
                dir,
            });
        }

        if terms.is_empty() {
            return Err(ShapingError::invalid_sort(
                "no valid columns specified in sort specification",
            ));
        }
        Ok(Self(terms))
    }

    pub fn terms(&self) -> &[SortTerm] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as signed tokens, e.g. `-created_at,+id`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|t| {
                let sign = match t.dir {
                    SortDir::Asc => '+',
                    SortDir::Desc => '-',
                };
                format!("{sign}{}", t.key())
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_signed_tokens())
    }
}

impl<'a> IntoIterator for &'a SortSpec {
    type Item = &'a SortTerm;
    type IntoIter = std::slice::Iter<'a, SortTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
