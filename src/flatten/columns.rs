//! Column naming strategies.
//!
//! `Full` keeps the separator-joined field path. `Short` keeps only the leaf
//! field name and resolves collisions by prefixing the nearest ancestor
//! segment, repeatedly, until every name is unique. Candidates are processed
//! sorted by full path, so two equivalent queries that differ only in field
//! order produce identical final names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::flatten::normalize::Row;
use crate::query::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// The separator-joined field path, unchanged.
    #[default]
    Full,
    /// The leaf field name, with ancestor prefixes added only on collision.
    Short,
}

impl std::str::FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(NamingStrategy::Full),
            "short" => Ok(NamingStrategy::Short),
            other => Err(format!("unknown naming strategy '{other}'")),
        }
    }
}

/// Naming configuration: one default strategy plus per-frame overrides.
#[derive(Debug, Clone, Default)]
pub struct NamingOptions {
    pub default: NamingStrategy,
    pub per_frame: HashMap<String, NamingStrategy>,
}

impl NamingOptions {
    pub fn full() -> Self {
        NamingOptions::default()
    }

    pub fn short() -> Self {
        NamingOptions {
            default: NamingStrategy::Short,
            per_frame: HashMap::new(),
        }
    }

    pub fn with_frame(mut self, frame: &str, strategy: NamingStrategy) -> Self {
        self.per_frame.insert(frame.to_string(), strategy);
        self
    }

    pub fn strategy_for(&self, frame: &str) -> NamingStrategy {
        self.per_frame.get(frame).copied().unwrap_or(self.default)
    }
}

/// Compute the final name for every column path, as full-name → final-name.
pub fn resolve_names(
    paths: &[FieldPath],
    separator: &str,
    strategy: NamingStrategy,
) -> HashMap<String, String> {
    let mut sorted: Vec<&FieldPath> = paths.iter().collect();
    sorted.sort();
    sorted.dedup();

    match strategy {
        NamingStrategy::Full => sorted
            .iter()
            .map(|p| {
                let name = p.join(separator);
                (name.clone(), name)
            })
            .collect(),
        NamingStrategy::Short => {
            let mut depths = vec![1usize; sorted.len()];
            loop {
                let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
                for (i, path) in sorted.iter().enumerate() {
                    groups.entry(candidate(path, depths[i], separator)).or_default().push(i);
                }

                let mut changed = false;
                for indices in groups.values() {
                    if indices.len() < 2 {
                        continue;
                    }
                    for &i in indices {
                        if depths[i] < sorted[i].len() {
                            depths[i] += 1;
                            changed = true;
                        }
                    }
                }
                if !changed {
                    break;
                }
            }

            sorted
                .iter()
                .enumerate()
                .map(|(i, p)| (p.join(separator), candidate(p, depths[i], separator)))
                .collect()
        }
    }
}

/// The last `depth` segments of `path`, joined.
fn candidate(path: &FieldPath, depth: usize, separator: &str) -> String {
    let segments = path.segments();
    let start = segments.len().saturating_sub(depth);
    segments[start..].join(separator)
}

/// Rewrite every row's column names through `mapping`. Columns without a
/// mapping entry (e.g. a fallback-labeled column) keep their name.
pub fn apply_naming(rows: Vec<Row>, mapping: &HashMap<String, String>) -> Vec<Row> {
    if mapping.iter().all(|(full, short)| full == short) {
        return rows;
    }
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(name, value)| match mapping.get(&name) {
                    Some(renamed) => (renamed.clone(), value),
                    None => (name, value),
                })
                .collect()
        })
        .collect()
}
