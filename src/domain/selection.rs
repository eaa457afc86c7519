//! Asset selection parsing and resolution against a loaded table.

use crate::domain::series_table::SeriesTable;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetSelection {
    /// Every asset in the table.
    #[default]
    All,
    Only(BTreeSet<String>),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectionError {
    #[error("empty token in asset list")]
    EmptyToken,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),
}

/// Parses a comma-separated asset list. Ids are case-sensitive since they
/// come from file names.
pub fn parse_assets(input: &str) -> Result<Vec<String>, SelectionError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SelectionError::EmptyToken);
        }
        if !seen.insert(trimmed) {
            return Err(SelectionError::DuplicateAsset(trimmed.to_string()));
        }
        assets.push(trimmed.to_string());
    }

    Ok(assets)
}

impl AssetSelection {
    /// `None`, blank, `*` or `all` select everything.
    pub fn parse(input: Option<&str>) -> Result<Self, SelectionError> {
        match input.map(str::trim) {
            None | Some("") | Some("*") => Ok(AssetSelection::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(AssetSelection::All),
            Some(s) => Ok(AssetSelection::Only(parse_assets(s)?.into_iter().collect())),
        }
    }

    pub fn resolve(&self, table: &SeriesTable) -> BTreeSet<String> {
        match self {
            AssetSelection::All => table.asset_ids().map(str::to_string).collect(),
            AssetSelection::Only(ids) => ids.clone(),
        }
    }

    /// Requested ids the table does not hold.
    pub fn unknown(&self, table: &SeriesTable) -> Vec<String> {
        match self {
            AssetSelection::All => Vec::new(),
            AssetSelection::Only(ids) => ids
                .iter()
                .filter(|id| !table.contains_asset(id))
                .cloned()
                .collect(),
        }
    }
}
