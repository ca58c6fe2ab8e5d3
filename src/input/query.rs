//! Entry query filter.
//!
//! A query selects entries by field. Every field that is set must match
//! (case-insensitive, `*` and `?` wildcards):
//!
//! | Field | Matches against |
//! |-------|-----------------|
//! | `id`  | sequence name |
//! | `acc` | any accession |
//! | `sv`  | sequence version |
//! | `gi`  | GI number |
//! | `org` | any taxonomy level or the common name |
//! | `key` | any keyword |
//! | `des` | any word of the description |
//! | `entry` | sequence name or any accession |

use serde::{Deserialize, Serialize};

use crate::core::record::SeqRecord;
use crate::parsing::error::ReadError;
use crate::utils::validation::wildcard_match;

/// Field names accepted by [`EntryQuery::set`]
pub const QUERY_FIELDS: &[&str] = &["id", "acc", "sv", "gi", "org", "key", "des", "entry"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryQuery {
    pub id: Option<String>,
    pub acc: Option<String>,
    pub sv: Option<String>,
    pub gi: Option<String>,
    pub org: Option<String>,
    pub key: Option<String>,
    pub des: Option<String>,
    pub entry: Option<String>,
}

impl EntryQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field by name.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::UnknownQueryField` for a field name not in
    /// [`QUERY_FIELDS`].
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), ReadError> {
        let slot = match field.trim().to_ascii_lowercase().as_str() {
            "id" => &mut self.id,
            "acc" => &mut self.acc,
            "sv" => &mut self.sv,
            "gi" => &mut self.gi,
            "org" => &mut self.org,
            "key" => &mut self.key,
            "des" => &mut self.des,
            "entry" => &mut self.entry,
            _ => return Err(ReadError::UnknownQueryField(field.to_string())),
        };
        *slot = Some(value.trim().to_string());
        Ok(())
    }

    /// Parse `field=value`
    ///
    /// # Errors
    ///
    /// Returns `ReadError::UnknownQueryField` when there is no `=` or the
    /// field is unknown.
    pub fn set_pair(&mut self, pair: &str) -> Result<(), ReadError> {
        let (field, value) = pair
            .split_once('=')
            .ok_or_else(|| ReadError::UnknownQueryField(pair.to_string()))?;
        self.set(field, value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Test a record against every set field
    #[must_use]
    pub fn matches(&self, seq: &SeqRecord) -> bool {
        let name = std::iter::once(seq.name.as_str());
        let accessions = seq.accessions.iter().map(String::as_str);
        let organism = seq
            .taxonomy
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(seq.common_name.as_str()));
        let words = seq
            .description
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')'))
            .filter(|w| !w.is_empty());

        field_matches(self.id.as_deref(), name.clone())
            && field_matches(self.acc.as_deref(), accessions.clone())
            && field_matches(
                self.sv.as_deref(),
                std::iter::once(seq.sequence_version.as_str()),
            )
            && field_matches(self.gi.as_deref(), std::iter::once(seq.gi.as_str()))
            && field_matches(self.org.as_deref(), organism)
            && field_matches(
                self.key.as_deref(),
                seq.keywords.iter().map(String::as_str),
            )
            && field_matches(self.des.as_deref(), words)
            && field_matches(self.entry.as_deref(), name.chain(accessions))
    }
}

/// An unset field matches anything; a set one must match at least one value
fn field_matches<'a>(pattern: Option<&str>, mut values: impl Iterator<Item = &'a str>) -> bool {
    match pattern {
        None => true,
        Some(p) => values.any(|v| wildcard_match(p, v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SeqRecord {
        let mut seq = SeqRecord::new();
        seq.name = "HSFAU".to_string();
        seq.accessions = vec!["X65923".to_string(), "Y00001".to_string()];
        seq.sequence_version = "X65923.1".to_string();
        seq.taxonomy = vec!["Homo sapiens".to_string(), "Primates".to_string()];
        seq.keywords = vec!["fau".to_string(), "ubiquitin".to_string()];
        seq.description = "H.sapiens fau mRNA".to_string();
        seq
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(EntryQuery::new().matches(&record()));
        assert!(EntryQuery::new().is_empty());
    }

    #[test]
    fn test_fields_must_all_match() {
        let mut q = EntryQuery::new();
        q.set("id", "hs*").unwrap();
        q.set("acc", "Y00001").unwrap();
        assert!(q.matches(&record()));

        q.set("key", "kinase").unwrap();
        assert!(!q.matches(&record()));
    }

    #[test]
    fn test_org_and_des() {
        let mut q = EntryQuery::new();
        q.set("org", "primates").unwrap();
        q.set("des", "mrna").unwrap();
        assert!(q.matches(&record()));
    }

    #[test]
    fn test_entry_matches_name_or_accession() {
        let mut q = EntryQuery::new();
        q.set_pair("entry=X65923").unwrap();
        assert!(q.matches(&record()));
        q.set_pair("entry=hsfau").unwrap();
        assert!(q.matches(&record()));
    }

    #[test]
    fn test_unknown_field_is_fatal() {
        let mut q = EntryQuery::new();
        let err = q.set("colour", "red").unwrap_err();
        assert!(matches!(err, ReadError::UnknownQueryField(ref f) if f == "colour"));
        assert!(err.is_fatal());
        assert!(q.set_pair("novalue").is_err());
    }
}
