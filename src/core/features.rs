//! Feature tables.
//!
//! Feature parsing proper lives outside the sequence reader; this module is
//! the seam. Flat-file parsers collect the raw feature block and hand it to a
//! [`FeatureParser`], then fix the table length once the residue count is
//! known. [`LineFeatureParser`] is the default implementation and reads the
//! EMBL/GenBank column layout:
//!
//! ```text
//! source          1..1859
//!                 /organism="Trifolium repens"
//! CDS             14..1495
//! ```

use serde::{Deserialize, Serialize};

use crate::core::types::SeqType;

/// One qualifier, `/name=value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A single feature with its location string and qualifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub key: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,
}

impl Feature {
    /// First value of a qualifier, if present
    #[must_use]
    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.name == name)
            .and_then(|q| q.value.as_deref())
    }
}

/// Feature table owned by a sequence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// Format the features were read from
    pub format: String,
    /// Entry the features belong to
    pub entry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SeqType>,
    pub features: Vec<Feature>,
    /// Length of the sequence the table annotates
    pub length: usize,
}

impl FeatureTable {
    #[must_use]
    pub fn new(format: &str, entry: &str, kind: Option<SeqType>) -> Self {
        Self {
            format: format.to_string(),
            entry: entry.to_string(),
            kind,
            features: Vec::new(),
            length: 0,
        }
    }

    /// Set the annotated sequence length
    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Parses a raw feature block into a table
pub trait FeatureParser: Send {
    /// Parse `text` (feature lines with the line-type prefix removed).
    ///
    /// Returns `None` when the block holds no features.
    fn parse(
        &self,
        text: &str,
        format: &str,
        entry: &str,
        kind: Option<SeqType>,
    ) -> Option<FeatureTable>;
}

/// Reads the fixed-column EMBL/GenBank feature layout
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFeatureParser;

impl FeatureParser for LineFeatureParser {
    fn parse(
        &self,
        text: &str,
        format: &str,
        entry: &str,
        kind: Option<SeqType>,
    ) -> Option<FeatureTable> {
        let mut table = FeatureTable::new(format, entry, kind);
        let mut in_quote = false;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if !line.starts_with(' ') && !in_quote {
                let mut parts = line.splitn(2, char::is_whitespace);
                let key = parts.next().unwrap_or_default().to_string();
                let location = parts.next().unwrap_or_default().trim().to_string();
                table.features.push(Feature {
                    key,
                    location,
                    qualifiers: Vec::new(),
                });
                continue;
            }

            let Some(feature) = table.features.last_mut() else {
                continue;
            };
            let body = line.trim();

            if body.starts_with('/') && !in_quote {
                let (name, value) = match body[1..].split_once('=') {
                    Some((n, v)) => (n.to_string(), Some(v.to_string())),
                    None => (body[1..].to_string(), None),
                };
                in_quote = value.as_deref().is_some_and(open_quote);
                feature.qualifiers.push(Qualifier { name, value });
            } else if let Some(q) = feature.qualifiers.last_mut() {
                let value = q.value.get_or_insert_with(String::new);
                if q.name != "translation" {
                    value.push(' ');
                }
                value.push_str(body);
                if in_quote && body.ends_with('"') {
                    in_quote = false;
                }
            } else {
                feature.location.push_str(body);
            }
        }

        for feature in &mut table.features {
            for q in &mut feature.qualifiers {
                if let Some(v) = &mut q.value {
                    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
                        *v = v[1..v.len() - 1].to_string();
                    }
                }
            }
        }

        if table.is_empty() {
            None
        } else {
            Some(table)
        }
    }
}

/// True when a qualifier value opens a quote it does not close
fn open_quote(value: &str) -> bool {
    value.starts_with('"') && (value.len() == 1 || !value.ends_with('"'))
}
