//! Annotation value types attached to a sequence record: literature
//! citations, database cross references, gene names and entry dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cross reference to another database (`DR` lines, `RX` lines, `/db_xref`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRef {
    /// Database name, e.g. `EMBL`, `PubMed`
    pub db: String,
    /// Primary identifier in that database
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quaternary: Option<String>,
}

impl XRef {
    pub fn new(db: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parse a `DR` style line body: `EMBL; AY123; AAB123; -; mRNA.`
    ///
    /// Returns `None` when fewer than two fields are present.
    #[must_use]
    pub fn parse_dr(text: &str) -> Option<Self> {
        let text = text.trim().trim_end_matches('.');
        let mut fields = text.split(';').map(str::trim);
        let db = fields.next().filter(|s| !s.is_empty())?;
        let id = fields.next().filter(|s| !s.is_empty())?;
        let mut xref = Self::new(db, id);
        let keep = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);
        xref.secondary = keep(fields.next());
        xref.tertiary = keep(fields.next());
        xref.quaternary = keep(fields.next());
        Some(xref)
    }
}

/// A literature reference (one `RN` block or GenBank `REFERENCE`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Reference number as given in the entry
    pub number: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authors: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Journal location (`RL`, `JOURNAL`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<XRef>,
}

impl Citation {
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Append text to a citation field, joining wrapped lines with a space
    pub fn append(field: &mut String, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !field.is_empty() {
            field.push(' ');
        }
        field.push_str(text);
    }

    /// Strip the quote marks and trailing `;` EMBL uses around titles
    pub fn tidy_title(&mut self) {
        let t = self.title.trim().trim_end_matches(';').trim();
        let t = t.strip_prefix('"').unwrap_or(t);
        let t = t.strip_suffix('"').unwrap_or(t);
        self.title = t.to_string();
        let a = self.authors.trim().trim_end_matches(';').to_string();
        self.authors = a;
    }
}

/// Gene names from Swissprot `GN` lines or GenBank `/gene` qualifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordered_locus_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orf_names: Vec<String>,
}

impl Gene {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.synonyms.is_empty()
            && self.ordered_locus_names.is_empty()
            && self.orf_names.is_empty()
    }
}

/// Creation and modification dates of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_modified: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_version: Option<String>,
}

impl SeqDates {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Parse a flat-file date such as `12-SEP-1991` or `01-Jan-1988`
#[must_use]
pub fn parse_entry_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim().trim_end_matches([',', '.']);
    let mut parts = text.splitn(3, '-');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if month.len() != 3 || !month.is_ascii() {
        return None;
    }
    // chrono expects title-cased month abbreviations
    let mut month_tc = month[..1].to_ascii_uppercase();
    month_tc.push_str(&month[1..].to_ascii_lowercase());
    NaiveDate::parse_from_str(&format!("{day}-{month_tc}-{year}"), "%d-%b-%Y").ok()
}
