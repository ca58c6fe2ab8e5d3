//! Multi-record session cache.
//!
//! Alignment-style formats hold many sequences in one interleaved body, so
//! their parsers pre-scan the whole set on the first call and then replay one
//! sequence per call. The scanned set lives in a [`SeqTable`]: an
//! insertion-ordered map from name to a growing item, with a replay cursor.
//!
//! Only one cache is live per input; [`SessionCache`] says which parser
//! built it.

use indexmap::IndexMap;

use crate::core::record::SeqRecord;
use crate::core::types::SeqType;
use crate::parsing::error::ReadError;
use crate::utils::validation::check_sequence_limit;

/// One sequence being accumulated from an alignment body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableItem {
    pub name: String,
    pub seq: String,
    pub weight: Option<f32>,
    pub desc: String,
    pub accession: String,
    pub quality: Option<Vec<f32>>,
}

impl TableItem {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Move this item's contents into a cleared record
    pub fn fill(self, seq: &mut SeqRecord) {
        seq.set_name(&self.name);
        seq.residues = self.seq;
        if let Some(w) = self.weight {
            seq.weight = w;
        }
        if !self.desc.is_empty() {
            seq.set_description(&self.desc);
        }
        if !self.accession.is_empty() {
            seq.add_accession(&self.accession);
        }
        seq.quality = self.quality;
    }
}

/// Name-keyed sequence table with a replay cursor
#[derive(Debug, Clone, Default)]
pub struct SeqTable {
    items: IndexMap<String, TableItem>,
    count: usize,
}

impl SeqTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the item for `name`, creating it at the end of the order if new.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::TooManySequences` when a new item would exceed
    /// the table limit.
    pub fn put(&mut self, name: &str) -> Result<&mut TableItem, ReadError> {
        if !self.items.contains_key(name) && check_sequence_limit(self.items.len()).is_some() {
            return Err(ReadError::TooManySequences(self.items.len() + 1));
        }
        Ok(self
            .items
            .entry(name.to_string())
            .or_insert_with(|| TableItem::new(name)))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableItem> {
        self.items.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TableItem> {
        self.items.get_mut(name)
    }

    /// Item at a first-seen position
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut TableItem> {
        self.items.get_index_mut(index).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Names in the order they were first seen
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = &TableItem> {
        self.items.values()
    }

    /// Number of sequences
    #[must_use]
    pub fn nseq(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items already replayed
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.items.len()
    }

    /// Take the next item in first-seen order and advance the cursor
    pub fn next_item(&mut self) -> Option<TableItem> {
        let item = self.items.get_index_mut(self.count)?.1;
        let taken = std::mem::take(item);
        self.count += 1;
        Some(taken)
    }

    /// Drop items that ended up with no residues
    pub fn retain_nonempty(&mut self) {
        self.items.retain(|_, item| !item.seq.is_empty());
    }
}

/// A scanned alignment plus what the header said about it
#[derive(Debug, Clone, Default)]
pub struct AlignmentCache {
    pub table: SeqTable,
    pub seq_type: Option<SeqType>,
}

impl AlignmentCache {
    #[must_use]
    pub fn new(table: SeqTable, seq_type: Option<SeqType>) -> Self {
        Self { table, seq_type }
    }
}

/// A Stockholm alignment with its file-level annotation
#[derive(Debug, Clone, Default)]
pub struct StockholmCache {
    pub table: SeqTable,
    pub id: String,
    pub accession: String,
    pub description: String,
}

/// A decompressed BAM stream positioned after the header
#[derive(Debug, Clone, Default)]
pub struct BamCache {
    pub data: Vec<u8>,
    pub offset: usize,
    pub references: Vec<(String, u32)>,
    pub records: usize,
}

/// Per-input cache; the variant names the parser that built it
#[derive(Debug, Clone)]
pub enum SessionCache {
    Msf(AlignmentCache),
    Clustal(AlignmentCache),
    Phylip(AlignmentCache),
    Nexus(AlignmentCache),
    Selex(AlignmentCache),
    Stockholm(StockholmCache),
    Hennig86(AlignmentCache),
    Mega(AlignmentCache),
    Treecon(AlignmentCache),
    Jackknifer(AlignmentCache),
    Pdb(AlignmentCache),
    Ace(AlignmentCache),
    Bam(BamCache),
}

impl SessionCache {
    /// Name of the format that owns the cache
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Msf(_) => "msf",
            Self::Clustal(_) => "clustal",
            Self::Phylip(_) => "phylip",
            Self::Nexus(_) => "nexus",
            Self::Selex(_) => "selex",
            Self::Stockholm(_) => "stockholm",
            Self::Hennig86(_) => "hennig86",
            Self::Mega(_) => "mega",
            Self::Treecon(_) => "treecon",
            Self::Jackknifer(_) => "jackknifer",
            Self::Pdb(_) => "pdb",
            Self::Ace(_) => "ace",
            Self::Bam(_) => "bam",
        }
    }

    /// The replay table, for every variant that has one
    pub fn table_mut(&mut self) -> Option<&mut SeqTable> {
        match self {
            Self::Msf(c)
            | Self::Clustal(c)
            | Self::Phylip(c)
            | Self::Nexus(c)
            | Self::Selex(c)
            | Self::Hennig86(c)
            | Self::Mega(c)
            | Self::Treecon(c)
            | Self::Jackknifer(c)
            | Self::Pdb(c)
            | Self::Ace(c) => Some(&mut c.table),
            Self::Stockholm(c) => Some(&mut c.table),
            Self::Bam(_) => None,
        }
    }

    /// Sequence type declared by the format header, if any
    #[must_use]
    pub fn seq_type(&self) -> Option<SeqType> {
        match self {
            Self::Msf(c)
            | Self::Clustal(c)
            | Self::Phylip(c)
            | Self::Nexus(c)
            | Self::Selex(c)
            | Self::Hennig86(c)
            | Self::Mega(c)
            | Self::Treecon(c)
            | Self::Jackknifer(c)
            | Self::Pdb(c)
            | Self::Ace(c) => c.seq_type,
            Self::Stockholm(_) | Self::Bam(_) => None,
        }
    }

    /// True when every cached sequence has been handed out
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match self {
            Self::Bam(c) => c.offset >= c.data.len(),
            Self::Stockholm(c) => c.table.is_exhausted(),
            Self::Msf(c)
            | Self::Clustal(c)
            | Self::Phylip(c)
            | Self::Nexus(c)
            | Self::Selex(c)
            | Self::Hennig86(c)
            | Self::Mega(c)
            | Self::Treecon(c)
            | Self::Jackknifer(c)
            | Self::Pdb(c)
            | Self::Ace(c) => c.table.is_exhausted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_keeps_first_seen_order() {
        let mut table = SeqTable::new();
        table.put("b").unwrap().seq.push_str("AC");
        table.put("a").unwrap().seq.push_str("GG");
        table.put("b").unwrap().seq.push_str("GT");

        assert_eq!(table.order().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(table.get("b").unwrap().seq, "ACGT");
        assert_eq!(table.nseq(), 2);
    }

    #[test]
    fn test_replay_cursor() {
        let mut table = SeqTable::new();
        for name in ["x", "y", "z"] {
            table.put(name).unwrap().seq.push('A');
        }
        let names: Vec<String> = std::iter::from_fn(|| table.next_item())
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(table.is_exhausted());
        assert_eq!(table.count(), 3);
        assert!(table.next_item().is_none());
    }

    #[test]
    fn test_fill_record() {
        let mut item = TableItem::new("seq one");
        item.seq = "ACGT".to_string();
        item.weight = Some(0.5);
        item.accession = "PF00001".to_string();
        let mut seq = SeqRecord::new();
        item.fill(&mut seq);
        assert_eq!(seq.name, "seq_one");
        assert_eq!(seq.residues, "ACGT");
        assert!((seq.weight - 0.5).abs() < f32::EPSILON);
        assert_eq!(seq.accession(), Some("PF00001"));
    }

    #[test]
    fn test_cache_variant_table() {
        let mut table = SeqTable::new();
        table.put("a").unwrap();
        let mut cache = SessionCache::Msf(AlignmentCache::new(table, Some(SeqType::Protein)));
        assert_eq!(cache.name(), "msf");
        assert_eq!(cache.seq_type(), Some(SeqType::Protein));
        assert!(!cache.is_exhausted());
        cache.table_mut().unwrap().next_item();
        assert!(cache.is_exhausted());
    }

    #[test]
    fn test_retain_nonempty() {
        let mut table = SeqTable::new();
        table.put("a").unwrap().seq.push('A');
        table.put("b").unwrap();
        table.retain_nonempty();
        assert_eq!(table.nseq(), 1);
    }
}
