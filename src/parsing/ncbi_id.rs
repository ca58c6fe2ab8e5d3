//! NCBI composite identifiers in FASTA headers.
//!
//! The first word of an NCBI-style header is a `|`-separated chain of
//! database prefixes and values:
//!
//! | Prefix | Layout | Result |
//! |--------|--------|--------|
//! | `gi` | `gi\|number` (then another identifier) | GI number |
//! | `gnl` | `gnl\|db\|id` | id, db |
//! | `gnl\|BL_ORD_ID` | `gnl\|BL_ORD_ID\|n rest...` | parse `rest` instead |
//! | `lcl`, `bbs` | `lcl\|id` | id |
//! | `pat` | `pat\|country\|number` | id |
//! | `pdb` | `pdb\|entry\|chain` | `entry_chain` |
//! | `gb emb dbj sp tr ref tpd tpe tpg` | `db\|acc.version\|locus` | accession, version, id |
//! | `pir prf` | `db\|acc\|name` | accession, id |
//!
//! Anything else falls back to treating the last two fields as
//! `[accession]|id`.

use crate::utils::validation::is_accession;

/// Identifiers pulled out of an NCBI-style header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NcbiHeader {
    pub id: String,
    pub accession: String,
    pub sequence_version: String,
    pub gi: String,
    pub db: String,
    pub description: String,
}

/// Parse a FASTA header line (without `>`) with NCBI composite identifiers.
///
/// Returns `None` when the first word contains no `|`.
#[must_use]
pub fn parse_ncbi_header(line: &str) -> Option<NcbiHeader> {
    let line = line.trim();
    let (token, rest) = match line.split_once(char::is_whitespace) {
        Some((t, r)) => (t, r.trim()),
        None => (line, ""),
    };
    if !token.contains('|') {
        return None;
    }

    let mut fields: Vec<&str> = token.split('|').collect();
    while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    let mut header = NcbiHeader {
        description: rest.to_string(),
        ..NcbiHeader::default()
    };

    let mut i = 0;
    while i < fields.len() {
        let prefix = fields[i].to_ascii_lowercase();
        let field = |n: usize| fields.get(i + n).copied().unwrap_or_default();
        match prefix.as_str() {
            "gi" => {
                header.gi = field(1).to_string();
                if header.id.is_empty() {
                    header.id = header.gi.clone();
                }
                i += 2;
                continue;
            }
            "gnl" => {
                if field(1) == "BL_ORD_ID" {
                    // BLAST database ordinal: the real header follows
                    if let Some(inner) = parse_ncbi_header(rest) {
                        return Some(inner);
                    }
                    return Some(plain_header(rest));
                }
                header.db = field(1).to_string();
                header.id = field(2).to_string();
            }
            "lcl" | "bbs" => {
                header.db = prefix.clone();
                header.id = field(1).to_string();
            }
            "pat" => {
                header.db = prefix.clone();
                header.id = if field(2).is_empty() {
                    field(1).to_string()
                } else {
                    field(2).to_string()
                };
            }
            "pdb" => {
                header.db = prefix.clone();
                header.id = if field(2).is_empty() {
                    field(1).to_string()
                } else {
                    format!("{}_{}", field(1), field(2))
                };
            }
            "gb" | "emb" | "dbj" | "sp" | "tr" | "ref" | "tpd" | "tpe" | "tpg" => {
                header.db = prefix.clone();
                set_accession(&mut header, field(1));
                header.id = if field(2).is_empty() {
                    header.accession.clone()
                } else {
                    field(2).to_string()
                };
            }
            "pir" | "prf" => {
                header.db = prefix.clone();
                header.accession = field(1).to_string();
                header.id = if field(2).is_empty() {
                    header.accession.clone()
                } else {
                    field(2).to_string()
                };
            }
            _ => fallback(&mut header, &fields[i..]),
        }
        break;
    }

    if header.id.is_empty() {
        header.id = header.accession.clone();
    }
    Some(header)
}

/// Last two fields as `[accession]|id`
fn fallback(header: &mut NcbiHeader, fields: &[&str]) {
    let nonempty: Vec<&str> = fields.iter().copied().filter(|f| !f.is_empty()).collect();
    match nonempty.as_slice() {
        [] => {}
        [only] => header.id = (*only).to_string(),
        [.., acc, id] => {
            header.id = (*id).to_string();
            if is_accession(acc) {
                set_accession(header, acc);
            }
        }
    }
}

fn set_accession(header: &mut NcbiHeader, value: &str) {
    match value.split_once('.') {
        Some((acc, _)) => {
            header.accession = acc.to_string();
            header.sequence_version = value.to_string();
        }
        None => header.accession = value.to_string(),
    }
}

/// Header with no composite id: first word is the id
fn plain_header(line: &str) -> NcbiHeader {
    let line = line.trim();
    let (id, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    NcbiHeader {
        id: id.to_string(),
        description: rest.trim().to_string(),
        ..NcbiHeader::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_word_is_not_ncbi() {
        assert!(parse_ncbi_header("seq1 some description").is_none());
    }

    #[test]
    fn test_gi_then_genbank() {
        let h = parse_ncbi_header("gi|5524211|gb|AAD44166.1| cytochrome b [Elephas]").unwrap();
        assert_eq!(h.gi, "5524211");
        assert_eq!(h.db, "gb");
        assert_eq!(h.accession, "AAD44166");
        assert_eq!(h.sequence_version, "AAD44166.1");
        assert_eq!(h.id, "AAD44166");
        assert_eq!(h.description, "cytochrome b [Elephas]");
    }

    #[test]
    fn test_swissprot_with_locus() {
        let h = parse_ncbi_header("sp|P01013|OVAX_CHICK GENE X PROTEIN").unwrap();
        assert_eq!(h.accession, "P01013");
        assert_eq!(h.id, "OVAX_CHICK");
        assert!(h.sequence_version.is_empty());
    }

    #[test]
    fn test_gi_only() {
        let h = parse_ncbi_header("gi|12345").unwrap();
        assert_eq!(h.id, "12345");
        assert_eq!(h.gi, "12345");
    }

    #[test]
    fn test_gnl_and_lcl() {
        let h = parse_ncbi_header("gnl|taxon|9606 human").unwrap();
        assert_eq!(h.db, "taxon");
        assert_eq!(h.id, "9606");

        let h = parse_ncbi_header("lcl|my_seq").unwrap();
        assert_eq!(h.id, "my_seq");
    }

    #[test]
    fn test_blast_ordinal_recurses() {
        let h = parse_ncbi_header("gnl|BL_ORD_ID|17 gi|42|emb|X56734.1|TRBGLU beta-glucosidase")
            .unwrap();
        assert_eq!(h.gi, "42");
        assert_eq!(h.accession, "X56734");
        assert_eq!(h.id, "TRBGLU");
        assert_eq!(h.description, "beta-glucosidase");

        let h = parse_ncbi_header("gnl|BL_ORD_ID|3 plainname desc").unwrap();
        assert_eq!(h.id, "plainname");
        assert_eq!(h.description, "desc");
    }

    #[test]
    fn test_pdb_chain() {
        let h = parse_ncbi_header("pdb|1ABC|A chain A").unwrap();
        assert_eq!(h.id, "1ABC_A");
    }

    #[test]
    fn test_pir_and_pat() {
        let h = parse_ncbi_header("pir|A12345|CCHU").unwrap();
        assert_eq!(h.accession, "A12345");
        assert_eq!(h.id, "CCHU");

        let h = parse_ncbi_header("pat|US|RE33188|1").unwrap();
        assert_eq!(h.id, "RE33188");
    }

    #[test]
    fn test_unknown_prefix_falls_back() {
        let h = parse_ncbi_header("xyz|AB000263|myname desc").unwrap();
        assert_eq!(h.id, "myname");
        assert_eq!(h.accession, "AB000263");
    }
}
