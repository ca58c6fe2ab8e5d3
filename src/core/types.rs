use serde::{Deserialize, Serialize};

/// Residue alphabet of a parsed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeqType {
    Nucleotide,
    Protein,
}

impl SeqType {
    /// One-letter code used in listings (`N` or `P`)
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Nucleotide => 'N',
            Self::Protein => 'P',
        }
    }

    /// Parse a one-letter or spelled-out type
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "nuc" | "nucleotide" | "dna" | "rna" => Some(Self::Nucleotide),
            "p" | "prot" | "protein" | "aa" => Some(Self::Protein),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeqType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nucleotide => write!(f, "nucleotide"),
            Self::Protein => write!(f, "protein"),
        }
    }
}

/// Sequence type a caller requires of every record it reads.
///
/// Checking happens after the query filter; a failure is the terminal
/// `BadType` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRequest {
    /// Anything goes
    #[default]
    Any,
    /// DNA or RNA
    Nucleotide,
    /// DNA only (no U)
    Dna,
    /// RNA only (no T)
    Rna,
    /// Any protein alphabet, which also accepts nucleotide letters
    Protein,
    /// Protein that must not look like a nucleotide sequence
    PureProtein,
}

/// IUPAC nucleotide codes accepted by the nucleotide checks
const NUCLEOTIDE_CODES: &[u8] = b"ACGTUNRYKMSWBDHVX";

/// Gap and padding characters
const GAP_CODES: &[u8] = b"-.~";

impl TypeRequest {
    /// Parse a type name as given on the command line
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "gapany" => Some(Self::Any),
            "n" | "nucleotide" | "nuc" | "gapnucleotide" => Some(Self::Nucleotide),
            "dna" | "gapdna" => Some(Self::Dna),
            "rna" | "gaprna" => Some(Self::Rna),
            "p" | "protein" | "gapprotein" => Some(Self::Protein),
            "pureprotein" => Some(Self::PureProtein),
            _ => None,
        }
    }

    /// The alphabet implied by this request, if any
    #[must_use]
    pub fn implied_type(self) -> Option<SeqType> {
        match self {
            Self::Any => None,
            Self::Nucleotide | Self::Dna | Self::Rna => Some(SeqType::Nucleotide),
            Self::Protein | Self::PureProtein => Some(SeqType::Protein),
        }
    }

    /// Check (and normalise) residues against this request.
    ///
    /// `?` becomes `N` for nucleotides and `X` for proteins. Returns the
    /// first offending character on failure.
    pub fn check(self, residues: &mut String, gaps: bool) -> Result<(), char> {
        if self == Self::Any {
            return Ok(());
        }

        let nucleotide = self.implied_type() == Some(SeqType::Nucleotide);
        let unknown = if nucleotide { 'N' } else { 'X' };
        if residues.contains('?') {
            *residues = residues.replace('?', &unknown.to_string());
        }

        for c in residues.bytes() {
            if GAP_CODES.contains(&c) {
                if !gaps {
                    return Err(c as char);
                }
                continue;
            }
            let upper = c.to_ascii_uppercase();
            let ok = match self {
                Self::Any => true,
                Self::Nucleotide => NUCLEOTIDE_CODES.contains(&upper),
                Self::Dna => upper != b'U' && NUCLEOTIDE_CODES.contains(&upper),
                Self::Rna => upper != b'T' && NUCLEOTIDE_CODES.contains(&upper),
                Self::Protein | Self::PureProtein => upper.is_ascii_uppercase() || upper == b'*',
            };
            if !ok {
                return Err(c as char);
            }
        }

        if self == Self::PureProtein && looks_nucleotide(residues) {
            return Err(residues.chars().next().unwrap_or('?'));
        }

        Ok(())
    }
}

/// True when at least 90% of the non-gap residues are `ACGTUN`
#[must_use]
pub fn looks_nucleotide(residues: &str) -> bool {
    let mut total = 0usize;
    let mut nuc = 0usize;
    for c in residues.bytes() {
        if GAP_CODES.contains(&c) || c == b'*' {
            continue;
        }
        total += 1;
        if matches!(c.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'U' | b'N') {
            nuc += 1;
        }
    }
    total > 0 && nuc * 10 >= total * 9
}

/// Case folding applied to residues after a successful read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Upper,
    Lower,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_type_parse() {
        assert_eq!(SeqType::parse("N"), Some(SeqType::Nucleotide));
        assert_eq!(SeqType::parse("protein"), Some(SeqType::Protein));
        assert_eq!(SeqType::parse("xyz"), None);
        assert_eq!(SeqType::Protein.code(), 'P');
    }

    #[test]
    fn test_nucleotide_check() {
        let mut seq = "ACGTN?".to_string();
        assert!(TypeRequest::Nucleotide.check(&mut seq, false).is_ok());
        assert_eq!(seq, "ACGTNN");

        let mut prot = "MKLVE".to_string();
        assert_eq!(TypeRequest::Nucleotide.check(&mut prot, false), Err('L'));
    }

    #[test]
    fn test_dna_rejects_uracil() {
        let mut seq = "ACGU".to_string();
        assert_eq!(TypeRequest::Dna.check(&mut seq, false), Err('U'));
        let mut rna = "ACGU".to_string();
        assert!(TypeRequest::Rna.check(&mut rna, false).is_ok());
    }

    #[test]
    fn test_gaps_need_permission() {
        let mut seq = "AC-GT".to_string();
        assert_eq!(TypeRequest::Nucleotide.check(&mut seq, false), Err('-'));
        assert!(TypeRequest::Nucleotide.check(&mut seq, true).is_ok());
    }

    #[test]
    fn test_pure_protein() {
        let mut seq = "ACGTACGTAC".to_string();
        assert!(TypeRequest::Protein.check(&mut seq, false).is_ok());
        assert!(TypeRequest::PureProtein.check(&mut seq, false).is_err());

        let mut prot = "MKWVTFISLL".to_string();
        assert!(TypeRequest::PureProtein.check(&mut prot, false).is_ok());
    }

    #[test]
    fn test_looks_nucleotide() {
        assert!(looks_nucleotide("ACGTACGTNN"));
        assert!(!looks_nucleotide("MKWVTFISLL"));
        assert!(!looks_nucleotide("---"));
    }
}
