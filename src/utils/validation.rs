//! Centralized validation and helper functions.

/// Maximum number of sequences one multi-record table may hold (DOS protection)
pub const MAX_SEQUENCES: usize = 1_000_000;

/// Check if adding another sequence would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new sequence.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_sequence_limit(table.nseq()).is_some() {
///     return Err(...);
/// }
/// table.put(name, item); // Safe to add
/// ```
#[must_use]
pub fn check_sequence_limit(count: usize) -> Option<String> {
    if count >= MAX_SEQUENCES {
        Some(format!(
            "Too many sequences: adding another would exceed maximum of {MAX_SEQUENCES}"
        ))
    } else {
        None
    }
}

/// Test whether a token looks like a database accession number.
///
/// Accepts an optional `.version` suffix and the usual shapes: letters
/// followed by digits (`X56734`, `AAAA01000001`), RefSeq with an underscore
/// (`NM_000546`), and UniProt (`Q9Y2X3`, `A0A023GPI8`).
///
/// # Examples
///
/// ```
/// use seqread::utils::validation::is_accession;
///
/// assert!(is_accession("X56734"));
/// assert!(is_accession("NM_000546.6"));
/// assert!(is_accession("Q9Y2X3"));
/// assert!(!is_accession("description"));
/// assert!(!is_accession("12345"));
/// ```
#[must_use]
pub fn is_accession(token: &str) -> bool {
    let base = match token.rsplit_once('.') {
        Some((b, v)) if !v.is_empty() && v.bytes().all(|c| c.is_ascii_digit()) => b,
        _ => token,
    };
    let bytes = base.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    if is_uniprot_accession(base) {
        return true;
    }

    let letters = bytes.iter().take_while(|c| c.is_ascii_alphabetic()).count();
    if letters > 6 {
        return false;
    }
    let mut rest = &bytes[letters..];
    if let Some(after) = rest.strip_prefix(b"_") {
        rest = after;
    }
    !rest.is_empty() && rest.iter().all(u8::is_ascii_digit)
}

/// UniProt accession: `[OPQ][0-9][A-Z0-9]{3}[0-9]` or
/// `[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2}`
fn is_uniprot_accession(s: &str) -> bool {
    let b = s.as_bytes();
    let alnum = |c: u8| c.is_ascii_uppercase() || c.is_ascii_digit();
    if b.len() == 6 && matches!(b[0], b'O' | b'P' | b'Q') {
        return b[1].is_ascii_digit() && b[2..5].iter().all(|&c| alnum(c)) && b[5].is_ascii_digit();
    }
    if (b.len() == 6 || b.len() == 10) && b[0].is_ascii_uppercase() && b[1].is_ascii_digit() {
        return b[2..].chunks(4).all(|chunk| {
            chunk[0].is_ascii_uppercase()
                && alnum(chunk[1])
                && alnum(chunk[2])
                && chunk[3].is_ascii_digit()
        });
    }
    false
}

/// Case-insensitive wildcard match supporting `*` and `?`.
///
/// # Examples
///
/// ```
/// use seqread::utils::validation::wildcard_match;
///
/// assert!(wildcard_match("hs*", "HSFAU"));
/// assert!(wildcard_match("p1234?", "P12345"));
/// assert!(!wildcard_match("hs*", "mmfau"));
/// ```
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<u8> = pattern.bytes().map(|c| c.to_ascii_lowercase()).collect();
    let t: Vec<u8> = text.bytes().map(|c| c.to_ascii_lowercase()).collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
