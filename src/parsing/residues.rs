//! Character filters that turn raw input lines into residue and quality text.
//!
//! | Filter | Keeps |
//! |--------|-------|
//! | [`append_filtered`] | letters and `* . ~ ? # + -` |
//! | [`append_filtered_warn`] | as above, reporting rejected characters |
//! | [`append_quality`] | bytes 33 to 126 |
//! | [`append_commented`] | as [`append_filtered`], dropping `<...>` comments |

/// True for a byte accepted as a residue or gap
#[must_use]
pub fn is_residue_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || matches!(c, b'*' | b'.' | b'~' | b'?' | b'#' | b'+' | b'-')
}

/// Append the residue characters of `line` to `dest`, returning the new length
pub fn append_filtered(dest: &mut String, line: &str) -> usize {
    dest.extend(line.bytes().filter(|&c| is_residue_char(c)).map(char::from));
    dest.len()
}

/// Like [`append_filtered`] but reports rejected non-whitespace characters.
///
/// Rejects are returned only when `warn_global` is set or the caller already
/// knows its format; during autodetection rejection is silent. `None` means
/// nothing worth warning about was dropped.
pub fn append_filtered_warn(
    dest: &mut String,
    line: &str,
    format_known: bool,
    warn_global: bool,
) -> Option<String> {
    let mut rejected = String::new();
    for c in line.chars() {
        if c.is_ascii() && is_residue_char(c as u8) {
            dest.push(c);
        } else if !c.is_whitespace() {
            rejected.push(c);
        }
    }

    if rejected.is_empty() || !(warn_global || format_known) {
        None
    } else {
        Some(rejected)
    }
}

/// Append printable quality bytes (33 to 126) from `line` to `dest`
pub fn append_quality(dest: &mut Vec<u8>, line: &str) -> usize {
    dest.extend(line.bytes().filter(|c| (33..=126).contains(c)));
    dest.len()
}

/// Append residues while skipping comments delimited by `<` and `>`.
///
/// Either bracket toggles `in_comment`, which the caller carries across
/// lines; this covers both `<...>` and `<...<` / `>...>` styles.
pub fn append_commented(dest: &mut String, in_comment: &mut bool, line: &str) -> usize {
    for c in line.bytes() {
        if c == b'<' || c == b'>' {
            *in_comment = !*in_comment;
            continue;
        }
        if !*in_comment && is_residue_char(c) {
            dest.push(char::from(c));
        }
    }
    dest.len()
}

/// Drop digits and whitespace, keeping everything else.
///
/// Some formats (GCG, Staden) number their sequence lines.
#[must_use]
pub fn strip_numbers(line: &str) -> String {
    line.chars()
        .filter(|c| !c.is_ascii_digit() && !c.is_whitespace())
        .collect()
}
