//! Structured protein descriptions from UniProt `DE` lines.
//!
//! Modern UniProt entries describe a protein with a small grammar:
//!
//! ```text
//! DE   RecName: Full=Cytochrome c;
//! DE            Short=Cyt c;
//! DE   AltName: Allergen=Hom s 1;
//! DE   Includes:
//! DE     RecName: Full=Aspartate carbamoyltransferase;
//! DE              EC=2.1.3.2;
//! DE   Flags: Precursor;
//! ```
//!
//! The parts are kept as an owned tree. When an entry has no plain-text
//! description, [`ProteinDescription::flatten`] rebuilds the familiar one-line
//! form by concatenating the parts in a fixed bracketed order.

use serde::{Deserialize, Serialize};

/// One `RecName`, `AltName` or `SubName` with its sub-tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinName {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ec: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergen: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub biotech: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cd_antigen: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inn: Vec<String>,
}

impl ProteinName {
    /// Apply one `Tag=Value` item; returns false for an unknown tag
    pub fn apply(&mut self, tag: &str, value: &str) -> bool {
        let value = strip_evidence(value);
        if value.is_empty() {
            return true;
        }
        match tag {
            "Full" => self.full = value,
            "Short" => self.short.push(value),
            "EC" => self.ec.push(value),
            "Allergen" => self.allergen.push(value),
            "Biotech" => self.biotech.push(value),
            "CD_antigen" => self.cd_antigen.push(value),
            "INN" => self.inn.push(value),
            _ => return false,
        }
        true
    }

    /// Bracketed suffix for every part except `full`
    fn render_extras(&self, out: &mut String) {
        for s in &self.short {
            out.push_str(&format!(" ({s})"));
        }
        for ec in &self.ec {
            out.push_str(&format!(" (EC {ec})"));
        }
        for a in &self.allergen {
            out.push_str(&format!(" (allergen {a})"));
        }
        for b in &self.biotech {
            out.push_str(&format!(" (biotech {b})"));
        }
        for cd in &self.cd_antigen {
            out.push_str(&format!(" (CD_antigen {cd})"));
        }
        for inn in &self.inn {
            out.push_str(&format!(" (INN {inn})"));
        }
    }

    /// Render as an alternative name: the full name in brackets, then extras
    fn render_alt(&self, out: &mut String) {
        if !self.full.is_empty() {
            out.push_str(&format!(" ({})", self.full));
        }
        self.render_extras(out);
    }
}

/// An `Includes:` or `Contains:` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_name: Option<ProteinName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_names: Vec<ProteinName>,
}

impl DescriptionSection {
    fn render(&self) -> String {
        let mut out = String::new();
        if let Some(rec) = &self.rec_name {
            out.push_str(&rec.full);
            rec.render_extras(&mut out);
        }
        for alt in &self.alt_names {
            alt.render_alt(&mut out);
        }
        out.trim().to_string()
    }
}

/// The complete structured description of a protein entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_name: Option<ProteinName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_names: Vec<ProteinName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_names: Vec<ProteinName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<DescriptionSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<DescriptionSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

/// Where new `RecName`/`AltName` lines are attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Top,
    Includes,
    Contains,
}

/// Which name the next continuation tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    None,
    Rec,
    Alt,
    Sub,
}

/// Incremental parser for the `DE` sub-grammar
#[derive(Debug, Default)]
pub struct DescriptionBuilder {
    desc: ProteinDescription,
    plain: Vec<String>,
    structured: bool,
    target: Option<Target>,
    current: Option<Current>,
}

impl DescriptionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the text of one `DE` line (prefix already removed)
    pub fn push_line(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let (head, rest) = match text.split_once(':') {
            Some((h, r)) if is_section_keyword(h.trim()) => (h.trim(), r.trim()),
            _ => ("", text),
        };

        match head {
            "RecName" | "AltName" | "SubName" => {
                self.structured = true;
                self.start_name(head);
                self.apply_tags(rest);
            }
            "Includes" => {
                self.structured = true;
                self.desc.includes.push(DescriptionSection::default());
                self.target = Some(Target::Includes);
                self.current = Some(Current::None);
            }
            "Contains" => {
                self.structured = true;
                self.desc.contains.push(DescriptionSection::default());
                self.target = Some(Target::Contains);
                self.current = Some(Current::None);
            }
            "Flags" => {
                self.structured = true;
                for flag in rest.split(';') {
                    let flag = strip_evidence(flag);
                    if !flag.is_empty() {
                        self.desc.flags.push(flag);
                    }
                }
            }
            _ => {
                if self.structured && rest.contains('=') {
                    self.apply_tags(rest);
                } else {
                    self.plain.push(text.to_string());
                }
            }
        }
    }

    fn start_name(&mut self, kind: &str) {
        let target = self.target.unwrap_or(Target::Top);
        let name = ProteinName::default();
        let current = match (target, kind) {
            (Target::Top, "RecName") => {
                self.desc.rec_name = Some(name);
                Current::Rec
            }
            (Target::Top, "AltName") => {
                self.desc.alt_names.push(name);
                Current::Alt
            }
            (Target::Top, _) => {
                self.desc.sub_names.push(name);
                Current::Sub
            }
            (Target::Includes | Target::Contains, k) => {
                let sections = if target == Target::Includes {
                    &mut self.desc.includes
                } else {
                    &mut self.desc.contains
                };
                if sections.is_empty() {
                    sections.push(DescriptionSection::default());
                }
                let Some(section) = sections.last_mut() else {
                    return;
                };
                if k == "RecName" {
                    section.rec_name = Some(name);
                    Current::Rec
                } else {
                    section.alt_names.push(name);
                    Current::Alt
                }
            }
        };
        self.current = Some(current);
    }

    fn current_name(&mut self) -> Option<&mut ProteinName> {
        let target = self.target.unwrap_or(Target::Top);
        match (target, self.current?) {
            (_, Current::None) => None,
            (Target::Top, Current::Rec) => self.desc.rec_name.as_mut(),
            (Target::Top, Current::Alt) => self.desc.alt_names.last_mut(),
            (Target::Top, Current::Sub) => self.desc.sub_names.last_mut(),
            (Target::Includes, c) => section_name(self.desc.includes.last_mut()?, c),
            (Target::Contains, c) => section_name(self.desc.contains.last_mut()?, c),
        }
    }

    fn apply_tags(&mut self, text: &str) {
        for item in text.split(';') {
            let Some((tag, value)) = item.split_once('=') else {
                continue;
            };
            let tag = tag.trim().to_string();
            let value = value.trim().to_string();
            if let Some(name) = self.current_name() {
                name.apply(&tag, &value);
            }
        }
    }

    /// True when any structured keyword was seen
    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.structured
    }

    /// Finish parsing: the structured tree (if any) and the flat description
    #[must_use]
    pub fn finish(self) -> (Option<ProteinDescription>, String) {
        let plain = self.plain.join(" ");
        if self.structured {
            let flat = self.desc.flatten();
            let flat = if flat.is_empty() { plain } else { flat };
            (Some(self.desc), flat)
        } else {
            (None, plain)
        }
    }
}

fn section_name(section: &mut DescriptionSection, current: Current) -> Option<&mut ProteinName> {
    match current {
        Current::Rec => section.rec_name.as_mut(),
        Current::Alt | Current::Sub => section.alt_names.last_mut(),
        Current::None => None,
    }
}

fn is_section_keyword(s: &str) -> bool {
    matches!(
        s,
        "RecName" | "AltName" | "SubName" | "Includes" | "Contains" | "Flags"
    )
}

/// Remove a trailing `{ECO:...}` evidence block and surrounding whitespace
fn strip_evidence(value: &str) -> String {
    let value = value.trim();
    let value = match value.find(" {") {
        Some(i) if value.ends_with('}') => &value[..i],
        _ => value,
    };
    value.trim().trim_end_matches(';').trim().to_string()
}

impl ProteinDescription {
    /// Rebuild the one-line description in fixed order: main name, its
    /// extras, alternative names, sub names, `[Includes: ...]`,
    /// `[Contains: ...]`, then flags.
    #[must_use]
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        let mut subs = self.sub_names.iter();

        if let Some(rec) = &self.rec_name {
            out.push_str(&rec.full);
            rec.render_extras(&mut out);
        } else if let Some(first) = subs.next() {
            out.push_str(&first.full);
            first.render_extras(&mut out);
        }

        for alt in &self.alt_names {
            alt.render_alt(&mut out);
        }
        for sub in subs {
            sub.render_alt(&mut out);
        }

        render_sections(&mut out, "Includes", &self.includes);
        render_sections(&mut out, "Contains", &self.contains);

        for flag in &self.flags {
            out.push_str(&format!(" ({flag})"));
        }

        out.trim().to_string()
    }
}

fn render_sections(out: &mut String, label: &str, sections: &[DescriptionSection]) {
    let parts: Vec<String> = sections
        .iter()
        .map(DescriptionSection::render)
        .filter(|s| !s.is_empty())
        .collect();
    if !parts.is_empty() {
        out.push_str(&format!(" [{label}: {}]", parts.join("; ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(lines: &[&str]) -> (Option<ProteinDescription>, String) {
        let mut builder = DescriptionBuilder::new();
        for line in lines {
            builder.push_line(line);
        }
        builder.finish()
    }

    #[test]
    fn test_rec_and_alt_short() {
        let (tree, flat) = build(&["RecName: Full=Foo;", "AltName: Short=Bar;"]);
        assert_eq!(flat, "Foo (Bar)");
        let tree = tree.unwrap();
        assert_eq!(tree.rec_name.unwrap().full, "Foo");
        assert_eq!(tree.alt_names[0].short, vec!["Bar".to_string()]);
    }

    #[test]
    fn test_continuation_tags() {
        let (_, flat) = build(&[
            "RecName: Full=Cytochrome c;",
            "         Short=Cyt c;",
            "         EC=1.9.3.1;",
            "AltName: Allergen=Hom s 1;",
            "Flags: Precursor;",
        ]);
        assert_eq!(
            flat,
            "Cytochrome c (Cyt c) (EC 1.9.3.1) (allergen Hom s 1) (Precursor)"
        );
    }

    #[test]
    fn test_includes_and_contains() {
        let (tree, flat) = build(&[
            "RecName: Full=CAD protein;",
            "Includes:",
            "  RecName: Full=Glutaminase;",
            "           EC=3.5.1.2;",
            "Includes:",
            "  RecName: Full=Dihydroorotase;",
            "Contains:",
            "  RecName: Full=Peptide A;",
        ]);
        let tree = tree.unwrap();
        assert_eq!(tree.includes.len(), 2);
        assert_eq!(tree.contains.len(), 1);
        assert_eq!(
            flat,
            "CAD protein [Includes: Glutaminase (EC 3.5.1.2); Dihydroorotase] [Contains: Peptide A]"
        );
    }

    #[test]
    fn test_sub_name_becomes_main() {
        let (_, flat) = build(&["SubName: Full=Uncharacterized protein {ECO:0000313|EMBL:X};"]);
        assert_eq!(flat, "Uncharacterized protein");
    }

    #[test]
    fn test_plain_text_description() {
        let (tree, flat) = build(&["Cytochrome c oxidase", "subunit 1."]);
        assert!(tree.is_none());
        assert_eq!(flat, "Cytochrome c oxidase subunit 1.");
    }
}
