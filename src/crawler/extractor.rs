//! Structured record extraction
//!
//! A record page is laid out as repeated groups inside a container:
//!
//! ```html
//! <section class="text-images">
//!   <h2>Ada Lovelace</h2>
//!   <p>
//!     <strong>Title:</strong> Professor<br>
//!     <strong>Email:</strong> <a href="mailto:ada@cpp.edu">ada@cpp.edu</a><br>
//!     <strong>Web:</strong> <a href="https://ada.example">Website</a>
//!   </p>
//! </section>
//! ```
//!
//! The heading gives the name. The field block is flattened into a list of
//! [`Segment`]s which a small state machine turns into label/value pairs.

use crate::config::TargetConfig;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// A structured person record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub email: String,
    pub title: Option<String>,
    pub office: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Why a candidate record was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record heading has no name")]
    MissingName,

    #[error("record for {name} has no email")]
    MissingEmail { name: String },

    #[error("duplicate email {email} on page")]
    DuplicateEmail { email: String },
}

/// A rejected candidate, with its position among the record headings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub position: usize,
    pub error: RecordError,
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Accepted records in heading order
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedRecord>,
}

/// Flattened piece of a field block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Bold label such as `Email:`
    Leader(String),
    Text(String),
    Link { text: String, href: Option<String> },
    Break,
    /// Any other element, reduced to its text
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Office,
    Phone,
    Email,
    Website,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "title" => Some(Self::Title),
            "office" => Some(Self::Office),
            "phone" => Some(Self::Phone),
            "email" => Some(Self::Email),
            "web" | "website" => Some(Self::Website),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Fields {
    title: Option<String>,
    office: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
}

impl Fields {
    fn set(&mut self, field: Field, value: Option<String>) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Office => &mut self.office,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
            Field::Website => &mut self.website,
        };
        *slot = value;
    }
}

enum ScanState {
    /// Before the first leader; stray text is ignored
    Preamble,
    /// Collecting fragments for a label (`None` when the label is unknown)
    InField {
        field: Option<Field>,
        parts: Vec<String>,
    },
}

/// Normalizes a leader's text into a label: lowercase, no trailing colon
pub fn normalize_label(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    lowered
        .strip_suffix(':')
        .unwrap_or(&lowered)
        .trim()
        .to_string()
}

fn clean_fragment(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(':').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Turns flattened segments into field values
///
/// Each leader closes the field being collected and opens a new one. Text
/// fragments are trimmed of whitespace and colons, empty ones dropped, and
/// the rest joined with a single space. Links give their `href` for the
/// website label and their text otherwise.
fn scan_fields(segments: &[Segment]) -> Fields {
    let mut fields = Fields::default();
    let mut state = ScanState::Preamble;

    for segment in segments {
        state = match (state, segment) {
            (previous, Segment::Leader(label)) => {
                finish(&mut fields, previous);
                ScanState::InField {
                    field: Field::from_label(&normalize_label(label)),
                    parts: Vec::new(),
                }
            }
            (ScanState::Preamble, _) => ScanState::Preamble,
            (ScanState::InField { field, mut parts }, segment) => {
                let fragment = match segment {
                    Segment::Text(text) | Segment::Other(text) => clean_fragment(text),
                    Segment::Link { text, href } => {
                        if field == Some(Field::Website) {
                            href.as_deref().and_then(clean_fragment)
                        } else {
                            clean_fragment(text)
                        }
                    }
                    Segment::Break | Segment::Leader(_) => None,
                };
                parts.extend(fragment);
                ScanState::InField { field, parts }
            }
        };
    }

    finish(&mut fields, state);
    fields
}

fn finish(fields: &mut Fields, state: ScanState) {
    if let ScanState::InField {
        field: Some(field),
        parts,
    } = state
    {
        let value = parts.join(" ");
        fields.set(field, if value.is_empty() { None } else { Some(value) });
    }
}

/// Extracts records from a target page
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    container: String,
    heading_tag: String,
    block_tag: String,
    leader_tag: String,
}

impl RecordExtractor {
    pub fn new(
        container: impl Into<String>,
        heading_tag: impl Into<String>,
        block_tag: impl Into<String>,
        leader_tag: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            heading_tag: heading_tag.into().to_lowercase(),
            block_tag: block_tag.into().to_lowercase(),
            leader_tag: leader_tag.into().to_lowercase(),
        }
    }

    pub fn from_config(config: &TargetConfig) -> Self {
        Self::new(
            config.record_container.clone(),
            config.record_heading.clone(),
            config.record_block.clone(),
            config.field_leader.clone(),
        )
    }

    /// Extracts every record of the page in heading order
    ///
    /// Records missing a name or an email, and records repeating an email
    /// already seen in this pass, are reported in `rejected`.
    pub fn extract(&self, html: &str) -> Extraction {
        let (container_selector, heading_selector) = match (
            Selector::parse(&self.container),
            Selector::parse(&self.heading_tag),
        ) {
            (Ok(container), Ok(heading)) => (container, heading),
            _ => {
                tracing::warn!("Invalid record selectors; no records extracted");
                return Extraction::default();
            }
        };

        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        let mut position = 0;

        for section in document.select(&container_selector) {
            for heading in section.select(&heading_selector) {
                // Nested containers yield the same heading once per ancestor
                if !visited.insert(heading.id()) {
                    continue;
                }
                let candidate = self.build_record(heading);
                match candidate.and_then(|record| {
                    if seen.insert(record.email.clone()) {
                        Ok(record)
                    } else {
                        Err(RecordError::DuplicateEmail {
                            email: record.email,
                        })
                    }
                }) {
                    Ok(record) => extraction.records.push(record),
                    Err(error) => {
                        tracing::warn!("Skipping record #{}: {}", position + 1, error);
                        extraction.rejected.push(RejectedRecord { position, error });
                    }
                }
                position += 1;
            }
        }

        extraction
    }

    fn build_record(&self, heading: ElementRef<'_>) -> Result<Record, RecordError> {
        let name = heading.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            return Err(RecordError::MissingName);
        }

        let fields = match self.find_block(heading) {
            Some(block) => scan_fields(&self.flatten(block)),
            None => Fields::default(),
        };

        let email = fields
            .email
            .ok_or_else(|| RecordError::MissingEmail { name: name.clone() })?;

        Ok(Record {
            name,
            email,
            title: fields.title,
            office: fields.office,
            phone: fields.phone,
            website: fields.website,
        })
    }

    /// First following sibling with the block tag, before the next heading
    fn find_block<'a>(&self, heading: ElementRef<'a>) -> Option<ElementRef<'a>> {
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            let name = sibling.value().name();
            if name == self.heading_tag {
                return None;
            }
            if name == self.block_tag {
                return Some(sibling);
            }
        }
        None
    }

    /// Flattens a block's children into segments
    ///
    /// Elements that wrap a leader are descended into, so
    /// `<span><strong>Phone:</strong> 555</span>` still yields a leader.
    pub fn flatten(&self, block: ElementRef<'_>) -> Vec<Segment> {
        let mut segments = Vec::new();
        self.flatten_into(block, &mut segments);
        segments
    }

    fn flatten_into(&self, element: ElementRef<'_>, out: &mut Vec<Segment>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    out.push(Segment::Text(text.to_string()));
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = child.value().name();
                    let text = || child.text().collect::<String>();

                    if name == self.leader_tag {
                        out.push(Segment::Leader(text()));
                    } else if name == "br" {
                        out.push(Segment::Break);
                    } else if name == "a" {
                        out.push(Segment::Link {
                            text: text(),
                            href: child.value().attr("href").map(str::to_string),
                        });
                    } else if self.holds_leader(child) {
                        self.flatten_into(child, out);
                    } else {
                        out.push(Segment::Other(text()));
                    }
                }
                _ => {}
            }
        }
    }

    fn holds_leader(&self, element: ElementRef<'_>) -> bool {
        element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|e| e.value().name() == self.leader_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new("section.text-images", "h2", "p", "strong")
    }

    fn page(body: &str) -> String {
        format!(
            r#"<html><body><h1 class="cpp-h1">Permanent Faculty</h1>
            <section class="text-images">{}</section></body></html>"#,
            body
        )
    }

    #[test]
    fn test_title_and_email_only() {
        let html = page(
            r#"<h2>Ada Lovelace</h2>
            <p><strong>Title:</strong> Professor<br>
            <strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let extraction = extractor().extract(&html);
        assert!(extraction.rejected.is_empty());
        assert_eq!(
            extraction.records,
            vec![Record {
                name: "Ada Lovelace".to_string(),
                email: "ada@cpp.edu".to_string(),
                title: Some("Professor".to_string()),
                office: None,
                phone: None,
                website: None,
            }]
        );
    }

    #[test]
    fn test_all_fields_with_links() {
        let html = page(
            r#"<h2>Grace Hopper</h2>
            <p>
              <strong>Title</strong>: Associate Professor<br>
              <strong>Office:</strong> 8-49<br>
              <strong>Phone:</strong> (909) 869-0000<br>
              <strong>Email:</strong> <a href="mailto:grace@cpp.edu">grace@cpp.edu</a><br>
              <strong>Web:</strong> <a href="https://www.cpp.edu/faculty/grace">Website</a>
            </p>"#,
        );

        let records = extractor().extract(&html).records;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title.as_deref(), Some("Associate Professor"));
        assert_eq!(record.office.as_deref(), Some("8-49"));
        assert_eq!(record.phone.as_deref(), Some("(909) 869-0000"));
        assert_eq!(record.email, "grace@cpp.edu");
        assert_eq!(
            record.website.as_deref(),
            Some("https://www.cpp.edu/faculty/grace")
        );
    }

    #[test]
    fn test_duplicate_email_in_pass_dropped() {
        let html = page(
            r#"<h2>First</h2><p><strong>Email:</strong> same@cpp.edu</p>
               <h2>Second</h2><p><strong>Email:</strong> same@cpp.edu</p>"#,
        );

        let extraction = extractor().extract(&html);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].name, "First");
        assert_eq!(
            extraction.rejected,
            vec![RejectedRecord {
                position: 1,
                error: RecordError::DuplicateEmail {
                    email: "same@cpp.edu".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_missing_email_rejected() {
        let html = page(r#"<h2>No Mail</h2><p><strong>Title:</strong> Lecturer</p>"#);

        let extraction = extractor().extract(&html);
        assert!(extraction.records.is_empty());
        assert_eq!(
            extraction.rejected[0].error,
            RecordError::MissingEmail {
                name: "No Mail".to_string()
            }
        );
    }

    #[test]
    fn test_missing_name_rejected() {
        let html = page(r#"<h2>  </h2><p><strong>Email:</strong> x@cpp.edu</p>"#);

        let extraction = extractor().extract(&html);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.rejected[0].error, RecordError::MissingName);
    }

    #[test]
    fn test_block_search_stops_at_next_heading() {
        let html = page(
            r#"<h2>No Block</h2>
               <h2>Has Block</h2><p><strong>Email:</strong> b@cpp.edu</p>"#,
        );

        let extraction = extractor().extract(&html);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].name, "Has Block");
        assert_eq!(extraction.rejected.len(), 1);
        assert_eq!(extraction.rejected[0].position, 0);
    }

    #[test]
    fn test_block_after_intervening_elements() {
        let html = page(
            r#"<h2>Ada</h2><img src="ada.jpg"><div>photo</div>
               <p><strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let records = extractor().extract(&html).records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "ada@cpp.edu");
    }

    #[test]
    fn test_nested_leader_flattened() {
        let html = page(
            r#"<h2>Ada</h2>
               <p><span><strong>Phone:</strong> 555-0100</span><br>
               <strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let records = extractor().extract(&html).records;
        assert_eq!(records[0].phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_unknown_labels_ignored() {
        let html = page(
            r#"<h2>Ada</h2>
               <p><strong>Hours:</strong> MW 10-11<br>
               <strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let record = &extractor().extract(&html).records[0];
        assert_eq!(record.title, None);
        assert_eq!(record.office, None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let html = page(
            r#"<h2>Ada</h2>
               <p><strong>Office:</strong> :<br>
               <strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let record = &extractor().extract(&html).records[0];
        assert_eq!(record.office, None);
    }

    #[test]
    fn test_multiple_fragments_joined_with_space() {
        let html = page(
            r#"<h2>Ada</h2>
               <p><strong>Office:</strong> Building 8<br> Room 49<br>
               <strong>Email:</strong> ada@cpp.edu</p>"#,
        );

        let record = &extractor().extract(&html).records[0];
        assert_eq!(record.office.as_deref(), Some("Building 8 Room 49"));
    }

    #[test]
    fn test_records_outside_container_ignored() {
        let html = r#"<h2>Outside</h2><p><strong>Email:</strong> out@cpp.edu</p>
            <section class="text-images"><h2>Inside</h2>
            <p><strong>Email:</strong> in@cpp.edu</p></section>"#;

        let records = extractor().extract(html).records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Inside");
    }

    #[test]
    fn test_nested_containers_visit_each_heading_once() {
        let html = page(
            r#"<section class="text-images">
                 <h2>Ada Lovelace</h2><p><strong>Email:</strong> ada@cpp.edu</p>
               </section>
               <h2>Grace Hopper</h2><p><strong>Email:</strong> grace@cpp.edu</p>"#,
        );

        let extraction = extractor().extract(&html);
        assert!(extraction.rejected.is_empty());
        let names: Vec<&str> = extraction.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label(" Email: "), "email");
        assert_eq!(normalize_label("WEB"), "web");
        assert_eq!(normalize_label("Office :"), "office");
    }

    #[test]
    fn test_flatten_segments() {
        let document = Html::parse_fragment(
            r#"<p><strong>Email:</strong> <a href="mailto:a@b.c">a@b.c</a><br><em>x</em></p>"#,
        );
        let selector = Selector::parse("p").unwrap();
        let block = document.select(&selector).next().unwrap();

        let segments = extractor().flatten(block);
        assert_eq!(
            segments,
            vec![
                Segment::Leader("Email:".to_string()),
                Segment::Text(" ".to_string()),
                Segment::Link {
                    text: "a@b.c".to_string(),
                    href: Some("mailto:a@b.c".to_string()),
                },
                Segment::Break,
                Segment::Other("x".to_string()),
            ]
        );
    }
}
