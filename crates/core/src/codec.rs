//! XML encoding of [`RecordCollection`]s.
//!
//! The envelope is declared once over the plain element shape. Each
//! [`RecordSchema`] picks a concrete envelope at compile time, and a
//! [`Substitution`] records which envelope fields carry that schema's element
//! tag instead of the plain one.
//!
//! Encoding goes through serde. Decoding reads events directly so that text
//! content comes back byte for byte, surrounding whitespace included.

use std::collections::HashMap;
use std::io::{Read, Write};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use crate::collection::RecordCollection;
use crate::error::CoreError;
use crate::records::{BaseRecord, OverrideField, OverrideRecord};

pub const ENVELOPE_TAG: &str = "SerializableBackstoryArray";
pub const PLAIN_TAG: &str = "SerializableBackstory";
pub const OVERRIDE_TAG: &str = "ReplacementBackstory";
pub const COUNT_FIELD: &str = "count";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// A record shape that can be placed in the envelope.
pub trait RecordSchema: Sized + Clone {
    const ELEMENT_TAG: &'static str;

    type Envelope: Serialize;

    fn from_base(base: BaseRecord) -> Self;

    fn base(&self) -> &BaseRecord;

    fn to_envelope(collection: &RecordCollection<Self>) -> Self::Envelope;

    /// Builds one record from the children of its element. Missing plain
    /// fields become empty strings.
    fn from_fields(fields: &mut ElementFields) -> Self;
}

/// Text of the child elements of one record element, by local tag name.
#[derive(Debug, Default)]
pub struct ElementFields {
    values: HashMap<String, String>,
}

impl ElementFields {
    pub fn insert(&mut self, tag: impl Into<String>, text: impl Into<String>) {
        self.values.insert(tag.into(), text.into());
    }

    pub fn take(&mut self, tag: &str) -> Option<String> {
        self.values.remove(tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    Element(&'static str),
    ElementArray(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub declared: DeclaredType,
}

/// Fields of the envelope as declared over the plain element shape.
pub const ENVELOPE_FIELDS: &[FieldDecl] = &[
    FieldDecl {
        name: COUNT_FIELD,
        declared: DeclaredType::Integer,
    },
    FieldDecl {
        name: "records",
        declared: DeclaredType::ElementArray(PLAIN_TAG),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionEntry {
    pub field: &'static str,
    pub element_tag: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub container: &'static str,
    pub entries: Vec<SubstitutionEntry>,
    scalars: Vec<&'static str>,
}

impl Substitution {
    /// Substitutes `concrete` for every field of `container` declared as
    /// `generic` or as an array of `generic`.
    pub fn compute(
        container: &'static str,
        fields: &[FieldDecl],
        generic: &'static str,
        concrete: &'static str,
    ) -> Self {
        tracing::debug!(container, generic, concrete, "computing element substitution");

        let mut entries = Vec::new();
        let mut scalars = Vec::new();
        for field in fields {
            match field.declared {
                DeclaredType::Element(tag) | DeclaredType::ElementArray(tag) if tag == generic => {
                    tracing::debug!(container, field = field.name, "substituting {generic} with {concrete}");
                    entries.push(SubstitutionEntry {
                        field: field.name,
                        element_tag: concrete,
                    });
                }
                DeclaredType::Element(_) | DeclaredType::ElementArray(_) => {}
                DeclaredType::Integer => scalars.push(field.name),
            }
        }

        for field in fields {
            let resolved = entries
                .iter()
                .find(|entry| entry.field == field.name)
                .map(|entry| entry.element_tag);
            match (field.declared, resolved) {
                (DeclaredType::ElementArray(_), Some(tag)) => {
                    tracing::debug!(field = field.name, "array with elements of type {tag}");
                }
                (DeclaredType::ElementArray(tag), None) => {
                    tracing::debug!(field = field.name, "array with elements of type {tag}");
                }
                (declared, resolved) => {
                    tracing::debug!(field = field.name, ?declared, ?resolved, "envelope field");
                }
            }
        }

        Self {
            container,
            entries,
            scalars,
        }
    }

    pub fn for_schema<T: RecordSchema>() -> Self {
        Self::compute(ENVELOPE_TAG, ENVELOPE_FIELDS, PLAIN_TAG, T::ELEMENT_TAG)
    }

    pub fn element_tag(&self, field: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.element_tag)
    }

    /// Checks an element opened at `depth` (the root is 0). The root must be
    /// the container, and each child of the root must be a scalar field or a
    /// substituted element.
    fn check_element(&self, depth: usize, name: &str, saw_root: bool) -> Result<(), CoreError> {
        match depth {
            0 if saw_root => Err(CoreError::Decode(format!(
                "unexpected element {name} after {}",
                self.container
            ))),
            0 if name != self.container => Err(CoreError::Decode(format!(
                "expected root element {}, found {name}",
                self.container
            ))),
            1 if !self.allows_child(name) => Err(CoreError::Decode(format!(
                "unexpected element {name} in {}",
                self.container
            ))),
            _ => Ok(()),
        }
    }

    fn allows_child(&self, name: &str) -> bool {
        self.scalars.iter().any(|scalar| *scalar == name)
            || self.entries.iter().any(|entry| entry.element_tag == name)
    }
}

/// Envelope of plain records, used for the full dump.
#[derive(Debug, Serialize)]
#[serde(rename = "SerializableBackstoryArray")]
pub struct PlainEnvelope {
    count: usize,
    #[serde(rename = "SerializableBackstory")]
    records: Vec<BaseRecord>,
}

/// Envelope of override records, used for the example and edit files.
#[derive(Debug, Serialize)]
#[serde(rename = "SerializableBackstoryArray")]
pub struct OverrideEnvelope {
    count: usize,
    #[serde(rename = "ReplacementBackstory")]
    records: Vec<OverrideElement>,
}

/// Flat wire form of an [`OverrideRecord`]: the seven plain fields followed by
/// the replacements. Absent replacements are not written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideElement {
    key: String,
    identifier: String,
    title: String,
    title_female: String,
    title_short: String,
    title_short_female: String,
    base_desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement_title_female: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement_title_short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement_title_short_female: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement_desc: Option<String>,
}

impl From<&OverrideRecord> for OverrideElement {
    fn from(record: &OverrideRecord) -> Self {
        let base = record.base.clone();
        Self {
            key: base.key,
            identifier: base.identifier,
            title: base.title,
            title_female: base.title_female,
            title_short: base.title_short,
            title_short_female: base.title_short_female,
            base_desc: base.base_desc,
            replacement_title: record.replacement_title.clone(),
            replacement_title_female: record.replacement_title_female.clone(),
            replacement_title_short: record.replacement_title_short.clone(),
            replacement_title_short_female: record.replacement_title_short_female.clone(),
            replacement_desc: record.replacement_desc.clone(),
        }
    }
}

impl RecordSchema for BaseRecord {
    const ELEMENT_TAG: &'static str = PLAIN_TAG;

    type Envelope = PlainEnvelope;

    fn from_base(base: BaseRecord) -> Self {
        base
    }

    fn base(&self) -> &BaseRecord {
        self
    }

    fn to_envelope(collection: &RecordCollection<Self>) -> PlainEnvelope {
        PlainEnvelope {
            count: collection.count,
            records: collection.records.clone(),
        }
    }

    fn from_fields(fields: &mut ElementFields) -> Self {
        let mut base = BaseRecord {
            key: fields.take("key").unwrap_or_default(),
            identifier: fields.take("identifier").unwrap_or_default(),
            ..BaseRecord::default()
        };
        for field in OverrideField::ALL {
            if let Some(text) = fields.take(field.original_name()) {
                *field.original_mut(&mut base) = text;
            }
        }
        base
    }
}

impl RecordSchema for OverrideRecord {
    const ELEMENT_TAG: &'static str = OVERRIDE_TAG;

    type Envelope = OverrideEnvelope;

    fn from_base(base: BaseRecord) -> Self {
        OverrideRecord::new(base)
    }

    fn base(&self) -> &BaseRecord {
        &self.base
    }

    fn to_envelope(collection: &RecordCollection<Self>) -> OverrideEnvelope {
        OverrideEnvelope {
            count: collection.count,
            records: collection.records.iter().map(OverrideElement::from).collect(),
        }
    }

    fn from_fields(fields: &mut ElementFields) -> Self {
        let mut record = OverrideRecord::new(BaseRecord::from_fields(fields));
        for field in OverrideField::ALL {
            record.set_replacement(field, fields.take(field.as_str()));
        }
        record
    }
}

pub fn encode<T: RecordSchema>(collection: &RecordCollection<T>) -> Result<String, CoreError> {
    let substitution = Substitution::for_schema::<T>();
    tracing::debug!(
        container = substitution.container,
        element = T::ELEMENT_TAG,
        count = collection.count,
        "encoding collection"
    );

    let envelope = T::to_envelope(collection);
    let mut out = String::from(XML_DECLARATION);
    let mut serializer = quick_xml::se::Serializer::new(&mut out);
    serializer.indent(' ', 2);
    envelope
        .serialize(serializer)
        .map_err(|e| CoreError::Encode(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

/// Record state gathered while walking a document.
struct Collector<T> {
    count: Option<usize>,
    records: Vec<T>,
    fields: ElementFields,
}

impl<T: RecordSchema> Collector<T> {
    /// Handles a closed element at `depth` whose text content was `text`.
    fn close(&mut self, depth: usize, name: String, text: String) -> Result<(), CoreError> {
        match depth {
            1 if name == COUNT_FIELD => {
                let count = text.trim().parse::<usize>().map_err(|e| {
                    CoreError::Decode(format!("invalid {COUNT_FIELD} {text:?}: {e}"))
                })?;
                self.count = Some(count);
            }
            1 => {
                let mut fields = std::mem::take(&mut self.fields);
                self.records.push(T::from_fields(&mut fields));
            }
            2 => self.fields.insert(name, text),
            _ => {}
        }
        Ok(())
    }
}

pub fn decode<T: RecordSchema>(xml: &str) -> Result<RecordCollection<T>, CoreError> {
    let substitution = Substitution::for_schema::<T>();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut collector = Collector::<T> {
        count: None,
        records: Vec::new(),
        fields: ElementFields::default(),
    };
    let mut open: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(decode_error)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let depth = open.len();
                substitution.check_element(depth, &name, saw_root)?;
                if depth == 0 {
                    saw_root = true;
                }
                if matches!(event, Event::Empty(_)) {
                    collector.close(depth, name, String::new())?;
                } else {
                    open.push(name);
                }
                text.clear();
            }
            Event::Text(ref e) => text.push_str(&e.unescape().map_err(decode_error)?),
            Event::CData(ref e) => text.push_str(&e.decode().map_err(decode_error)?),
            Event::End(_) => {
                let Some(name) = open.pop() else {
                    return Err(CoreError::Decode("unbalanced end tag".into()));
                };
                collector.close(open.len(), name, std::mem::take(&mut text))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.last() {
        return Err(CoreError::Decode(format!("document ends inside {name}")));
    }
    if !saw_root {
        return Err(CoreError::Decode(format!(
            "missing {} element",
            substitution.container
        )));
    }

    Ok(RecordCollection::with_declared_count(
        collector.count.unwrap_or(0),
        collector.records,
    ))
}

fn decode_error(error: impl std::fmt::Display) -> CoreError {
    CoreError::Decode(error.to_string())
}

pub fn encode_to_writer<T: RecordSchema, W: Write>(
    collection: &RecordCollection<T>,
    mut writer: W,
) -> Result<(), CoreError> {
    let xml = encode(collection)?;
    writer.write_all(xml.as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn decode_from_reader<T: RecordSchema, R: Read>(
    mut reader: R,
) -> Result<RecordCollection<T>, CoreError> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml).map_err(decode_error)?;
    decode(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base(key: &str, identifier: &str, title: &str, desc: &str) -> BaseRecord {
        BaseRecord {
            key: key.into(),
            identifier: identifier.into(),
            title: title.into(),
            title_female: format!("{title}ess"),
            title_short: title.chars().take(4).collect(),
            title_short_female: String::new(),
            base_desc: desc.into(),
        }
    }

    #[test]
    fn substitution_targets_record_array_only() {
        let plain = Substitution::for_schema::<BaseRecord>();
        assert_eq!(plain.container, ENVELOPE_TAG);
        assert_eq!(plain.element_tag("records"), Some(PLAIN_TAG));
        assert_eq!(plain.element_tag("count"), None);

        let overrides = Substitution::for_schema::<OverrideRecord>();
        assert_eq!(
            overrides.entries,
            vec![SubstitutionEntry {
                field: "records",
                element_tag: OVERRIDE_TAG,
            }]
        );
    }

    #[test]
    fn substitution_matches_single_element_fields() {
        let fields = [
            FieldDecl {
                name: "primary",
                declared: DeclaredType::Element(PLAIN_TAG),
            },
            FieldDecl {
                name: "others",
                declared: DeclaredType::ElementArray("Unrelated"),
            },
        ];
        let substitution = Substitution::compute("Holder", &fields, PLAIN_TAG, OVERRIDE_TAG);
        assert_eq!(substitution.element_tag("primary"), Some(OVERRIDE_TAG));
        assert_eq!(substitution.element_tag("others"), None);
    }

    #[test]
    fn plain_shape_uses_plain_element_tag() {
        let collection = RecordCollection::new(vec![base("rancher", "ID1", "Rancher", "Raises animals")]);
        let xml = encode(&collection).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<SerializableBackstoryArray>"));
        assert!(xml.contains("<count>1</count>"));
        assert!(xml.contains("<SerializableBackstory>"));
        assert!(xml.contains("<titleFemale>Rancheress</titleFemale>"));
        assert!(xml.contains("<baseDesc>Raises animals</baseDesc>"));
        assert!(!xml.contains("ReplacementBackstory"));
    }

    #[test]
    fn override_shape_round_trips_and_omits_absent_fields() {
        let mut first = OverrideRecord::new(base("rancher", "ID1", "Rancher", "Raises animals"));
        first.replacement_desc = Some("Tends livestock".into());
        let mut second = OverrideRecord::new(base("miner", "ID2", "Miner", "Digs"));
        second.set_example_text();
        let collection = RecordCollection::new(vec![first, second]);

        let xml = encode(&collection).unwrap();
        assert!(xml.contains("<ReplacementBackstory>"));
        assert!(!xml.contains("<SerializableBackstory>"));
        assert_eq!(xml.matches("<replacementTitle>").count(), 1);
        assert_eq!(xml.matches("<replacementDesc>").count(), 2);

        let decoded: RecordCollection<OverrideRecord> = decode(&xml).unwrap();
        assert_eq!(decoded, collection);
        assert_eq!(decoded.records[0].replacement_title, None);
    }

    #[test]
    fn decodes_hand_written_file() {
        let xml = r#"<?xml version="1.0"?>
<SerializableBackstoryArray xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <count>1</count>
  <ReplacementBackstory>
    <key>rancher</key>
    <identifier>ID1</identifier>
    <replacementDesc>Tends livestock</replacementDesc>
  </ReplacementBackstory>
</SerializableBackstoryArray>
"#;
        let decoded: RecordCollection<OverrideRecord> = decode(xml).unwrap();
        assert_eq!(decoded.count, 1);
        let record = &decoded.records[0];
        assert_eq!(record.key(), "rancher");
        assert_eq!(record.identifier(), "ID1");
        assert_eq!(record.base.title, "");
        assert_eq!(record.replacement_desc.as_deref(), Some("Tends livestock"));
        assert_eq!(record.replacement_title, None);
    }

    #[test]
    fn declared_count_survives_decode() {
        let xml = "<SerializableBackstoryArray><count>3</count>\
                   <ReplacementBackstory><key>a</key><identifier>A</identifier></ReplacementBackstory>\
                   <ReplacementBackstory><key>b</key><identifier>B</identifier></ReplacementBackstory>\
                   </SerializableBackstoryArray>";
        let decoded: RecordCollection<OverrideRecord> = decode(xml).unwrap();
        assert_eq!(decoded.count, 3);
        assert_eq!(decoded.len(), 2);
        assert!(!decoded.is_consistent());
    }

    #[test]
    fn rejects_plain_dump_as_edit_file() {
        let collection = RecordCollection::new(vec![base("rancher", "ID1", "Rancher", "Raises animals")]);
        let xml = encode(&collection).unwrap();

        let result = decode::<OverrideRecord>(&xml);
        match result {
            Err(CoreError::Decode(message)) => assert!(message.contains("SerializableBackstory")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            decode::<OverrideRecord>("<SerializableBackstoryArray><count>1</count>"),
            Err(CoreError::Decode(_))
        ));
        assert!(matches!(
            decode::<OverrideRecord>("<Other><count>1</count></Other>"),
            Err(CoreError::Decode(_))
        ));
        assert!(matches!(decode::<BaseRecord>(""), Err(CoreError::Decode(_))));
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        let mut record = OverrideRecord::new(base("rancher", "ID1", " Rancher", "  Line one.\n\nLine two.  \n"));
        record.replacement_desc = Some("\n  Tends livestock.\t\n".into());
        record.replacement_title_short = Some("   ".into());
        let collection = RecordCollection::new(vec![record]);

        let xml = encode(&collection).unwrap();
        let decoded: RecordCollection<OverrideRecord> = decode(&xml).unwrap();
        assert_eq!(decoded, collection);
        assert_eq!(decoded.records[0].base.base_desc, "  Line one.\n\nLine two.  \n");

        let plain = RecordCollection::new(vec![base("miner", "ID2", "Miner", "\tDigs \n")]);
        let decoded: RecordCollection<BaseRecord> = decode(&encode(&plain).unwrap()).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn hand_written_text_is_taken_verbatim() {
        let xml = "<SerializableBackstoryArray><count>1</count><ReplacementBackstory>\
                   <key>rancher</key><identifier>ID1</identifier>\
                   <replacementTitle> Cattle &amp; sheep </replacementTitle>\
                   <replacementDesc><![CDATA[ <raw> ]]></replacementDesc>\
                   <replacementTitleShort/>\
                   </ReplacementBackstory></SerializableBackstoryArray>";
        let decoded: RecordCollection<OverrideRecord> = decode(xml).unwrap();
        let record = &decoded.records[0];
        assert_eq!(record.replacement_title.as_deref(), Some(" Cattle & sheep "));
        assert_eq!(record.replacement_desc.as_deref(), Some(" <raw> "));
        assert_eq!(record.replacement_title_short.as_deref(), Some(""));
        assert_eq!(record.replacement_title_female, None);
    }

    #[test]
    fn rejects_invalid_count() {
        for count in ["-1", "two", ""] {
            let xml = format!(
                "<SerializableBackstoryArray><count>{count}</count></SerializableBackstoryArray>"
            );
            assert!(
                matches!(decode::<OverrideRecord>(&xml), Err(CoreError::Decode(_))),
                "count {count:?} should not decode"
            );
        }
    }

    #[test]
    fn count_tolerates_surrounding_whitespace() {
        let xml = "<SerializableBackstoryArray><count>\n  0\n</count></SerializableBackstoryArray>";
        let decoded: RecordCollection<BaseRecord> = decode(xml).unwrap();
        assert_eq!(decoded.count, 0);
        assert!(decoded.is_empty());
    }

    #[test]
    fn writer_and_reader_agree() {
        let collection = RecordCollection::new(vec![
            base("a", "A", "Alpha", "First"),
            base("b", "B", "Beta", "Second"),
        ]);
        let mut bytes = Vec::new();
        encode_to_writer(&collection, &mut bytes).unwrap();

        let decoded: RecordCollection<BaseRecord> = decode_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, collection);
    }
}
