//! Document parser: groups rows into records and builds [`VCard`]s.

use std::io::BufRead;

use encoding_rs::Encoding;
use url::Url;

use super::error::{ParseError, ParseErrorKind};
use super::lexer::LineReader;
use super::row::VcfRow;
use super::values::property_from_row;
use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::codec::{try_parse_date_time, unmask};
use crate::rfc::vcard::core::{
    DataType, DateAndOrTime, ParameterSection, PropertyValue, VCard, VCardProperty, VCardVersion, names,
};

/// Parses every vCard in `input`.
///
/// Malformed lines are logged and skipped. Content outside
/// `BEGIN:VCARD`/`END:VCARD` is ignored, and a record cut off by the end of
/// input is still returned.
///
/// ## Errors
/// Never fails for in-memory input; the `Result` mirrors [`parse_reader`].
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> RfcResult<Vec<VCard>> {
    parse_reader(input.as_bytes())
}

/// Parses exactly one vCard.
///
/// ## Errors
/// Returns `RfcError::ParseError` if the input contains no vCard.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_single(input: &str) -> RfcResult<VCard> {
    parse_reader(input.as_bytes())?
        .into_iter()
        .next()
        .ok_or_else(|| RfcError::ParseError("no vCard found in input".to_string()))
}

/// Parses every vCard read from `reader` as UTF-8.
///
/// ## Errors
/// Returns `RfcError::Io` if reading fails.
pub fn parse_reader<R: BufRead>(reader: R) -> RfcResult<Vec<VCard>> {
    parse_reader_with_encoding(reader, encoding_rs::UTF_8)
}

/// Parses every vCard read from `reader`, decoding text in `encoding`.
///
/// A `CHARSET` parameter on a property overrides `encoding` for that line.
///
/// ## Errors
/// Returns `RfcError::Io` if reading fails.
#[tracing::instrument(skip(reader, encoding), fields(encoding = encoding.name()))]
pub fn parse_reader_with_encoding<R: BufRead>(
    reader: R,
    encoding: &'static Encoding,
) -> RfcResult<Vec<VCard>> {
    let mut cards = Vec::new();
    let mut stack: Vec<PendingRecord> = Vec::new();

    for line in LineReader::with_encoding(reader, encoding) {
        let line = line?;
        let row = match VcfRow::parse(&line.text, line.number) {
            Ok(row) => row,
            Err(error) => {
                tracing::warn!(line = line.number, %error, "Skipping malformed vCard line");
                continue;
            }
        };

        if is_marker(&row, names::BEGIN) {
            stack.push(PendingRecord::new(row.line));
            continue;
        }

        if is_marker(&row, names::END) {
            if let Some(record) = stack.pop() {
                close_record(record, &mut stack, &mut cards);
            } else {
                tracing::debug!(line = row.line, "END:VCARD without BEGIN, ignoring");
            }
            continue;
        }

        let Some(current) = stack.last_mut() else {
            tracing::debug!(line = row.line, key = %row.key, "Row outside of a vCard, ignoring");
            continue;
        };

        if row.key == names::VERSION {
            current.version = VCardVersion::parse(row.value_str());
        }

        if row.key == names::AGENT
            && row
                .value
                .as_deref()
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("BEGIN:VCARD"))
        {
            // 2.1: the nested record follows on its own lines.
            let line = row.line;
            current.rows.push((
                VcfRow {
                    value: None,
                    ..row
                },
                None,
            ));
            stack.push(PendingRecord::new(line));
            continue;
        }

        current.rows.push((row, None));
    }

    while let Some(record) = stack.pop() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedEof,
            record.start_line,
            "vCard not closed by END:VCARD",
        );
        tracing::warn!(%error, "Keeping unterminated vCard");
        close_record(record, &mut stack, &mut cards);
    }

    tracing::debug!(count = cards.len(), "Parsed vCards");
    Ok(cards)
}

/// Rows of a record that has not seen its END yet, each with the nested
/// record attached to it (2.1 AGENT).
#[derive(Debug)]
struct PendingRecord {
    start_line: usize,
    version: Option<VCardVersion>,
    rows: Vec<(VcfRow, Option<VCard>)>,
}

impl PendingRecord {
    const fn new(start_line: usize) -> Self {
        Self {
            start_line,
            version: None,
            rows: Vec::new(),
        }
    }
}

fn is_marker(row: &VcfRow, key: &str) -> bool {
    row.key == key
        && row
            .value
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("VCARD"))
}

/// Builds the record and hands it to its parent's AGENT row, or to the
/// result list at top level.
fn close_record(record: PendingRecord, stack: &mut [PendingRecord], cards: &mut Vec<VCard>) {
    let card = build_card(record);

    let Some(parent) = stack.last_mut() else {
        cards.push(card);
        return;
    };

    match parent.rows.last_mut() {
        Some((row, nested @ None)) if row.key == names::AGENT && row.value.is_none() => {
            *nested = Some(card);
        }
        _ => {
            let row = VcfRow {
                group: None,
                key: names::AGENT.to_string(),
                parameters: ParameterSection::new(),
                value: None,
                line: 0,
            };
            parent.rows.push((row, Some(card)));
        }
    }
}

fn build_card(record: PendingRecord) -> VCard {
    let version = record.version.unwrap_or_default();
    let mut card = VCard::with_version(version);
    let mut deferred = Vec::new();

    for (row, nested) in record.rows {
        if row.key == names::VERSION {
            continue;
        }
        if row.key.starts_with(names::X_PREFIX) {
            deferred.push(row);
            continue;
        }
        if row.key == names::AGENT {
            card.add_property(agent_property(row, nested, version));
            continue;
        }
        card.add_property(property_from_row(row, version));
    }

    for row in deferred {
        migrate_non_standard(&mut card, row);
    }

    card
}

fn agent_property(mut row: VcfRow, nested: Option<VCard>, version: VCardVersion) -> VCardProperty {
    let value = if let Some(card) = nested {
        PropertyValue::VCard(Box::new(card))
    } else {
        row.decode_quoted_printable();
        match row.value.take() {
            None => PropertyValue::Empty,
            Some(raw) => {
                let text = if version == VCardVersion::V2_1 { raw } else { unmask(&raw) };
                embedded_or_reference(text.trim(), row.line)
            }
        }
    };

    VCardProperty {
        group: row.group,
        name: row.key,
        parameters: row.parameters,
        value,
    }
}

/// An AGENT value: an embedded vCard, a URI or plain text.
fn embedded_or_reference(text: &str, line: usize) -> PropertyValue {
    let starts_with_begin = text
        .get(..11)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCARD"));

    if starts_with_begin {
        match parse_reader(text.as_bytes()) {
            Ok(mut cards) if !cards.is_empty() => {
                return PropertyValue::VCard(Box::new(cards.swap_remove(0)));
            }
            Ok(_) | Err(_) => {
                tracing::debug!(line, "Embedded AGENT vCard could not be parsed");
            }
        }
    }

    if let Ok(url) = Url::parse(text) {
        return PropertyValue::Uri(url);
    }
    PropertyValue::Text(text.to_string())
}

/// Target of a non-standard property that has a standard equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Migration {
    Spouse,
    Assistant,
    Anniversary,
    Gender,
    WabGender,
}

impl Migration {
    fn for_key(key: &str) -> Option<Self> {
        match key {
            "X-SPOUSE" | "X-WAB-SPOUSE_NAME" | "X-EVOLUTION-SPOUSE" | "X-KADDRESSBOOK-X-SPOUSENAME" => {
                Some(Self::Spouse)
            }
            "X-ASSISTANT" | "X-EVOLUTION-ASSISTANT" | "X-KADDRESSBOOK-X-ASSISTANTSNAME" => {
                Some(Self::Assistant)
            }
            "X-ANNIVERSARY"
            | "X-EVOLUTION-ANNIVERSARY"
            | "X-KADDRESSBOOK-X-ANNIVERSARY"
            | "X-WAB-WEDDING_ANNIVERSARY" => Some(Self::Anniversary),
            "X-GENDER" => Some(Self::Gender),
            "X-WAB-GENDER" => Some(Self::WabGender),
            _ => None,
        }
    }

    /// Whether `card` already has a property this migration would create.
    fn target_exists(self, card: &VCard) -> bool {
        match self {
            Self::Spouse => has_relation(card, "SPOUSE"),
            Self::Assistant => has_relation(card, "AGENT") || card.has_property(names::AGENT),
            Self::Anniversary => card.has_property(names::ANNIVERSARY),
            Self::Gender | Self::WabGender => card.has_property(names::GENDER),
        }
    }
}

fn has_relation(card: &VCard, relation_type: &str) -> bool {
    card.properties(names::RELATED)
        .any(|p| p.parameters.has_type(relation_type))
}

/// Applies a deferred `X-` row. Rows without a standard counterpart, and
/// rows whose counterpart already exists, are kept as text properties.
fn migrate_non_standard(card: &mut VCard, mut row: VcfRow) {
    row.decode_quoted_printable();

    let migrated = Migration::for_key(&row.key)
        .filter(|m| !m.target_exists(card))
        .and_then(|m| {
            let mut trimmed = row.clone();
            trimmed.unmask_and_trim();
            migrated_property(m, &trimmed)
        });

    match migrated {
        Some(property) => {
            tracing::trace!(line = row.line, key = %row.key, target = %property.name, "Migrated non-standard property");
            card.add_property(property);
        }
        None => {
            row.unmask();
            let value = row
                .value
                .take()
                .filter(|v| !v.is_empty())
                .map_or(PropertyValue::Empty, PropertyValue::Text);
            card.add_property(VCardProperty {
                group: row.group,
                name: row.key,
                parameters: row.parameters,
                value,
            });
        }
    }
}

fn migrated_property(migration: Migration, row: &VcfRow) -> Option<VCardProperty> {
    let value = row.value.as_deref()?;

    let property = match migration {
        Migration::Spouse => relation(value, "SPOUSE"),
        Migration::Assistant => relation(value, "AGENT"),
        Migration::Anniversary => {
            let date = try_parse_date_time(value)
                .map_or_else(|| DateAndOrTime::Text(value.to_string()), DateAndOrTime::DateTime);
            VCardProperty::new(names::ANNIVERSARY, PropertyValue::DateTime(date))
        }
        Migration::Gender => {
            let sex = if value.to_ascii_uppercase().starts_with('F') { "F" } else { "M" };
            VCardProperty::new(names::GENDER, PropertyValue::structured([sex]))
        }
        Migration::WabGender => {
            let sex = if value.contains('1') { "F" } else { "M" };
            VCardProperty::new(names::GENDER, PropertyValue::structured([sex]))
        }
    };

    Some(VCardProperty {
        group: row.group.clone(),
        ..property
    })
}

/// A RELATED property: a URI if the value has a scheme, text otherwise.
fn relation(value: &str, relation_type: &str) -> VCardProperty {
    let mut property = match Url::parse(value) {
        Ok(url) if !value.contains(char::is_whitespace) => {
            VCardProperty::new(names::RELATED, PropertyValue::Uri(url))
        }
        _ => {
            let mut p = VCardProperty::text(names::RELATED, value);
            p.parameters.data_type = Some(DataType::Text);
            p
        }
    };
    property.parameters.add_type(relation_type);
    property
}
