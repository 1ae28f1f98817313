//! vCard serializer.
//!
//! Every record is written in the target version, whatever version it was
//! read from. Values and parameters are rewritten for that version: transfer
//! encodings, media tokens, date formats and masking all follow the target.

use std::collections::HashSet;

use url::Url;
use vcfkit_core::VcfOptions;
use vcfkit_core::constants::{
    BEGIN_VCARD_LINE, CRLF, END_VCARD_LINE, FOLD_SEQUENCE, MAX_BYTES_PER_LINE, URN_UUID_PREFIX,
};

use super::fold::fold_line;
use crate::rfc::vcard::codec::datetime::{self, DateKind};
use crate::rfc::vcard::codec::escape::escape_param_value;
use crate::rfc::vcard::codec::mime::{MediaKind, token_from_media_type};
use crate::rfc::vcard::codec::{MaskMode, base64, data_url, mask, quoted_printable};
use crate::rfc::vcard::core::{
    DataProperty, DataPropertyValue, DataType, DateAndOrTime, ParameterSection, PropertyValue,
    VCard, VCardProperty, VCardVersion, ValueEncoding, names,
};
use crate::rfc::vcard::parse::ValueKind;

/// Properties that only exist in vCard 4.0.
const V4_ONLY: [&str; 8] = [
    "KIND",
    names::GENDER,
    names::ANNIVERSARY,
    names::MEMBER,
    names::RELATED,
    "LANG",
    "CLIENTPIDMAP",
    "XML",
];

/// Serializes `cards` as vCards of `version`.
///
/// Lines end in CRLF and are folded at 75 octets.
#[must_use]
#[tracing::instrument(skip(cards), fields(count = cards.len(), %version, %options))]
pub fn serialize(cards: &[VCard], version: VCardVersion, options: VcfOptions) -> String {
    let mut serializer = Serializer::new(version, options, true);
    for card in cards {
        serializer.write_card(card);
    }
    tracing::debug!(bytes = serializer.out.len(), "Serialized vCards");
    serializer.out
}

/// Serializes a single vCard.
#[must_use]
pub fn serialize_single(card: &VCard, version: VCardVersion, options: VcfOptions) -> String {
    serialize(std::slice::from_ref(card), version, options)
}

/// A rendered property value and the parameters it needs.
struct Rendered {
    value: String,
    /// The value is Quoted-Printable with its own soft line breaks.
    quoted_printable: bool,
    /// 2.1 Base64 values end with a blank line.
    trailing_blank_line: bool,
}

impl Rendered {
    const fn plain(value: String) -> Self {
        Self {
            value,
            quoted_printable: false,
            trailing_blank_line: false,
        }
    }
}

struct Serializer {
    version: VCardVersion,
    options: VcfOptions,
    fold: bool,
    out: String,
}

impl Serializer {
    const fn new(version: VCardVersion, options: VcfOptions, fold: bool) -> Self {
        Self {
            version,
            options,
            fold,
            out: String::new(),
        }
    }

    fn write_card(&mut self, card: &VCard) {
        let mut separate = Vec::new();
        // X- names produced from standard properties in this record.
        let mut extensions = HashSet::new();

        self.out.push_str(BEGIN_VCARD_LINE);
        self.push_line(&format!("VERSION:{}", self.version));

        if self.version >= VCardVersion::V3_0 && !card.has_property(names::FN) {
            self.push_line("FN:");
        }
        if self.version <= VCardVersion::V3_0 && !card.has_property(names::N) {
            self.push_line("N:");
        }

        let preferred_adr = self.preferred_index(card, names::ADR);
        let preferred_label = self.preferred_index(card, names::LABEL);

        for (index, property) in card.properties.iter().enumerate() {
            if property.is_non_standard() {
                continue;
            }
            let skip_legacy_duplicate = match property.name.as_str() {
                names::ADR => preferred_adr.is_some_and(|i| i != index),
                names::LABEL => preferred_label.is_some_and(|i| i != index),
                _ => false,
            };
            if skip_legacy_duplicate {
                continue;
            }
            self.write_standard(property, &mut separate, &mut extensions);
        }

        if self.options.contains(VcfOptions::WRITE_NON_STANDARD_PROPERTIES) {
            for property in card.properties.iter().filter(|p| p.is_non_standard()) {
                if extensions.contains(property.name.as_str()) {
                    continue;
                }
                self.write_property(property);
            }
        }

        self.out.push_str(END_VCARD_LINE);

        for agent in separate {
            self.write_card(&agent);
        }
    }

    /// In 2.1 without multiple-address support, the index of the only
    /// `name` property to keep.
    fn preferred_index(&self, card: &VCard, name: &str) -> Option<usize> {
        if self.version != VCardVersion::V2_1
            || self
                .options
                .contains(VcfOptions::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21)
        {
            return None;
        }
        card.properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name == name)
            .min_by_key(|(_, p)| p.parameters.preference_rank())
            .map(|(i, _)| i)
    }

    fn write_standard(
        &mut self,
        property: &VCardProperty,
        separate: &mut Vec<VCard>,
        extensions: &mut HashSet<&'static str>,
    ) {
        let v4 = self.version == VCardVersion::V4_0;

        match property.name.as_str() {
            names::AGENT => self.write_agent(property, separate),
            names::RELATED if property.parameters.has_type("AGENT") && !v4 => {
                self.write_agent(property, separate);
            }
            names::RELATED if property.parameters.has_type("SPOUSE") && !v4 => {
                if self.options.contains(VcfOptions::WRITE_RELATION_EXTENSIONS) {
                    extensions.insert("X-SPOUSE");
                    self.write_extension(property, "X-SPOUSE");
                }
            }
            names::ANNIVERSARY | names::GENDER if !v4 => {
                if self
                    .options
                    .contains(VcfOptions::WRITE_NON_STANDARD_PROPERTIES)
                {
                    let name = if property.name == names::GENDER {
                        "X-GENDER"
                    } else {
                        "X-ANNIVERSARY"
                    };
                    extensions.insert(name);
                    self.write_extension(property, name);
                }
            }
            name if !v4 && V4_ONLY.contains(&name) => {
                tracing::trace!(name, "Property not defined before vCard 4.0, skipping");
            }
            names::LABEL if v4 => {
                tracing::trace!("LABEL is not a vCard 4.0 property, skipping");
            }
            _ => self.write_property(property),
        }
    }

    /// Writes a standard property under its `X-` name for older versions.
    fn write_extension(&mut self, property: &VCardProperty, name: &str) {
        let value = match &property.value {
            PropertyValue::Structured(components) => {
                let sex = components
                    .first()
                    .and_then(|c| c.first())
                    .map(String::as_str)
                    .unwrap_or_default();
                let text = match sex {
                    "F" | "f" => "Female",
                    "M" | "m" => "Male",
                    other => other,
                };
                PropertyValue::Text(text.to_string())
            }
            PropertyValue::Uri(url) => PropertyValue::Text(url.to_string()),
            other => other.clone(),
        };

        let extension = VCardProperty {
            group: property.group.clone(),
            name: name.to_string(),
            parameters: ParameterSection::new(),
            value,
        };
        self.write_property(&extension);
    }

    fn write_agent(&mut self, property: &VCardProperty, separate: &mut Vec<VCard>) {
        let PropertyValue::VCard(nested) = &property.value else {
            let mut agent = property.clone();
            self.rename_agent(&mut agent);
            self.write_property(&agent);
            return;
        };

        if self
            .options
            .contains(VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD)
        {
            let mut agent_card = (**nested).clone();
            let uid = if let Some(uid) = agent_card.uid() {
                uid.to_string()
            } else {
                let uid = format!("{URN_UUID_PREFIX}{}", uuid::Uuid::new_v4());
                agent_card.set_uid(uid.clone());
                uid
            };
            let reference = if Url::parse(&uid).is_ok() {
                uid
            } else {
                format!("{URN_UUID_PREFIX}{uid}")
            };

            let mut agent = property.clone();
            agent.value = match Url::parse(&reference) {
                Ok(url) => PropertyValue::Uri(url),
                Err(_) => PropertyValue::Text(reference),
            };
            self.rename_agent(&mut agent);
            self.write_property(&agent);
            separate.push(agent_card);
            return;
        }

        match self.version {
            VCardVersion::V2_1 => {
                self.push_line(&format!("{}AGENT:", self.group_prefix(property)));
                self.write_card(nested);
            }
            VCardVersion::V3_0 => {
                let mut inner = Self::new(self.version, self.options, false);
                inner.write_card(nested);
                let line = format!(
                    "{}AGENT:{}",
                    self.group_prefix(property),
                    mask(&inner.out, self.version, MaskMode::List)
                );
                self.push_line(&line);
            }
            VCardVersion::V4_0 => {
                let mut agent = property.clone();
                agent.value =
                    PropertyValue::Text(nested.formatted_name().unwrap_or_default().to_string());
                self.rename_agent(&mut agent);
                agent.parameters.data_type = Some(DataType::Text);
                self.write_property(&agent);
            }
        }
    }

    /// AGENT in 2.1/3.0, RELATED;TYPE=agent in 4.0.
    fn rename_agent(&self, agent: &mut VCardProperty) {
        if self.version == VCardVersion::V4_0 {
            agent.name = names::RELATED.to_string();
            agent.parameters.add_type("AGENT");
        } else {
            agent.name = names::AGENT.to_string();
            agent.parameters.remove_type("AGENT");
        }
    }

    fn group_prefix(&self, property: &VCardProperty) -> String {
        match &property.group {
            Some(group) if self.options.contains(VcfOptions::WRITE_GROUPS) => format!("{group}."),
            _ => String::new(),
        }
    }

    fn write_property(&mut self, property: &VCardProperty) {
        if property.is_empty() && !self.options.contains(VcfOptions::WRITE_EMPTY_PROPERTIES) {
            return;
        }

        let mut parameters = self.prepare_parameters(property);
        let rendered = self.render_value(property, &mut parameters);

        let mut head = self.group_prefix(property);
        head.push_str(&property.name);
        self.write_parameters(&mut head, &parameters);
        head.push(':');

        if rendered.quoted_printable {
            // Only the head is folded; the value carries its own soft breaks.
            let mut line = if self.fold { fold_line(&head) } else { head };
            let mut used = line.rsplit(CRLF).next().map_or(0, str::len);
            if used >= MAX_BYTES_PER_LINE - 1 {
                line.push_str(FOLD_SEQUENCE);
                used = 1;
            }
            line.push_str(&quoted_printable::encode(rendered.value.as_bytes(), used));
            self.out.push_str(&line);
            self.out.push_str(CRLF);
        } else {
            head.push_str(&rendered.value);
            self.push_line(&head);
        }

        if rendered.trailing_blank_line {
            self.out.push_str(CRLF);
        }
    }

    fn push_line(&mut self, line: &str) {
        if self.fold {
            self.out.push_str(&fold_line(line));
        } else {
            self.out.push_str(line);
        }
        self.out.push_str(CRLF);
    }

    /// Copies the parameters and drops those the value renderer derives
    /// again for the target version.
    fn prepare_parameters(&self, property: &VCardProperty) -> ParameterSection {
        let mut parameters = property.parameters.clone();
        parameters.encoding = None;
        parameters.charset = None;
        parameters.data_type = parameters.data_type.filter(|t| {
            matches!(
                t,
                DataType::Boolean
                    | DataType::Integer
                    | DataType::Float
                    | DataType::UtcOffset
                    | DataType::LanguageTag
            ) && matches!(property.value, PropertyValue::Text(_))
        });

        if self.version != VCardVersion::V4_0 && property.parameters.preference.is_some() {
            parameters.preference = None;
            parameters.types.push("PREF".to_string());
        }
        if self.version != VCardVersion::V4_0 && matches!(property.value, PropertyValue::Data(_)) {
            parameters.media_type = None;
        }
        parameters
    }

    fn render_value(&self, property: &VCardProperty, parameters: &mut ParameterSection) -> Rendered {
        let v4 = self.version == VCardVersion::V4_0;
        let default_kind = ValueKind::for_property(&property.name);

        match &property.value {
            PropertyValue::Empty => Rendered::plain(String::new()),
            PropertyValue::Text(text) => {
                let typed_kind = match default_kind {
                    ValueKind::Uri => self.version != VCardVersion::V2_1,
                    ValueKind::DateAndOrTime | ValueKind::Timestamp => v4,
                    _ => false,
                };
                if typed_kind {
                    parameters.data_type = Some(DataType::Text);
                }
                self.render_text(text, parameters)
            }
            PropertyValue::TextList(items) => {
                let joined = items
                    .iter()
                    .map(|item| self.mask_component(item, &[',']))
                    .collect::<Vec<_>>()
                    .join(",");
                self.render_masked(joined, parameters)
            }
            PropertyValue::Structured(components) => {
                let joined = components
                    .iter()
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| self.mask_component(item, &[',', ';']))
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .collect::<Vec<_>>()
                    .join(";");
                self.render_masked(joined, parameters)
            }
            PropertyValue::DateTime(DateAndOrTime::DateTime(dt)) => {
                Rendered::plain(datetime::format(dt, self.version, DateKind::DateTime))
            }
            PropertyValue::DateTime(DateAndOrTime::Text(text)) => {
                if v4 {
                    parameters.data_type = Some(DataType::Text);
                }
                self.render_text(text, parameters)
            }
            PropertyValue::Timestamp(dt) => {
                Rendered::plain(datetime::format(dt, self.version, DateKind::Timestamp))
            }
            PropertyValue::Uri(url) => {
                if default_kind != ValueKind::Uri {
                    parameters.data_type = Some(DataType::Uri);
                }
                Rendered::plain(url.to_string())
            }
            PropertyValue::Geo(geo) => Rendered::plain(geo.to_value(self.version)),
            PropertyValue::Data(data) => self.render_data(property, data, parameters),
            PropertyValue::VCard(nested) => {
                // Embedded records outside AGENT are written by name.
                let name = nested.formatted_name().unwrap_or_default().to_string();
                if v4 {
                    parameters.data_type = Some(DataType::Text);
                }
                self.render_text(&name, parameters)
            }
        }
    }

    fn render_data(
        &self,
        property: &VCardProperty,
        data: &DataProperty,
        parameters: &mut ParameterSection,
    ) -> Rendered {
        let media_type = property
            .parameters
            .media_type
            .clone()
            .or_else(|| data.embedded_media_type());
        let token = MediaKind::for_property(&property.name)
            .zip(media_type.as_deref())
            .and_then(|(kind, media_type)| token_from_media_type(kind, media_type));

        match (data.value(), self.version) {
            (DataPropertyValue::Bytes(bytes), VCardVersion::V4_0) => {
                parameters.media_type = None;
                Rendered::plain(data_url::encode(media_type.as_deref(), bytes))
            }
            (DataPropertyValue::Bytes(bytes), _) => {
                parameters.encoding = Some(ValueEncoding::Base64);
                if let Some(token) = token {
                    parameters.add_type(&token);
                }
                Rendered {
                    value: base64::encode(bytes),
                    quoted_printable: false,
                    trailing_blank_line: self.version == VCardVersion::V2_1,
                }
            }
            (DataPropertyValue::Uri(url), VCardVersion::V4_0) => {
                parameters.media_type = media_type;
                Rendered::plain(url.to_string())
            }
            (DataPropertyValue::Uri(url), _) => {
                parameters.data_type = Some(DataType::Uri);
                if let Some(token) = token {
                    parameters.add_type(&token);
                }
                Rendered::plain(url.to_string())
            }
            (DataPropertyValue::Text(text), VCardVersion::V4_0) => {
                parameters.media_type = None;
                Rendered::plain(data_url::encode(
                    Some("text/plain;charset=utf-8"),
                    text.as_bytes(),
                ))
            }
            (DataPropertyValue::Text(text), _) => self.render_text(text, parameters),
        }
    }

    /// Masks one list item or structured component.
    fn mask_component(&self, item: &str, delimiters: &[char]) -> String {
        if self.version == VCardVersion::V2_1 {
            escape_legacy(item, delimiters)
        } else {
            mask(item, self.version, MaskMode::List)
        }
    }

    fn render_text(&self, text: &str, parameters: &mut ParameterSection) -> Rendered {
        if self.version == VCardVersion::V2_1 {
            self.render_masked(escape_legacy(text, &[]), parameters)
        } else {
            Rendered::plain(mask(text, self.version, MaskMode::Flat))
        }
    }

    /// Finishes an already masked value. 2.1 values that are not printable
    /// ASCII are Quoted-Printable encoded.
    fn render_masked(&self, masked: String, parameters: &mut ParameterSection) -> Rendered {
        if self.version == VCardVersion::V2_1 && quoted_printable::needs_encoding(&masked) {
            parameters.encoding = Some(ValueEncoding::QuotedPrintable);
            parameters.charset = Some("UTF-8".to_string());
            Rendered {
                value: masked,
                quoted_printable: true,
                trailing_blank_line: false,
            }
        } else {
            Rendered::plain(masked)
        }
    }

    fn write_parameters(&self, out: &mut String, parameters: &ParameterSection) {
        match self.version {
            VCardVersion::V2_1 => self.write_legacy_parameters(out, parameters),
            _ => self.write_modern_parameters(out, parameters),
        }
    }

    /// 2.1: TYPE tokens are written without a name.
    fn write_legacy_parameters(&self, out: &mut String, parameters: &ParameterSection) {
        for token in &parameters.types {
            out.push(';');
            out.push_str(token);
        }
        if let Some(encoding) = parameters.encoding {
            push_parameter(out, "ENCODING", &[encoding.as_str(self.version)], self.version);
        }
        if let Some(charset) = &parameters.charset {
            push_parameter(out, "CHARSET", &[charset.as_str()], self.version);
        }
        if let Some(data_type) = parameters.data_type.and_then(|t| t.as_str(self.version)) {
            push_parameter(out, "VALUE", &[data_type], self.version);
        }
        if let Some(language) = &parameters.language {
            push_parameter(out, "LANGUAGE", &[language.as_str()], self.version);
        }
        self.write_non_standard(out, parameters);
    }

    fn write_modern_parameters(&self, out: &mut String, parameters: &ParameterSection) {
        let v4 = self.version == VCardVersion::V4_0;

        if !parameters.types.is_empty() {
            let types: Vec<String> = parameters
                .types
                .iter()
                .map(|t| if v4 { t.to_ascii_lowercase() } else { t.clone() })
                .collect();
            push_parameter(out, "TYPE", &types, self.version);
        }
        if let Some(data_type) = parameters.data_type.and_then(|t| t.as_str(self.version)) {
            push_parameter(out, "VALUE", &[data_type], self.version);
        }
        if let Some(encoding) = parameters.encoding {
            push_parameter(out, "ENCODING", &[encoding.as_str(self.version)], self.version);
        }
        if let Some(language) = &parameters.language {
            push_parameter(out, "LANGUAGE", &[language.as_str()], self.version);
        }

        if v4 {
            if let Some(pref) = parameters.preference {
                push_parameter(out, "PREF", &[pref.to_string()], self.version);
            }
            if let Some(media_type) = &parameters.media_type {
                push_parameter(out, "MEDIATYPE", &[media_type.as_str()], self.version);
            }
            if let Some(label) = &parameters.label {
                push_parameter(out, "LABEL", &[label.as_str()], self.version);
            }
            if let Some(geo) = &parameters.geo {
                push_parameter(out, "GEO", &[geo.to_string()], self.version);
            }
            if let Some(tz) = &parameters.time_zone {
                push_parameter(out, "TZ", &[tz.as_str()], self.version);
            }
            if let Some(alt_id) = &parameters.alt_id {
                push_parameter(out, "ALTID", &[alt_id.as_str()], self.version);
            }
            if !parameters.pid.is_empty() {
                push_parameter(out, "PID", &parameters.pid, self.version);
            }
            if !parameters.sort_as.is_empty() {
                push_parameter(out, "SORT-AS", &parameters.sort_as, self.version);
            }
            if let Some(calscale) = &parameters.calscale {
                push_parameter(out, "CALSCALE", &[calscale.as_str()], self.version);
            }
        }

        self.write_non_standard(out, parameters);
    }

    fn write_non_standard(&self, out: &mut String, parameters: &ParameterSection) {
        for (name, values) in &parameters.non_standard {
            push_parameter(out, name, values, self.version);
        }
    }
}

/// Appends `;NAME=v1,v2`, quoting values that need it.
fn push_parameter<S: AsRef<str>>(out: &mut String, name: &str, values: &[S], version: VCardVersion) {
    out.push(';');
    out.push_str(name);
    out.push('=');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let (escaped, needs_quotes) = escape_param_value(value.as_ref(), version);
        if needs_quotes && version != VCardVersion::V2_1 {
            out.push('"');
            out.push_str(&escaped);
            out.push('"');
        } else {
            out.push_str(&escaped);
        }
    }
}

/// 2.1 masking: backslashes and the given delimiters. Line breaks are left
/// for Quoted-Printable.
fn escape_legacy(text: &str, delimiters: &[char]) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || delimiters.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
