//! Round-trip and version conversion tests.
//!
//! A record parsed, serialized and parsed again must carry the same
//! properties with the same values.

use std::collections::BTreeMap;

use vcfkit_core::VcfOptions;

use super::fixtures::*;
use crate::rfc::vcard::build::{serialize, serialize_single};
use crate::rfc::vcard::core::{DataPropertyValue, PropertyValue, VCard, VCardVersion};
use crate::rfc::vcard::parse::{parse, parse_single};

/// Everything except writing agents as separate records.
fn keep_everything() -> VcfOptions {
    VcfOptions::ALL.unset(VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD)
}

/// Property values grouped by name, in file order within a name.
fn values_by_name(card: &VCard) -> BTreeMap<&str, Vec<&PropertyValue>> {
    let mut map: BTreeMap<&str, Vec<&PropertyValue>> = BTreeMap::new();
    for property in &card.properties {
        map.entry(property.name.as_str())
            .or_default()
            .push(&property.value);
    }
    map
}

/// Parse a vCard, serialize it in its own version, then parse again and
/// compare.
fn round_trip(input: &str) -> Result<(), String> {
    let vcard1 = parse_single(input).map_err(|e| format!("First parse failed: {e}"))?;

    let serialized = serialize_single(&vcard1, vcard1.version, keep_everything());

    let vcard2 =
        parse_single(&serialized).map_err(|e| format!("Second parse failed: {e}\n{serialized}"))?;

    if vcard1.version != vcard2.version {
        return Err(format!(
            "Version mismatch: {:?} vs {:?}",
            vcard1.version, vcard2.version
        ));
    }

    if vcard1.properties.len() != vcard2.properties.len() {
        return Err(format!(
            "Property count mismatch: {} vs {}\n{serialized}",
            vcard1.properties.len(),
            vcard2.properties.len()
        ));
    }

    let values1 = values_by_name(&vcard1);
    let values2 = values_by_name(&vcard2);
    if values1 != values2 {
        return Err(format!(
            "Values mismatch:\n{values1:#?}\nvs\n{values2:#?}\n{serialized}"
        ));
    }

    Ok(())
}

#[test_log::test]
fn round_trip_author_vcard() {
    round_trip(VCARD_AUTHOR).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_basic_vcard() {
    round_trip(VCARD_BASIC).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_v4_media() {
    round_trip(VCARD_V4_MEDIA).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_v3_agent() {
    round_trip(VCARD_V3_AGENT).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_v21_legacy() {
    round_trip(VCARD_V21_LEGACY).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_v21_agent() {
    round_trip(VCARD_V21_AGENT).expect("round trip should succeed");
}

#[test]
fn output_lines_fit_in_75_octets() {
    for input in [VCARD_AUTHOR, VCARD_V4_MEDIA, VCARD_V3_AGENT, VCARD_V21_LEGACY] {
        let card = parse_single(input).unwrap();
        for version in [VCardVersion::V2_1, VCardVersion::V3_0, VCardVersion::V4_0] {
            let output = serialize_single(&card, version, keep_everything());
            for line in output.split("\r\n") {
                assert!(line.len() <= 75, "{version}: {line:?}");
            }
        }
    }
}

#[test]
fn multiple_records_with_noise() {
    let cards = parse(VCARD_MULTIPLE_WITH_NOISE).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].formatted_name(), Some("First"));
    assert_eq!(cards[0].properties.len(), 2);
    assert_eq!(cards[1].formatted_name(), Some("Second"));

    let output = serialize(&cards, VCardVersion::V3_0, VcfOptions::default());
    assert_eq!(output.matches("BEGIN:VCARD\r\n").count(), 2);
    assert_eq!(parse(&output).unwrap(), cards);
}

#[test]
fn legacy_values_are_decoded() {
    let card = parse_single(VCARD_V21_LEGACY).unwrap();
    assert_eq!(card.version, VCardVersion::V2_1);
    assert_eq!(card.formatted_name(), Some("Hans Müller"));
    assert_eq!(
        card.get_property("N").unwrap().value,
        PropertyValue::structured(["Müller", "Hans"])
    );
    assert_eq!(
        card.get_property("NOTE").unwrap().value,
        PropertyValue::Text("Line one\r\nLine two".into())
    );

    let tels: Vec<_> = card.properties("TEL").collect();
    assert_eq!(tels[0].parameters.types, ["HOME", "VOICE"]);
    assert_eq!(tels[1].parameters.preference, Some(1));

    let photo = card.get_property("PHOTO").unwrap();
    assert_eq!(photo.parameters.media_type.as_deref(), Some("image/jpeg"));
    let PropertyValue::Data(data) = &photo.value else {
        panic!("PHOTO should be data");
    };
    assert!(matches!(data.value(), DataPropertyValue::Bytes(b) if b.starts_with(&[0xFF, 0xD8])));
}

#[test]
fn legacy_to_v4() {
    let card = parse_single(VCARD_V21_LEGACY).unwrap();
    let output = serialize_single(&card, VCardVersion::V4_0, VcfOptions::default());

    assert!(output.contains("VERSION:4.0\r\n"));
    assert!(output.contains("FN:Hans Müller\r\n"));
    assert!(output.contains("N:Müller;Hans\r\n"));
    assert!(output.contains("TEL;TYPE=home,voice:+49-30-1234567\r\n"));
    assert!(output.contains("TEL;TYPE=work;PREF=1:+49-30-7654321\r\n"));
    assert!(output.contains("NOTE:Line one\\nLine two\r\n"));
    assert!(output.contains("PHOTO:data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==\r\n"));
    assert!(!output.contains("QUOTED-PRINTABLE"));
}

#[test]
fn v3_agent_to_v4_related() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();
    let output = serialize_single(&card, VCardVersion::V4_0, VcfOptions::default());

    assert!(output.contains("RELATED;TYPE=agent;VALUE=text:Susan Thomas\r\n"));
    assert!(output.contains("RELATED;TYPE=spouse;VALUE=text:Mary Dawson\r\n"));
    assert!(output.contains("PHOTO:data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==\r\n"));
    assert!(output.contains("GEO:geo:37.386013,-122.082932\r\n"));
    assert!(output.contains("REV:19951031T222710Z\r\n"));
    assert!(!output.contains("AGENT:"));
}

#[test]
fn v3_agent_to_v21_inline() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();
    let output = serialize_single(&card, VCardVersion::V2_1, VcfOptions::default());
    assert!(output.contains("AGENT:\r\nBEGIN:VCARD\r\nVERSION:2.1\r\n"));
    assert_eq!(output.matches("END:VCARD\r\n").count(), 2);

    let again = parse_single(&output).unwrap();
    let PropertyValue::VCard(agent) = &again.get_property("AGENT").unwrap().value else {
        panic!("AGENT should stay embedded");
    };
    assert_eq!(agent.formatted_name(), Some("Susan Thomas"));
}

#[test]
fn agent_as_separate_record() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();
    let options = VcfOptions::default() | VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD;
    let output = serialize_single(&card, VCardVersion::V3_0, options);

    let cards = parse(&output).unwrap();
    assert_eq!(cards.len(), 2);

    let PropertyValue::Uri(reference) = &cards[0].get_property("AGENT").unwrap().value else {
        panic!("AGENT should be a reference");
    };
    assert!(reference.as_str().starts_with("urn:uuid:"));
    assert_eq!(cards[1].formatted_name(), Some("Susan Thomas"));
    assert_eq!(cards[1].uid(), Some(reference.as_str()));
}

#[test]
fn non_standard_properties_need_the_flag() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();

    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::default());
    assert!(!output.contains("X-ABLABEL"));

    let options = VcfOptions::default() | VcfOptions::WRITE_NON_STANDARD_PROPERTIES;
    let output = serialize_single(&card, VCardVersion::V3_0, options);
    assert!(output.contains("item1.X-ABLABEL:Work\r\n"));
}

#[test]
fn groups_need_the_flag() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();
    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::NONE);
    assert!(output.contains("\r\nEMAIL;TYPE=INTERNET,PREF:Frank_Dawson@Lotus.com\r\n"));
    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::WRITE_GROUPS);
    assert!(output.contains("\r\nitem1.EMAIL;TYPE=INTERNET,PREF:Frank_Dawson@Lotus.com\r\n"));
}

#[test]
fn relation_extension_needs_the_flag() {
    let card = parse_single(VCARD_V3_AGENT).unwrap();
    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::NONE);
    assert!(!output.contains("X-SPOUSE"));
    let output = serialize_single(
        &card,
        VCardVersion::V3_0,
        VcfOptions::WRITE_RELATION_EXTENSIONS,
    );
    assert!(output.contains("X-SPOUSE:Mary Dawson\r\n"));
}

#[test]
fn empty_properties_need_the_flag() {
    let card = parse_single("BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nN:A;;;;\r\nNOTE:\r\nEND:VCARD\r\n")
        .unwrap();
    assert_eq!(card.get_property("NOTE").unwrap().value, PropertyValue::Empty);

    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::NONE);
    assert!(!output.contains("NOTE"));
    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::WRITE_EMPTY_PROPERTIES);
    assert!(output.contains("NOTE:\r\n"));
}

#[test]
fn single_address_in_v21_unless_allowed() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nN:A;;;;\r\n\
                 ADR;TYPE=HOME:;;Home St;;;;\r\n\
                 ADR;TYPE=WORK,PREF:;;Work St;;;;\r\n\
                 END:VCARD\r\n";
    let card = parse_single(input).unwrap();

    let output = serialize_single(&card, VCardVersion::V2_1, VcfOptions::NONE);
    assert_eq!(output.matches("ADR").count(), 1);
    assert!(output.contains("ADR;WORK;PREF:;;Work St;;;;\r\n"));

    let output = serialize_single(
        &card,
        VCardVersion::V2_1,
        VcfOptions::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21,
    );
    assert_eq!(output.matches("ADR").count(), 2);
}

#[test]
fn vcard21_media_token_to_v3() {
    let card = parse_single(VCARD_V21_LEGACY).unwrap();
    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::default());
    assert!(output.contains("PHOTO;TYPE=JPEG;ENCODING=b:/9j/4AAQSkZJRgABAQ==\r\n"));
    assert!(output.contains("URL:http://www.example.com/\r\n"));
}
