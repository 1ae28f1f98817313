//! Each serializer flag changes only its own part of the output.

use vcfkit_core::VcfOptions;
use vcfkit_rfc::rfc::vcard::core::{DateAndOrTime, PropertyValue, VCardVersion};
use vcfkit_rfc::rfc::vcard::{parse, parse_single, serialize_single};
use vcfkit_test::{physical_lines, reparse, vcard};

fn contact() -> String {
    vcard(
        "4.0",
        &[
            "FN:Jane Doe",
            "N:Doe;Jane;;;",
            "item1.EMAIL;PREF=1:jane@example.com",
            "item1.X-ABLABEL:Work",
            "NOTE:",
            "ADR;TYPE=home:;;1 Home St;;;;",
            "ADR;TYPE=work;PREF=1:;;2 Work St;;;;",
            "GENDER:F",
            "ANNIVERSARY:20100612",
            "RELATED;TYPE=spouse;VALUE=text:John Doe",
            "RELATED;TYPE=agent;VALUE=text:Sue Agent",
            "X-UNKNOWN-APP:data",
        ],
    )
}

/// Lines that differ between output written with and without `flag`.
fn lines_added_by(flag: VcfOptions, version: VCardVersion) -> Vec<String> {
    let card = parse_single(&contact()).unwrap();
    let without = serialize_single(&card, version, VcfOptions::NONE);
    let with = serialize_single(&card, version, flag);
    let without_lines = physical_lines(&without);
    physical_lines(&with)
        .into_iter()
        .filter(|line| !without_lines.contains(line))
        .map(str::to_string)
        .collect()
}

#[test_log::test]
fn write_groups() {
    assert_eq!(
        lines_added_by(VcfOptions::WRITE_GROUPS, VCardVersion::V3_0),
        ["item1.EMAIL;TYPE=PREF:jane@example.com"]
    );
}

#[test]
fn write_empty_properties() {
    assert_eq!(
        lines_added_by(VcfOptions::WRITE_EMPTY_PROPERTIES, VCardVersion::V3_0),
        ["NOTE:"]
    );
}

#[test]
fn write_non_standard_properties() {
    let added = lines_added_by(VcfOptions::WRITE_NON_STANDARD_PROPERTIES, VCardVersion::V3_0);
    assert!(added.contains(&"X-GENDER:Female".to_string()), "{added:?}");
    assert!(added.contains(&"X-ANNIVERSARY:2010-06-12".to_string()), "{added:?}");
    assert!(added.contains(&"X-ABLABEL:Work".to_string()), "{added:?}");
    assert!(added.contains(&"X-UNKNOWN-APP:data".to_string()), "{added:?}");
    assert!(!added.iter().any(|line| line.contains("SPOUSE")));
}

#[test]
fn write_relation_extensions() {
    assert_eq!(
        lines_added_by(VcfOptions::WRITE_RELATION_EXTENSIONS, VCardVersion::V3_0),
        ["X-SPOUSE:John Doe"]
    );
}

#[test]
fn allow_multiple_addresses_in_vcard21() {
    assert_eq!(
        lines_added_by(
            VcfOptions::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21,
            VCardVersion::V2_1
        ),
        ["ADR;HOME:;;1 Home St;;;;"]
    );
    assert!(
        lines_added_by(
            VcfOptions::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21,
            VCardVersion::V3_0
        )
        .is_empty()
    );
}

#[test]
fn include_agent_as_separate_vcard_leaves_text_agents_alone() {
    assert!(
        lines_added_by(
            VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD,
            VCardVersion::V3_0
        )
        .is_empty()
    );
}

#[test]
fn include_agent_as_separate_vcard_with_embedded_agent() {
    let input = vcard(
        "3.0",
        &[
            "FN:Boss",
            "N:Boss;;;;",
            "AGENT:BEGIN:VCARD\\nVERSION:3.0\\nFN:Helper\\nUID:helper-1\\nEND:VCARD",
        ],
    );
    let card = parse_single(&input).unwrap();

    let output = serialize_single(&card, VCardVersion::V3_0, VcfOptions::NONE);
    assert_eq!(parse(&output).unwrap().len(), 1);

    let output = serialize_single(
        &card,
        VCardVersion::V3_0,
        VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD,
    );
    assert!(output.contains("AGENT;VALUE=URI:urn:uuid:helper-1\r\n"));
    let cards = parse(&output).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].uid(), Some("helper-1"));
}

#[test]
fn extensions_migrate_back_to_v4_properties() {
    let card = parse_single(&contact()).unwrap();
    let options = VcfOptions::WRITE_NON_STANDARD_PROPERTIES | VcfOptions::WRITE_RELATION_EXTENSIONS;
    let card = reparse(&card, VCardVersion::V3_0, options);

    assert_eq!(
        card.get_property("GENDER").unwrap().value,
        PropertyValue::structured(["F"])
    );
    assert!(matches!(
        card.get_property("ANNIVERSARY").unwrap().value,
        PropertyValue::DateTime(DateAndOrTime::DateTime(_))
    ));
    let spouse = card
        .properties("RELATED")
        .find(|p| p.parameters.has_type("SPOUSE"))
        .unwrap();
    assert_eq!(spouse.value.as_text(), Some("John Doe"));
    assert!(!card.has_property("X-GENDER"));
    assert!(!card.has_property("X-SPOUSE"));
    assert!(card.has_property("X-UNKNOWN-APP"));
}

#[test]
fn flags_from_configuration_names() {
    let options = VcfOptions::from_names(["write-groups", "write-empty-properties"]).unwrap();
    assert_eq!(
        options,
        VcfOptions::WRITE_GROUPS | VcfOptions::WRITE_EMPTY_PROPERTIES
    );
    assert_eq!(options.to_string(), "write-groups,write-empty-properties");
    assert!(VcfOptions::from_names(["write-everything"]).is_err());
}
