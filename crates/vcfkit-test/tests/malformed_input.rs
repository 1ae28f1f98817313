//! The parser keeps going on input that does not follow the grammar.

use std::io::{BufReader, Cursor};

use vcfkit_rfc::error::RfcError;
use vcfkit_rfc::rfc::vcard::core::{DateAndOrTime, PropertyValue, VCardVersion};
use vcfkit_rfc::rfc::vcard::{parse, parse_reader, parse_single};
use vcfkit_test::vcard;

#[test_log::test]
fn broken_lines_are_skipped() {
    let input = vcard(
        "3.0",
        &[
            "FN:Jane",
            "THIS LINE HAS NO SEPARATOR",
            "BAD NAME:value",
            ";NO-NAME=1:value",
            "NOTE:kept",
        ],
    );
    let card = parse_single(&input).unwrap();
    assert_eq!(card.formatted_name(), Some("Jane"));
    assert_eq!(
        card.get_property("NOTE").unwrap().value,
        PropertyValue::Text("kept".into())
    );
    assert_eq!(card.properties.len(), 2);
}

#[test_log::test]
fn unterminated_record_is_kept() {
    let cards = parse("BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Cut Off\r\nTEL:123").unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].version, VCardVersion::V4_0);
    assert_eq!(cards[0].formatted_name(), Some("Cut Off"));
    assert!(cards[0].has_property("TEL"));
}

#[test]
fn stray_end_and_rows_outside_records_are_ignored() {
    let input = format!(
        "END:VCARD\r\nFN:Outside\r\n{}garbage\r\n",
        vcard("3.0", &["FN:Inside"])
    );
    let cards = parse(&input).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].formatted_name(), Some("Inside"));
}

#[test]
fn no_records_at_all() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("hello\r\nworld\r\n").unwrap().is_empty());
    assert!(matches!(
        parse_single("nothing here"),
        Err(RfcError::ParseError(_))
    ));
}

#[test]
fn missing_version_defaults_to_oldest() {
    let card = parse_single("BEGIN:VCARD\r\nFN:No Version\r\nEND:VCARD\r\n").unwrap();
    assert_eq!(card.version, VCardVersion::V2_1);
    assert_eq!(card.formatted_name(), Some("No Version"));
}

#[test]
fn invalid_typed_values_fall_back_to_text() {
    let input = vcard(
        "3.0",
        &[
            "FN:A",
            "BDAY:sometime in spring",
            "REV:not a timestamp",
            "GEO:200.0;10.0",
            "URL:not a url",
        ],
    );
    let card = parse_single(&input).unwrap();
    let value = |name: &str| card.get_property(name).unwrap().value.clone();

    assert_eq!(
        value("BDAY"),
        PropertyValue::DateTime(DateAndOrTime::Text("sometime in spring".into()))
    );
    assert_eq!(value("REV"), PropertyValue::Text("not a timestamp".into()));
    assert_eq!(value("GEO"), PropertyValue::Text("200.0;10.0".into()));
    assert_eq!(value("URL"), PropertyValue::Text("not a url".into()));
}

#[test]
fn mixed_line_endings() {
    let input = "BEGIN:VCARD\nVERSION:3.0\rFN:Mixed\r\n Endings\nEND:VCARD";
    let card = parse_single(input).unwrap();
    assert_eq!(card.formatted_name(), Some("MixedEndings"));
}

#[test]
fn unknown_parameters_are_kept() {
    let input = vcard("3.0", &["FN:A", "TEL;X-FOO=bar;PREF=high:123"]);
    let card = parse_single(&input).unwrap();
    let tel = card.get_property("TEL").unwrap();
    assert!(tel.parameters.preference.is_none());
    assert!(
        tel.parameters
            .non_standard
            .contains(&("X-FOO".to_string(), vec!["bar".to_string()]))
    );
    assert!(
        tel.parameters
            .non_standard
            .contains(&("PREF".to_string(), vec!["high".to_string()]))
    );
}

#[test]
fn reader_input_matches_string_input() {
    let input = format!(
        "{}{}",
        vcard("2.1", &["FN:One"]),
        vcard("4.0", &["FN:Two"])
    );
    let from_reader = parse_reader(BufReader::with_capacity(7, Cursor::new(input.as_bytes()))).unwrap();
    assert_eq!(from_reader, parse(&input).unwrap());
    assert_eq!(from_reader.len(), 2);
}
