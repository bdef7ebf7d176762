use fli_reader::fli::format::{header, version};
use fli_reader::{FliError, HeaderTree};

const V1_HEADER: &str = "{FLIMIMAGE}\n[LAYOUT]\nchannels=1\nx=2\ny=2\nz=1\nphases=1\ntimestamps=1\nfrequencies=1\ndatatype=UINT8\n[INFO]\ncompression=0\nversion=1.0\n{END}\n";

fn parse(text: &str) -> (HeaderTree, u64) {
    header::parse_bytes(text.as_bytes()).unwrap_or_else(|e| panic!("header failed to parse: {}", e))
}

fn end_offset(text: &str) -> u64 {
    (text.find("{END}").expect("test header has an END marker") + "{END}".len()) as u64
}

#[test]
fn chapters_sections_and_keys_build_the_tree() {
    let (tree, data_start) = parse(V1_HEADER);

    assert_eq!(tree.get("FLIMIMAGE", "LAYOUT", "x"), Some("2"));
    assert_eq!(tree.get("FLIMIMAGE", "LAYOUT", "datatype"), Some("UINT8"));
    assert_eq!(tree.get("FLIMIMAGE", "INFO", "version"), Some("1.0"));
    assert_eq!(tree.get("FLIMIMAGE", "INFO", "x"), None);
    assert_eq!(tree.len(), 10);
    assert_eq!(data_start, end_offset(V1_HEADER));
    assert!(!tree.has_chapter("END"));
}

#[test]
fn keys_before_any_marker_land_in_default() {
    let text = "version = 2.0\nx = 4\n{END}";
    let (tree, data_start) = parse(text);

    assert_eq!(tree.get("DEFAULT", "DEFAULT", "version"), Some("2.0"));
    assert_eq!(tree.get("DEFAULT", "DEFAULT", "x"), Some("4"));
    assert_eq!(data_start, text.len() as u64);
}

#[test]
fn new_chapter_resets_the_active_section() {
    let (tree, _) = parse("{A}\n[S]\nk = 1\n{B}\nk = 2\n{END}\n");

    assert_eq!(tree.get("A", "S", "k"), Some("1"));
    assert_eq!(tree.get("B", "DEFAULT", "k"), Some("2"));
    assert_eq!(tree.get("B", "S", "k"), None);
}

#[test]
fn names_keys_and_values_are_trimmed() {
    let (tree, _) = parse("{ FLIMIMAGE }\n[  LAYOUT ]\n   x   =   512   \n{ END }\n");

    assert_eq!(tree.get("FLIMIMAGE", "LAYOUT", "x"), Some("512"));
}

#[test]
fn lines_without_exactly_one_equals_sign_are_ignored() {
    let (tree, _) = parse("{C}\nnovalue\na = b = c\n=\nk = v\n{END}\n");

    assert_eq!(tree.get("C", "DEFAULT", "k"), Some("v"));
    assert_eq!(tree.get("C", "DEFAULT", "a"), None);
    assert_eq!(tree.get("C", "DEFAULT", "novalue"), None);
    assert_eq!(tree.len(), 1);
}

#[test]
fn repeated_key_keeps_the_last_value() {
    let (tree, _) = parse("{C}\n[S]\nk = 1\nk = 2\n{END}\n");

    assert_eq!(tree.get("C", "S", "k"), Some("2"));
}

#[test]
fn empty_sections_announced_by_markers_exist() {
    let (tree, _) = parse("{FLIMIMAGE}\n[BACKGROUND]\n[LAYOUT]\nx = 1\n{END}\n");

    assert!(tree.has_section("FLIMIMAGE", "BACKGROUND"));
    assert!(tree.section("FLIMIMAGE", "BACKGROUND").is_some_and(|s| s.is_empty()));
}

#[test]
fn data_start_does_not_depend_on_line_endings() {
    let lf = V1_HEADER.to_string();
    let crlf = V1_HEADER.replace('\n', "\r\n");
    let cr = V1_HEADER.replace('\n', "\r");

    for text in [&lf, &crlf, &cr] {
        let (tree, data_start) = parse(text);
        assert_eq!(data_start, end_offset(text));
        assert_eq!(tree, parse(&lf).0, "tree differs for {:?}", text);
    }
}

#[test]
fn bytes_after_the_end_marker_are_not_consumed() {
    let mut bytes = V1_HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(&[b'{', 0xFF, b'=', b'[', 0x00, b'\n']);

    let (tree, data_start) = header::parse_bytes(&bytes).expect("header with payload");
    assert_eq!(data_start, end_offset(V1_HEADER));
    assert_eq!(tree, parse(V1_HEADER).0);
}

#[test]
fn missing_end_marker_is_a_truncated_header() {
    let text = "{FLIMIMAGE}\n[LAYOUT]\nx = 1\n";
    let err = header::parse_bytes(text.as_bytes()).unwrap_err();

    match err {
        FliError::HeaderTruncated { bytes_read } => assert_eq!(bytes_read, text.len() as u64),
        other => panic!("expected HeaderTruncated, got {:?}", other),
    }
}

#[test]
fn rendering_and_reparsing_is_idempotent() {
    let text = "version = 2.0\n{FLIMIMAGE}\nx = 8\n[LAYOUT]\nchannels = [0, 1]\n[BACKGROUND]\n{CAMERA}\n[SETTINGS]\nexposure = 12.5 ms\n{END}\n";
    let (tree, _) = parse(text);

    let rendered = tree.render();
    let (reparsed, data_start) = parse(&rendered);
    assert_eq!(reparsed, tree);
    assert_eq!(data_start, rendered.len() as u64);

    let (again, _) = parse(&reparsed.render());
    assert_eq!(again, tree);
}

#[test]
fn version_lookup_prefers_the_info_section() {
    let (tree, _) = parse("{FLIMIMAGE}\nversion = 2.0\n[INFO]\nversion = 1.0\n{END}\n");

    assert_eq!(version::tell_version(&tree), Some("1.0"));
}

#[test]
fn version_lookup_skips_empty_values() {
    let (tree, _) = parse("{FLIMIMAGE}\nversion = 2.0\n[INFO]\nversion =\n{END}\n");

    assert_eq!(version::tell_version(&tree), Some("2.0"));
}

#[test]
fn version_lookup_falls_back_to_default_chapter() {
    let (tree, _) = parse("version = 2.0\n{END}\n");

    assert_eq!(version::tell_version(&tree), Some("2.0"));
}

#[test]
fn missing_or_unknown_version_is_rejected() {
    let (no_version, _) = parse("{FLIMIMAGE}\n[LAYOUT]\nx = 1\n{END}\n");
    assert_eq!(version::tell_version(&no_version), None);
    assert!(matches!(
        version::resolve(&no_version),
        Err(FliError::UnknownSchemaVersion(_))
    ));

    let (future, _) = parse("{FLIMIMAGE}\n[INFO]\nversion = 3.0\n{END}\n");
    match version::resolve(&future) {
        Err(FliError::UnknownSchemaVersion(v)) => assert_eq!(v, "3.0"),
        other => panic!("expected UnknownSchemaVersion, got {:?}", other),
    }

    let (minor, _) = parse("{FLIMIMAGE}\n[INFO]\nversion = 1.7\n{END}\n");
    assert!(matches!(
        version::resolve(&minor),
        Err(FliError::UnknownSchemaVersion(v)) if v == "1.7"
    ));

    let (garbage, _) = parse("{FLIMIMAGE}\n[INFO]\nversion = beta\n{END}\n");
    assert!(matches!(
        version::resolve(&garbage),
        Err(FliError::UnknownSchemaVersion(_))
    ));
}

#[test]
fn whole_number_versions_resolve() {
    use fli_reader::fli::SchemaVersion;

    for (raw, expected) in [
        ("1", SchemaVersion::V1),
        ("1.00", SchemaVersion::V1),
        ("2.0", SchemaVersion::V2),
    ] {
        let (tree, _) = parse(&format!("version = {}\n{{END}}", raw));
        let (found, schema) = version::resolve(&tree).expect("known version");
        assert_eq!(found, raw);
        assert_eq!(schema, expected);
    }
}
