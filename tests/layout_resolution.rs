use fli_reader::fli::format::{header, layout};
use fli_reader::fli::{Packing, SampleFormat};
use fli_reader::{Diagnostic, FliError, ImageShape, LayoutDescriptor};

/// Resolves a header given as text. A trailing `{END}` is appended.
fn resolve(body: &str) -> fli_reader::Result<(LayoutDescriptor, Vec<Diagnostic>)> {
    let text = format!("{}{{END}}", body);
    let (tree, _) = header::parse_bytes(text.as_bytes())?;
    layout::resolve(&tree)
}

fn resolve_ok(body: &str) -> (LayoutDescriptor, Vec<Diagnostic>) {
    resolve(body).unwrap_or_else(|e| panic!("layout failed to resolve: {}", e))
}

fn shape(dims: [usize; 7]) -> ImageShape {
    ImageShape::from_array(dims)
}

const V1_FULL: &str = "{FLIMIMAGE}
[INFO]
version = 1.0
compression = 1
[LAYOUT]
channels = 2
x = 3
y = 4
z = 5
phases = 6
timestamps = 7
frequencies = 2
datatype = UINT16
";

#[test]
fn v1_reads_all_seven_dimensions() {
    let (layout, diagnostics) = resolve_ok(V1_FULL);

    assert_eq!(layout.version, "1.0");
    assert_eq!(layout.image_shape, shape([2, 3, 4, 5, 6, 7, 2]));
    assert_eq!(layout.image_shape.storage_dims(), [2, 7, 6, 5, 4, 3, 2]);
    assert_eq!(layout.pixel_type.name, "UINT16");
    assert_eq!(layout.pixel_type.format, SampleFormat::U16);
    assert!(layout.compressed);
    assert!(!layout.background_present());
    assert_eq!(layout.image_byte_len().expect("image size"), 2 * 3 * 4 * 5 * 6 * 7 * 2 * 2);
    assert!(diagnostics.is_empty());
}

#[test]
fn v1_absent_dimensions_default_to_one() {
    let (layout, _) = resolve_ok("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\nx = 16\n");

    assert_eq!(layout.image_shape, shape([1, 16, 1, 1, 1, 1, 1]));
    assert_eq!(layout.pixel_type.format, SampleFormat::U8);
    assert!(!layout.compressed);
}

#[test]
fn v1_has_dark_image_keeps_channel_and_frequency() {
    let body = V1_FULL.replace("datatype = UINT16\n", "datatype = UINT16\nhasDarkImage = 1\n");
    let (layout, _) = resolve_ok(&body);

    let background = layout.background.as_ref().expect("dark image declared");
    assert_eq!(background.shape, shape([2, 3, 4, 1, 1, 1, 2]));
    assert_eq!(background.pixel_type, layout.pixel_type);
    assert_eq!(layout.background_byte_len().expect("background size"), 2 * 3 * 4 * 2 * 2);
}

#[test]
fn v1_background_section_wins_over_has_dark_image() {
    let body = "{FLIMIMAGE}
[INFO]
version = 1.0
[LAYOUT]
x = 4
y = 4
timestamps = 3
datatype = UINT16
hasDarkImage = 1
[BACKGROUND]
x = 4
y = 4
datatype = UINT32
";
    let (layout, _) = resolve_ok(body);

    let background = layout.background.expect("background section declared");
    assert_eq!(background.shape, shape([1, 4, 4, 1, 1, 1, 1]));
    assert_eq!(background.pixel_type.format, SampleFormat::U32);
}

#[test]
fn v1_without_info_section_assumes_uncompressed() {
    let (layout, diagnostics) = resolve_ok("{FLIMIMAGE}\nversion = 1.0\n[LAYOUT]\nx = 2\ny = 2\n");

    assert!(!layout.compressed);
    assert_eq!(diagnostics, vec![Diagnostic::MissingInfoSection]);
}

#[test]
fn v1_pixel_format_takes_precedence_over_datatype() {
    let (layout, _) =
        resolve_ok("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\ndatatype = UINT16\npixelFormat = Mono12p\n");

    assert_eq!(layout.pixel_type.name, "Mono12p");
    assert_eq!(layout.pixel_type.bits, 12);
    assert_eq!(layout.pixel_type.packing, Packing::Lsb);
}

#[test]
fn v1_packing_key_overrides_twelve_bit_default() {
    let (layout, _) = resolve_ok(
        "{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\nx = 3\ndatatype = UINT12\npacking = MSB\n",
    );

    assert_eq!(layout.pixel_type.packing, Packing::Msb);
    assert_eq!(layout.image_byte_len().expect("image size"), 5);
}

#[test]
fn v1_packing_key_is_ignored_for_full_width_types() {
    let (layout, _) = resolve_ok(
        "{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\ndatatype = UINT16\npacking = sideways\n",
    );

    assert_eq!(layout.pixel_type.packing, Packing::None);
}

#[test]
fn v1_rejects_bad_values() {
    let bad_packing = resolve("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\ndatatype = UINT12\npacking = middle\n");
    assert!(matches!(bad_packing, Err(FliError::InvalidPacking(ref p)) if p == "middle"));

    let bad_type = resolve("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\ndatatype = COMPLEX64\n");
    assert!(matches!(bad_type, Err(FliError::UnsupportedDataType(ref t)) if t == "COMPLEX64"));

    let bad_dimension = resolve("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\nx = wide\n");
    match bad_dimension {
        Err(FliError::InvalidHeaderValue { path, value, .. }) => {
            assert_eq!(path, "FLIMIMAGE.LAYOUT.x");
            assert_eq!(value, "wide");
        }
        other => panic!("expected InvalidHeaderValue, got {:?}", other),
    }

    let zero_dimension = resolve("{FLIMIMAGE}\n[INFO]\nversion = 1.0\n[LAYOUT]\ny = 0\n");
    assert!(matches!(zero_dimension, Err(FliError::InvalidHeaderValue { .. })));
}

#[test]
fn v1_requires_layout_section() {
    match resolve("{FLIMIMAGE}\n[INFO]\nversion = 1.0\ncompression = 0\n") {
        Err(FliError::MissingHeaderField { path }) => assert_eq!(path, "FLIMIMAGE.LAYOUT"),
        other => panic!("expected MissingHeaderField, got {:?}", other),
    }
}

const V2_FULL: &str = "{FLIMIMAGE}
version = 2.0
channels = [0, 1]
phases = [0, 90, 180, 270]
frequencies = [40.0]
x = 8
y = 6
z = 1
numberOfFrames = 3
numberOfDarkImages = 2
pixelFormat = Mono12p
";

#[test]
fn v2_counts_list_entries_for_list_axes() {
    let (layout, diagnostics) = resolve_ok(V2_FULL);

    assert_eq!(layout.version, "2.0");
    assert_eq!(layout.image_shape, shape([2, 8, 6, 1, 4, 3, 1]));
    assert_eq!(layout.pixel_type.name, "Mono12p");
    assert!(!layout.compressed);
    assert_eq!(layout.background_shape(), Some(layout.image_shape));
    assert_eq!(layout.image_byte_len().expect("image size"), (2 * 8 * 6 * 4 * 3) * 12 / 8);
    assert!(diagnostics.is_empty());
}

#[test]
fn v2_optional_axes_default_to_one() {
    let (layout, _) = resolve_ok("{FLIMIMAGE}\nversion = 2.0\nx = 4\ny = 2\npixelFormat = Mono16\n");

    assert_eq!(layout.image_shape, shape([1, 4, 2, 1, 1, 1, 1]));
    assert_eq!(layout.pixel_type.format, SampleFormat::U16);
    assert!(layout.background.is_none());
}

#[test]
fn v2_empty_axis_list_is_rejected() {
    for key in ["channels", "phases", "frequencies"] {
        let body = format!("{{FLIMIMAGE}}\nversion = 2.0\nx = 4\ny = 2\n{} = [ ]\npixelFormat = Mono16\n", key);
        match resolve(&body) {
            Err(FliError::InvalidHeaderValue { path, value, reason }) => {
                assert_eq!(path, format!("FLIMIMAGE.DEFAULT.{}", key));
                assert_eq!(value, "[ ]");
                assert_eq!(reason, "dimension must be at least 1");
            }
            other => panic!("expected InvalidHeaderValue for {}, got {:?}", key, other),
        }
    }
}

#[test]
fn payload_size_overflow_is_rejected() {
    let body = "{FLIMIMAGE}
[INFO]
version = 1.0
[LAYOUT]
channels = 4294967296
x = 4294967296
y = 4294967296
datatype = UINT16
";
    match resolve(body) {
        Err(FliError::InvalidHeaderValue { reason, .. }) => {
            assert_eq!(reason, "payload size overflows u64")
        }
        other => panic!("expected InvalidHeaderValue, got {:?}", other),
    }
}

#[test]
fn v2_without_chapter_marker_reads_default_group() {
    let (layout, _) = resolve_ok("version = 2.0\nx = 2\ny = 2\npixelFormat = Mono8\n");

    assert_eq!(layout.image_shape, shape([1, 2, 2, 1, 1, 1, 1]));
    assert_eq!(layout.pixel_type.format, SampleFormat::U8);
}

#[test]
fn v2_ignores_compression_and_datatype_keys() {
    let body = V2_FULL.replace("pixelFormat = Mono12p\n", "pixelFormat = Mono8\ndatatype = UINT16\ncompression = 1\n");
    let (layout, _) = resolve_ok(&body);

    assert_eq!(layout.pixel_type.name, "Mono8");
    assert!(!layout.compressed);
}

#[test]
fn v2_requires_x_y_and_pixel_format() {
    for (key, line) in [
        ("x", "x = 8\n"),
        ("y", "y = 6\n"),
        ("pixelFormat", "pixelFormat = Mono12p\n"),
    ] {
        let body = V2_FULL.replace(line, "");
        match resolve(&body) {
            Err(FliError::MissingHeaderField { path }) => {
                assert_eq!(path, format!("FLIMIMAGE.DEFAULT.{}", key))
            }
            other => panic!("expected MissingHeaderField for {}, got {:?}", key, other),
        }
    }
}

#[test]
fn unsupported_version_fails_before_layout() {
    let body = V1_FULL.replace("version = 1.0", "version = 3.0");
    assert!(matches!(resolve(&body), Err(FliError::UnknownSchemaVersion(v)) if v == "3.0"));
}
