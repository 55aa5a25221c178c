use tiffstack_core::config::{DecodeLimits, ViewerConfig, ViewerOptions};
use tiffstack_core::display::Normalization;
use tiffstack_core::error::StackError;

#[test]
fn test_default_config_roundtrip() {
    let config = ViewerConfig::default();
    let text = config.to_toml_string().unwrap();
    let parsed = ViewerConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = ViewerConfig::from_toml_str("").unwrap();
    assert_eq!(config.display.normalization, Normalization::MinMax);
    assert_eq!(config.viewer, ViewerOptions::default());
    assert_eq!(config.limits, DecodeLimits::default());
}

#[test]
fn test_partial_viewer_section() {
    let config = ViewerConfig::from_toml_str(
        r#"
[viewer]
can_pan = false
max_zoom = 8.0
"#,
    )
    .unwrap();
    assert!(!config.viewer.can_pan);
    assert!(config.viewer.can_zoom);
    assert_eq!(config.viewer.max_zoom, 8.0);
    assert_eq!(config.viewer.min_zoom, 0.1);
}

#[test]
fn test_normalization_variants_parse() {
    let config = ViewerConfig::from_toml_str(
        r#"
[display]
normalization = "SampleRange"
"#,
    )
    .unwrap();
    assert_eq!(config.display.normalization, Normalization::SampleRange);

    let config = ViewerConfig::from_toml_str(
        r#"
[display.normalization.Fixed]
low = 100.0
high = 4000.0
"#,
    )
    .unwrap();
    assert_eq!(
        config.display.normalization,
        Normalization::Fixed { low: 100.0, high: 4000.0 }
    );
}

#[test]
fn test_invalid_zoom_limits_rejected() {
    let result = ViewerConfig::from_toml_str(
        r#"
[viewer]
min_zoom = 5.0
max_zoom = 2.0
"#,
    );
    assert!(matches!(result, Err(StackError::Config(_))));
}

#[test]
fn test_invalid_fixed_range_rejected() {
    let result = ViewerConfig::from_toml_str(
        r#"
[display.normalization.Fixed]
low = 10.0
high = 10.0
"#,
    );
    assert!(matches!(result, Err(StackError::Config(_))));
}

#[test]
fn test_malformed_toml_rejected() {
    assert!(matches!(
        ViewerConfig::from_toml_str("[viewer\ncan_zoom = "),
        Err(StackError::Config(_))
    ));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewer.toml");
    std::fs::write(&path, "[limits]\ndecoding_buffer_mb = 64\n").unwrap();

    let config = ViewerConfig::load(&path).unwrap();
    assert_eq!(config.limits.decoding_buffer_mb, 64);
    assert_eq!(config.limits.to_tiff_limits().decoding_buffer_size, 64 * 1024 * 1024);
}
