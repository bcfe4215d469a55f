use std::fs;
use std::path::PathBuf;

use tlv_config::{ConfigError, TlvFileConfig};

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_file_and_decodes_nested_records() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();

    let path = write_config(
        "tlv-nested",
        r#"
[tags.0x01]
name = "FIRST_NEST"
[tags.0x01.type.0x01]
name = "LEAF"
type = "int"

[tags.0x02]
name = "NON_NESTED_DATA"
type = "int"
"#,
    );
    let config = TlvFileConfig::from_path(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(config.options.length_size, None);

    let mut node = config.new_node().unwrap();
    node.decode(&[
        0x01, 0x06, 0x01, 0x04, 0x00, 0x00, 0x00, 0x07, //
        0x02, 0x04, 0x00, 0x00, 0x00, 0x2A,
    ])
    .unwrap();

    let leaf = node
        .get_path(&["FIRST_NEST".into(), "LEAF".into()])
        .unwrap();
    assert_eq!(leaf.as_u64(), Some(7));
    assert_eq!(
        node.get_by_name("NON_NESTED_DATA").unwrap().as_u64(),
        Some(42)
    );
}

#[test]
fn missing_file_is_a_load_error() {
    let path = std::env::temp_dir().join("tlv-config-does-not-exist.toml");
    let err = TlvFileConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}
