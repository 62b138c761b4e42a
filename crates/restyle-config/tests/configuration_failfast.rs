use std::ffi::OsString;
use std::fs;

use ortho_config::OrthoConfig;
use restyle_config::Config;
use tempfile::TempDir;

#[test]
fn malformed_configuration_files_fail_to_load() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("restyle.toml");
    fs::write(&path, "max_sweeps = \"many\"\n").expect("write malformed config");

    let args = vec![
        OsString::from("restyle"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(!error.to_string().is_empty());
}

#[test]
fn log_format_is_read_from_the_command_line() {
    let args = vec![
        OsString::from("restyle"),
        OsString::from("--log-format"),
        OsString::from("json"),
    ];
    let config = Config::load_from_iter(args).expect("load");
    assert_eq!(config.log_format(), restyle_config::LogFormat::Json);
}
