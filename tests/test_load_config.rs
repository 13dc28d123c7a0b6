use std::fs::write;

use gallery_sync::config::{Config, DEFAULT_GALLERY_ENDPOINT, DEFAULT_UPLOAD_ENDPOINT};
use gallery_sync::load_config::{load_config, resolve, APP_ID_ENV};
use serial_test::serial;
use tempfile::NamedTempFile;

#[test]
#[serial]
fn full_config_file_is_loaded_verbatim() {
    let file = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        file.path(),
        b"gallery_endpoint: \"https://gallery.test/image\"\nupload_endpoint: \"https://gallery.test/upload\"\napp_id: \"someone@example.com\"\n",
    )
    .expect("Writing temp config failed");

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.gallery_endpoint, "https://gallery.test/image");
    assert_eq!(config.upload_endpoint, "https://gallery.test/upload");
    assert_eq!(config.app_id, "someone@example.com");
}

#[test]
#[serial]
fn missing_endpoints_fall_back_to_defaults() {
    let file = NamedTempFile::new().expect("Creating temp config file failed");
    write(file.path(), b"app_id: \"someone@example.com\"\n").expect("Writing temp config failed");

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.gallery_endpoint, DEFAULT_GALLERY_ENDPOINT);
    assert_eq!(config.upload_endpoint, DEFAULT_UPLOAD_ENDPOINT);
}

#[test]
#[serial]
fn missing_app_id_falls_back_to_environment() {
    std::env::set_var(APP_ID_ENV, "env@example.com");
    let resolved = resolve(Config::default()).expect("env app id should resolve");
    assert_eq!(resolved.app_id, "env@example.com");
    std::env::remove_var(APP_ID_ENV);
}

#[test]
#[serial]
fn missing_app_id_everywhere_is_an_error() {
    std::env::remove_var(APP_ID_ENV);
    assert!(resolve(Config::default()).is_err());
}

#[test]
#[serial]
fn malformed_yaml_is_an_error() {
    std::env::set_var(APP_ID_ENV, "env@example.com");
    let file = NamedTempFile::new().expect("Creating temp config file failed");
    write(file.path(), b"gallery_endpoint: [not, a, string\n").expect("Writing temp config failed");
    assert!(load_config(file.path()).is_err());
    std::env::remove_var(APP_ID_ENV);
}

#[test]
#[serial]
fn unreadable_path_is_an_error() {
    assert!(load_config("/definitely/not/a/real/config.yaml").is_err());
}
