use std::fs;

use interfacer::canonicalize_or_current;
use interfacer::commands::{
    implement_command, inspect_command, list_command, load_config, overlay_args, scan_tree,
    ImplementArgs,
};
use interfacer_core::config::InterfacerConfig;
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_dot_and_relative_paths() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let dot = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    assert_eq!(dot, tmp.path().canonicalize().expect("canon tmp"));

    let nested = canonicalize_or_current("nested").expect("canonicalize nested");
    assert_eq!(nested, subdir.canonicalize().expect("canonicalize subdir"));

    let missing = canonicalize_or_current("missing").expect("fallback");
    assert!(missing.ends_with("missing"));

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn overlay_args_prefers_command_line_values() {
    let tmp = tempdir().expect("tempdir");
    let file = InterfacerConfig {
        project_module: Some("example.com/file".into()),
        new_method: Some("Close() error".into()),
        return_default_values: Some("nil".into()),
        exclude_dirs: vec!["gen".into()],
        ..Default::default()
    };
    let args = ImplementArgs {
        project_dir: Some(tmp.path().to_string_lossy().to_string()),
        project_module: Some("example.com/flag".into()),
        interface: Some("example.com/flag/p.I".into()),
        exclude: vec!["testdata".into()],
        ..Default::default()
    };

    let merged = overlay_args(file, &args).expect("overlay");
    assert_eq!(merged.project_dir, Some(tmp.path().canonicalize().expect("canon")));
    assert_eq!(merged.project_module.as_deref(), Some("example.com/flag"));
    assert_eq!(merged.interface_full_name.as_deref(), Some("example.com/flag/p.I"));
    assert_eq!(merged.new_method.as_deref(), Some("Close() error"));
    assert_eq!(merged.return_default_values.as_deref(), Some("nil"));
    assert_eq!(merged.exclude_dirs, vec!["gen", "testdata"]);
}

#[test]
fn load_config_reads_explicit_file() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("custom.yaml");
    fs::write(&path, "project_module: example.com/app\nenable_debug: true\n").expect("write");

    let config = load_config(Some(path.to_str().expect("utf-8 path"))).expect("load");
    assert_eq!(config.project_module.as_deref(), Some("example.com/app"));
    assert!(config.enable_debug);

    fs::write(&path, "sub_modules: nope").expect("write");
    let err = load_config(Some(path.to_str().expect("utf-8 path"))).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"), "unexpected error: {err}");
}

#[test]
fn commands_report_scan_and_lookup_failures() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().to_string_lossy().to_string();
    fs::create_dir_all(tmp.path().join("p")).expect("mkdir");
    fs::write(tmp.path().join("p/p.go"), "package p\n\ntype T struct {\n").expect("write");

    let err = list_command(&root, "example.com/app", &[], true).unwrap_err();
    assert!(err.to_string().contains("Failed to scan"), "unexpected error: {err}");

    fs::write(tmp.path().join("p/p.go"), "package p\n\ntype T struct{}\n").expect("write");
    let table = scan_tree(&root, "example.com/app", &[], false).expect("scan");
    assert!(table.lookup_struct("example.com/app/p.T").is_some());

    let err = inspect_command(&root, "example.com/app", "example.com/app/p.I", &[], true).unwrap_err();
    assert!(err.to_string().contains("Interface not found"), "unexpected error: {err}");

    let args = ImplementArgs {
        project_dir: Some(root.clone()),
        project_module: Some("example.com/app".into()),
        interface: Some("example.com/app/p.I".into()),
        method: Some("Close() error".into()),
        ..Default::default()
    };
    let err = implement_command(InterfacerConfig::default(), &args).unwrap_err();
    assert!(err.to_string().contains("Failed to implement example.com/app/p.I"), "unexpected error: {err}");
}
