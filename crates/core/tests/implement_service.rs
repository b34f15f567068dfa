use std::fs;
use std::path::{Path, PathBuf};

use interfacer_core::config::{InterfacerConfig, ResolvedConfig, SubModuleConfig};
use interfacer_core::services::{implement, ImplementError};
use tempfile::tempdir;

const STORE: &str = r#"package store

import "context"

type Store interface {
	Get(ctx context.Context, id string) (string, error)
}
"#;

const MEM: &str = r#"package mem

import "context"

type Mem struct{}

func (m *Mem) Get(ctx context.Context, id string) (string, error) {
	return id, nil
}
"#;

const DISK: &str = r#"package disk

import (
	"context"
)

type Disk struct {
	path string
}

func (d Disk) Get(_ context.Context, id string) (string, error) {
	return d.path + id, nil
}
"#;

const OTHER: &str = r#"package other

type Other struct{}

func (o *Other) Get(id string) (string, error) {
	return id, nil
}
"#;

const PLUGIN: &str = r#"package plug

import (
	"context"
)

type Cache struct{}

func (c *Cache) Get(ctx context.Context, key string) (string, error) {
	return "", nil
}
"#;

fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(&path, contents).expect("write go file");
    path
}

fn app_tree(root: &Path) {
    write(root, "store/store.go", STORE);
    write(root, "mem/mem.go", MEM);
    write(root, "disk/disk.go", DISK);
    write(root, "other/other.go", OTHER);
}

fn config(root: &Path) -> InterfacerConfig {
    InterfacerConfig {
        project_dir: Some(root.to_path_buf()),
        project_module: Some("example.com/app".into()),
        interface_full_name: Some("example.com/app/store.Store".into()),
        new_method: Some("Close(ctx context.Context) error".into()),
        return_default_values: Some("nil".into()),
        ..Default::default()
    }
}

fn resolved(config: &InterfacerConfig) -> ResolvedConfig {
    config.validate().expect("valid config")
}

fn read(path: PathBuf) -> String {
    fs::read_to_string(path).expect("read")
}

#[test]
fn adds_method_to_interface_and_stubs_every_implementer() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    app_tree(root);

    let report = implement(&resolved(&config(root)), false).expect("implement");
    assert!(report.interface_updated);
    assert!(!report.dry_run);
    assert_eq!(report.method, "Close(ctx context.Context) error");
    assert_eq!(report.interface_file, root.join("store/store.go"));

    let mut stubbed: Vec<(&str, &str, bool)> =
        report.stubs.iter().map(|s| (s.type_name.as_str(), s.receiver.as_str(), s.added)).collect();
    stubbed.sort();
    assert_eq!(
        stubbed,
        vec![("example.com/app/disk.Disk", "d Disk", true), ("example.com/app/mem.Mem", "m *Mem", true)]
    );
    assert_eq!(report.files.len(), 3);

    assert!(read(root.join("store/store.go"))
        .contains("\tGet(ctx context.Context, id string) (string, error)\n\tClose(ctx context.Context) error\n}"));
    assert_eq!(
        read(root.join("mem/mem.go")),
        format!("{MEM}\nfunc (m *Mem) Close(ctx context.Context) error {{\n\treturn nil\n}}\n")
    );
    assert!(read(root.join("disk/disk.go"))
        .ends_with("\nfunc (d Disk) Close(ctx context.Context) error {\n\treturn nil\n}\n"));
    assert_eq!(read(root.join("other/other.go")), OTHER);
}

#[test]
fn second_run_changes_nothing() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    app_tree(root);
    let settings = resolved(&config(root));

    implement(&settings, false).expect("first run");
    let mem = read(root.join("mem/mem.go"));

    let report = implement(&settings, false).expect("second run");
    assert!(!report.interface_updated);
    assert!(report.files.is_empty());
    assert_eq!(report.stubs.len(), 2);
    assert!(report.stubs.iter().all(|s| !s.added));
    assert_eq!(read(root.join("mem/mem.go")), mem);
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    app_tree(root);

    let report = implement(&resolved(&config(root)), true).expect("dry run");
    assert!(report.dry_run);
    assert!(report.interface_updated);
    let mut files = report.files.clone();
    files.sort();
    assert_eq!(
        files,
        vec![root.join("disk/disk.go"), root.join("mem/mem.go"), root.join("store/store.go")]
    );
    assert_eq!(read(root.join("store/store.go")), STORE);
    assert_eq!(read(root.join("mem/mem.go")), MEM);
}

#[test]
fn write_path_overrides_redirect_stubs() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    app_tree(root);
    let generated = write(root, "mem/mem_gen.go", "package mem\n");

    let mut settings = config(root);
    settings.write_paths = vec!["example.com/app/mem.Mem,mem/mem_gen.go".into()];
    let report = implement(&resolved(&settings), false).expect("implement");

    let mem_stub = report.stubs.iter().find(|s| s.type_name == "example.com/app/mem.Mem").expect("mem stub");
    assert_eq!(mem_stub.file, generated);
    assert_eq!(read(root.join("mem/mem.go")), MEM);
    assert_eq!(
        read(generated),
        "package mem\n\nimport \"context\"\n\nfunc (m *Mem) Close(ctx context.Context) error {\n\treturn nil\n}\n"
    );
}

#[test]
fn sub_modules_receive_stubs_for_the_new_method() {
    let dir = tempdir().expect("tempdir");
    let app = dir.path().join("app");
    let plugin = dir.path().join("plugin");
    app_tree(&app);
    let cache = write(&plugin, "plug/cache.go", PLUGIN);

    let mut settings = config(&app);
    settings.sub_modules = vec![SubModuleConfig {
        project_dir: plugin.clone(),
        project_module: "example.com/plugin".into(),
        exclude_dirs: Vec::new(),
    }];
    let report = implement(&resolved(&settings), false).expect("implement");

    assert_eq!(report.sub_modules.len(), 1);
    let sub = &report.sub_modules[0];
    assert_eq!(sub.module, "example.com/plugin");
    assert_eq!(sub.stubs.len(), 1);
    assert_eq!(sub.stubs[0].type_name, "example.com/plugin/plug.Cache");
    assert!(sub.stubs[0].added);
    assert!(report.files.contains(&cache));
    assert!(read(cache).ends_with("\nfunc (c *Cache) Close(ctx context.Context) error {\n\treturn nil\n}\n"));
}

#[test]
fn dry_run_sub_modules_match_the_unchanged_interface() {
    let dir = tempdir().expect("tempdir");
    let app = dir.path().join("app");
    let plugin = dir.path().join("plugin");
    app_tree(&app);
    let cache = write(&plugin, "plug/cache.go", PLUGIN);

    let mut settings = config(&app);
    settings.sub_modules = vec![SubModuleConfig {
        project_dir: plugin,
        project_module: "example.com/plugin".into(),
        exclude_dirs: Vec::new(),
    }];
    let report = implement(&resolved(&settings), true).expect("dry run");
    assert_eq!(report.sub_modules[0].stubs.len(), 1);
    assert!(report.files.contains(&cache));
    assert_eq!(read(cache), PLUGIN);
}

#[test]
fn method_declared_in_a_sibling_file_is_not_stubbed_again() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    let a = write(root, "p/a.go", "package p\n\ntype T struct{}\n\nfunc (t *T) Foo() error {\n\treturn nil\n}\n");
    let b = write(root, "p/b.go", "package p\n\nfunc (t *T) Close() error {\n\treturn nil\n}\n");
    write(root, "p/i.go", "package p\n\ntype I interface {\n\tFoo() error\n}\n");
    let a_before = read(a.clone());
    let b_before = read(b.clone());

    let settings = InterfacerConfig {
        project_dir: Some(root.to_path_buf()),
        project_module: Some("example.com/app".into()),
        interface_full_name: Some("example.com/app/p.I".into()),
        new_method: Some("Close() error".into()),
        ..Default::default()
    };
    let report = implement(&resolved(&settings), false).expect("implement");

    assert!(report.interface_updated);
    assert_eq!(report.stubs.len(), 1);
    assert_eq!(report.stubs[0].type_name, "example.com/app/p.T");
    assert!(!report.stubs[0].added);
    assert_eq!(report.files, vec![root.join("p/i.go")]);
    assert_eq!(read(a), a_before);
    assert_eq!(read(b), b_before);
}

#[test]
fn unknown_interface_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    app_tree(root);

    let mut settings = config(root);
    settings.interface_full_name = Some("example.com/app/store.Missing".into());
    let err = implement(&resolved(&settings), false).unwrap_err();
    assert!(matches!(err, ImplementError::InterfaceNotFound(_)), "unexpected error: {err}");
    assert_eq!(read(root.join("store/store.go")), STORE);
}
