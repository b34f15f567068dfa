use std::fs;
use std::path::{Path, PathBuf};

use interfacer_core::model::MethodToken;
use interfacer_core::scanner::{package_path, with_default_excludes, ScanError, Scanner, SymbolTable};
use tempfile::tempdir;

const MODULE: &str = "example.com/app";

fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(&path, contents).expect("write go file");
    path
}

fn scan(root: &Path) -> SymbolTable {
    Scanner::new(MODULE).scan(root, &with_default_excludes(&[])).expect("scan")
}

fn implementer_names(table: &SymbolTable, interface: &str) -> Vec<String> {
    let iface = table.lookup_interface(interface).expect("interface");
    let mut names: Vec<String> = table.implementers(iface).map(|s| s.name().to_string()).collect();
    names.sort();
    names
}

#[test]
fn finds_implementers_across_files_of_a_package() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "p/i.go",
        "package p\n\ntype I interface {\n\tGet(id string) (*T, error)\n\tClose() error\n}\n",
    );
    write(
        root,
        "p/t.go",
        r#"package p

type T struct {
	name string
}

func (t *T) Get(id string) (*T, error) {
	return t, nil
}

func (t *T) Close() error { return nil }

func (t *T) Extra() {}
"#,
    );
    write(root, "p/u.go", "package p\n\ntype U struct{}\n\nfunc (U) Close() error { return nil }\n");

    let table = scan(root);
    assert_eq!(implementer_names(&table, "example.com/app/p.I"), vec!["example.com/app/p.T"]);

    let t = table.lookup_struct("example.com/app/p.T").expect("T");
    assert_eq!(t.base.package, "example.com/app/p");
    assert_eq!(t.methods.len(), 3);
    let get = &t.methods["Get"];
    assert_eq!(get.params, vec!["string"]);
    assert_eq!(get.returns, vec!["*example.com/app/p.T", "error"]);
    assert_eq!(t.base.tokens.len(), 3);
    assert!(t.base.tokens.windows(2).all(|w| w[0] < w[1]), "tokens are sorted");

    let receiver = t.method_receiver();
    assert_eq!(receiver.name, "t");
    assert_eq!(receiver.ty, "*T");

    let u = table.lookup_struct("example.com/app/p.U").expect("U");
    assert_eq!(u.method_receiver().ty, "*U", "unnamed receivers fall back to a generated one");
}

#[test]
fn interface_types_declared_in_a_later_file_are_qualified() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    let i = write(root, "p/i.go", "package p\n\ntype I interface {\n\tGet() *T\n}\n");
    write(root, "p/t.go", "package p\n\ntype T struct{}\n\nfunc (t *T) Get() *T { return t }\n");

    let table = scan(root);
    let iface = table.lookup_interface("example.com/app/p.I").expect("I");
    assert_eq!(iface.methods[0].returns, vec!["*example.com/app/p.T"]);
    assert_eq!(iface.base.file_paths, vec![i]);
    assert_eq!(implementer_names(&table, "example.com/app/p.I"), vec!["example.com/app/p.T"]);
}

#[test]
fn methods_seen_before_their_receiver_type_are_merged() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    let a = write(root, "q/a.go", "package q\n\nfunc (f *Foo) Use(b Baz) Baz {\n\treturn b\n}\n");
    let b = write(root, "q/b.go", "package q\n\ntype Foo struct{}\n\ntype Baz int\n");
    write(root, "q/c.go", "package q\n\ntype User interface {\n\tUse(b Baz) Baz\n}\n");

    let table = scan(root);
    let foo = table.lookup_struct("example.com/app/q.Foo").expect("Foo");
    assert_eq!(foo.base.file_paths, vec![a, b]);
    let method = &foo.methods["Use"];
    assert_eq!(method.params, vec!["example.com/app/q.Baz"]);
    assert_eq!(method.returns, vec!["example.com/app/q.Baz"]);
    assert_eq!(implementer_names(&table, "example.com/app/q.User"), vec!["example.com/app/q.Foo"]);
}

#[test]
fn later_method_declaration_replaces_earlier_one() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "m/m1.go", "package m\n\ntype S struct{}\n\nfunc (s S) Name() string { return \"\" }\n");
    write(root, "m/m2.go", "package m\n\nfunc (s *S) Name() int { return 0 }\n");

    let table = scan(root);
    let s = table.lookup_struct("example.com/app/m.S").expect("S");
    assert_eq!(s.methods.len(), 1);
    assert_eq!(s.methods["Name"].returns, vec!["int"]);
    assert_eq!(s.base.tokens, vec![MethodToken::new("Name", &[], &["int".to_string()])]);
}

#[test]
fn embedding_is_followed_transitively() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "e/t.go",
        r#"package e

type T struct {
	Base
	n int
}

type Pinger interface {
	Ping() error
}

type ReadPinger interface {
	Pinger
	Read() int
}
"#,
    );
    write(
        root,
        "e/base.go",
        "package e\n\ntype C interface {\n\tPing() error\n}\n\ntype Base struct {\n\tC\n}\n\nfunc (b *Base) Read() int { return 0 }\n",
    );

    let table = scan(root);
    let t_id = table.struct_id("example.com/app/e.T").expect("T");
    let base_id = table.struct_id("example.com/app/e.Base").expect("Base");
    assert_eq!(table.struct_info(t_id).embedded_structs, vec![base_id]);
    let c_id = table.interface_id("example.com/app/e.C").expect("C");
    assert_eq!(table.struct_info(base_id).embedded_interfaces, vec![c_id]);

    let names: Vec<&str> = table.struct_info(t_id).base.tokens.iter().map(MethodToken::name).collect();
    assert_eq!(names, vec!["Ping", "Read"]);
    assert_eq!(
        implementer_names(&table, "example.com/app/e.Pinger"),
        vec!["example.com/app/e.Base", "example.com/app/e.T"]
    );
    assert_eq!(
        implementer_names(&table, "example.com/app/e.ReadPinger"),
        vec!["example.com/app/e.Base", "example.com/app/e.T"]
    );
    let read_pinger = table.lookup_interface("example.com/app/e.ReadPinger").expect("ReadPinger");
    assert_eq!(read_pinger.base.tokens.len(), 2);
}

#[test]
fn embedding_cycles_terminate() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "c/c.go",
        r#"package c

type X struct {
	Y
}

type Y struct {
	*X
}

func (x *X) A() {}

func (y *Y) B() {}

type P interface {
	Q
	A()
}

type Q interface {
	P
	B()
}
"#,
    );

    let table = scan(root);
    let x = table.lookup_struct("example.com/app/c.X").expect("X");
    let y = table.lookup_struct("example.com/app/c.Y").expect("Y");
    assert_eq!(x.base.tokens, y.base.tokens);
    assert_eq!(x.base.tokens.len(), 2);
    assert_eq!(table.lookup_interface("example.com/app/c.P").expect("P").base.tokens.len(), 2);
    assert_eq!(
        implementer_names(&table, "example.com/app/c.Q"),
        vec!["example.com/app/c.X", "example.com/app/c.Y"]
    );
}

#[test]
fn excluded_directories_are_skipped_at_any_depth() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "keep/k.go", "package keep\n\ntype K struct{}\n");
    write(root, "vendor/v/v.go", "package v\n\ntype V struct{}\n");
    write(root, "gen/g.go", "package gen\n\ntype G struct{}\n");
    write(root, "keep/gen/g.go", "package gen\n\ntype Nested struct{}\n");
    write(root, ".git/x.go", "package x\n\ntype Hidden struct{}\n");

    let table = Scanner::new(MODULE)
        .scan(root, &with_default_excludes(&["gen".to_string()]))
        .expect("scan");
    let names: Vec<&str> = table.structs().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["example.com/app/keep.K"]);
}

#[test]
fn scan_root_is_never_excluded() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("vendor");
    write(&root, "r.go", "package vendor\n\ntype R struct{}\n");

    let table = Scanner::new(MODULE).scan(&root, &with_default_excludes(&[])).expect("scan");
    assert!(table.lookup_struct("example.com/app.R").is_some());
}

#[test]
fn external_test_packages_are_ignored() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "p/p.go", "package p\n\ntype Real struct{}\n");
    write(root, "p/p_test.go", "package p_test\n\ntype Fixture struct{}\n");

    let table = scan(root);
    assert!(table.lookup_struct("example.com/app/p.Real").is_some());
    assert!(table.lookup_struct("example.com/app/p.Fixture").is_none());
}

#[test]
fn recomputing_tokens_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "p/p.go",
        "package p\n\ntype I interface {\n\tRun()\n}\n\ntype A struct{}\n\nfunc (a A) Run() {}\n",
    );

    let mut table = scan(root);
    let before: Vec<_> = table.structs().iter().map(|s| s.base.tokens.clone()).collect();
    table.compute_tokens();
    let after: Vec<_> = table.structs().iter().map(|s| s.base.tokens.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(table.match_implementers(), 1);
    assert_eq!(table.match_implementers(), 1);
}

#[test]
fn scanner_without_implements_leaves_interfaces_unmatched() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "p/p.go",
        "package p\n\ntype I interface {\n\tRun()\n}\n\ntype A struct{}\n\nfunc (a A) Run() {}\n",
    );

    let table = Scanner::new(MODULE).without_implements().scan(root, &[]).expect("scan");
    let iface = table.lookup_interface("example.com/app/p.I").expect("I");
    assert!(iface.implementers.is_empty());
    assert_eq!(iface.base.tokens.len(), 1, "tokens are still computed");
}

#[test]
fn symbol_table_serializes_records() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "p/p.go", "package p\n\ntype A struct{}\n\nfunc (a *A) Run(n int) {}\n");

    let table = scan(root);
    let value = serde_json::to_value(&table).expect("serialize");
    let structs = value["structs"].as_array().expect("structs array");
    assert_eq!(structs.len(), 1);
    assert_eq!(structs[0]["name"], "example.com/app/p.A");
    assert_eq!(structs[0]["methods"]["Run"]["params"][0], "int");
}

#[test]
fn reports_unusable_roots_and_bad_sources() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("missing");
    let err = Scanner::new(MODULE).scan(&missing, &[]).unwrap_err();
    assert!(matches!(err, ScanError::RootUnavailable { .. }), "unexpected error: {err}");

    let file = write(dir.path(), "file.go", "package x\n");
    let err = Scanner::new(MODULE).scan(&file, &[]).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory(_)), "unexpected error: {err}");

    write(dir.path(), "bad/broken.go", "package bad\n\ntype T struct {\n");
    let err = Scanner::new(MODULE).scan(dir.path(), &[]).unwrap_err();
    assert!(matches!(err, ScanError::Parse { .. }), "unexpected error: {err}");
    assert!(err.to_string().contains("broken.go"));
}

#[test]
fn package_paths_follow_directory_layout() {
    let root = Path::new("/src/app");
    assert_eq!(package_path(MODULE, root, root), "example.com/app");
    assert_eq!(package_path(MODULE, root, &root.join("internal/store")), "example.com/app/internal/store");
}

#[test]
fn default_excludes_are_appended_once() {
    let all = with_default_excludes(&["gen".to_string(), "vendor".to_string()]);
    assert_eq!(all, vec!["gen", "vendor", ".idea", ".git", ".github"]);
}
