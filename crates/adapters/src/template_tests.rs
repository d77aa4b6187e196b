// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn template_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let tpl = root.path().join("java-micronaut");
    fs::create_dir_all(tpl.join("src/{{muppet_name}}")).unwrap();
    fs::write(tpl.join("README.md"), "# {{muppet_name}} on port {{port}}\n").unwrap();
    fs::write(tpl.join("src/{{muppet_name}}/App.java"), "class {{muppet_name}} {}\n").unwrap();
    fs::write(tpl.join("logo.png"), [0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe]).unwrap();
    fs::create_dir_all(root.path().join("node-express")).unwrap();
    fs::create_dir_all(root.path().join(".git")).unwrap();
    fs::write(root.path().join("NOTES.md"), "not a template").unwrap();
    root
}

#[test]
fn substitution_replaces_name_and_parameters() {
    let params = params(&[("port", "8080")]);
    let out = substitute("{{muppet_name}}:{{port}} {{unknown}}", "svc", &params);
    assert_eq!(out, "svc:8080 {{unknown}}");
}

#[tokio::test]
async fn lists_template_directories_only() {
    let root = template_root();
    let renderer = FsTemplateRenderer::new(root.path());
    assert_eq!(renderer.list_templates().await.unwrap(), vec!["java-micronaut", "node-express"]);
}

#[tokio::test]
async fn generate_renders_contents_and_paths() {
    let root = template_root();
    let out = tempfile::tempdir().unwrap();
    let renderer = FsTemplateRenderer::new(root.path());

    let generated = renderer
        .generate("java-micronaut", "billing", &params(&[("port", "3000")]), out.path())
        .await
        .unwrap();

    assert_eq!(generated, out.path().join("billing"));
    let readme = fs::read_to_string(generated.join("README.md")).unwrap();
    assert_eq!(readme, "# billing on port 3000\n");
    assert!(generated.join("src/billing/App.java").exists());
    let logo = fs::read(generated.join("logo.png")).unwrap();
    assert_eq!(logo, vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe]);
}

#[tokio::test]
async fn generate_rejects_unknown_template() {
    let root = template_root();
    let out = tempfile::tempdir().unwrap();
    let renderer = FsTemplateRenderer::new(root.path());
    let err = renderer.generate("cobol", "svc", &BTreeMap::new(), out.path()).await.unwrap_err();
    assert!(matches!(err, TemplateError::UnknownTemplate(ref t) if t == "cobol"));
    let platform: PlatformError = err.into();
    assert_eq!(platform.status_code(), 400);
}

#[tokio::test]
async fn collect_files_separates_text_and_binary() {
    let root = template_root();
    let files = collect_files(&root.path().join("java-micronaut")).await.unwrap();

    assert_eq!(
        files.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["README.md", "logo.png", "src/{{muppet_name}}/App.java"]
    );
    assert!(matches!(files["README.md"], FileContent::Text(_)));
    assert!(matches!(files["logo.png"], FileContent::Binary(_)));
    assert_eq!(files["logo.png"].as_bytes().len(), 6);
}

#[tokio::test]
async fn fake_renderer_writes_real_files() {
    let out = tempfile::tempdir().unwrap();
    let renderer = FakeTemplateRenderer::new();
    let root =
        renderer.generate("java-micronaut", "svc", &BTreeMap::new(), out.path()).await.unwrap();
    let files = collect_files(&root).await.unwrap();
    assert_eq!(files["README.md"], FileContent::Text("# svc\n".to_string()));
    assert_eq!(renderer.generated(), vec![("java-micronaut".to_string(), "svc".to_string())]);
}
