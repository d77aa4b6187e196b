// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template rendering adapter.
//!
//! A template is a directory under the templates root. Rendering copies it
//! into `<output_dir>/<muppet_name>`, replacing `{{muppet_name}}` and
//! `{{<parameter>}}` tokens in UTF-8 file contents and in path components.
//! Binary files are copied untouched.

use async_trait::async_trait;
use muppet_core::PlatformError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("template I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template walk failed: {0}")]
    Walk(String),
}

impl TemplateError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TemplateError::Io { path: path.to_path_buf(), source }
    }
}

impl From<TemplateError> for PlatformError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::UnknownTemplate(ref name) => {
                let name = name.clone();
                PlatformError::validation(e.to_string()).with_detail("template", name)
            }
            other => PlatformError::internal(other.to_string()),
        }
    }
}

/// Content of one generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(s) => s.as_bytes(),
            FileContent::Binary(b) => b,
        }
    }
}

/// Relative path (always `/`-separated) to content
pub type FileMap = BTreeMap<String, FileContent>;

/// Adapter that scaffolds a muppet's source tree from a template
#[async_trait]
pub trait TemplateRenderer: Send + Sync + 'static {
    async fn list_templates(&self) -> Result<Vec<String>, TemplateError>;

    /// Render `template` for `muppet_name` and return the generated root.
    async fn generate(
        &self,
        template: &str,
        muppet_name: &str,
        parameters: &BTreeMap<String, String>,
        output_dir: &Path,
    ) -> Result<PathBuf, TemplateError>;
}

/// Replace `{{muppet_name}}` and `{{key}}` tokens.
pub fn substitute(text: &str, muppet_name: &str, parameters: &BTreeMap<String, String>) -> String {
    let mut out = text.replace("{{muppet_name}}", muppet_name);
    for (key, value) in parameters {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Read every file under `root` into memory.
pub async fn collect_files(root: &Path) -> Result<FileMap, TemplateError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || collect_files_blocking(&root))
        .await
        .map_err(|e| TemplateError::Walk(e.to_string()))?
}

fn collect_files_blocking(root: &Path) -> Result<FileMap, TemplateError> {
    let mut files = FileMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| TemplateError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = std::fs::read(entry.path()).map_err(|e| TemplateError::io(entry.path(), e))?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(e) => FileContent::Binary(e.into_bytes()),
        };
        files.insert(key, content);
    }
    Ok(files)
}

#[derive(Debug, Clone)]
pub struct FsTemplateRenderer {
    root: PathBuf,
}

impl FsTemplateRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn render_tree(
    source: &Path,
    dest: &Path,
    muppet_name: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<(), TemplateError> {
    std::fs::create_dir_all(dest).map_err(|e| TemplateError::io(dest, e))?;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| TemplateError::Walk(e.to_string()))?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(substitute(&rel.to_string_lossy(), muppet_name, parameters));
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| TemplateError::io(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TemplateError::io(parent, e))?;
        }
        let bytes = std::fs::read(entry.path()).map_err(|e| TemplateError::io(entry.path(), e))?;
        let rendered = match String::from_utf8(bytes) {
            Ok(text) => substitute(&text, muppet_name, parameters).into_bytes(),
            Err(e) => e.into_bytes(),
        };
        std::fs::write(&target, rendered).map_err(|e| TemplateError::io(&target, e))?;
    }
    Ok(())
}

#[async_trait]
impl TemplateRenderer for FsTemplateRenderer {
    async fn list_templates(&self) -> Result<Vec<String>, TemplateError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            let mut names = Vec::new();
            for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
                let entry = entry.map_err(|e| TemplateError::Walk(e.to_string()))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().is_dir() && !name.starts_with('.') {
                    names.push(name);
                }
            }
            names.sort();
            Ok(names)
        })
        .await
        .map_err(|e| TemplateError::Walk(e.to_string()))?
    }

    async fn generate(
        &self,
        template: &str,
        muppet_name: &str,
        parameters: &BTreeMap<String, String>,
        output_dir: &Path,
    ) -> Result<PathBuf, TemplateError> {
        let source = self.root.join(template);
        if !tokio::fs::metadata(&source).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(TemplateError::UnknownTemplate(template.to_string()));
        }
        let dest = output_dir.join(muppet_name);
        let (name, params, out) = (muppet_name.to_string(), parameters.clone(), dest.clone());
        tokio::task::spawn_blocking(move || render_tree(&source, &out, &name, &params))
            .await
            .map_err(|e| TemplateError::Walk(e.to_string()))??;
        tracing::info!(
            %template,
            muppet = %muppet_name,
            output = %dest.display(),
            "generated from template"
        );
        Ok(dest)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{substitute, TemplateError, TemplateRenderer};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    struct FakeTemplateState {
        templates: BTreeMap<String, BTreeMap<String, String>>,
        generated: Vec<(String, String)>,
        fail: bool,
    }

    /// In-memory templates for testing; `generate` writes real files.
    #[derive(Clone)]
    pub struct FakeTemplateRenderer {
        inner: Arc<Mutex<FakeTemplateState>>,
    }

    impl Default for FakeTemplateRenderer {
        fn default() -> Self {
            let renderer = Self {
                inner: Arc::new(Mutex::new(FakeTemplateState {
                    templates: BTreeMap::new(),
                    generated: Vec::new(),
                    fail: false,
                })),
            };
            renderer.add_template(
                "java-micronaut",
                &[
                    ("README.md", "# {{muppet_name}}\n"),
                    (".github/workflows/ci.yml", "name: {{muppet_name}} CI\n"),
                    (
                        "src/main/resources/application.yml",
                        "micronaut:\n  application:\n    name: {{muppet_name}}\n",
                    ),
                ],
            );
            renderer
        }
    }

    impl FakeTemplateRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_template(&self, name: &str, files: &[(&str, &str)]) {
            self.inner.lock().templates.insert(
                name.to_string(),
                files.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect(),
            );
        }

        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// Recorded `(template, muppet_name)` generations
        pub fn generated(&self) -> Vec<(String, String)> {
            self.inner.lock().generated.clone()
        }
    }

    #[async_trait]
    impl TemplateRenderer for FakeTemplateRenderer {
        async fn list_templates(&self) -> Result<Vec<String>, TemplateError> {
            Ok(self.inner.lock().templates.keys().cloned().collect())
        }

        async fn generate(
            &self,
            template: &str,
            muppet_name: &str,
            parameters: &BTreeMap<String, String>,
            output_dir: &Path,
        ) -> Result<PathBuf, TemplateError> {
            let files = {
                let mut state = self.inner.lock();
                state.generated.push((template.to_string(), muppet_name.to_string()));
                if state.fail {
                    return Err(TemplateError::Walk("injected failure".to_string()));
                }
                state
                    .templates
                    .get(template)
                    .cloned()
                    .ok_or_else(|| TemplateError::UnknownTemplate(template.to_string()))?
            };
            let dest = output_dir.join(muppet_name);
            for (path, content) in files {
                let target = dest.join(path);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| TemplateError::io(parent, e))?;
                }
                std::fs::write(&target, substitute(&content, muppet_name, parameters))
                    .map_err(|e| TemplateError::io(&target, e))?;
            }
            Ok(dest)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTemplateRenderer;

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
