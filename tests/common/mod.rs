//! Shared fixtures and test doubles for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use axonapi_core::{AdapterTarget, FileRef, FileUploader, UploadError};
use serde_json::Value;

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn load_fixture(name: &str) -> Value {
    let text = std::fs::read_to_string(fixture_path(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Upload {
    Path { field: String, adapter: String, path: String },
    Content { field: String, adapter: String, name: String, content: String },
}

/// Records every upload and answers with a deterministic reference.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    pub uploads: Mutex<Vec<Upload>>,
}

impl RecordingUploader {
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl FileUploader for RecordingUploader {
    fn upload_path(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        path: &Path,
        _content_type: Option<&str>,
    ) -> Result<FileRef, UploadError> {
        self.uploads.lock().unwrap().push(Upload::Path {
            field: field.to_string(),
            adapter: adapter.name_plugin.clone(),
            path: path.display().to_string(),
        });
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FileRef {
            uuid: format!("path-{}", field),
            filename,
        })
    }

    fn upload_content(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        name: &str,
        content: &[u8],
        _content_type: Option<&str>,
    ) -> Result<FileRef, UploadError> {
        self.uploads.lock().unwrap().push(Upload::Content {
            field: field.to_string(),
            adapter: adapter.name_plugin.clone(),
            name: name.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
        });
        Ok(FileRef {
            uuid: format!("content-{}", field),
            filename: name.to_string(),
        })
    }
}
