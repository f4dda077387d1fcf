//! File upload collaborator.
//!
//! File-type settings are stored on the platform as `{uuid, filename}`
//! references. Turning a local path or in-memory content into one is the
//! transport's job; the parser only gets this capability injected.

use std::path::Path;

use crate::error::UploadError;
use crate::model::records::AdapterTarget;
use crate::model::settings::FileRef;

pub trait FileUploader {
    /// Upload the file at `path` for setting `field` of `adapter`.
    fn upload_path(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        path: &Path,
        content_type: Option<&str>,
    ) -> Result<FileRef, UploadError>;

    /// Upload in-memory `content` under file name `name`.
    fn upload_content(
        &self,
        field: &str,
        adapter: &AdapterTarget,
        name: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> Result<FileRef, UploadError>;
}
