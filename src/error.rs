//! Error types.

use serde_json::Value;
use thiserror::Error;

use crate::model::settings::SettingSchema;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Failure reported by the file upload collaborator.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload transport failed: {0}")]
    Transport(String),

    #[error("upload response missing {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "{origin}: required setting {name:?} has no value and no default (schema: {schema:?})"
    )]
    SettingMissing {
        name: String,
        schema: Box<SettingSchema>,
        origin: String,
    },

    #[error("{origin}: invalid choice {value} for setting {name:?}, valid choices: {choices:?}")]
    SettingInvalidChoice {
        name: String,
        value: Value,
        choices: Vec<Value>,
        schema: Box<SettingSchema>,
        origin: String,
    },

    #[error("{origin}: invalid value {value} for setting {name:?}, must be {expected}")]
    SettingInvalidType {
        name: String,
        value: Value,
        expected: String,
        schema: Box<SettingSchema>,
        origin: String,
    },

    #[error("{origin}: setting {name:?} declares unknown type {type_str:?}")]
    SettingUnknownType {
        name: String,
        value: Value,
        type_str: String,
        schema: Box<SettingSchema>,
        origin: String,
    },

    #[error(
        "{origin}: file setting {name:?} needs uuid+filename, filepath, \
         or filecontent+filename, got {value}"
    )]
    SettingFileMissing {
        name: String,
        value: Value,
        schema: Box<SettingSchema>,
        origin: String,
    },

    #[error("{origin}: file setting {name:?} needs an upload but no adapter/uploader was given")]
    UploadUnavailable { name: String, origin: String },

    #[error("{origin}: upload for file setting {name:?} failed")]
    Upload {
        name: String,
        #[source]
        error: UploadError,
        origin: String,
    },

    #[error("{desc} {name:?} already exists, duplicate")]
    DuplicateDefinition { desc: String, name: String },

    #[error("{kind} not found: {value}")]
    ObjectNotFound { kind: String, value: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl ParseError {
    /// Setting name the error is about, when it concerns one.
    pub fn setting_name(&self) -> Option<&str> {
        match self {
            ParseError::SettingMissing { name, .. }
            | ParseError::SettingInvalidChoice { name, .. }
            | ParseError::SettingInvalidType { name, .. }
            | ParseError::SettingUnknownType { name, .. }
            | ParseError::SettingFileMissing { name, .. }
            | ParseError::UploadUnavailable { name, .. }
            | ParseError::Upload { name, .. } => Some(name),
            _ => None,
        }
    }
}
