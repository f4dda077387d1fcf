//! Settings-schema driven config parsing.
//!
//! Applies the coercer across a whole settings schema and a raw config
//! payload, producing a type-correct configuration or failing on the first
//! bad setting.

use serde_json::{Map, Value};

use crate::context::ParseContext;
use crate::error::{ParseError, Result};
use crate::logging::structured::{LogContext, REDACTED};
use crate::model::records::AdapterTarget;
use crate::model::sentinels::is_unchanged;
use crate::model::settings::{ResolvedConfig, SettingCatalog, SettingSchema};
use crate::validation::upload::FileUploader;

/// Validates raw config values against settings schemas.
///
/// `source` labels every error and log line. File settings that need an
/// upload require both an adapter and an uploader.
pub struct ConfigParser<'a> {
    pub(crate) source: &'a str,
    pub(crate) adapter: Option<&'a AdapterTarget>,
    pub(crate) uploader: Option<&'a dyn FileUploader>,
    pub(crate) ctx: LogContext,
}

impl<'a> ConfigParser<'a> {
    pub fn new(source: &'a str) -> Self {
        let ctx = ParseContext::new().log_context().with_source(source);
        Self {
            source,
            adapter: None,
            uploader: None,
            ctx,
        }
    }

    pub fn with_adapter(mut self, adapter: &'a AdapterTarget) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_uploader(mut self, uploader: &'a dyn FileUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Resolve every setting in `settings` from `raw`.
    ///
    /// Keys in `raw` that no setting declares are dropped.
    pub fn parse(
        &self,
        raw: &Map<String, Value>,
        settings: &SettingCatalog,
    ) -> Result<ResolvedConfig> {
        let mut resolved = ResolvedConfig::with_capacity(settings.len());

        for (name, schema) in settings.iter() {
            let supplied = raw.get(name);

            crate::log_debug!(
                self.ctx,
                "SETTING_PROCESS",
                name = name,
                required = schema.required,
                has_value = supplied.is_some(),
                has_default = schema.has_default(),
                value = supplied.map(|v| loggable(schema, v)),
            );

            let value = match (supplied, schema.default.as_ref()) {
                (Some(value), _) => value,
                (None, Some(default)) => {
                    crate::log_debug!(
                        self.ctx,
                        "SETTING_DEFAULT_APPLIED",
                        name = name,
                        default = loggable(schema, default),
                    );
                    default
                }
                (None, None) if !schema.required => continue,
                (None, None) => {
                    return Err(ParseError::SettingMissing {
                        name: name.to_string(),
                        schema: Box::new(schema.clone()),
                        origin: self.source.to_string(),
                    });
                }
            };

            let coerced = self.check_value(name, value, schema)?;
            resolved.insert(name.clone(), coerced);
        }

        let dropped: Vec<&str> = raw
            .keys()
            .map(String::as_str)
            .filter(|key| !settings.contains_key(*key))
            .collect();
        if !dropped.is_empty() {
            crate::log_debug!(self.ctx, "SETTING_UNKNOWN_KEYS_DROPPED", keys = dropped);
        }

        Ok(resolved)
    }
}

/// Value as it may appear in a log line.
pub(crate) fn loggable(schema: &SettingSchema, value: &Value) -> String {
    if is_unchanged(value) || schema.is_secret() {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// Resolve `raw` against `settings`. See [`ConfigParser::parse`].
pub fn parse_config(
    raw: &Map<String, Value>,
    settings: &SettingCatalog,
    source: &str,
    adapter: Option<&AdapterTarget>,
    uploader: Option<&dyn FileUploader>,
) -> Result<ResolvedConfig> {
    let mut parser = ConfigParser::new(source);
    if let Some(adapter) = adapter {
        parser = parser.with_adapter(adapter);
    }
    if let Some(uploader) = uploader {
        parser = parser.with_uploader(uploader);
    }
    parser.parse(raw, settings)
}
