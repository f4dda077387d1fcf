//! Single-value schema coercion, including file-setting resolution.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ParseError, Result};
use crate::model::records::AdapterTarget;
use crate::model::sentinels::is_unchanged;
use crate::model::settings::{CoercedValue, FileRef, SettingSchema, SettingType};
use crate::validation::config::ConfigParser;
use crate::validation::convert::{value_to_bool, value_to_int, value_to_string_list};
use crate::validation::upload::FileUploader;

/// Non-empty string under `key`.
fn truthy_str<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl<'a> ConfigParser<'a> {
    /// Validate and convert one value against its schema.
    ///
    /// The UNCHANGED marker bypasses every check. The enum check runs
    /// before type dispatch.
    pub fn check_value(
        &self,
        name: &str,
        value: &Value,
        schema: &SettingSchema,
    ) -> Result<CoercedValue> {
        if is_unchanged(value) {
            return Ok(CoercedValue::Unchanged);
        }

        if !schema.enum_values.is_empty() && !schema.enum_values.contains(value) {
            return Err(ParseError::SettingInvalidChoice {
                name: name.to_string(),
                value: value.clone(),
                choices: schema.enum_values.clone(),
                schema: Box::new(schema.clone()),
                origin: self.source.to_string(),
            });
        }

        let setting_type = match schema.setting_type() {
            Some(setting_type) => setting_type,
            None => {
                return Err(ParseError::SettingUnknownType {
                    name: name.to_string(),
                    value: value.clone(),
                    type_str: schema.type_str.clone(),
                    schema: Box::new(schema.clone()),
                    origin: self.source.to_string(),
                });
            }
        };

        let coerced = match setting_type {
            SettingType::File => return self.check_file(name, value, schema),
            SettingType::Bool => value_to_bool(value).map(CoercedValue::Bool),
            SettingType::Integer | SettingType::Number => {
                value_to_int(value).map(CoercedValue::Integer)
            }
            SettingType::Array => value_to_string_list(value).map(CoercedValue::Array),
            SettingType::String => value.as_str().map(|s| CoercedValue::String(s.to_string())),
        };

        coerced.ok_or_else(|| self.invalid_type(name, value, schema, setting_type.as_str()))
    }

    /// Resolve a file setting to a `{uuid, filename}` reference.
    ///
    /// First match wins: an existing reference, then a path upload, then a
    /// content upload.
    pub fn check_file(
        &self,
        name: &str,
        value: &Value,
        schema: &SettingSchema,
    ) -> Result<CoercedValue> {
        let file_info = match value {
            Value::String(path) => {
                let mut file_info = Map::new();
                file_info.insert("filepath".to_string(), Value::String(path.clone()));
                file_info
            }
            Value::Object(obj) => obj.clone(),
            _ => return Err(self.invalid_type(name, value, schema, "dict or str")),
        };

        let uuid = truthy_str(&file_info, "uuid");
        let filename = truthy_str(&file_info, "filename");
        let filepath = truthy_str(&file_info, "filepath");
        let filecontent = truthy_str(&file_info, "filecontent");
        let content_type = truthy_str(&file_info, "filecontent_type");

        if let (Some(uuid), Some(filename)) = (uuid, filename) {
            return Ok(CoercedValue::File(FileRef {
                uuid: uuid.to_string(),
                filename: filename.to_string(),
            }));
        }

        if let Some(filepath) = filepath {
            let (adapter, uploader) = self.upload_target(name)?;
            crate::log_info!(
                self.ctx,
                "FILE_UPLOAD_PATH",
                name = name,
                node = adapter.node_name,
                path = filepath,
            );
            let uploaded = uploader
                .upload_path(name, adapter, Path::new(filepath), content_type)
                .map_err(|error| self.upload_failed(name, error))?;
            return Ok(CoercedValue::File(uploaded));
        }

        if let (Some(content), Some(filename)) = (filecontent, filename) {
            let (adapter, uploader) = self.upload_target(name)?;
            crate::log_info!(
                self.ctx,
                "FILE_UPLOAD_CONTENT",
                name = name,
                node = adapter.node_name,
                filename = filename,
                bytes = content.len(),
            );
            let uploaded = uploader
                .upload_content(name, adapter, filename, content.as_bytes(), content_type)
                .map_err(|error| self.upload_failed(name, error))?;
            return Ok(CoercedValue::File(uploaded));
        }

        Err(ParseError::SettingFileMissing {
            name: name.to_string(),
            value: Value::Object(file_info),
            schema: Box::new(schema.clone()),
            origin: self.source.to_string(),
        })
    }

    fn upload_target(&self, name: &str) -> Result<(&'a AdapterTarget, &'a dyn FileUploader)> {
        match (self.adapter, self.uploader) {
            (Some(adapter), Some(uploader)) => Ok((adapter, uploader)),
            _ => Err(ParseError::UploadUnavailable {
                name: name.to_string(),
                origin: self.source.to_string(),
            }),
        }
    }

    fn upload_failed(&self, name: &str, error: crate::error::UploadError) -> ParseError {
        crate::log_warn!(self.ctx, "FILE_UPLOAD_FAILED", name = name, error = error.to_string());
        ParseError::Upload {
            name: name.to_string(),
            error,
            origin: self.source.to_string(),
        }
    }

    fn invalid_type(
        &self,
        name: &str,
        value: &Value,
        schema: &SettingSchema,
        expected: &str,
    ) -> ParseError {
        ParseError::SettingInvalidType {
            name: name.to_string(),
            value: value.clone(),
            expected: expected.to_string(),
            schema: Box::new(schema.clone()),
            origin: self.source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sentinels::unchanged_value;
    use crate::validation::upload::testing::{
        target, FailingUploader, RecordingUploader, UploadCall,
    };
    use serde_json::json;

    fn check(value: Value, schema: &SettingSchema) -> Result<CoercedValue> {
        ConfigParser::new("test").check_value(&schema.name, &value, schema)
    }

    fn strings(items: &[&str]) -> CoercedValue {
        CoercedValue::Array(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_unchanged_bypasses_checks() {
        let schema = SettingSchema::new("password", "integer").with_enum(vec![json!(1)]);
        assert_eq!(check(unchanged_value(), &schema).unwrap(), CoercedValue::Unchanged);

        let unknown = SettingSchema::new("password", "badwolf");
        assert_eq!(check(unchanged_value(), &unknown).unwrap(), CoercedValue::Unchanged);
    }

    #[test]
    fn test_enum() {
        let schema = SettingSchema::new("test1", "string").with_enum(vec![json!("test1")]);
        assert_eq!(
            check(json!("test1"), &schema).unwrap(),
            CoercedValue::String("test1".to_string())
        );
        match check(json!("badwolf"), &schema).unwrap_err() {
            ParseError::SettingInvalidChoice { value, choices, .. } => {
                assert_eq!(value, json!("badwolf"));
                assert_eq!(choices, vec![json!("test1")]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_enum_checked_before_unknown_type() {
        let schema = SettingSchema::new("x", "badwolf").with_enum(vec![json!("a")]);
        assert!(matches!(
            check(json!("b"), &schema),
            Err(ParseError::SettingInvalidChoice { .. })
        ));
    }

    #[test]
    fn test_string() {
        let schema = SettingSchema::new("test1", "string");
        assert_eq!(
            check(json!("test1"), &schema).unwrap(),
            CoercedValue::String("test1".to_string())
        );
        assert!(matches!(
            check(json!(true), &schema),
            Err(ParseError::SettingInvalidType { .. })
        ));
    }

    #[test]
    fn test_number_and_integer() {
        for type_str in ["number", "integer"] {
            let schema = SettingSchema::new("test1", type_str);
            assert_eq!(check(json!("2"), &schema).unwrap(), CoercedValue::Integer(2));
            assert_eq!(check(json!(7), &schema).unwrap(), CoercedValue::Integer(7));
            match check(json!("two"), &schema).unwrap_err() {
                ParseError::SettingInvalidType { expected, .. } => assert_eq!(expected, type_str),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_bool() {
        let schema = SettingSchema::new("test1", "bool");
        assert_eq!(check(json!(false), &schema).unwrap(), CoercedValue::Bool(false));
        assert_eq!(check(json!("True"), &schema).unwrap(), CoercedValue::Bool(true));
        assert_eq!(check(json!(0), &schema).unwrap(), CoercedValue::Bool(false));
        assert!(matches!(
            check(json!("perhaps"), &schema),
            Err(ParseError::SettingInvalidType { .. })
        ));
    }

    #[test]
    fn test_array() {
        let schema = SettingSchema::new("test1", "array");
        assert_eq!(check(json!("a,b,c"), &schema).unwrap(), strings(&["a", "b", "c"]));
        assert_eq!(
            check(json!("test1, test2 ,test3"), &schema).unwrap(),
            strings(&["test1", "test2", "test3"])
        );
        assert_eq!(check(json!(["a", "b"]), &schema).unwrap(), strings(&["a", "b"]));
        assert!(matches!(
            check(json!([true]), &schema),
            Err(ParseError::SettingInvalidType { .. })
        ));
    }

    #[test]
    fn test_unknown_type() {
        let schema = SettingSchema::new("test1", "badwolf");
        match check(json!("a"), &schema).unwrap_err() {
            ParseError::SettingUnknownType { type_str, .. } => assert_eq!(type_str, "badwolf"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_file_badtype() {
        let schema = SettingSchema::new("test1", "file");
        match check(json!(["X"]), &schema).unwrap_err() {
            ParseError::SettingInvalidType { expected, .. } => assert_eq!(expected, "dict or str"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_file_missing() {
        let schema = SettingSchema::new("test1", "file");
        assert!(matches!(
            check(json!({}), &schema),
            Err(ParseError::SettingFileMissing { .. })
        ));
        assert!(matches!(
            check(json!({"filename": "only-a-name.csv"}), &schema),
            Err(ParseError::SettingFileMissing { .. })
        ));
        assert!(matches!(
            check(json!(""), &schema),
            Err(ParseError::SettingFileMissing { .. })
        ));
    }

    #[test]
    fn test_file_uuid_passthrough_skips_upload() {
        let schema = SettingSchema::new("test1", "file");
        let adapter = target();
        let uploader = RecordingUploader::default();
        let parser = ConfigParser::new("test")
            .with_adapter(&adapter)
            .with_uploader(&uploader);

        let value = json!({"uuid": "x", "filename": "y", "filecontent": "ignored", "ignore": "me"});
        let coerced = parser.check_value("test1", &value, &schema).unwrap();

        assert_eq!(
            coerced,
            CoercedValue::File(FileRef {
                uuid: "x".to_string(),
                filename: "y".to_string(),
            })
        );
        assert!(uploader.calls.borrow().is_empty());
    }

    #[test]
    fn test_filepath_str_and_object() {
        let schema = SettingSchema::new("test1", "file");
        let adapter = target();
        let uploader = RecordingUploader::default();
        let parser = ConfigParser::new("test")
            .with_adapter(&adapter)
            .with_uploader(&uploader);

        let from_str = parser
            .check_value("test1", &json!("/data/badwolf.csv"), &schema)
            .unwrap();
        let from_obj = parser
            .check_value(
                "test1",
                &json!({"filepath": "/data/badwolf.csv", "filecontent_type": "text/csv"}),
                &schema,
            )
            .unwrap();

        let expected = CoercedValue::File(FileRef {
            uuid: "uploaded-path".to_string(),
            filename: "badwolf.csv".to_string(),
        });
        assert_eq!(from_str, expected);
        assert_eq!(from_obj, expected);

        let calls = uploader.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            UploadCall::Path {
                field: "test1".to_string(),
                node_id: "node-1".to_string(),
                path: "/data/badwolf.csv".to_string(),
                content_type: Some("text/csv".to_string()),
            }
        );
    }

    #[test]
    fn test_filecontent() {
        let schema = SettingSchema::new("test1", "file");
        let adapter = target();
        let uploader = RecordingUploader::default();
        let parser = ConfigParser::new("test")
            .with_adapter(&adapter)
            .with_uploader(&uploader);

        let coerced = parser
            .check_value(
                "test1",
                &json!({"filename": "badwolf.csv", "filecontent": "mac_address,field1\r\n"}),
                &schema,
            )
            .unwrap();

        assert_eq!(
            coerced,
            CoercedValue::File(FileRef {
                uuid: "uploaded-content".to_string(),
                filename: "badwolf.csv".to_string(),
            })
        );
        match &uploader.calls.borrow()[0] {
            UploadCall::Content { name, content, .. } => {
                assert_eq!(name, "badwolf.csv");
                assert_eq!(content.as_slice(), b"mac_address,field1\r\n");
            }
            other => panic!("unexpected call {:?}", other),
        };
    }

    #[test]
    fn test_filepath_wins_over_content() {
        let schema = SettingSchema::new("test1", "file");
        let adapter = target();
        let uploader = RecordingUploader::default();
        let parser = ConfigParser::new("test")
            .with_adapter(&adapter)
            .with_uploader(&uploader);

        parser
            .check_value(
                "test1",
                &json!({"filepath": "/a.csv", "filename": "b.csv", "filecontent": "x"}),
                &schema,
            )
            .unwrap();
        assert!(matches!(uploader.calls.borrow()[0], UploadCall::Path { .. }));
    }

    #[test]
    fn test_upload_without_uploader() {
        let schema = SettingSchema::new("test1", "file");
        assert!(matches!(
            check(json!("/data/badwolf.csv"), &schema),
            Err(ParseError::UploadUnavailable { .. })
        ));
    }

    #[test]
    fn test_upload_failure_propagates() {
        let schema = SettingSchema::new("test1", "file");
        let adapter = target();
        let parser = ConfigParser::new("test")
            .with_adapter(&adapter)
            .with_uploader(&FailingUploader);

        match parser.check_value("test1", &json!("/x.csv"), &schema).unwrap_err() {
            ParseError::Upload { name, error, .. } => {
                assert_eq!(name, "test1");
                assert!(error.to_string().contains("connection reset"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
