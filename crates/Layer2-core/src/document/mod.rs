//! Document - 호스트 문서 헤더 모델
//!
//! 호스트 문서 본문(노드)은 다루지 않고, 플러그인 호스트가 읽고 쓰는
//! 헤더의 `pluginStorage` 필드만 타입으로 표현합니다.
//! 나머지 헤더 필드는 손대지 않고 그대로 보존합니다.

mod storage_map;

pub use storage_map::{PluginStorageMap, PluginStore};

use loom_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// DocumentHeader
// ============================================================================

/// 헤더 안의 플러그인 저장소 키
pub const PLUGIN_STORAGE_KEY: &str = "pluginStorage";

/// 문서 헤더
///
/// 헤더 전체를 키 순서가 보존되는 맵 하나로 들고 있고,
/// `pluginStorage` 는 키로 읽고 씁니다. 저장해도 다른 필드의 순서는 그대로입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHeader {
    fields: Map<String, Value>,
}

impl DocumentHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 라이프사이클 이벤트 payload 로부터 파싱
    ///
    /// `null` payload 는 헤더가 없는 문서로 취급합니다.
    /// `pluginStorage` 모양이 잘못되었으면 `Error::InvalidInput`.
    pub fn from_payload(payload: &Value) -> Result<Option<Self>> {
        if payload.is_null() {
            return Ok(None);
        }
        let header: Self = serde_json::from_value(payload.clone())
            .map_err(|e| Error::InvalidInput(format!("Invalid document header: {}", e)))?;
        header.plugin_storage()?;
        Ok(Some(header))
    }

    /// 이벤트 payload 로 변환
    pub fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// 헤더 필드 하나
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    // ========================================================================
    // pluginStorage
    // ========================================================================

    /// `pluginStorage` 필드가 있는지 (`null` 은 없음으로 취급)
    pub fn has_plugin_storage(&self) -> bool {
        self.fields
            .get(PLUGIN_STORAGE_KEY)
            .is_some_and(|v| !v.is_null())
    }

    /// `pluginStorage` 파싱
    pub fn plugin_storage(&self) -> Result<Option<PluginStorageMap>> {
        match self.fields.get(PLUGIN_STORAGE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                Error::InvalidInput(format!("Invalid {}: {}", PLUGIN_STORAGE_KEY, e))
            }),
        }
    }

    /// `pluginStorage` 기록
    ///
    /// 필드가 이미 있으면 같은 위치에서 교체하고, 없으면 맨 뒤에 추가합니다.
    pub fn set_plugin_storage(&mut self, storage: &PluginStorageMap) {
        self.fields
            .insert(PLUGIN_STORAGE_KEY.to_string(), storage.to_value());
    }
}

// ============================================================================
// Document
// ============================================================================

/// 문서 파일 (헤더 + 노드)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// 헤더 (없을 수 있음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<DocumentHeader>,

    /// 노드 목록 (불투명)
    #[serde(default)]
    pub nodes: Vec<Value>,
}

impl Document {
    /// JSON 문자열에서 파싱
    pub fn from_json(content: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(content)
            .map_err(|e| Error::InvalidInput(format!("Invalid document: {}", e)))?;
        if let Some(header) = &document.header {
            header.plugin_storage()?;
        }
        Ok(document)
    }

    /// JSON 문자열로 직렬화
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 헤더 (없으면 생성)
    pub fn header_mut(&mut self) -> &mut DocumentHeader {
        self.header.get_or_insert_with(DocumentHeader::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plugin_storage_round_trips_byte_for_byte() {
        let raw = r#"{"pluginStorage":{"Runner":{"zeta":1,"alpha":[true,null]},"VarStore":{"b":"x","a":{"n":2}}},"title":"story"}"#;

        let header: DocumentHeader = serde_json::from_str(raw).unwrap();
        let written = serde_json::to_string(&header).unwrap();

        assert_eq!(written, raw);
    }

    #[test]
    fn test_extra_fields_preserved() {
        let header: DocumentHeader =
            serde_json::from_value(json!({ "title": "story", "lastSavedUnix": 5 })).unwrap();

        assert!(header.plugin_storage().unwrap().is_none());
        assert!(!header.has_plugin_storage());
        assert_eq!(header.get("title"), Some(&json!("story")));

        let value = header.to_payload().unwrap();
        assert!(value.get("pluginStorage").is_none());
        assert_eq!(value["lastSavedUnix"], 5);
    }

    #[test]
    fn test_from_payload() {
        assert!(DocumentHeader::from_payload(&Value::Null).unwrap().is_none());

        let header = DocumentHeader::from_payload(&json!({ "pluginStorage": { "A": { "x": 1 } } }))
            .unwrap()
            .unwrap();
        let storage = header.plugin_storage().unwrap().unwrap();
        assert_eq!(storage.get("A").unwrap()["x"], 1);

        let err = DocumentHeader::from_payload(&json!({ "pluginStorage": [1, 2] })).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_writing_storage_keeps_key_order() {
        let raw = r#"{"title":"S","pluginStorage":{"A":{"x":1}},"lastSavedUnix":5}"#;
        let mut header: DocumentHeader = serde_json::from_str(raw).unwrap();

        let storage = header.plugin_storage().unwrap().unwrap();
        header.set_plugin_storage(&storage.with_entry("A", "x", json!(2)));

        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"title":"S","pluginStorage":{"A":{"x":2}},"lastSavedUnix":5}"#
        );
    }

    #[test]
    fn test_new_storage_field_is_appended() {
        let mut header: DocumentHeader = serde_json::from_value(json!({ "title": "S" })).unwrap();
        header.set_plugin_storage(&PluginStorageMap::new().with_entry("A", "x", json!(1)));

        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"title":"S","pluginStorage":{"A":{"x":1}}}"#
        );
    }

    #[test]
    fn test_invalid_storage_in_document() {
        let err = Document::from_json(r#"{ "header": { "pluginStorage": 3 } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_document_without_header() {
        let doc = Document::from_json(r#"{ "nodes": [{ "title": "Start" }] }"#).unwrap();
        assert!(doc.header.is_none());
        assert_eq!(doc.nodes.len(), 1);
    }
}
