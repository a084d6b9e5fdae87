//! Subcommands: run, inspect

use crate::counter::Counter;
use anyhow::Context;
use loom_core::{
    Document, HostConfig, PluginHost, SetterInput, SettingsColumn, SettingsStorage, UiTree,
    TOOLBAR,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// `loom run` 옵션
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub document: PathBuf,
    pub open_settings: bool,
    pub clicks: Vec<String>,
    pub sets: Vec<(String, String)>,
    pub save: Option<PathBuf>,
}

/// `--set setter=value` 파싱
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((setter, value)) if !setter.trim().is_empty() => {
            Ok((setter.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected <setter>=<value>, got '{}'", raw)),
    }
}

/// 문서 파일 읽기
pub async fn read_document(path: &Path) -> anyhow::Result<Document> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let document = Document::from_json(&content)
        .with_context(|| format!("Failed to parse document {}", path.display()))?;
    Ok(document)
}

/// 문서 파일 쓰기
pub async fn write_document(path: &Path, document: &Document) -> anyhow::Result<()> {
    let content = document.to_json_pretty()?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write document {}", path.display()))?;
    Ok(())
}

/// 기본 레이아웃(툴바 + 설정 컬럼)으로 호스트 생성
pub fn build_host(
    config: HostConfig,
    settings: Arc<dyn SettingsStorage>,
) -> anyhow::Result<PluginHost> {
    let mut containers = SettingsColumn::container_ids();
    containers.push(TOOLBAR.to_string());

    let ui = Arc::new(UiTree::with_containers(containers));
    let host = PluginHost::new(config, ui, settings).context("Failed to create plugin host")?;
    Ok(host)
}

/// 문서를 열고 상호작용을 재생한 뒤 플러그인 저장소가 반영된 문서를 반환
pub async fn run(
    config: HostConfig,
    settings: Arc<dyn SettingsStorage>,
    options: &RunOptions,
) -> anyhow::Result<Document> {
    let mut document = read_document(&options.document).await?;
    let host = build_host(config, settings)?;

    let started = host.start(&[Counter::construct]);
    for e in &started.failures {
        warn!("Plugin failed to start: {}", e);
    }

    if let Some(header) = &document.header {
        host.load_document(header)?;
    } else {
        host.new_document();
    }
    host.application_ready();

    for (setter, value) in &options.sets {
        host.settings()
            .set(setter, SetterInput::Value(value.clone()))
            .with_context(|| format!("Failed to apply {}={}", setter, value))?;
    }

    if options.open_settings {
        host.open_settings();
        for column in SettingsColumn::container_ids() {
            if let Some(html) = host.ui().render_html(&column) {
                println!("{}", html);
            }
        }
    }

    for id in &options.clicks {
        if !host.click(id).with_context(|| format!("Click on {} failed", id))? {
            warn!("Element {} has no click handler", id);
        }
    }

    if document.header.is_some() || !host.storage().snapshot().is_empty() {
        host.save_document(document.header_mut());
    }

    if let Some(path) = &options.save {
        write_document(path, &document).await?;
        info!("Saved document to {}", path.display());
    }

    Ok(document)
}

/// 플러그인별 저장소 요약
pub fn describe_storage(document: &Document) -> anyhow::Result<String> {
    let storage = match &document.header {
        Some(header) => header.plugin_storage()?,
        None => None,
    };
    let storage = match storage {
        Some(storage) if !storage.is_empty() => storage,
        _ => return Ok("No plugin storage\n".to_string()),
    };

    let mut out = String::new();
    for (plugin, store) in storage.iter() {
        let _ = writeln!(out, "{} ({} keys)", plugin, store.len());
        for (key, value) in store.iter() {
            let _ = writeln!(out, "  {} = {}", key, value);
        }
    }
    Ok(out)
}

/// `loom inspect`
pub async fn inspect(path: &Path) -> anyhow::Result<()> {
    let document = read_document(path).await?;
    print!("{}", describe_storage(&document)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{BUTTON_ID, SETTER_KEY};
    use loom_core::MemorySettingsStorage;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("story.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("setCounterStep=5"),
            Ok(("setCounterStep".to_string(), "5".to_string()))
        );
        assert_eq!(
            parse_assignment("key=a=b"),
            Ok(("key".to_string(), "a=b".to_string()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[tokio::test]
    async fn test_run_persists_counter() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(
            &dir,
            r#"{"header":{"title":"Story","pluginStorage":{"Counter":{"count":3}}},"nodes":[]}"#,
        );
        let saved = dir.path().join("saved.json");

        let options = RunOptions {
            document: path,
            clicks: vec![BUTTON_ID.to_string(), BUTTON_ID.to_string()],
            sets: vec![(SETTER_KEY.to_string(), "5".to_string())],
            save: Some(saved.clone()),
            ..Default::default()
        };

        let document = run(
            HostConfig::default(),
            Arc::new(MemorySettingsStorage::new()),
            &options,
        )
        .await
        .unwrap();

        let header = document.header.as_ref().unwrap();
        let storage = header.plugin_storage().unwrap().unwrap();
        assert_eq!(storage.get("Counter").unwrap()["count"], 13);
        assert_eq!(header.get("title"), Some(&serde_json::json!("Story")));

        let keys: Vec<_> = header.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "pluginStorage"]);

        let reloaded = read_document(&saved).await.unwrap();
        assert_eq!(reloaded, document);
        assert!(describe_storage(&reloaded).unwrap().contains("count = 13"));
    }

    #[tokio::test]
    async fn test_run_without_interactions_leaves_header_alone() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, r#"{"header":{"title":"Plain"},"nodes":[]}"#);

        let options = RunOptions {
            document: path,
            ..Default::default()
        };
        let document = run(
            HostConfig::default(),
            Arc::new(MemorySettingsStorage::new()),
            &options,
        )
        .await
        .unwrap();

        assert!(!document.header.unwrap().has_plugin_storage());
    }

    #[tokio::test]
    async fn test_headerless_document_stays_headerless() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, r#"{"nodes":[]}"#);
        let saved = dir.path().join("saved.json");

        let options = RunOptions {
            document: path,
            open_settings: true,
            save: Some(saved.clone()),
            ..Default::default()
        };
        let document = run(
            HostConfig::default(),
            Arc::new(MemorySettingsStorage::new()),
            &options,
        )
        .await
        .unwrap();

        assert!(document.header.is_none());
        let written = std::fs::read_to_string(&saved).unwrap();
        assert!(!written.contains("header"));
    }

    #[tokio::test]
    async fn test_headerless_document_gains_header_when_storage_written() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir, r#"{"nodes":[]}"#);

        let options = RunOptions {
            document: path,
            clicks: vec![BUTTON_ID.to_string()],
            ..Default::default()
        };
        let document = run(
            HostConfig::default(),
            Arc::new(MemorySettingsStorage::new()),
            &options,
        )
        .await
        .unwrap();

        let storage = document.header.unwrap().plugin_storage().unwrap().unwrap();
        assert_eq!(storage.get("Counter").unwrap()["count"], 1);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let options = RunOptions {
            document: dir.path().join("missing.json"),
            ..Default::default()
        };

        let err = run(
            HostConfig::default(),
            Arc::new(MemorySettingsStorage::new()),
            &options,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read document"));
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(
            describe_storage(&Document::default()).unwrap(),
            "No plugin storage\n"
        );
    }
}
