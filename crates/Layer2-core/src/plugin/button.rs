//! UI Button Factory - 플러그인 버튼 생성
//!
//! 같은 id 의 버튼은 한 번만 만들어집니다. 핸들러는 이벤트 시점에
//! 레지스트리에서 플러그인을 찾아 명령을 실행합니다.

use super::registry::PluginRegistry;
use super::traits::Command;
use crate::ui::{Element, UiEventKind, UiTree};
use loom_foundation::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// 아이콘 기본값
pub const DEFAULT_ICON: &str = "cog";

// ============================================================================
// ButtonDescriptor
// ============================================================================

/// 버튼 선언
#[derive(Debug, Clone, Default)]
pub struct ButtonDescriptor {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub on_click: Option<Command>,
    pub on_pointer_down: Option<Command>,
    pub on_double_click: Option<Command>,
    /// 부착할 컨테이너 id
    pub attach_to: String,
    pub class_name: Option<String>,
    pub title: Option<String>,
    pub id: Option<String>,
}

impl ButtonDescriptor {
    pub fn new(attach_to: impl Into<String>) -> Self {
        Self {
            attach_to: attach_to.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn on_click(mut self, command: Command) -> Self {
        self.on_click = Some(command);
        self
    }

    pub fn on_pointer_down(mut self, command: Command) -> Self {
        self.on_pointer_down = Some(command);
        self
    }

    pub fn on_double_click(mut self, command: Command) -> Self {
        self.on_double_click = Some(command);
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 실제 요소 id: id → name → title → icon
    pub fn effective_id(&self) -> Option<&str> {
        [&self.id, &self.name, &self.title, &self.icon]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// 선언된 핸들러 (종류, 명령)
    pub fn handlers(&self) -> Vec<(UiEventKind, Command)> {
        [
            (UiEventKind::Click, self.on_click),
            (UiEventKind::PointerDown, self.on_pointer_down),
            (UiEventKind::DoubleClick, self.on_double_click),
        ]
        .into_iter()
        .filter_map(|(kind, command)| command.map(|c| (kind, c)))
        .collect()
    }

    /// 등록 전 검증
    pub fn validate(&self) -> Result<()> {
        if self.attach_to.trim().is_empty() {
            return Err(Error::Validation(
                "Button attach_to must not be empty".to_string(),
            ));
        }
        if self.effective_id().is_none() {
            return Err(Error::Validation(
                "Button needs one of id, name, title or icon".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// UiButtonFactory
// ============================================================================

/// 버튼 팩토리
pub struct UiButtonFactory {
    ui: Arc<UiTree>,
    registry: Arc<PluginRegistry>,
}

impl UiButtonFactory {
    pub fn new(ui: Arc<UiTree>, registry: Arc<PluginRegistry>) -> Self {
        Self { ui, registry }
    }

    /// 버튼 생성
    ///
    /// 같은 id 의 요소가 이미 있으면 아무것도 하지 않고 `Ok(None)`.
    /// 컨테이너가 없으면 `Error::MissingElement`.
    pub fn create_button(
        &self,
        plugin_name: &str,
        descriptor: &ButtonDescriptor,
    ) -> Result<Option<String>> {
        descriptor.validate()?;

        let id = descriptor
            .effective_id()
            .map(str::to_string)
            .unwrap_or_default();

        if self.ui.contains(&id) {
            debug!(plugin = plugin_name, id = %id, "Button already exists, skipping");
            return Ok(None);
        }

        let button = self.build(plugin_name, &id, descriptor);
        self.ui.append_child(&descriptor.attach_to, button)?;

        info!(
            plugin = plugin_name,
            id = %id,
            container = %descriptor.attach_to,
            "Created plugin button"
        );
        Ok(Some(id))
    }

    fn build(&self, plugin_name: &str, id: &str, descriptor: &ButtonDescriptor) -> Element {
        let icon = descriptor.icon.as_deref().unwrap_or(DEFAULT_ICON);
        let class = match descriptor.class_name.as_deref() {
            Some(extra) if !extra.is_empty() => format!("item {}", extra),
            _ => "item".to_string(),
        };

        let item = Element::new("span")
            .with_class(class)
            .with_attr("title", descriptor.title.clone().unwrap_or_default())
            .with_child(
                Element::new("svg")
                    .with_class(format!(
                        "icon menu-icon icon-file-{} icon-lg icon-fw",
                        icon
                    ))
                    .with_attr("data-icon", format!("icon-{}", icon)),
            )
            .with_child(Element::new("span").with_class("hide-when-narrow"))
            .with_text(descriptor.name.clone().unwrap_or_default());

        let mut button = Element::new("span").with_id(id).with_child(item);

        for (kind, command) in descriptor.handlers() {
            let registry = Arc::clone(&self.registry);
            let plugin = plugin_name.to_string();
            button = button.on(kind, move |event| registry.invoke(&plugin, command, event));
        }

        button
    }
}
