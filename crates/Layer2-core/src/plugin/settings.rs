//! Settings Registrar - 플러그인 설정 항목
//!
//! 플러그인은 선택지가 정해진 설정 하나를 선언할 수 있습니다.
//! 값은 영속 저장소에 연결된 셀에 들어 있고, 설정 패널이 열릴 때마다
//! 컨트롤이 처음부터 다시 만들어집니다.

use crate::ui::{Element, UiEvent, UiEventKind, UiTree};
use indexmap::IndexMap;
use loom_foundation::{
    Error, LifecycleEvent, LifecycleEventBus, ListenerId, ReactiveCell, Result, SettingsStorage,
    SubscriptionId,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// SettingsColumn
// ============================================================================

/// 설정 패널 컬럼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SettingsColumn {
    #[default]
    A,
    B,
    C,
}

impl SettingsColumn {
    pub fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }

    /// 컨테이너 요소 id (`settingsColumnA` ...)
    pub fn container_id(&self) -> String {
        format!("settingsColumn{}", self.letter())
    }

    /// 모든 컬럼의 컨테이너 id
    pub fn container_ids() -> Vec<String> {
        [Self::A, Self::B, Self::C]
            .iter()
            .map(SettingsColumn::container_id)
            .collect()
    }
}

impl std::str::FromStr for SettingsColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            other => Err(Error::Validation(format!(
                "Unknown settings column: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// SettingsItem - 설정 항목 선언
// ============================================================================

/// 설정 선택지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsOption {
    pub id: String,
    pub name: String,
}

impl SettingsOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// 설정 항목 선언
#[derive(Debug, Clone)]
pub struct SettingsItem {
    /// 표시 제목
    pub title: String,

    /// 영속 저장 키 (고유)
    pub value_key: String,

    /// 저장된 값이 없을 때 기본값
    pub default_value: String,

    /// 선택지 목록 키
    pub options_key: String,

    /// 선택지 (순서 유지)
    pub options: Vec<SettingsOption>,

    /// setter 가 공개될 이름
    pub setter_key: String,

    /// 배치 컬럼 (없으면 호스트 기본값)
    pub settings_column: Option<SettingsColumn>,
}

impl SettingsItem {
    /// 새 설정 항목
    ///
    /// `options_key`/`setter_key` 기본값은 `<value_key>Options`/`set<value_key>`.
    pub fn new(title: impl Into<String>, value_key: impl Into<String>) -> Self {
        let value_key = value_key.into();
        Self {
            title: title.into(),
            options_key: format!("{}Options", value_key),
            setter_key: format!("set{}", value_key),
            value_key,
            default_value: String::new(),
            options: Vec::new(),
            settings_column: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn options_key(mut self, key: impl Into<String>) -> Self {
        self.options_key = key.into();
        self
    }

    pub fn option(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.options.push(SettingsOption::new(id, name));
        self
    }

    pub fn options(mut self, options: Vec<SettingsOption>) -> Self {
        self.options = options;
        self
    }

    pub fn setter_key(mut self, key: impl Into<String>) -> Self {
        self.setter_key = key.into();
        self
    }

    pub fn column(mut self, column: SettingsColumn) -> Self {
        self.settings_column = Some(column);
        self
    }

    /// 등록 전 검증
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("value_key", &self.value_key),
            ("options_key", &self.options_key),
            ("setter_key", &self.setter_key),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "Settings item {} must not be empty",
                    field
                )));
            }
        }

        if self.options.is_empty() {
            return Err(Error::Validation(format!(
                "Settings item {} has no options",
                self.value_key
            )));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(Error::Validation(format!(
                    "Settings item {} has duplicate option id {}",
                    self.value_key, option.id
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Setter
// ============================================================================

/// setter 입력
#[derive(Debug, Clone)]
pub enum SetterInput {
    /// 명시적 값
    Value(String),
    /// UI change 이벤트 (이벤트 값 사용)
    Event(UiEvent),
}

/// 호스트에 공개되는 setter
#[derive(Debug, Clone)]
pub struct SettingSetter {
    value_key: String,
    cell: ReactiveCell<String>,
}

impl SettingSetter {
    pub fn value_key(&self) -> &str {
        &self.value_key
    }

    /// 새 값 설정
    pub fn set(&self, input: SetterInput) -> Result<()> {
        let value = match input {
            SetterInput::Value(value) => value,
            SetterInput::Event(event) => event.value.ok_or_else(|| {
                Error::InvalidInput(format!("{} event on {} carries no value", event.kind, event.target))
            })?,
        };

        debug!(key = %self.value_key, value = %value, "Setting value");
        self.cell.set(value);
        Ok(())
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.cell.set(value.into());
    }
}

/// 등록된 설정 핸들
#[derive(Debug, Clone)]
pub struct SettingHandle {
    value_key: String,
    cell: ReactiveCell<String>,
    setter: SettingSetter,
}

impl SettingHandle {
    pub fn value_key(&self) -> &str {
        &self.value_key
    }

    /// 현재 값
    pub fn get(&self) -> String {
        self.cell.get()
    }

    pub fn setter(&self) -> &SettingSetter {
        &self.setter
    }

    /// 값 변경 구독
    pub fn subscribe(&self, listener: impl Fn(&String) + Send + Sync + 'static) -> SubscriptionId {
        self.cell.subscribe(listener)
    }
}

// ============================================================================
// SettingsRegistrar
// ============================================================================

struct SettingsEntry {
    item: SettingsItem,
    column: SettingsColumn,
    cell: ReactiveCell<String>,
    persist: SubscriptionId,
}

#[derive(Default)]
struct RegistrarState {
    /// value_key -> 항목 (등록 순서)
    entries: IndexMap<String, SettingsEntry>,
    /// options_key -> 선택지
    options: HashMap<String, Vec<SettingsOption>>,
    /// setter_key -> setter
    setters: HashMap<String, SettingSetter>,
}

impl RegistrarState {
    /// 대체된 항목의 options/setter 키 정리
    ///
    /// 남은 항목이 같은 키를 쓰고 있으면 그대로 둡니다. setter 는 남은 항목 중
    /// 마지막 것으로 다시 연결합니다.
    fn release_keys(&mut self, removed: &SettingsItem) {
        let options_in_use = self
            .entries
            .values()
            .any(|entry| entry.item.options_key == removed.options_key);
        if !options_in_use {
            self.options.remove(&removed.options_key);
        }

        let owned = self
            .setters
            .get(&removed.setter_key)
            .is_some_and(|setter| setter.value_key == removed.value_key);
        if !owned {
            return;
        }

        let successor = self
            .entries
            .values()
            .rev()
            .find(|entry| entry.item.setter_key == removed.setter_key)
            .map(|entry| SettingSetter {
                value_key: entry.item.value_key.clone(),
                cell: entry.cell.clone(),
            });
        match successor {
            Some(setter) => {
                self.setters.insert(removed.setter_key.clone(), setter);
            }
            None => {
                self.setters.remove(&removed.setter_key);
            }
        }
    }
}

/// 설정 등록기
pub struct SettingsRegistrar {
    storage: Arc<dyn SettingsStorage>,
    ui: Arc<UiTree>,
    default_column: SettingsColumn,
    state: RwLock<RegistrarState>,
}

impl SettingsRegistrar {
    pub fn new(
        storage: Arc<dyn SettingsStorage>,
        ui: Arc<UiTree>,
        default_column: SettingsColumn,
    ) -> Self {
        Self {
            storage,
            ui,
            default_column,
            state: RwLock::new(RegistrarState::default()),
        }
    }

    /// `settingsOpened` 구독 (한 번만)
    pub fn attach(self: &Arc<Self>, bus: &LifecycleEventBus) -> ListenerId {
        let registrar = Arc::clone(self);
        bus.on_settings_opened(move |_: &LifecycleEvent| -> Result<()> {
            registrar.render_all()
        })
    }

    /// 설정 항목 등록
    ///
    /// 같은 `value_key` 로 다시 등록하면 이전 항목을 대체합니다.
    /// 값 셀은 그대로 이어받으므로 먼저 받은 `SettingHandle` 도 새 값을 봅니다.
    pub fn add_settings_item(&self, item: SettingsItem) -> Result<SettingHandle> {
        item.validate()?;

        let column = item.settings_column.unwrap_or(self.default_column);
        let initial = self
            .storage
            .get_item(&item.value_key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| item.default_value.clone());

        let previous = self.state.write().entries.shift_remove(&item.value_key);
        let (cell, previous_item) = match previous {
            Some(previous) => {
                debug!(key = %item.value_key, "Redefining settings item");
                previous.cell.unsubscribe(previous.persist);
                previous.cell.set(initial);
                (previous.cell, Some(previous.item))
            }
            None => (ReactiveCell::new(initial), None),
        };

        let persist = {
            let storage = Arc::clone(&self.storage);
            let key = item.value_key.clone();
            cell.subscribe(move |value: &String| {
                if let Err(e) = storage.set_item(&key, value) {
                    warn!(key = %key, "Failed to persist setting: {}", e);
                }
            })
        };

        let setter = SettingSetter {
            value_key: item.value_key.clone(),
            cell: cell.clone(),
        };

        let mut state = self.state.write();

        if let Some(previous_item) = &previous_item {
            state.release_keys(previous_item);
        }

        state
            .options
            .insert(item.options_key.clone(), item.options.clone());
        state
            .setters
            .insert(item.setter_key.clone(), setter.clone());

        info!(
            key = %item.value_key,
            column = column.letter(),
            "Registered settings item: {}", item.title
        );

        let handle = SettingHandle {
            value_key: item.value_key.clone(),
            cell: cell.clone(),
            setter,
        };

        state.entries.insert(
            item.value_key.clone(),
            SettingsEntry {
                item,
                column,
                cell,
                persist,
            },
        );

        Ok(handle)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 현재 값
    pub fn value(&self, value_key: &str) -> Option<String> {
        self.state
            .read()
            .entries
            .get(value_key)
            .map(|entry| entry.cell.get())
    }

    /// value_key 값 변경 구독
    pub fn subscribe(
        &self,
        value_key: &str,
        listener: impl Fn(&String) + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        let cell = self
            .state
            .read()
            .entries
            .get(value_key)
            .map(|entry| entry.cell.clone())
            .ok_or_else(|| Error::NotFound(format!("Setting {}", value_key)))?;
        Ok(cell.subscribe(listener))
    }

    /// setter_key 로 setter 조회
    pub fn setter(&self, setter_key: &str) -> Option<SettingSetter> {
        self.state.read().setters.get(setter_key).cloned()
    }

    /// setter_key 로 값 설정
    pub fn set(&self, setter_key: &str, input: SetterInput) -> Result<()> {
        let setter = self
            .setter(setter_key)
            .ok_or_else(|| Error::NotFound(format!("Setter {}", setter_key)))?;
        setter.set(input)
    }

    /// 선택지 목록
    pub fn options(&self, options_key: &str) -> Option<Vec<SettingsOption>> {
        self.state.read().options.get(options_key).cloned()
    }

    /// 선택지 교체 (다음 렌더링부터 반영)
    pub fn set_options(&self, options_key: &str, options: Vec<SettingsOption>) -> Result<()> {
        let mut state = self.state.write();
        let slot = state
            .options
            .get_mut(options_key)
            .ok_or_else(|| Error::NotFound(format!("Options {}", options_key)))?;
        *slot = options;
        Ok(())
    }

    /// 등록된 항목 수
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// 렌더된 컨트롤의 요소 id
    pub fn control_id(value_key: &str) -> String {
        format!("settings-{}", value_key)
    }

    /// 렌더된 select 의 요소 id
    pub fn select_id(value_key: &str) -> String {
        format!("settings-{}-select", value_key)
    }

    // ========================================================================
    // 렌더링
    // ========================================================================

    /// 모든 항목을 다시 렌더링
    ///
    /// 컬럼 컨테이너가 없는 항목은 실패로 모으고 나머지는 계속 렌더링합니다.
    pub fn render_all(&self) -> Result<()> {
        let controls: Vec<(SettingsColumn, String, Element)> = {
            let state = self.state.read();
            state
                .entries
                .values()
                .map(|entry| {
                    let options = state
                        .options
                        .get(&entry.item.options_key)
                        .cloned()
                        .unwrap_or_default();
                    let setter = state.setters.get(&entry.item.setter_key).cloned();
                    (
                        entry.column,
                        entry.item.value_key.clone(),
                        build_control(&entry.item, &options, &entry.cell.get(), setter),
                    )
                })
                .collect()
        };

        let mut failures = Vec::new();
        for (column, value_key, control) in controls {
            self.ui.remove(&Self::control_id(&value_key));
            if let Err(e) = self.ui.append_child(&column.container_id(), control) {
                failures.push(e);
            }
        }

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Error::dispatch("settingsOpened", failures)),
        }
    }
}

fn build_control(
    item: &SettingsItem,
    options: &[SettingsOption],
    current: &str,
    setter: Option<SettingSetter>,
) -> Element {
    let select_id = SettingsRegistrar::select_id(&item.value_key);

    let mut select = Element::new("select")
        .with_id(select_id.clone())
        .with_attr("data-options-key", item.options_key.clone());

    for option in options {
        let mut element = Element::new("option")
            .with_attr("value", option.id.clone())
            .with_text(option.name.clone());
        if option.id == current {
            element = element.with_attr("selected", "true");
        }
        select = select.with_child(element);
    }

    if let Some(setter) = setter {
        select = select.on(UiEventKind::Change, move |event| {
            setter.set(SetterInput::Event(event.clone()))
        });
    }

    Element::new("div")
        .with_id(SettingsRegistrar::control_id(&item.value_key))
        .with_class("settings-item")
        .with_child(
            Element::new("label")
                .with_class("settings-label")
                .with_attr("for", select_id)
                .with_text(item.title.clone()),
        )
        .with_child(
            Element::new("div")
                .with_class("settings-value markup")
                .with_child(select),
        )
}
