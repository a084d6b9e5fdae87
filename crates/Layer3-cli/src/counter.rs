//! Counter - 데모 플러그인
//!
//! 툴바 버튼을 누를 때마다 문서별 저장소의 `count` 를 늘립니다.
//! 증가폭은 설정 항목(`counterStep`)으로 고릅니다.

use loom_core::{
    ButtonDescriptor, Capabilities, Command, Error, LifecycleEvent, Plugin, Result, ScopedStorage,
    SettingHandle, SettingsItem, UiEvent, TOOLBAR,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};

pub const INCREMENT: Command = Command::new("increment");
pub const RESET: Command = Command::new("reset");

/// 증가폭 setter 이름
pub const SETTER_KEY: &str = "setCounterStep";

/// 버튼 요소 id
pub const BUTTON_ID: &str = "counter-btn";

pub struct Counter {
    storage: ScopedStorage,
    step: SettingHandle,
}

impl Counter {
    pub const NAME: &'static str = "Counter";

    /// 플러그인 생성자
    pub fn construct(caps: &Capabilities) -> Result<Arc<dyn Plugin>> {
        caps.create_button(
            Self::NAME,
            &ButtonDescriptor::new(TOOLBAR)
                .id(BUTTON_ID)
                .name("Count")
                .icon("plus")
                .title("Increment the document counter")
                .on_click(INCREMENT)
                .on_double_click(RESET),
        )?;

        let step = caps.add_settings_item(
            SettingsItem::new("Counter step", "counterStep")
                .default_value("1")
                .setter_key(SETTER_KEY)
                .option("1", "One")
                .option("5", "Five")
                .option("10", "Ten"),
        )?;

        caps.on_document_loaded(|event: &LifecycleEvent| -> Result<()> {
            debug!(event_id = %event.id, "Counter saw document");
            Ok(())
        });
        caps.on_load(|_: &LifecycleEvent| -> Result<()> {
            info!("Counter ready");
            Ok(())
        });

        Ok(Arc::new(Self {
            storage: caps.storage(Self::NAME),
            step,
        }))
    }

    /// 현재 카운트
    pub fn count(&self) -> i64 {
        self.storage
            .get_key("count")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    fn step(&self) -> Result<i64> {
        let raw = self.step.get();
        raw.parse()
            .map_err(|_| Error::InvalidInput(format!("Counter step is not a number: {}", raw)))
    }
}

impl Plugin for Counter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn commands(&self) -> Vec<Command> {
        vec![INCREMENT, RESET]
    }

    fn invoke(&self, command: Command, event: &UiEvent) -> Result<()> {
        match command {
            INCREMENT => {
                let next = self.count() + self.step()?;
                self.storage.set("count", json!(next));
                self.storage.set("lastTarget", json!(event.target));
                debug!(count = next, "Counter incremented");
                Ok(())
            }
            RESET => {
                self.storage.set("count", json!(0));
                Ok(())
            }
            other => Err(Error::unknown_command(Self::NAME, other.name())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
