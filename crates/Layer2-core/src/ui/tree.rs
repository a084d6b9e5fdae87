//! UiTree - 메모리 내 요소 트리
//!
//! 호스트 DOM 의 구조적 계약만 표현합니다: id 로 요소 찾기,
//! 컨테이너에 자식 붙이기, 요소에 붙은 핸들러로 상호작용 전달.

use super::event::{UiEvent, UiEventKind, UiHandler};
use loom_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Element
// ============================================================================

/// UI 요소
#[derive(Clone)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
    handlers: HashMap<UiEventKind, UiHandler>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            class_name: None,
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// 이벤트 핸들러 부착 (같은 종류는 교체)
    pub fn on(
        mut self,
        kind: UiEventKind,
        handler: impl Fn(&UiEvent) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(kind, Arc::new(handler));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_handler(&self, kind: UiEventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// 클래스 목록에 포함되는지
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name
            .as_deref()
            .map(|c| c.split_whitespace().any(|part| part == class))
            .unwrap_or(false)
    }

    /// 자손 중 태그가 같은 요소 (문서 순서)
    pub fn descendants_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_by_tag(self, tag, &mut found);
        found
    }

    /// 자신과 자손 전체 요소 수
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }

    /// 마크업 렌더링 (디버깅/출력용)
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }

    fn find(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn remove_descendant(&mut self, id: &str) -> Option<Element> {
        if let Some(pos) = self
            .children
            .iter()
            .position(|c| c.id.as_deref() == Some(id))
        {
            return Some(self.children.remove(pos));
        }
        self.children
            .iter_mut()
            .find_map(|c| c.remove_descendant(id))
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .field("attributes", &self.attributes)
            .field("text", &self.text)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("children", &self.children)
            .finish()
    }
}

fn collect_by_tag<'a>(element: &'a Element, tag: &str, found: &mut Vec<&'a Element>) {
    for child in &element.children {
        if child.tag == tag {
            found.push(child);
        }
        collect_by_tag(child, tag, found);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn write_html(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if let Some(id) = &element.id {
        out.push_str(&format!(" id=\"{}\"", escape(id)));
    }
    if let Some(class) = &element.class_name {
        out.push_str(&format!(" class=\"{}\"", escape(class)));
    }
    for (name, value) in &element.attributes {
        out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
    }
    out.push('>');
    if let Some(text) = &element.text {
        out.push_str(&escape(text));
    }
    for child in &element.children {
        write_html(child, out);
    }
    out.push_str(&format!("</{}>", element.tag));
}

// ============================================================================
// UiTree
// ============================================================================

/// 요소 트리
///
/// 핸들러는 잠금이 풀린 뒤 호출되므로 핸들러 안에서 트리를 다시 수정해도 됩니다.
pub struct UiTree {
    root: RwLock<Element>,
}

impl UiTree {
    /// 빈 트리 (루트 `body`)
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Element::new("body")),
        }
    }

    /// 루트 아래에 컨테이너들을 가진 트리
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tree = Self::new();
        {
            let mut root = tree.root.write();
            for id in ids {
                root.children.push(Element::new("div").with_id(id));
            }
        }
        tree
    }

    /// 루트 아래에 컨테이너 추가
    pub fn add_container(&self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        let mut root = self.root.write();
        if root.find(&id).is_some() {
            return Err(Error::Validation(format!("Element {} already exists", id)));
        }
        root.children.push(Element::new("div").with_id(id));
        Ok(())
    }

    /// id 로 요소 존재 여부
    pub fn contains(&self, id: &str) -> bool {
        self.root.read().find(id).is_some()
    }

    /// id 로 요소 조회 (복제본)
    pub fn element(&self, id: &str) -> Option<Element> {
        self.root.read().find(id).cloned()
    }

    /// 컨테이너에 자식 추가
    ///
    /// 컨테이너가 없으면 `Error::MissingElement`.
    pub fn append_child(&self, container_id: &str, element: Element) -> Result<()> {
        let mut root = self.root.write();
        let container = root
            .find_mut(container_id)
            .ok_or_else(|| Error::MissingElement(container_id.to_string()))?;

        trace!(
            container = container_id,
            tag = %element.tag,
            id = ?element.id,
            "Appending element"
        );
        container.children.push(element);
        Ok(())
    }

    /// id 로 요소 제거
    pub fn remove(&self, id: &str) -> Option<Element> {
        self.root.write().remove_descendant(id)
    }

    /// 컨테이너의 직계 자식 (복제본)
    pub fn children(&self, id: &str) -> Vec<Element> {
        self.root
            .read()
            .find(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    /// 전체 요소 수 (루트 포함)
    pub fn element_count(&self) -> usize {
        self.root.read().subtree_len()
    }

    /// 상호작용 전달
    ///
    /// 대상 요소에 해당 종류의 핸들러가 없으면 `Ok(false)`.
    pub fn dispatch(&self, event: &UiEvent) -> Result<bool> {
        let handler = {
            let root = self.root.read();
            let element = root
                .find(&event.target)
                .ok_or_else(|| Error::NotFound(format!("Element {}", event.target)))?;
            element.handlers.get(&event.kind).cloned()
        };

        match handler {
            Some(handler) => {
                debug!(element = %event.target, kind = %event.kind, "Dispatching UI event");
                handler(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 요소 마크업
    pub fn render_html(&self, id: &str) -> Option<String> {
        self.root.read().find(id).map(Element::to_html)
    }
}

impl Default for UiTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_append_and_find() {
        let tree = UiTree::with_containers(["toolbar"]);
        tree.append_child("toolbar", Element::new("span").with_id("run-btn"))
            .unwrap();

        assert!(tree.contains("run-btn"));
        assert_eq!(tree.children("toolbar").len(), 1);
        assert_eq!(tree.element_count(), 3);
    }

    #[test]
    fn test_append_to_missing_container() {
        let tree = UiTree::new();
        let err = tree
            .append_child("settingsColumnZ", Element::new("div"))
            .unwrap_err();

        assert!(matches!(err, Error::MissingElement(ref id) if id == "settingsColumnZ"));
    }

    #[test]
    fn test_add_container_twice() {
        let tree = UiTree::new();
        tree.add_container("toolbar").unwrap();
        assert!(tree.add_container("toolbar").is_err());
    }

    #[test]
    fn test_remove_nested() {
        let tree = UiTree::with_containers(["panel"]);
        tree.append_child(
            "panel",
            Element::new("div")
                .with_id("outer")
                .with_child(Element::new("span").with_id("inner")),
        )
        .unwrap();

        assert!(tree.remove("inner").is_some());
        assert!(!tree.contains("inner"));
        assert!(tree.contains("outer"));
        assert!(tree.remove("inner").is_none());
    }

    #[test]
    fn test_dispatch_calls_handler() {
        let tree = UiTree::with_containers(["toolbar"]);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        tree.append_child(
            "toolbar",
            Element::new("select")
                .with_id("pick")
                .on(UiEventKind::Change, move |e| {
                    s.lock().push(e.value.clone().unwrap_or_default());
                    Ok(())
                }),
        )
        .unwrap();

        assert!(tree.dispatch(&UiEvent::change("pick", "light")).unwrap());
        assert!(!tree.dispatch(&UiEvent::click("pick")).unwrap());
        assert!(tree.dispatch(&UiEvent::click("nope")).is_err());
        assert_eq!(*seen.lock(), vec!["light"]);
    }

    #[test]
    fn test_handler_may_modify_tree() {
        let tree = Arc::new(UiTree::with_containers(["toolbar"]));

        let inner = Arc::clone(&tree);
        tree.append_child(
            "toolbar",
            Element::new("span")
                .with_id("once")
                .on(UiEventKind::Click, move |_| {
                    inner.remove("once");
                    Ok(())
                }),
        )
        .unwrap();

        tree.dispatch(&UiEvent::click("once")).unwrap();
        assert!(!tree.contains("once"));
    }

    #[test]
    fn test_to_html_escapes() {
        let element = Element::new("span")
            .with_class("item")
            .with_attr("title", "a \"b\"")
            .with_text("<run>");

        assert_eq!(
            element.to_html(),
            r#"<span class="item" title="a &quot;b&quot;">&lt;run&gt;</span>"#
        );
    }
}
