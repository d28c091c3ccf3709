//! In-memory browser for unit tests of waits and page objects

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::webdriver::{Browser, ElementRef, Rect};

type ClickHandler = Box<dyn FnMut(&mut FakeState) + Send>;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeElement {
    pub text: String,
    pub value: String,
    pub attributes: HashMap<String, String>,
    pub properties: HashMap<String, Value>,
    pub hidden: bool,
    pub disabled: bool,
    pub rect: Rect,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn prop(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.rect.width = width;
        self
    }
}

#[derive(Default)]
pub(crate) struct FakeState {
    pub url: String,
    next_id: usize,
    elements: HashMap<String, FakeElement>,
    roots: HashMap<Locator, Vec<String>>,
    children: HashMap<(String, Locator), Vec<String>>,
    hidden_polls: HashMap<Locator, usize>,
    pub local_storage: HashMap<String, String>,
    pub windows: Vec<String>,
    pub current_window: usize,
    pub log: Vec<String>,
}

impl FakeState {
    pub fn add(&mut self, locator: Locator, element: FakeElement) -> ElementRef {
        let id = self.insert(element);
        self.roots.entry(locator).or_default().push(id.clone());
        ElementRef(id)
    }

    pub fn add_child(&mut self, parent: &ElementRef, locator: Locator, element: FakeElement) -> ElementRef {
        let id = self.insert(element);
        self.children
            .entry((parent.0.clone(), locator))
            .or_default()
            .push(id.clone());
        ElementRef(id)
    }

    pub fn remove(&mut self, locator: &Locator) {
        if let Some(ids) = self.roots.remove(locator) {
            for id in ids {
                self.elements.remove(&id);
            }
        }
    }

    pub fn element_mut(&mut self, element: &ElementRef) -> Option<&mut FakeElement> {
        self.elements.get_mut(&element.0)
    }

    fn insert(&mut self, element: FakeElement) -> String {
        self.next_id += 1;
        let id = format!("el-{}", self.next_id);
        self.elements.insert(id.clone(), element);
        id
    }

    fn get(&self, element: &ElementRef) -> E2eResult<&FakeElement> {
        self.elements.get(&element.0).ok_or_else(|| E2eError::WebDriver {
            error: "stale element reference".to_string(),
            message: format!("{} is no longer attached", element.0),
        })
    }
}

pub(crate) struct FakeBrowser {
    state: Mutex<FakeState>,
    click_handlers: Mutex<HashMap<String, ClickHandler>>,
}

impl FakeBrowser {
    pub fn new(url: &str) -> Self {
        let state = FakeState {
            url: url.to_string(),
            windows: vec!["window-1".to_string()],
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            click_handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add(&self, locator: Locator, element: FakeElement) -> ElementRef {
        self.with_state(|s| s.add(locator, element))
    }

    pub fn add_child(&self, parent: &ElementRef, locator: Locator, element: FakeElement) -> ElementRef {
        self.with_state(|s| s.add_child(parent, locator, element))
    }

    /// Hide every match for `locator` from the next `polls` lookups.
    pub fn appear_after(&self, locator: Locator, polls: usize) {
        self.with_state(|s| {
            s.hidden_polls.insert(locator, polls);
        });
    }

    pub fn on_click(&self, element: &ElementRef, handler: impl FnMut(&mut FakeState) + Send + 'static) {
        self.click_handlers
            .lock()
            .unwrap()
            .insert(element.0.clone(), Box::new(handler));
    }

    pub fn value_of(&self, element: &ElementRef) -> String {
        self.with_state(|s| s.elements.get(&element.0).map(|e| e.value.clone()).unwrap_or_default())
    }

    pub fn log(&self) -> Vec<String> {
        self.with_state(|s| s.log.clone())
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.with_state(|s| {
            s.log.push(format!("goto {}", url));
            s.url = url.to_string();
        });
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.with_state(|s| s.url.clone()))
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.with_state(|s| s.log.push("refresh".to_string()));
        Ok(())
    }

    async fn back(&self) -> E2eResult<()> {
        self.with_state(|s| s.log.push("back".to_string()));
        Ok(())
    }

    async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        Ok(self.with_state(|s| {
            if let Some(remaining) = s.hidden_polls.get_mut(locator) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Vec::new();
                }
            }
            s.roots
                .get(locator)
                .map(|ids| ids.iter().map(|id| ElementRef(id.clone())).collect())
                .unwrap_or_default()
        }))
    }

    async fn find_child_elements(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> E2eResult<Vec<ElementRef>> {
        self.with_state(|s| {
            s.get(parent)?;
            Ok(s.children
                .get(&(parent.0.clone(), *locator))
                .map(|ids| ids.iter().map(|id| ElementRef(id.clone())).collect())
                .unwrap_or_default())
        })
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        self.with_state(|s| {
            s.get(element)?;
            s.log.push(format!("click {}", element.0));
            Ok::<_, E2eError>(())
        })?;
        let handler = self.click_handlers.lock().unwrap().remove(&element.0);
        if let Some(mut handler) = handler {
            self.with_state(|s| handler(s));
            self.click_handlers
                .lock()
                .unwrap()
                .insert(element.0.clone(), handler);
        }
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> E2eResult<()> {
        self.with_state(|s| s.log.push(format!("double_click {}", element.0)));
        self.click(element).await
    }

    async fn clear(&self, element: &ElementRef) -> E2eResult<()> {
        self.with_state(|s| {
            s.log.push(format!("clear {}", element.0));
            let el = s.elements.get_mut(&element.0).ok_or_else(|| E2eError::WebDriver {
                error: "stale element reference".to_string(),
                message: element.0.clone(),
            })?;
            el.value.clear();
            Ok(())
        })
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        self.with_state(|s| {
            s.log.push(format!("send_keys {} {:?}", element.0, text));
            let el = s.elements.get_mut(&element.0).ok_or_else(|| E2eError::WebDriver {
                error: "stale element reference".to_string(),
                message: element.0.clone(),
            })?;
            // Ctrl+A, Backspace
            if text == "\u{E009}a\u{E009}\u{E003}" {
                el.value.clear();
            } else {
                el.value.push_str(text);
            }
            Ok(())
        })
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        self.with_state(|s| Ok(s.get(element)?.text.clone()))
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        self.with_state(|s| {
            let el = s.get(element)?;
            if name == "value" {
                return Ok(Some(el.value.clone()));
            }
            Ok(el.attributes.get(name).cloned())
        })
    }

    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        self.with_state(|s| {
            let el = s.get(element)?;
            if name == "value" {
                return Ok(Value::String(el.value.clone()));
            }
            Ok(el.properties.get(name).cloned().unwrap_or(Value::Null))
        })
    }

    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        self.with_state(|s| Ok(!s.get(element)?.hidden))
    }

    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool> {
        self.with_state(|s| Ok(!s.get(element)?.disabled))
    }

    async fn rect(&self, element: &ElementRef) -> E2eResult<Rect> {
        self.with_state(|s| Ok(s.get(element)?.rect))
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        let key = args.first().and_then(Value::as_str).map(String::from);
        self.with_state(|s| {
            s.log.push(format!("execute {}", script));
            if script.contains("localStorage.getItem") {
                let key = key.unwrap_or_default();
                return Ok(s
                    .local_storage
                    .get(&key)
                    .map(|v| Value::String(v.clone()))
                    .unwrap_or(Value::Null));
            }
            if script.contains("localStorage.setItem") {
                let value = args.get(1).and_then(Value::as_str).unwrap_or_default();
                s.local_storage.insert(key.unwrap_or_default(), value.to_string());
            } else if script.contains("localStorage.removeItem") {
                s.local_storage.remove(&key.unwrap_or_default());
            } else if script.contains("localStorage.clear") {
                s.local_storage.clear();
            }
            Ok(Value::Null)
        })
    }

    async fn window_handle(&self) -> E2eResult<String> {
        Ok(self.with_state(|s| s.windows[s.current_window].clone()))
    }

    async fn window_handles(&self) -> E2eResult<Vec<String>> {
        Ok(self.with_state(|s| s.windows.clone()))
    }

    async fn switch_to_window(&self, handle: &str) -> E2eResult<()> {
        self.with_state(|s| match s.windows.iter().position(|w| w == handle) {
            Some(idx) => {
                s.current_window = idx;
                Ok(())
            }
            None => Err(E2eError::WebDriver {
                error: "no such window".to_string(),
                message: handle.to_string(),
            }),
        })
    }

    async fn new_window(&self) -> E2eResult<String> {
        Ok(self.with_state(|s| {
            let handle = format!("window-{}", s.windows.len() + 1);
            s.windows.push(handle.clone());
            handle
        }))
    }

    async fn close_window(&self) -> E2eResult<()> {
        self.with_state(|s| {
            let idx = s.current_window;
            s.windows.remove(idx);
            s.current_window = 0;
        });
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn quit(&self) -> E2eResult<()> {
        self.with_state(|s| s.log.push("quit".to_string()));
        Ok(())
    }
}
