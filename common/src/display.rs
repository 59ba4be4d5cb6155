use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    #[error("display element `{0}` is missing")]
    MissingTarget(String),
}

/// A display made of text elements addressed by a fixed identifier.
///
/// To be implemented for each app platform.
pub trait DisplaySurface {
    /// Replaces the text of `element_id`.
    ///
    /// Fails with [`DisplayError::MissingTarget`] if no such element exists.
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), DisplayError>;
}

/// Headless page holding a fixed set of elements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryPage {
    elements: BTreeMap<String, String>,
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty element.
    pub fn with_element(mut self, element_id: impl Into<String>) -> Self {
        self.elements.insert(element_id.into(), String::new());
        self
    }

    pub fn text(&self, element_id: &str) -> Option<&str> {
        self.elements.get(element_id).map(String::as_str)
    }

    pub fn remove_element(&mut self, element_id: &str) -> Option<String> {
        self.elements.remove(element_id)
    }
}

impl DisplaySurface for InMemoryPage {
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), DisplayError> {
        let element = self
            .elements
            .get_mut(element_id)
            .ok_or_else(|| DisplayError::MissingTarget(element_id.to_string()))?;

        element.clear();
        element.push_str(text);
        Ok(())
    }
}

/// An [`InMemoryPage`] that can be handed to a ticker and still be read from outside.
#[derive(Clone, Debug, Default)]
pub struct SharedPage(Arc<Mutex<InMemoryPage>>);

impl SharedPage {
    pub fn new(page: InMemoryPage) -> Self {
        Self(Arc::new(Mutex::new(page)))
    }

    pub fn text(&self, element_id: &str) -> Option<String> {
        self.with(|page| page.text(element_id).map(str::to_string))
    }

    /// Runs `f` with the page locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut InMemoryPage) -> R) -> R {
        let mut page = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }
}

impl DisplaySurface for SharedPage {
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), DisplayError> {
        self.with(|page| page.set_text(element_id, text))
    }
}
