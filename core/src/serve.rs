//! # Document Cache
//!
//! Lazily builds the serialized document once and serves the cached text
//! afterwards. The first build is guarded so concurrent first requests run
//! the generator a single time; reads after that do not lock.

use crate::descriptor::ReflectionSnapshot;
use crate::error::AppResult;
use crate::generator::DocumentGenerator;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

type Builder = Box<dyn Fn() -> AppResult<String> + Send + Sync>;

/// A lazily built, immutable rendering of a document.
pub struct DocumentCache {
    builder: Builder,
    rendered: OnceLock<Arc<str>>,
    build_lock: Mutex<()>,
}

impl DocumentCache {
    /// Creates a cache around a rendering function.
    pub fn new<F>(builder: F) -> Self
    where
        F: Fn() -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            builder: Box::new(builder),
            rendered: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Creates a cache rendering `snapshot` as JSON with `generator`.
    pub fn from_generator(generator: DocumentGenerator, snapshot: ReflectionSnapshot) -> Self {
        Self::new(move || generator.generate_json(&snapshot))
    }

    /// The rendered document, building it on first use.
    ///
    /// A failed build is not cached; the next call tries again.
    pub fn get(&self) -> AppResult<Arc<str>> {
        if let Some(rendered) = self.rendered.get() {
            return Ok(Arc::clone(rendered));
        }

        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(rendered) = self.rendered.get() {
            return Ok(Arc::clone(rendered));
        }

        let text: Arc<str> = (self.builder)()?.into();
        info!(bytes = text.len(), "Cached generated document");
        Ok(Arc::clone(self.rendered.get_or_init(|| text)))
    }

    /// Whether the document has been built.
    pub fn is_built(&self) -> bool {
        self.rendered.get().is_some()
    }
}
