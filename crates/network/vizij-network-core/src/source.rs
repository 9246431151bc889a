//! Content handles consumed by network instances.
//!
//! The content loader itself lives outside this crate. A [`ContentSlot`]
//! stands for one loadable content entry: the loader (possibly on another
//! thread) stores payloads into it, and network instances poll it from their
//! own tick.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::definition::NetworkDefinition;

/// Source of a (possibly still loading) network definition.
pub trait DefinitionSource {
    /// Content key, used to label diagnostics.
    fn key(&self) -> &str;
    fn get(&self) -> Option<Arc<NetworkDefinition>>;
    fn is_loading(&self) -> bool;
    /// Monotonically increasing load-generation counter.
    fn total_loads_count(&self) -> u32;
}

/// One content entry: an atomically swappable payload plus load bookkeeping.
pub struct ContentSlot<T> {
    key: String,
    payload: ArcSwapOption<T>,
    loads: AtomicU32, // bumped after a payload is stored
    loading: AtomicBool,
}

impl<T> ContentSlot<T> {
    /// An empty slot with no load in flight.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: ArcSwapOption::empty(),
            loads: AtomicU32::new(0),
            loading: AtomicBool::new(false),
        }
    }

    /// A slot whose first load already completed.
    pub fn loaded(key: impl Into<String>, value: T) -> Self {
        let slot = Self::new(key);
        slot.store(value);
        slot
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn get(&self) -> Option<Arc<T>> {
        self.payload.load_full()
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    #[inline]
    pub fn total_loads_count(&self) -> u32 {
        self.loads.load(Ordering::Acquire)
    }

    /// Mark a load (or reload) as in flight. The current payload, if any,
    /// stays readable.
    pub fn begin_load(&self) {
        self.loading.store(true, Ordering::Release);
    }

    pub fn store(&self, value: T) {
        self.store_arc(Arc::new(value));
    }

    /// Publish a new payload and bump the load counter.
    pub fn store_arc(&self, value: Arc<T>) {
        self.payload.store(Some(value));
        self.loading.store(false, Ordering::Release);
        self.loads.fetch_add(1, Ordering::AcqRel);
    }

    /// The in-flight load failed; keep whatever payload was there.
    pub fn fail_load(&self) {
        self.loading.store(false, Ordering::Release);
    }
}

impl DefinitionSource for ContentSlot<NetworkDefinition> {
    fn key(&self) -> &str {
        ContentSlot::key(self)
    }

    fn get(&self) -> Option<Arc<NetworkDefinition>> {
        ContentSlot::get(self)
    }

    fn is_loading(&self) -> bool {
        ContentSlot::is_loading(self)
    }

    fn total_loads_count(&self) -> u32 {
        ContentSlot::total_loads_count(self)
    }
}
