//! Which item each display slot shows, and whether its thumbnail arrived.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use image::DynamicImage;
use tracing::trace;

use crate::domain::entities::GalleryItem;
use crate::infrastructure::image::{FetchWorker, SlotKey};

/// What a slot currently displays.
#[derive(Debug, Clone)]
pub enum SlotContent {
    Placeholder,
    Thumbnail(Arc<DynamicImage>),
}

impl SlotContent {
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

#[derive(Debug, Clone)]
pub struct BoundSlot {
    pub item: GalleryItem,
    pub content: SlotContent,
}

/// Caller-side registry of recycled slots.
///
/// Lives in the single-threaded context that owns the [`FetchWorker`]; the
/// listener it hands out shares the registry through `Rc`.
pub struct SlotBinding<K> {
    slots: Rc<RefCell<HashMap<K, BoundSlot>>>,
    shown: Rc<Cell<usize>>,
}

impl<K> Clone for SlotBinding<K> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            shown: self.shown.clone(),
        }
    }
}

impl<K: SlotKey> Default for SlotBinding<K> {
    fn default() -> Self {
        Self {
            slots: Rc::default(),
            shown: Rc::default(),
        }
    }
}

impl<K: SlotKey> SlotBinding<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `slot` at `item`: shows the placeholder and requests the
    /// item's thumbnail, superseding whatever the slot wanted before.
    pub fn bind(&self, worker: &FetchWorker<K>, slot: K, item: &GalleryItem) {
        self.slots.borrow_mut().insert(
            slot.clone(),
            BoundSlot {
                item: item.clone(),
                content: SlotContent::Placeholder,
            },
        );
        worker.queue(slot, item.thumbnail_url());
    }

    /// Releases `slot` and cancels its pending thumbnail.
    pub fn recycle(&self, worker: &FetchWorker<K>, slot: &K) {
        self.slots.borrow_mut().remove(slot);
        worker.queue(slot.clone(), None);
    }

    /// Callback that shows a delivered thumbnail in its slot.
    pub fn listener(&self) -> impl FnMut(&K, Arc<DynamicImage>) + use<K> {
        let slots = self.slots.clone();
        let shown = self.shown.clone();
        move |slot, image| {
            if let Some(bound) = slots.borrow_mut().get_mut(slot) {
                bound.content = SlotContent::Thumbnail(image);
                shown.set(shown.get() + 1);
            } else {
                trace!(slot = ?slot, "Thumbnail for an unbound slot");
            }
        }
    }

    /// Registers [`SlotBinding::listener`] with the worker.
    pub fn attach(&self, worker: &mut FetchWorker<K>) {
        worker.set_listener(self.listener());
    }

    #[must_use]
    pub fn content(&self, slot: &K) -> Option<SlotContent> {
        self.slots.borrow().get(slot).map(|b| b.content.clone())
    }

    #[must_use]
    pub fn item(&self, slot: &K) -> Option<GalleryItem> {
        self.slots.borrow().get(slot).map(|b| b.item.clone())
    }

    /// Number of slots currently bound.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total thumbnails applied to slots so far.
    #[must_use]
    pub fn thumbnails_shown(&self) -> usize {
        self.shown.get()
    }
}
