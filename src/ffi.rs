//! C interface
//!
//! Engines live in a process-wide registry and are addressed by opaque
//! handles, so a disposed or made-up handle is detected instead of
//! dereferenced. Style lists handed out by `highlighter_highlight_range` are
//! owned by the caller until passed back to `highlighter_free_style_items`.

use std::ffi::{CStr, c_char};
use std::path::Path;
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::HighlightEngine;
use crate::theme::{Color, StyleSpan};

/// Opaque engine handle, `0` is never valid
pub type HighlighterHandle = u64;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl From<Color> for StyleColor {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.to_unit();
        Self { r, g, b, a }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleItem {
    pub line: u64,
    pub pos: u64,
    pub len: u64,
    pub fg: StyleColor,
    pub bg: StyleColor,
    pub bold: bool,
    pub underline: bool,
    pub italic: bool,
}

impl From<StyleSpan> for StyleItem {
    fn from(span: StyleSpan) -> Self {
        Self {
            line: span.line as u64,
            pos: span.offset as u64,
            len: span.length as u64,
            fg: span.foreground.into(),
            bg: span.background.into(),
            bold: span.bold,
            underline: span.underline,
            italic: span.italic,
        }
    }
}

/// Caller-owned array of style items. Empty lists carry a null pointer.
#[repr(C)]
#[derive(Debug)]
pub struct StyleItemList {
    pub count: u64,
    pub items: *mut StyleItem,
}

impl StyleItemList {
    fn empty() -> Self {
        Self {
            count: 0,
            items: ptr::null_mut(),
        }
    }

    fn from_spans(spans: Vec<StyleSpan>) -> Self {
        if spans.is_empty() {
            return Self::empty();
        }
        let items: Box<[StyleItem]> = spans.into_iter().map(StyleItem::from).collect();
        let count = items.len() as u64;
        Self {
            count,
            items: Box::into_raw(items) as *mut StyleItem,
        }
    }
}

struct Slot {
    generation: u32,
    engine: Option<SharedEngine>,
}

type SharedEngine = Arc<Mutex<HighlightEngine>>;

/// Arena of live engines. A handle packs the slot's generation in the high
/// 32 bits and `slot + 1` in the low 32 bits.
///
/// Each engine has its own lock. The registry lock is only held to look a
/// handle up, so a slow call on one engine never blocks the others.
struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Registry {
    const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, engine: HighlightEngine) -> HighlighterHandle {
        let engine = Some(Arc::new(Mutex::new(engine)));
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].engine = engine;
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    engine,
                });
                self.slots.len() - 1
            }
        };
        encode(index, self.slots[index].generation)
    }

    fn get(&self, handle: HighlighterHandle) -> Option<SharedEngine> {
        let (index, generation) = decode(handle)?;
        let slot = self.slots.get(index)?;
        if slot.generation != generation {
            return None;
        }
        slot.engine.clone()
    }

    fn remove(&mut self, handle: HighlighterHandle) -> Option<SharedEngine> {
        let (index, generation) = decode(handle)?;
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let engine = slot.engine.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(engine)
    }
}

fn encode(index: usize, generation: u32) -> HighlighterHandle {
    (u64::from(generation) << 32) | (index as u64 + 1)
}

fn decode(handle: HighlighterHandle) -> Option<(usize, u32)> {
    let low = handle & 0xffff_ffff;
    if low == 0 {
        return None;
    }
    Some(((low - 1) as usize, (handle >> 32) as u32))
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock(engine: &Mutex<HighlightEngine>) -> MutexGuard<'_, HighlightEngine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_engine<R>(
    handle: HighlighterHandle,
    f: impl FnOnce(&mut HighlightEngine) -> R,
) -> Option<R> {
    // Registry guard is dropped at the end of this statement
    let engine = registry().get(handle);
    match engine {
        Some(engine) => Some(f(&mut lock(&engine))),
        None => {
            tracing::warn!(handle, "unknown highlighter handle");
            None
        }
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// # Safety
/// `s` must be null or point to a NUL-terminated string that stays valid for `'a`.
unsafe fn str_from_cstr<'a>(s: *const c_char) -> std::borrow::Cow<'a, str> {
    if s.is_null() {
        return std::borrow::Cow::Borrowed("");
    }
    unsafe { CStr::from_ptr(s) }.to_string_lossy()
}

/// Load the definitions in `folder`. Returns `0` if they cannot be loaded.
///
/// # Safety
/// `folder` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn highlighter_new(folder: *const c_char) -> HighlighterHandle {
    let folder = unsafe { str_from_cstr(folder) };
    match HighlightEngine::construct(Path::new(folder.as_ref())) {
        Ok(engine) => registry().insert(engine),
        Err(err) => {
            tracing::error!(error = %err, "failed to load highlighter definitions");
            0
        }
    }
}

/// An engine without language rules. Never returns `0`.
#[unsafe(no_mangle)]
pub extern "C" fn highlighter_new_plain_text() -> HighlighterHandle {
    registry().insert(HighlightEngine::plain_text())
}

/// Style lines `line..line + line_count` of `text`, which holds the document
/// from its first line. Release the result with `highlighter_free_style_items`.
///
/// # Safety
/// `text` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn highlighter_highlight_range(
    handle: HighlighterHandle,
    text: *const c_char,
    line: u64,
    line_count: u64,
    total_lines: u64,
) -> StyleItemList {
    let text = unsafe { str_from_cstr(text) };
    with_engine(handle, |engine| {
        engine.highlight(
            &text,
            to_usize(line),
            to_usize(line_count),
            to_usize(total_lines),
        )
    })
    .map(StyleItemList::from_spans)
    .unwrap_or_else(StyleItemList::empty)
}

/// Release a list returned by `highlighter_highlight_range`.
///
/// # Safety
/// `list` must come from `highlighter_highlight_range` and not have been
/// freed before.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn highlighter_free_style_items(list: StyleItemList) {
    if list.items.is_null() {
        return;
    }
    let slice = ptr::slice_from_raw_parts_mut(list.items, to_usize(list.count));
    drop(unsafe { Box::from_raw(slice) });
}

#[unsafe(no_mangle)]
pub extern "C" fn highlighter_invalidate_cache(handle: HighlighterHandle) {
    with_engine(handle, |engine| engine.invalidate_cache());
}

/// Background of the active theme, transparent black for unknown handles
#[unsafe(no_mangle)]
pub extern "C" fn highlighter_background_color(handle: HighlighterHandle) -> StyleColor {
    with_engine(handle, |engine| engine.background_color().into()).unwrap_or_default()
}

#[unsafe(no_mangle)]
pub extern "C" fn highlighter_set_dark_mode(handle: HighlighterHandle, dark_mode: bool) {
    with_engine(handle, |engine| engine.set_dark_mode(dark_mode));
}

/// Drop the engine. Later calls with this handle are ignored; a call already
/// running on another thread finishes first.
#[unsafe(no_mangle)]
pub extern "C" fn highlighter_dispose(handle: HighlighterHandle) {
    let engine = registry().remove(handle);
    match engine.map(Arc::try_unwrap) {
        Some(Ok(engine)) => engine
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .dispose(),
        Some(Err(_)) => tracing::debug!(handle, "engine in use, dropped after the last call"),
        None => tracing::warn!(handle, "dispose of unknown highlighter handle"),
    }
}
