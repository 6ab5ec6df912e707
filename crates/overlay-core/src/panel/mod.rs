//! The photo overlays panel: five reconciled sections plus the event glue.

pub mod labels;
pub mod sections;

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::constants::{DEFAULT_MOVE_DEBOUNCE, LOCAL_PHOTOS_LAYER};
use crate::context::EditorContext;
use crate::prefs::PreferenceStore;
use crate::reconcile::{Patch, RenderedList};
use crate::scheduler::RecomputeScheduler;
use crate::visibility;

use sections::{DateFilter, LocalPhotos, PhotoSources, PhotoTypes, UsernameFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    PhotoSources,
    PhotoTypes,
    DateFilter,
    UsernameFilter,
    LocalPhotos,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::PhotoSources,
        SectionId::PhotoTypes,
        SectionId::DateFilter,
        SectionId::UsernameFilter,
        SectionId::LocalPhotos,
    ];
}

/// Patches produced for one section during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionPatches {
    pub section: SectionId,
    pub patches: Vec<Patch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    LayersChanged,
    PhotosChanged,
    MapMoved,
}

pub struct PhotoOverlaysPanel {
    ctx: Rc<dyn EditorContext>,
    store: Rc<PreferenceStore>,
    sources: RenderedList,
    photo_types: RenderedList,
    date_filter: RenderedList,
    username_filter: RenderedList,
    local_photos: RenderedList,
    scheduler: RecomputeScheduler,
    passes: usize,
}

impl PhotoOverlaysPanel {
    pub fn new(ctx: Rc<dyn EditorContext>, store: Rc<PreferenceStore>) -> Self {
        Self::with_debounce(ctx, store, DEFAULT_MOVE_DEBOUNCE)
    }

    pub fn with_debounce(
        ctx: Rc<dyn EditorContext>,
        store: Rc<PreferenceStore>,
        move_debounce: Duration,
    ) -> Self {
        Self {
            ctx,
            store,
            sources: RenderedList::new(),
            photo_types: RenderedList::new(),
            date_filter: RenderedList::new(),
            username_filter: RenderedList::new(),
            local_photos: RenderedList::new(),
            scheduler: RecomputeScheduler::new(move_debounce),
            passes: 0,
        }
    }

    /// Reconcile every section against the current context.
    ///
    /// Sections without changes are left out of the result.
    pub fn render(&mut self) -> Vec<SectionPatches> {
        let ctx = self.ctx.as_ref();
        let mut out = Vec::new();

        let mut push = |section: SectionId, patches: Vec<Patch>| {
            if !patches.is_empty() {
                out.push(SectionPatches { section, patches });
            }
        };

        let rules = PhotoSources::new(ctx);
        push(SectionId::PhotoSources, self.sources.reconcile(rules.data(), &rules));

        let rules = PhotoTypes::new(ctx);
        push(SectionId::PhotoTypes, self.photo_types.reconcile(rules.data(), &rules));

        let rules = DateFilter::new(ctx);
        push(SectionId::DateFilter, self.date_filter.reconcile(rules.data(), &rules));

        let rules = UsernameFilter::new(ctx);
        push(
            SectionId::UsernameFilter,
            self.username_filter.reconcile(rules.data(), &rules),
        );

        let rules = LocalPhotos::new(ctx);
        push(SectionId::LocalPhotos, self.local_photos.reconcile(rules.data(), &rules));

        self.passes += 1;
        tracing::debug!(pass = self.passes, sections = out.len(), "photo overlays reconciled");
        out
    }

    /// Layer and photo changes re-render right away. Map moves only arm the debounce.
    pub fn handle_event(&mut self, event: PanelEvent, now: Instant) -> Vec<SectionPatches> {
        match event {
            PanelEvent::LayersChanged | PanelEvent::PhotosChanged => self.render(),
            PanelEvent::MapMoved => {
                self.scheduler.notify(now);
                Vec::new()
            }
        }
    }

    /// Advance the move debounce. Returns whether a pass waits for the next idle point.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.scheduler.poll(now)
    }

    /// Run the queued pass, if any. Call when the host loop has nothing else to do.
    pub fn run_idle(&mut self) -> Option<Vec<SectionPatches>> {
        self.scheduler.take_idle().then(|| self.render())
    }

    pub fn time_until_recompute(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_fire(now)
    }

    pub fn section(&self, id: SectionId) -> &RenderedList {
        match id {
            SectionId::PhotoSources => &self.sources,
            SectionId::PhotoTypes => &self.photo_types,
            SectionId::DateFilter => &self.date_filter,
            SectionId::UsernameFilter => &self.username_filter,
            SectionId::LocalPhotos => &self.local_photos,
        }
    }

    /// Number of reconciliation passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    // User actions. Each one mutates the context and re-renders.

    pub fn toggle_layer(&mut self, layer_id: &str) -> Vec<SectionPatches> {
        visibility::toggle_layer(self.ctx.as_ref(), &self.store, layer_id);
        self.render()
    }

    pub fn toggle_photo_type(&mut self, photo_type: &str) -> Vec<SectionPatches> {
        self.ctx.photos().toggle_photo_type(photo_type);
        self.render()
    }

    pub fn set_date_filter(&mut self, member: &str, value: &str) -> Vec<SectionPatches> {
        self.ctx.photos().set_date_filter(member, value.trim(), true);
        self.render()
    }

    pub fn set_username_filter(&mut self, raw: &str) -> Vec<SectionPatches> {
        self.ctx.photos().set_username_filter(raw, true);
        self.render()
    }

    /// Zoom the map to the local photos. Does nothing without loaded photos.
    pub fn zoom_to_local_photos(&self) -> bool {
        let Some(layer) = self.ctx.layers().layer(LOCAL_PHOTOS_LAYER) else {
            return false;
        };
        match layer.local_photos() {
            Some(photos) if photos.has_data() => {
                photos.fit_zoom();
                true
            }
            _ => false,
        }
    }

    pub fn set_local_photo_files(&mut self, files: Vec<PathBuf>) -> Vec<SectionPatches> {
        let Some(layer) = self.ctx.layers().layer(LOCAL_PHOTOS_LAYER) else {
            tracing::debug!("no local photos layer to receive files");
            return Vec::new();
        };
        if let Some(photos) = layer.local_photos() {
            photos.set_file_list(files);
        }
        self.render()
    }
}
