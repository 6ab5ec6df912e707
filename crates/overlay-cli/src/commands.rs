use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use serde_json::{json, Value};

use overlay_core::{
    restore_layers, toggle_layer, CoreConfig, Editor, Extent, FilterState, LayerRegistry,
    LocalPhotoFiles, MapView, Mode, ModeController, PhotoOverlaysPanel, PreferenceStore, SectionId,
};

use overlay_core::scheduler::driver::run_move_loop;

use crate::demo::demo_layers;

/// Store, editor and panel wired together for one invocation.
pub struct Session {
    pub store: Rc<PreferenceStore>,
    pub editor: Rc<Editor>,
    pub local_photos: Rc<LocalPhotoFiles>,
    pub panel: PhotoOverlaysPanel,
    move_debounce: Duration,
}

impl Session {
    /// Open the preference file, restore persisted layers and filters, then
    /// enter `mode` if one is given.
    pub fn open(config: &CoreConfig, mode: Option<&str>) -> Self {
        let store = Rc::new(PreferenceStore::open(config));
        if !store.is_durable() {
            tracing::warn!("changes will not outlive this process");
        }

        let local_photos = Rc::new(LocalPhotoFiles::new());
        let layers = Rc::new(demo_layers(local_photos.clone()));
        let photos = Rc::new(FilterState::load(store.clone(), layers.clone()));
        let editor = Rc::new(Editor::new(layers, photos));

        let restored = restore_layers(editor.as_ref(), &store);
        tracing::debug!(?restored, "restored layer visibility");

        if let Some(mode) = mode {
            editor.mode.enter(Mode::new(mode));
        }

        let panel =
            PhotoOverlaysPanel::with_debounce(editor.clone(), store.clone(), config.move_debounce);
        Self {
            store,
            editor,
            local_photos,
            panel,
            move_debounce: config.move_debounce,
        }
    }

    pub fn prefs_get(&self, key: &str) -> anyhow::Result<Value> {
        let value = self
            .store
            .get(key)
            .with_context(|| format!("no preference stored under {key:?}"))?;
        Ok(Value::String(value))
    }

    pub fn prefs_set(&self, key: &str, value: &str) -> anyhow::Result<Value> {
        if !self.store.set(key, value) {
            bail!("failed to write preference {key:?}");
        }
        Ok(json!({ "key": key, "value": value }))
    }

    pub fn prefs_remove(&self, key: &str) -> anyhow::Result<Value> {
        if !self.store.remove(key) {
            bail!("failed to remove preference {key:?}");
        }
        Ok(json!({ "key": key, "removed": true }))
    }

    pub fn prefs_list(&self) -> Value {
        let entries = self
            .store
            .keys()
            .into_iter()
            .filter_map(|key| self.store.get(&key).map(|value| (key, Value::String(value))))
            .collect();
        Value::Object(entries)
    }

    pub fn layers_show(&self) -> Value {
        let layers: Vec<Value> = self
            .editor
            .layers
            .all()
            .iter()
            .map(|layer| {
                json!({
                    "id": layer.id(),
                    "supported": layer.supported(),
                    "enabled": layer.enabled(),
                })
            })
            .collect();
        json!({ "mode": self.editor.mode.mode_id(), "layers": layers })
    }

    pub fn layers_toggle(&self, layer_id: &str) -> anyhow::Result<Value> {
        if self.editor.layers.layer(layer_id).is_none() {
            bail!("unknown layer {layer_id:?}");
        }
        let enabled = toggle_layer(self.editor.as_ref(), &self.store, layer_id);
        Ok(json!({
            "id": layer_id,
            "enabled": enabled,
            "mode": self.editor.mode.mode_id(),
        }))
    }

    pub fn set_view(&self, extent: Option<Extent>, zoom: Option<f64>) {
        let extent = extent.unwrap_or_else(|| self.editor.map.extent());
        let zoom = zoom.unwrap_or_else(|| self.editor.map.zoom());
        self.editor.map.set_view(extent, zoom);
    }

    pub fn load_local_photos(&mut self, files: Vec<PathBuf>) {
        if !files.is_empty() {
            self.panel.set_local_photo_files(files);
        }
    }

    /// Render the panel and return the full patch list of this pass.
    pub fn render(&mut self) -> anyhow::Result<Value> {
        let patches = self.panel.render();
        serde_json::to_value(&patches).context("failed to encode patches")
    }

    /// Pan the map `count` times, `interval` apart, with the panel listening.
    ///
    /// Runs on a current-thread tokio runtime until the last debounced pass
    /// has rendered.
    pub fn simulate_moves(&mut self, count: usize, interval: Duration) -> anyhow::Result<Value> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to start runtime")?;
        self.simulate_moves_on(&runtime, count, interval)
    }

    fn simulate_moves_on(
        &mut self,
        runtime: &tokio::runtime::Runtime,
        count: usize,
        interval: Duration,
    ) -> anyhow::Result<Value> {
        self.panel.render();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let editor = self.editor.clone();
        let debounce = self.move_debounce;
        let panel = &mut self.panel;
        let mut emitted = Vec::new();

        let passes = runtime.block_on(async {
            let producer = async move {
                for _ in 0..count {
                    let extent = editor.map.extent();
                    let shifted = Extent::new(
                        extent.min_lon + 0.01,
                        extent.min_lat,
                        extent.max_lon + 0.01,
                        extent.max_lat,
                    );
                    editor.map.set_view(shifted, editor.map.zoom());
                    if tx.send(()).is_err() {
                        break;
                    }
                    tokio::time::sleep(interval).await;
                }
            };
            let looper = run_move_loop(rx, debounce, || emitted.push(panel.render()));
            let ((), passes) = tokio::join!(producer, looper);
            passes
        });

        Ok(json!({
            "moves": count,
            "passes": passes,
            "patches": serde_json::to_value(&emitted)?,
        }))
    }

    /// Current materialized sections, after at least one render.
    pub fn sections(&self) -> anyhow::Result<Value> {
        let mut out = serde_json::Map::new();
        for id in SectionId::ALL {
            let key = serde_json::to_value(id)?
                .as_str()
                .map(str::to_string)
                .context("section id is not a string")?;
            out.insert(key, serde_json::to_value(self.panel.section(id).items())?);
        }
        Ok(Value::Object(out))
    }
}
