//! Guarded layer visibility changes.
//!
//! Visibility is never changed while a drawing mode is active, and hiding a
//! primary data layer drops the editor back to browse mode so no edit state
//! keeps pointing at entities that just disappeared.

use std::collections::BTreeMap;

use crate::constants::{pref_keys, PRIMARY_DATA_LAYERS};
use crate::context::{EditorContext, LayerRegistry};
use crate::models::mode::is_drawing_mode;
use crate::models::Mode;
use crate::prefs::{blob, PreferenceStore};

/// `false` for unknown layers.
pub fn is_layer_shown(layers: &dyn LayerRegistry, layer_id: &str) -> bool {
    layers
        .layer(layer_id)
        .map(|layer| layer.enabled())
        .unwrap_or(false)
}

/// Set a layer's enabled flag unless the editor is mid-draw.
///
/// Returns `true` if the flag was written.
pub fn set_layer_visibility(ctx: &dyn EditorContext, layer_id: &str, enabled: bool) -> bool {
    let mode_id = ctx.mode().mode_id();
    if is_drawing_mode(&mode_id) {
        tracing::debug!(layer_id, mode = %mode_id, "layer visibility locked while drawing");
        return false;
    }

    let Some(layer) = ctx.layers().layer(layer_id) else {
        return false;
    };
    layer.set_enabled(enabled);

    if !enabled && PRIMARY_DATA_LAYERS.contains(&layer_id) {
        ctx.mode().enter(Mode::browse());
    }
    true
}

/// Flip a layer and record its resulting visibility under `dataLayers`.
///
/// The stored mapping is merged, so other layers' entries survive. Returns the
/// layer's visibility after the call.
pub fn toggle_layer(ctx: &dyn EditorContext, store: &PreferenceStore, layer_id: &str) -> bool {
    let shown = is_layer_shown(ctx.layers(), layer_id);
    set_layer_visibility(ctx, layer_id, !shown);

    let now_shown = is_layer_shown(ctx.layers(), layer_id);
    blob::merge_entry(store, pref_keys::DATA_LAYERS, layer_id, now_shown);
    now_shown
}

/// Apply the stored `dataLayers` mapping to the registry, e.g. at startup.
///
/// Unknown ids are skipped. Returns the ids whose visibility was applied.
pub fn restore_layers(ctx: &dyn EditorContext, store: &PreferenceStore) -> Vec<String> {
    let stored: BTreeMap<String, bool> = blob::read_map(store, pref_keys::DATA_LAYERS);
    stored
        .into_iter()
        .filter_map(|(layer_id, enabled)| {
            ctx.layers().layer(&layer_id)?;
            let applied = is_layer_shown(ctx.layers(), &layer_id) == enabled
                || set_layer_visibility(ctx, &layer_id, enabled);
            applied.then_some(layer_id)
        })
        .collect()
}
