#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use glam::Vec3;
use miniroom_core::constants::FURNITURE_SAFETY_MARGIN;
use miniroom_core::{
    constrain_to_room, grid_snap, normalize_angle, reset_camera_controls_rotation, rotation_snap,
    shortest_rotation, AssetOverrides, CatalogItem, FurnitureOverride, ItemUpdate, Mode,
    OverrideRegistry, PlacedItem,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod camera;
mod constants;
mod events;
mod frame;
mod idb;
mod keymap;
mod object_url;
mod state;
mod storage;

use camera::CameraControlsRig;
use idb::IdbBlobStore;
use object_url::BrowserObjectUrls;
use state::with_app;
use storage::LocalStorage;

thread_local! {
    static ASSETS: Rc<AssetOverrides<IdbBlobStore>> = Rc::new(AssetOverrides::new(IdbBlobStore::new()));
}

fn assets() -> Rc<AssetOverrides<IdbBlobStore>> {
    ASSETS.with(Rc::clone)
}

fn overrides() -> OverrideRegistry<LocalStorage> {
    OverrideRegistry::new(LocalStorage)
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn busy() -> JsValue {
    JsValue::from_str("editor busy")
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("miniroom-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let restored = with_app(|app| app.layout.restore_into(&mut app.editor))
        .ok_or_else(|| anyhow::anyhow!("app state busy during init"))?;
    if restored {
        log::info!("[init] restored saved layout");
    }

    events::wire_global_keydown();
    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext::new())));
    Ok(())
}

// ---------------- Pure helpers ----------------

#[wasm_bindgen(js_name = normalizeAngle)]
pub fn normalize_angle_js(angle: f64) -> f64 {
    normalize_angle(angle as f32) as f64
}

#[wasm_bindgen(js_name = shortestRotation)]
pub fn shortest_rotation_js(from: f64, to: f64) -> f64 {
    shortest_rotation(from as f32, to as f32) as f64
}

#[wasm_bindgen(js_name = gridSnap)]
pub fn grid_snap_js(value: f64, cell: f64) -> f64 {
    grid_snap(value as f32, cell as f32) as f64
}

#[wasm_bindgen(js_name = rotationSnap)]
pub fn rotation_snap_js(angle: f64, increment_degrees: f64) -> f64 {
    rotation_snap(angle as f32, increment_degrees as f32) as f64
}

/// Takes a `PlacedItem` JSON and returns it moved inside the current room.
#[wasm_bindgen(js_name = constrainItem)]
pub fn constrain_item_js(item_json: &str) -> Result<String, JsValue> {
    let item: PlacedItem = serde_json::from_str(item_json).map_err(js_err)?;
    let room = with_app(|app| *app.editor.room()).unwrap_or_default();
    let out = constrain_to_room(&item, &room.boundaries(), FURNITURE_SAFETY_MARGIN);
    serde_json::to_string(&out).map_err(js_err)
}

// ---------------- Metadata overrides ----------------

#[wasm_bindgen(js_name = setOverride)]
pub fn set_override_js(id: &str, patch_json: &str) -> Result<(), JsValue> {
    let patch: FurnitureOverride = serde_json::from_str(patch_json).map_err(js_err)?;
    overrides().set(id, patch);
    Ok(())
}

#[wasm_bindgen(js_name = getOverride)]
pub fn get_override_js(id: &str) -> Option<String> {
    overrides()
        .get(id)
        .and_then(|ov| serde_json::to_string(&ov).ok())
}

#[wasm_bindgen(js_name = clearOverride)]
pub fn clear_override_js(id: &str) {
    overrides().clear(id);
}

#[wasm_bindgen(js_name = isOverridden)]
pub fn is_overridden_js(id: &str) -> bool {
    overrides().is_overridden(id)
}

#[wasm_bindgen(js_name = applyOverridesToItems)]
pub fn apply_overrides_to_items_js(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<CatalogItem> = serde_json::from_str(items_json).map_err(js_err)?;
    serde_json::to_string(&overrides().apply_to_items(&items)).map_err(js_err)
}

// ---------------- Blob overrides ----------------

#[wasm_bindgen(js_name = setBuiltInModelOverride)]
pub async fn set_built_in_model_override(id: String, bytes: Vec<u8>) -> Result<(), JsValue> {
    assets().set_model_override(&id, &bytes).await.map_err(js_err)
}

#[wasm_bindgen(js_name = setBuiltInThumbnailOverride)]
pub async fn set_built_in_thumbnail_override(id: String, bytes: Vec<u8>) -> Result<(), JsValue> {
    assets().set_thumbnail_override(&id, &bytes).await.map_err(js_err)
}

#[wasm_bindgen(js_name = clearBuiltInModelOverride)]
pub async fn clear_built_in_model_override(id: String) -> Result<(), JsValue> {
    assets().clear_model_override(&id).await.map_err(js_err)
}

#[wasm_bindgen(js_name = clearBuiltInThumbnailOverride)]
pub async fn clear_built_in_thumbnail_override(id: String) -> Result<(), JsValue> {
    assets().clear_thumbnail_override(&id).await.map_err(js_err)
}

/// JSON object `{ id: { modelUrl?, thumbUrl? } }`. The caller revokes the urls.
#[wasm_bindgen(js_name = getBuiltInOverrideUrls)]
pub async fn get_built_in_override_urls(ids: Vec<String>) -> Result<String, JsValue> {
    let map = assets()
        .override_urls(&ids, &BrowserObjectUrls)
        .await
        .map_err(js_err)?;
    serde_json::to_string(&map).map_err(js_err)
}

// ---------------- Camera ----------------

#[wasm_bindgen(js_name = moveCameraToTarget)]
#[allow(clippy::too_many_arguments)]
pub fn move_camera_to_target_js(
    controls: JsValue,
    px: f32,
    py: f32,
    pz: f32,
    tx: f32,
    ty: f32,
    tz: f32,
    smooth: bool,
) {
    let mut rig = CameraControlsRig::new(controls);
    miniroom_core::move_camera_to_target(&mut rig, Vec3::new(px, py, pz), Vec3::new(tx, ty, tz), smooth);
}

#[wasm_bindgen(js_name = resetCameraControlsRotation)]
pub fn reset_camera_controls_rotation_js(controls: JsValue) {
    let mut rig = CameraControlsRig::new(controls);
    reset_camera_controls_rotation(&mut rig);
}

/// Registers the scene's camera-controls for the view lock.
#[wasm_bindgen(js_name = attachCameraControls)]
pub fn attach_camera_controls(controls: JsValue) {
    with_app(|app| app.rig = Some(CameraControlsRig::new(controls)));
}

#[wasm_bindgen(js_name = toggleViewLock)]
pub fn toggle_view_lock() -> Result<bool, JsValue> {
    with_app(|app| {
        let rig = app
            .rig
            .as_mut()
            .ok_or_else(|| JsValue::from_str("no camera controls attached"))?;
        app.view_lock.toggle(rig);
        app.editor.set_view_locked(app.view_lock.is_locked());
        Ok(app.view_lock.is_locked())
    })
    .unwrap_or_else(|| Err(busy()))
}

// ---------------- Editor ----------------

#[wasm_bindgen(js_name = addItem)]
pub fn add_item(item_json: &str) -> Result<(), JsValue> {
    let item: PlacedItem = serde_json::from_str(item_json).map_err(js_err)?;
    with_app(|app| app.editor.add_item(item).map_err(js_err)).unwrap_or_else(|| Err(busy()))
}

/// Applies a dragged transform; components are `[x, y, z]` arrays or null.
#[wasm_bindgen(js_name = updateItemTransform)]
pub fn update_item_transform(
    id: &str,
    position: Option<Vec<f32>>,
    rotation: Option<Vec<f32>>,
    scale: Option<Vec<f32>>,
) -> Result<(), JsValue> {
    let vec3 = |v: Option<Vec<f32>>| v.filter(|v| v.len() == 3).map(|v| Vec3::new(v[0], v[1], v[2]));
    let update = ItemUpdate {
        position: vec3(position),
        rotation: vec3(rotation),
        scale: vec3(scale),
        ..Default::default()
    };
    with_app(|app| {
        let snapped = ItemUpdate {
            position: update.position.map(|p| app.editor.snap.apply_position(p)),
            rotation: update.rotation.map(|r| app.editor.snap.apply_rotation(r)),
            ..update
        };
        app.editor.update_item(id, snapped).map_err(js_err)
    })
    .unwrap_or_else(|| Err(busy()))
}

#[wasm_bindgen(js_name = removeItem)]
pub fn remove_item(id: &str) -> Result<(), JsValue> {
    with_app(|app| app.editor.remove_item(id).map(|_| ()).map_err(js_err))
        .unwrap_or_else(|| Err(busy()))
}

#[wasm_bindgen(js_name = selectItem)]
pub fn select_item(id: Option<String>) {
    with_app(|app| app.editor.select_item(id.as_deref()));
}

#[wasm_bindgen(js_name = setEditMode)]
pub fn set_edit_mode(edit: bool) {
    with_app(|app| app.editor.set_mode(if edit { Mode::Edit } else { Mode::View }));
}

/// A transform gesture on `id` ended; arms the auto-lock.
#[wasm_bindgen(js_name = endGesture)]
pub fn end_gesture(id: &str) {
    with_app(|app| app.editor.end_gesture(id, instant::Instant::now()));
}

#[wasm_bindgen(js_name = beginGesture)]
pub fn begin_gesture(id: &str) {
    with_app(|app| app.editor.begin_gesture(id));
}

#[wasm_bindgen(js_name = itemsJson)]
pub fn items_json() -> Result<String, JsValue> {
    with_app(|app| serde_json::to_string(app.editor.items()).map_err(js_err))
        .unwrap_or_else(|| Err(busy()))
}

#[wasm_bindgen(js_name = saveLayout)]
pub fn save_layout() -> Result<(), JsValue> {
    with_app(|app| {
        app.layout
            .save_current(&app.editor, js_sys::Date::now())
            .map_err(js_err)
    })
    .unwrap_or_else(|| Err(busy()))
}

#[wasm_bindgen(js_name = restoreLayout)]
pub fn restore_layout() -> bool {
    with_app(|app| app.layout.restore_into(&mut app.editor)).unwrap_or(false)
}
