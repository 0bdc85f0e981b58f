use glam::Vec3;
use js_sys::{Array, Function, Reflect};
use miniroom_core::{normalize_angle, CameraError, CameraRig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::constants::*;

#[wasm_bindgen]
extern "C" {
    /// A `camera-controls` instance handed over from JS.
    #[derive(Debug, Clone)]
    pub type CameraControls;

    #[wasm_bindgen(method, getter)]
    fn camera(this: &CameraControls) -> JsValue;

    #[wasm_bindgen(method, getter)]
    fn active(this: &CameraControls) -> bool;

    #[wasm_bindgen(method, js_name = setLookAt)]
    fn set_look_at(
        this: &CameraControls,
        px: f64,
        py: f64,
        pz: f64,
        tx: f64,
        ty: f64,
        tz: f64,
        enable_transition: bool,
    ) -> js_sys::Promise;

    #[wasm_bindgen(method, js_name = getTarget)]
    fn get_target(this: &CameraControls, out: &JsValue) -> JsValue;
}

fn read_f64(obj: &JsValue, field: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(field)).ok()?.as_f64()
}

fn vec3_from_js(v: &JsValue) -> Option<Vec3> {
    Some(Vec3::new(
        read_f64(v, "x")? as f32,
        read_f64(v, "y")? as f32,
        read_f64(v, "z")? as f32,
    ))
}

fn has_field(obj: &JsValue, field: &str) -> bool {
    Reflect::has(obj, &JsValue::from_str(field)).unwrap_or(false)
}

/// [`CameraRig`] over a JS `camera-controls` object.
#[derive(Clone)]
pub struct CameraControlsRig {
    controls: CameraControls,
}

impl CameraControlsRig {
    pub fn new(controls: JsValue) -> Self {
        Self {
            controls: controls.unchecked_into(),
        }
    }

    fn camera_position(&self) -> Option<Vec3> {
        let camera = self.controls.camera();
        let position = Reflect::get(&camera, &JsValue::from_str("position")).ok()?;
        vec3_from_js(&position)
    }

    // getTarget needs a THREE.Vector3; build one from the camera position's
    // constructor so no three.js import is needed here.
    fn controls_target(&self) -> Option<Vec3> {
        let position = Reflect::get(&self.controls.camera(), &JsValue::from_str("position")).ok()?;
        let ctor: Function = Reflect::get(&position, &JsValue::from_str("constructor"))
            .ok()?
            .dyn_into()
            .ok()?;
        let out = Reflect::construct(&ctor, &Array::new()).ok()?;
        self.controls.get_target(&out);
        vec3_from_js(&out)
    }
}

impl CameraRig for CameraControlsRig {
    fn position(&self) -> Vec3 {
        self.camera_position().unwrap_or(Vec3::ZERO)
    }

    fn target(&self) -> Vec3 {
        self.controls_target()
            .or_else(|| {
                let t = Reflect::get(&self.controls, &JsValue::from_str(CONTROLS_TARGET)).ok()?;
                vec3_from_js(&t)
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn set_look_at(&mut self, position: Vec3, target: Vec3, smooth: bool) {
        // transition promise is not awaited; settling is observed via `active`
        _ = self.controls.set_look_at(
            position.x as f64,
            position.y as f64,
            position.z as f64,
            target.x as f64,
            target.y as f64,
            target.z as f64,
            smooth,
        );
    }

    fn reset_orientation_bookkeeping(&mut self) -> Result<(), CameraError> {
        let obj: &JsValue = self.controls.as_ref();
        if !has_field(obj, CONTROLS_AZIMUTH) {
            return Err(CameraError::MissingInternals(CONTROLS_AZIMUTH.into()));
        }
        if !has_field(obj, CONTROLS_POLAR) {
            return Err(CameraError::MissingInternals(CONTROLS_POLAR.into()));
        }
        let azimuth = read_f64(obj, CONTROLS_AZIMUTH)
            .ok_or_else(|| CameraError::MissingInternals(CONTROLS_AZIMUTH.into()))?;
        let normalized = JsValue::from_f64(normalize_angle(azimuth as f32) as f64);
        let set = |field: &str| {
            Reflect::set(obj, &JsValue::from_str(field), &normalized)
                .map_err(|_| CameraError::MissingInternals(field.into()))
        };
        set(CONTROLS_AZIMUTH)?;
        if has_field(obj, CONTROLS_INTERNAL_AZIMUTH) {
            set(CONTROLS_INTERNAL_AZIMUTH)?;
        }
        Ok(())
    }

    fn is_settled(&self) -> bool {
        !self.controls.active()
    }
}
