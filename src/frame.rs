use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::*;
use crate::state::{with_app, App};

pub struct FrameContext {
    pub last_instant: Instant,
    pub since_save: f32,
}

impl FrameContext {
    pub fn new() -> Self {
        Self {
            last_instant: Instant::now(),
            since_save: 0.0,
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(FRAME_MAX_DT_SEC);
        self.last_instant = now;
        self.since_save += dt_sec;

        let autosave_due = AUTOSAVE_INTERVAL_SEC > 0.0 && self.since_save >= AUTOSAVE_INTERVAL_SEC;
        if autosave_due {
            self.since_save = 0.0;
        }
        with_app(|app| {
            let locked = app.editor.tick(now);
            if !locked.is_empty() {
                log::info!("[frame] auto-locked {:?}", locked);
            }
            if let Some(rig) = app.rig.as_ref() {
                if app.view_lock.poll(rig) {
                    log::debug!("[frame] view lock transition settled");
                }
            }
            if autosave_due {
                autosave(app);
            }
        });
    }
}

fn autosave(app: &App) {
    if let Err(e) = app.layout.autosave(&app.editor, js_sys::Date::now()) {
        log::warn!("[frame] autosave failed: {}", e);
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
