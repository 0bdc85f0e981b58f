use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::TEXT_INPUT_TAGS;
use crate::keymap::action_for_key;
use crate::state::with_app;

fn typing_in_text_field(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| TEXT_INPUT_TAGS.contains(&el.tag_name().as_str()))
        .unwrap_or(false)
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent) {
    if typing_in_text_field(ev) {
        return;
    }
    let ctrl = ev.ctrl_key() || ev.meta_key();
    let Some(action) = action_for_key(&ev.key(), ctrl, ev.shift_key()) else {
        return;
    };
    if with_app(|app| app.apply(action)).unwrap_or(false) {
        log::debug!("[keys] {:?}", action);
        ev.prevent_default();
    }
}

pub fn wire_global_keydown() {
    if let Some(window) = web::window() {
        let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
            handle_global_keydown(&ev);
        }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
