use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod backend;
mod chat_ui;
mod commands;
mod dom;
mod markdown;
mod storage;
mod utils;

pub use commands::ChatCommand;
pub use storage::LocalStorageStore;

thread_local! {
    static WIDGET: RefCell<Option<chat_ui::ChatWidget>> = const { RefCell::new(None) };
}

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Skintel chat WASM initialized");
}

/// Restore the conversation and attach the chat widget to the page
#[wasm_bindgen]
pub fn init_chat_widget(api_base: String) -> Result<(), JsValue> {
    log::info!("Initializing chat widget against {}", api_base);
    let widget = chat_ui::ChatWidget::new(api_base)?;
    widget.start()?;
    WIDGET.with(|slot| *slot.borrow_mut() = Some(widget));
    Ok(())
}

/// Run a JSON-encoded [`ChatCommand`] from the host page
#[wasm_bindgen]
pub fn dispatch_chat_command(json: &str) -> Result<(), JsValue> {
    let command = ChatCommand::parse(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid chat command: {}", e)))?;
    with_widget(|widget| widget.dispatch(command))
}

#[wasm_bindgen]
pub fn send_chat_message(content: String) -> Result<(), JsValue> {
    with_widget(|widget| widget.dispatch(ChatCommand::Send { content }))
}

#[wasm_bindgen]
pub fn clear_chat() -> Result<(), JsValue> {
    with_widget(|widget| widget.dispatch(ChatCommand::Clear))
}

/// Ask for advice on the concerns picked in the page's concern selector
#[wasm_bindgen]
pub fn ask_about_concerns(concerns: Vec<String>) -> Result<(), JsValue> {
    with_widget(|widget| widget.dispatch(ChatCommand::AskAboutConcerns { concerns }))
}

fn with_widget<F>(f: F) -> Result<(), JsValue>
where
    F: FnOnce(&chat_ui::ChatWidget) -> Result<(), JsValue>,
{
    // Handlers re-enter through their own clones, so release the slot first
    let widget = WIDGET.with(|slot| slot.borrow().clone());
    match widget {
        Some(widget) => f(&widget),
        None => Err(JsValue::from_str(
            "Chat widget not initialized; call init_chat_widget first",
        )),
    }
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
