use std::cell::RefCell;
use std::rc::Rc;

use skintel_session::{
    begin_turn, complete_turn, ChatBackend, ConversationManager, KeyValueStore, MemoryStore,
    SessionConfig, TurnGate, TurnGuard,
};
use skintel_types::ChatMessage;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Document;

use crate::backend::HttpBackend;
use crate::commands::ChatCommand;
use crate::dom;
use crate::markdown;
use crate::storage::LocalStorageStore;
use crate::utils;

const MESSAGES_ID: &str = "chatMessages";
const INPUT_ID: &str = "chatInput";
const SEND_ID: &str = "chatSend";
const CLEAR_ID: &str = "chatClear";
const TYPING_ID: &str = "chatTyping";

const BUSY_ERROR: &str = "A reply is still pending; try again when it arrives";

type Manager = ConversationManager<Box<dyn KeyValueStore>>;

/// Which endpoint answers a turn
enum TurnRequest {
    Chat,
    Advice(Vec<String>),
}

/// The chat panel: transcript, input box and buttons.
///
/// Clones share one conversation, so event handlers each hold their own.
#[derive(Clone)]
pub struct ChatWidget {
    document: Document,
    manager: Rc<RefCell<Manager>>,
    backend: Rc<HttpBackend>,
    gate: TurnGate,
}

impl ChatWidget {
    pub fn new(api_base: String) -> Result<Self, JsValue> {
        let document = crate::document()?;

        let store: Box<dyn KeyValueStore> = match LocalStorageStore::open() {
            Some(store) => Box::new(store),
            None => {
                log::warn!("localStorage unavailable; chat history will not survive a reload");
                Box::new(MemoryStore::new())
            }
        };
        let manager = ConversationManager::new(store, SessionConfig::default());
        log::info!("Chat restored with {} messages", manager.messages().len());

        Ok(Self {
            document,
            manager: Rc::new(RefCell::new(manager)),
            backend: Rc::new(HttpBackend::new(api_base)),
            gate: TurnGate::new(),
        })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        self.setup_send_button()?;
        self.setup_enter_key()?;
        self.setup_clear_button()?;
        self.render_all()
    }

    pub fn dispatch(&self, command: ChatCommand) -> Result<(), JsValue> {
        match command {
            ChatCommand::Send { content } => self.start_turn(&content, TurnRequest::Chat),
            ChatCommand::Clear => self.clear(),
            ChatCommand::AskAboutConcerns { concerns } => {
                if concerns.is_empty() {
                    return Ok(());
                }
                let prompt = utils::concerns_prompt(&concerns);
                self.start_turn(&prompt, TurnRequest::Advice(concerns))
            }
        }
    }

    fn setup_send_button(&self) -> Result<(), JsValue> {
        let button = dom::get_element_by_id(&self.document, SEND_ID)?;
        let widget = self.clone();

        let closure = Closure::wrap(Box::new(move || {
            if let Err(e) = widget.send_from_input() {
                log::error!("Failed to send message: {:?}", e);
            }
        }) as Box<dyn FnMut()>);

        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_enter_key(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, INPUT_ID)?;
        let widget = self.clone();

        let closure = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                if let Err(e) = widget.send_from_input() {
                    log::error!("Failed to send message: {:?}", e);
                }
            }
        }) as Box<dyn FnMut(_)>);

        input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_clear_button(&self) -> Result<(), JsValue> {
        // Optional on pages that only embed the transcript
        let Some(button) = self.document.get_element_by_id(CLEAR_ID) else {
            return Ok(());
        };
        let widget = self.clone();

        let closure = Closure::wrap(Box::new(move || {
            if let Err(e) = widget.clear() {
                log::error!("Failed to clear chat: {:?}", e);
            }
        }) as Box<dyn FnMut()>);

        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn send_from_input(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, INPUT_ID)?;
        let content = input.value();
        if self.gate.is_busy() || content.trim().is_empty() {
            return Ok(());
        }

        input.set_value("");
        self.start_turn(&content, TurnRequest::Chat)
    }

    fn start_turn(&self, content: &str, request: TurnRequest) -> Result<(), JsValue> {
        let guard = acquire_turn(&self.gate).map_err(JsValue::from_str)?;

        let pending = begin_turn(&mut *self.manager.borrow_mut(), content);
        let Some(pending) = pending else {
            return Ok(());
        };

        self.append_message(pending.user_message())?;
        self.set_busy(true);

        let widget = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match request {
                TurnRequest::Chat => {
                    widget
                        .backend
                        .reply(pending.content(), pending.context())
                        .await
                }
                TurnRequest::Advice(concerns) => widget.backend.skin_advice(&concerns).await,
            };

            let outcome = complete_turn(&mut *widget.manager.borrow_mut(), pending, result);
            if let Err(e) = widget.append_message(outcome.message()) {
                log::error!("Failed to render reply: {:?}", e);
            }

            widget.set_busy(false);
            drop(guard);
        });

        Ok(())
    }

    fn clear(&self) -> Result<(), JsValue> {
        if self.gate.is_busy() {
            return Err(JsValue::from_str(BUSY_ERROR));
        }

        self.manager.borrow_mut().clear_chat();
        log::info!("Chat history cleared");
        self.render_all()
    }

    fn render_all(&self) -> Result<(), JsValue> {
        let container = dom::get_element_by_id(&self.document, MESSAGES_ID)?;
        dom::clear_element(&container);

        let manager = self.manager.borrow();
        for message in manager.messages() {
            self.render_message(&container, message)?;
        }

        dom::scroll_to_bottom(&container);
        Ok(())
    }

    fn append_message(&self, message: &ChatMessage) -> Result<(), JsValue> {
        let container = dom::get_element_by_id(&self.document, MESSAGES_ID)?;
        self.render_message(&container, message)?;
        dom::scroll_to_bottom(&container);
        Ok(())
    }

    fn render_message(
        &self,
        container: &web_sys::Element,
        message: &ChatMessage,
    ) -> Result<(), JsValue> {
        let sender = message.sender().as_str();
        let msg_div =
            dom::create_element_with_class(&self.document, "div", &format!("message {}", sender))?;
        msg_div.set_attribute("data-message-id", message.id())?;

        let use_markdown = !message.is_from_user();
        let content_html = markdown::render_message_content(message.content(), use_markdown);
        let markdown_class = if use_markdown { " markdown" } else { "" };

        let html = format!(
            r#"<div class="message-content{}">{}</div><div class="message-time">{}</div>"#,
            markdown_class,
            content_html,
            utils::format_time(&message.timestamp())
        );
        msg_div.set_inner_html(&html);
        container.append_child(&msg_div)?;

        Ok(())
    }

    fn set_busy(&self, busy: bool) {
        if let Ok(button) = dom::get_button_by_id(&self.document, SEND_ID) {
            button.set_disabled(busy);
        }
        if let Ok(input) = dom::get_textarea_by_id(&self.document, INPUT_ID) {
            input.set_disabled(busy);
        }
        if let Ok(button) = dom::get_button_by_id(&self.document, CLEAR_ID) {
            button.set_disabled(busy);
        }
        dom::set_visible(&self.document, TYPING_ID, busy);
    }
}

/// Commands arriving while a reply is pending are rejected, not queued
fn acquire_turn(gate: &TurnGate) -> Result<TurnGuard, &'static str> {
    gate.try_acquire().ok_or(BUSY_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_turn_is_rejected_while_pending() {
        let gate = TurnGate::new();
        let guard = acquire_turn(&gate).unwrap();
        assert_eq!(acquire_turn(&gate).unwrap_err(), BUSY_ERROR);

        drop(guard);
        assert!(acquire_turn(&gate).is_ok());
    }
}
