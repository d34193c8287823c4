use crate::session::SessionState;
use crate::types::{ChatMessage, Role};
use crate::views::shared::{format_message_time, markdown_to_html};
use dioxus::events::Key;
use dioxus::prelude::*;

fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[component]
pub fn ChatView(
    snapshot: Signal<SessionState>,
    pending: Signal<Option<String>>,
    busy: Signal<bool>,
    on_submit: EventHandler<String>,
) -> Element {
    let mut input = use_signal(String::new);

    let mut send = move |text: String| {
        if text.trim().is_empty() || busy() {
            return;
        }
        input.set(String::new());
        on_submit.call(text);
    };

    let state = snapshot();
    let waiting = pending();
    let title = state.conversation_title().map(str::to_string);

    rsx! {
        div { class: "chat-wrap",
            if let Some(title) = title {
                h3 { class: "conversation-heading", "{title}" }
            }
            div { id: "chat-list", class: "chat-list",
                if state.history().is_empty() && waiting.is_none() {
                    div { class: "chat-empty", "Start a conversation by typing a message below." }
                }
                for (i, msg) in state.history().iter().enumerate() {
                    MessageBubble { key: "{i}", message: msg.clone(), sent_at: state.sent_at(i) }
                }
                if let Some(text) = waiting.clone() {
                    MessageBubble { message: ChatMessage::user(text), sent_at: None }
                    div { class: "message-row assistant",
                        div { class: "avatar assistant", "AI" }
                        div { class: "shimmer-line",
                            span { class: "shimmer-text", "Thinking…" }
                        }
                    }
                }
            }
        }

        form { class: "composer",
            onsubmit: move |ev| ev.prevent_default(),
            div { class: "composer-inner",
                textarea {
                    rows: "1",
                    placeholder: "Type your message here...",
                    value: "{input}",
                    oninput: move |ev| input.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                            ev.prevent_default();
                            send(input());
                        }
                    },
                    disabled: busy(),
                    autofocus: true,
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy() || input().trim().is_empty(),
                    onclick: move |_| send(input()),
                    "Send"
                }
            }
        }
    }
}

#[component]
fn MessageBubble(message: ChatMessage, sent_at: Option<i64>) -> Element {
    let class = role_class(message.role);
    let timestamp = format_message_time(sent_at);
    let html = match message.role {
        Role::Assistant => markdown_to_html(&message.content),
        Role::User => String::new(),
    };
    rsx! {
        div { class: "message-row {class}",
            if message.role == Role::Assistant {
                div { class: "avatar assistant", "AI" }
            }
            div { class: "bubble {class}",
                if message.role == Role::Assistant {
                    div { class: "md", dangerous_inner_html: "{html}" }
                } else {
                    "{message.content}"
                }
            }
        }
        if let Some(ts) = timestamp {
            div { class: "message-meta {class}",
                span { class: "message-timestamp", "{ts}" }
            }
        }
    }
}
