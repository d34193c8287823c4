use crate::session::ConversationEntry;
use crate::views::shared::format_updated_at;
use dioxus::prelude::*;

#[component]
pub fn Sidebar(
    conversations: Signal<Vec<ConversationEntry>>,
    on_new: EventHandler<()>,
    on_select: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    let entries = conversations();

    rsx! {
        div { class: "sidebar",
            h2 { class: "sidebar-title", "💬 Chat History" }
            button {
                class: "new-chat-btn",
                r#type: "button",
                onclick: move |_| on_new.call(()),
                "➕ New Chat"
            }
            div { class: "conversation-list",
                if entries.is_empty() {
                    div { class: "conversation-empty", "No conversations yet" }
                }
                for entry in entries.iter() {
                    ConversationRow {
                        key: "{entry.id}",
                        entry: entry.clone(),
                        on_select,
                        on_delete,
                    }
                }
            }
        }
    }
}

#[component]
fn ConversationRow(
    entry: ConversationEntry,
    on_select: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    let label = if entry.is_active {
        format!("📌 {}", entry.title)
    } else {
        entry.title.clone()
    };
    let updated = format_updated_at(entry.updated_at);
    let select_id = entry.id.clone();
    let delete_id = entry.id.clone();

    rsx! {
        div { class: format_args!("conversation-row {}", if entry.is_active { "active" } else { "" }),
            button {
                class: "conversation-open",
                r#type: "button",
                title: "{entry.title}",
                onclick: move |_| on_select.call(select_id.clone()),
                span { class: "conversation-title", "{label}" }
                if let Some(updated) = updated {
                    span { class: "conversation-updated", "{updated}" }
                }
            }
            button {
                class: "conversation-delete",
                r#type: "button",
                title: "Delete conversation",
                onclick: move |ev| {
                    ev.stop_propagation();
                    on_delete.call(delete_id.clone());
                },
                "🗑"
            }
        }
    }
}
