use crate::session::{ChatSession, ConversationEntry, SessionState};
use crate::views::{ChatView, Sidebar};
use dioxus::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

const STYLES: &str = include_str!("../assets/convopro.css");

/// Session handle shared with the UI through the root context.
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Copies session state and a fresh conversation list into the view signals.
async fn publish(
    session: &ChatSession,
    mut snapshot: Signal<SessionState>,
    mut conversations: Signal<Vec<ConversationEntry>>,
    mut notice: Signal<Option<String>>,
) {
    snapshot.set(session.state().clone());
    match session.list_conversations().await {
        Ok(list) => conversations.set(list),
        Err(err) => {
            error!(error = %err, "failed to list conversations");
            notice.set(Some(format!("Could not load conversations: {err}")));
        }
    }
}

#[component]
pub fn App() -> Element {
    let session = use_context::<SharedSession>();
    let snapshot = use_signal(SessionState::default);
    let conversations = use_signal(Vec::<ConversationEntry>::new);
    let mut models = use_signal(Vec::<String>::new);
    let mut notice = use_signal(|| Option::<String>::None);
    let mut pending = use_signal(|| Option::<String>::None);
    let mut busy = use_signal(|| false);

    {
        let session = session.clone();
        use_future(move || {
            let session = session.clone();
            async move {
                let mut guard = session.lock().await;
                match guard.models().await {
                    Ok(list) => models.set(list.to_vec()),
                    Err(err) => {
                        error!(error = %err, "failed to load model catalog");
                        notice.set(Some(format!("Could not reach Ollama: {err}")));
                    }
                }
                publish(&guard, snapshot, conversations, notice).await;
            }
        });
    }

    let on_new = {
        let session = session.clone();
        move |_: ()| {
            if busy() {
                return;
            }
            let session = session.clone();
            spawn(async move {
                let mut guard = session.lock().await;
                guard.start_new_conversation();
                publish(&guard, snapshot, conversations, notice).await;
            });
        }
    };

    let on_select = {
        let session = session.clone();
        move |id: String| {
            if busy() {
                return;
            }
            let session = session.clone();
            spawn(async move {
                let mut guard = session.lock().await;
                if let Err(err) = guard.select_conversation(&id).await {
                    error!(id = %id, error = %err, "failed to open conversation");
                    notice.set(Some(format!("Could not open conversation: {err}")));
                }
                publish(&guard, snapshot, conversations, notice).await;
            });
        }
    };

    let on_delete = {
        let session = session.clone();
        move |id: String| {
            if busy() {
                return;
            }
            let session = session.clone();
            spawn(async move {
                let mut guard = session.lock().await;
                if let Err(err) = guard.delete_conversation(&id).await {
                    error!(id = %id, error = %err, "failed to delete conversation");
                    notice.set(Some(format!("Could not delete conversation: {err}")));
                }
                publish(&guard, snapshot, conversations, notice).await;
            });
        }
    };

    let on_model = {
        let session = session.clone();
        move |model: String| {
            let session = session.clone();
            spawn(async move {
                let mut guard = session.lock().await;
                guard.select_model(model);
                publish(&guard, snapshot, conversations, notice).await;
            });
        }
    };

    let on_submit = {
        let session = session.clone();
        move |text: String| {
            if busy() || text.trim().is_empty() {
                return;
            }
            let Some(model) = snapshot.read().selected_model().map(str::to_string) else {
                notice.set(Some("Select a model before sending a message.".to_string()));
                return;
            };
            busy.set(true);
            notice.set(None);
            pending.set(Some(text.clone()));

            let session = session.clone();
            spawn(async move {
                let mut guard = session.lock().await;
                match guard.submit_user_message(&model, &text).await {
                    Ok(Some(outcome)) => debug!(
                        id = %outcome.conversation_id,
                        started = outcome.started_conversation,
                        failed = outcome.answer_error.is_some(),
                        "turn completed"
                    ),
                    Ok(None) => {}
                    Err(err) => {
                        error!(error = %err, "failed to save message");
                        notice.set(Some(format!("Message was not saved: {err}")));
                    }
                }
                pending.set(None);
                publish(&guard, snapshot, conversations, notice).await;
                busy.set(false);
            });
        }
    };

    rsx! {
        style { dangerous_inner_html: "{STYLES}" }
        div { class: "app-container",
            Sidebar {
                conversations,
                on_new,
                on_select,
                on_delete,
            }
            div { class: "main-column",
                div { class: "header",
                    h1 { class: "app-title", "💬 ConvoPro - Chat with LLMs/Local ChatGpt Clone" }
                    ModelPicker { models, snapshot, on_model }
                }
                if let Some(message) = notice() {
                    div { class: "notice",
                        span { "{message}" }
                        button {
                            class: "notice-dismiss",
                            r#type: "button",
                            onclick: move |_| notice.set(None),
                            "×"
                        }
                    }
                }
                ChatView {
                    snapshot,
                    pending,
                    busy,
                    on_submit,
                }
            }
        }
    }
}

#[component]
fn ModelPicker(
    models: Signal<Vec<String>>,
    snapshot: Signal<SessionState>,
    on_model: EventHandler<String>,
) -> Element {
    let selected = snapshot.read().selected_model().unwrap_or_default().to_string();
    let options = models();
    rsx! {
        label { class: "model-picker",
            span { "Select LLM Model" }
            select {
                value: "{selected}",
                disabled: options.is_empty(),
                onchange: move |ev| on_model.call(ev.value()),
                if options.is_empty() {
                    option { value: "", "No models available" }
                }
                for model in options.iter() {
                    option {
                        value: "{model}",
                        selected: *model == selected,
                        "{model}"
                    }
                }
            }
        }
    }
}
