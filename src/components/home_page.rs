use dioxus::prelude::*;
use crate::Route;

#[component]
pub fn HomeComponent() -> Element {
    let app_state = use_context::<crate::components::AppState>();
    let username = app_state.session.read().username().map(str::to_string);

    rsx! {
        div { class: "page-container py-8 animate-fade-in",
            div { class: "page-header",
                h1 { class: "page-title", "Welcome to Recipes!" }
                p { class: "text-[var(--text-secondary)]", "Share what you cook." }
            }
            if let Some(username) = username {
                Link {
                    to: Route::ProfileComponent { username: username.clone() },
                    class: "btn btn-primary",
                    "Go to your profile"
                }
            } else {
                div { class: "empty-state",
                    p { class: "empty-state-text", "You are not signed in" }
                }
            }
        }
    }
}
