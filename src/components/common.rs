use dioxus::prelude::*;
use crate::backend::model::{avatar_from_upload, Plan, RecipeSummary};

/// JS string literal for `text`.
fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Blocking browser confirm dialog.
pub async fn confirm(message: &str) -> bool {
    let mut eval = document::eval(&format!("dioxus.send(window.confirm({}));", js_string(message)));
    match eval.recv::<bool>().await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!("Confirm dialog failed: {:?}", e);
            false
        }
    }
}

/// Blocking browser alert dialog.
pub fn alert(message: &str) {
    let mut eval = document::eval(&format!("window.alert({}); dioxus.send(true);", js_string(message)));
    spawn(async move {
        let _ = eval.recv::<serde_json::Value>().await;
    });
}

#[component]
pub fn Spinner(#[props(default)] small: bool) -> Element {
    let size = if small { "spinner spinner-small" } else { "spinner" };
    rsx! {
        div { class: "{size}", role: "progressbar" }
    }
}

#[component]
pub fn Avatar(#[props(!optional)] src: Option<String>, initials: String, #[props(default)] large: bool) -> Element {
    let size = if large { "avatar avatar-large" } else { "avatar" };
    rsx! {
        div { class: "{size}",
            if let Some(src) = src {
                img { src: "{src}", alt: "{initials}", class: "w-full h-full object-cover rounded-inherit" }
            } else {
                span { class: "avatar-initials", "{initials}" }
            }
        }
    }
}

#[component]
pub fn RecipeCard(recipe: RecipeSummary) -> Element {
    rsx! {
        a { class: "recipe-card card", href: "/recipes/{recipe.id}",
            div { class: "recipe-card-image",
                if let Some(url) = recipe.image_url.clone() {
                    img { src: "{url}", alt: "{recipe.name}", class: "w-full h-full object-cover" }
                } else {
                    div { class: "recipe-card-placeholder", "🍽" }
                }
            }
            h3 { class: "recipe-card-title", "{recipe.name}" }
            if !recipe.summary.is_empty() {
                p { class: "recipe-card-summary", "{recipe.summary}" }
            }
        }
    }
}

/// Avatar picker. Reads the chosen file in the page and hands back a `data:` URL.
#[component]
pub fn UploadImage(#[props(!optional)] avatar: Option<String>, initials: String, on_change: EventHandler<String>) -> Element {
    let mut upload_error = use_signal(|| None::<String>);

    use_effect(move || {
        let mut eval = document::eval(r#"
            setTimeout(() => {
                const input = document.getElementById('avatar-upload-input');
                if (input) {
                    input.addEventListener('change', (e) => {
                        const file = e.target.files[0];
                        if (!file) return;

                        const reader = new FileReader();
                        reader.onload = (evt) => {
                            const b64 = evt.target.result.split(',')[1];
                            dioxus.send({ mime: file.type, data: b64 });
                        };
                        reader.readAsDataURL(file);
                    });
                }
            }, 300);
        "#);

        spawn(async move {
            while let Ok(msg) = eval.recv::<serde_json::Value>().await {
                let mime = msg.get("mime").and_then(|v| v.as_str()).unwrap_or_default();
                let data = msg.get("data").and_then(|v| v.as_str()).unwrap_or_default();
                match avatar_from_upload(mime, data) {
                    Ok(url) => {
                        upload_error.set(None);
                        on_change.call(url);
                    }
                    Err(e) => {
                        tracing::warn!("Rejected avatar upload: {}", e);
                        upload_error.set(Some(e.to_string()));
                    }
                }
            }
        });
    });

    rsx! {
        div { class: "upload-image",
            label { class: "upload-image-label", r#for: "avatar-upload-input",
                Avatar { src: avatar, initials, large: true }
                span { class: "upload-image-hint", "Change photo" }
            }
            input {
                id: "avatar-upload-input",
                r#type: "file",
                accept: "image/*",
                class: "hidden",
            }
            if let Some(err) = upload_error() {
                p { class: "form-error", "{err}" }
            }
        }
    }
}

/// Upsell button listing the tiers above `current`. Payment capture is owned by the
/// payments service; picking a tier reports it through `on_success`.
#[component]
pub fn PlansPopover(current: Plan, on_success: EventHandler<Plan>) -> Element {
    let mut open = use_signal(|| false);

    rsx! {
        div { class: "plans-popover",
            button {
                class: "btn btn-upsell",
                onclick: move |_| open.set(!open()),
                "Want more? Go premium!"
            }
            if open() {
                div { class: "panel plans-panel animate-fade-in",
                    for plan in current.upgrades() {
                        div { key: "{plan}", class: "card plan-option",
                            h3 { class: "panel-title", "{plan}" }
                            p { class: "plan-price", "{plan.monthly_price()} / month" }
                            button {
                                class: "btn btn-primary",
                                onclick: move |_| {
                                    open.set(false);
                                    on_success.call(plan);
                                },
                                "Choose {plan}"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("it's \"quoted\"\n"), "\"it's \\\"quoted\\\"\\n\"");
    }
}
