//! HTML form pages and their reply pages
//!
//! Every route accepts GET and POST. Form fields are read from the body on
//! POST and from the query string on GET.

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::response::html::{self, Outcome, PromptForm};
use crate::text::{format_number, strip_think};
use crate::AppState;

const GENERIC_ERROR: &str = "Sorry, something went wrong while contacting the service. Please try again later.";

/// Form with a `q` field (menu, llama, prediction)
#[derive(Debug, Default, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub q: Option<String>,
}

/// Form with a `prompt` field (deepseek)
#[derive(Debug, Default, Deserialize)]
pub struct PromptField {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Missing or malformed forms behave like empty ones
fn read_form<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(value)) => value,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable form submission");
            T::default()
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn index() -> Html<String> {
    Html(html::index_page())
}

pub async fn main_menu(form: Result<Form<QueryForm>, FormRejection>) -> Html<String> {
    if let Some(q) = non_blank(read_form(form).q) {
        debug!(q = %q, "Menu visited");
    }
    Html(html::main_page())
}

pub async fn llama() -> Html<String> {
    Html(html::prompt_form_page(&PromptForm {
        title: "Llama",
        action: "/llama_reply",
        field: "q",
        placeholder: "Ask the Llama model anything",
        multiline: false,
    }))
}

pub async fn llama_reply(
    State(state): State<Arc<AppState>>,
    form: Result<Form<QueryForm>, FormRejection>,
) -> Html<String> {
    let Some(prompt) = non_blank(read_form(form).q) else {
        return Html(html::reply_page(
            "Llama",
            None,
            Outcome::Notice("Please enter a question."),
            "/llama",
        ));
    };

    let model = &state.settings.completion.chat_model;
    info!(model = %model, prompt_len = prompt.len(), "Received llama reply request");

    let page = match state.completion.complete(model, &prompt).await {
        Ok(reply) => html::reply_page("Llama", Some(prompt.as_str()), Outcome::Answer(reply.trim()), "/llama"),
        Err(e) => {
            error!(model = %model, error = %e, "Llama completion failed");
            html::reply_page("Llama", Some(prompt.as_str()), Outcome::Notice(GENERIC_ERROR), "/llama")
        }
    };

    Html(page)
}

pub async fn deepseek() -> Html<String> {
    Html(html::prompt_form_page(&PromptForm {
        title: "DeepSeek",
        action: "/deepseek_reply",
        field: "prompt",
        placeholder: "Ask the DeepSeek reasoning model",
        multiline: true,
    }))
}

pub async fn deepseek_reply(
    State(state): State<Arc<AppState>>,
    form: Result<Form<PromptField>, FormRejection>,
) -> Html<String> {
    let Some(prompt) = non_blank(read_form(form).prompt) else {
        return Html(html::reply_page(
            "DeepSeek",
            None,
            Outcome::Notice("Please enter a prompt."),
            "/deepseek",
        ));
    };

    let model = &state.settings.completion.reasoning_model;
    info!(model = %model, prompt_len = prompt.len(), "Received deepseek reply request");

    let page = match state.completion.complete(model, &prompt).await {
        Ok(reply) => {
            let answer = strip_think(&reply);
            let outcome = if answer.is_empty() {
                Outcome::Notice("The model returned an empty answer.")
            } else {
                Outcome::Answer(&answer)
            };
            html::reply_page("DeepSeek", Some(prompt.as_str()), outcome, "/deepseek")
        }
        Err(e) => {
            error!(model = %model, error = %e, "DeepSeek completion failed");
            html::reply_page("DeepSeek", Some(prompt.as_str()), Outcome::Notice(GENERIC_ERROR), "/deepseek")
        }
    };

    Html(page)
}

pub async fn dbs() -> Html<String> {
    Html(html::dbs_page())
}

pub async fn prediction(
    State(state): State<Arc<AppState>>,
    form: Result<Form<QueryForm>, FormRejection>,
) -> Html<String> {
    const TITLE: &str = "DBS Prediction";

    let raw = non_blank(read_form(form).q);
    let Some(value) = raw
        .as_deref()
        .and_then(|q| q.parse::<f64>().ok())
        .filter(|v| v.is_finite())
    else {
        return Html(html::reply_page(
            TITLE,
            raw.as_deref(),
            Outcome::Notice("Please enter a valid number."),
            "/dbs",
        ));
    };
    let question = format!("Input: {}", format_number(value));

    let Some(predictor) = state.predictor.as_ref() else {
        error!("Prediction requested but no regression model is loaded");
        return Html(html::reply_page(
            TITLE,
            Some(question.as_str()),
            Outcome::Notice("The prediction model is not available right now."),
            "/dbs",
        ));
    };

    let page = match predictor.predict(&[value]) {
        Ok(result) => {
            info!(model = %predictor.name(), input = value, output = result, "Prediction served");
            let answer = format!("Predicted value: {}", format_number(result));
            html::reply_page(TITLE, Some(question.as_str()), Outcome::Answer(&answer), "/dbs")
        }
        Err(e) => {
            error!(model = %predictor.name(), error = %e, "Prediction failed");
            html::reply_page(TITLE, Some(question.as_str()), Outcome::Notice(GENERIC_ERROR), "/dbs")
        }
    };

    Html(page)
}

pub async fn telegram(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(html::telegram_page(&state.settings.telegram.bot_link()))
}
