//! Bot command parsing and update dispatch

use teloxide::types::{Message, Update, UpdateKind};
use teloxide::utils::command::{BotCommands, ParseError};
use tracing::{info, warn};

use crate::text::{format_number, strip_think};
use crate::AppState;

pub const WELCOME_TEXT: &str = "Hi! I relay your questions to hosted language models and a small regression model.\n\n\
/deepseek <question> - ask the DeepSeek reasoning model\n\
/llama <question> - ask the Llama chat model\n\
/predict <number> - run the DBS regression model\n\
/help - show this list\n\n\
Any other text goes to the chat model.";

pub const APOLOGY_TEXT: &str = "Sorry, something went wrong while handling your request. Please try again later.";

/// Commands the bot understands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "this help")]
    Help,
    #[command(description = "reasoning model answer (thinking removed)")]
    DeepSeek(String),
    #[command(description = "chat model answer")]
    Llama(String),
    #[command(description = "regression prediction, e.g. /predict 3.5")]
    Predict(String),
}

impl Command {
    fn trim_args(self) -> Self {
        match self {
            Command::DeepSeek(args) => Command::DeepSeek(args.trim().to_string()),
            Command::Llama(args) => Command::Llama(args.trim().to_string()),
            Command::Predict(args) => Command::Predict(args.trim().to_string()),
            other => other,
        }
    }
}

/// Help listing generated from the command descriptions
pub fn help_text() -> String {
    Command::descriptions().to_string()
}

/// A text message, classified
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Command(Command),
    /// Slash command we do not know, without the slash
    UnknownCommand(String),
    /// Text that is not a command
    Text(String),
}

impl Incoming {
    /// `None` for blank messages and commands addressed to another bot
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if !text.starts_with('/') {
            return Some(Incoming::Text(text.to_string()));
        }

        match Command::parse(text, bot_username.trim_start_matches('@')) {
            Ok(command) => Some(Incoming::Command(command.trim_args())),
            Err(ParseError::WrongBotName(name)) => {
                info!(bot = %name, "Ignoring command addressed to another bot");
                None
            }
            Err(_) => Some(Incoming::UnknownCommand(command_name(text))),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Incoming::Command(Command::Start) => "start",
            Incoming::Command(Command::Help) => "help",
            Incoming::Command(Command::DeepSeek(_)) => "deepseek",
            Incoming::Command(Command::Llama(_)) => "llama",
            Incoming::Command(Command::Predict(_)) => "predict",
            Incoming::UnknownCommand(_) => "unknown",
            Incoming::Text(_) => "text",
        }
    }
}

/// `/weather@somebot Paris` -> `weather`
fn command_name(text: &str) -> String {
    let head = text.split_whitespace().next().unwrap_or(text);
    let head = head.trim_start_matches('/');
    head.split('@').next().unwrap_or(head).to_string()
}

/// A reply the webhook should deliver
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingReply {
    pub chat_id: i64,
    pub text: String,
}

/// The message an update carries, new or edited
pub fn incoming_message(update: &Update) -> Option<&Message> {
    match &update.kind {
        UpdateKind::Message(message) | UpdateKind::EditedMessage(message) => Some(message),
        _ => None,
    }
}

/// Work out the reply for an update; `None` when there is nothing to answer
pub async fn handle_update(state: &AppState, update: &Update) -> Option<OutgoingReply> {
    let message = incoming_message(update)?;
    let incoming = Incoming::parse(message.text()?, &state.settings.telegram.bot_username)?;

    info!(
        update_id = update.id.0,
        chat_id = message.chat.id.0,
        command = incoming.label(),
        "Dispatching Telegram message"
    );

    let text = reply_for(state, incoming).await;

    Some(OutgoingReply {
        chat_id: message.chat.id.0,
        text,
    })
}

pub async fn reply_for(state: &AppState, incoming: Incoming) -> String {
    let command = match incoming {
        Incoming::Command(command) => command,
        Incoming::Text(prompt) => {
            let model = state.settings.completion.chat_model.clone();
            return ask_model(state, &model, &prompt, false).await;
        }
        Incoming::UnknownCommand(name) => {
            return format!("Unknown command /{}. Send /help for the list.", name)
        }
    };

    match command {
        Command::Start => WELCOME_TEXT.to_string(),
        Command::Help => help_text(),
        Command::DeepSeek(prompt) if prompt.is_empty() => {
            "Usage: /deepseek <question>".to_string()
        }
        Command::DeepSeek(prompt) => {
            let model = state.settings.completion.reasoning_model.clone();
            ask_model(state, &model, &prompt, true).await
        }
        Command::Llama(prompt) if prompt.is_empty() => "Usage: /llama <question>".to_string(),
        Command::Llama(prompt) => {
            let model = state.settings.completion.chat_model.clone();
            ask_model(state, &model, &prompt, false).await
        }
        Command::Predict(args) => predict_reply(state, &args),
    }
}

async fn ask_model(state: &AppState, model: &str, prompt: &str, reasoning: bool) -> String {
    match state.completion.complete(model, prompt).await {
        Ok(reply) => {
            let reply = if reasoning { strip_think(&reply) } else { reply.trim().to_string() };
            if reply.is_empty() {
                "The model returned an empty answer.".to_string()
            } else {
                reply
            }
        }
        Err(e) => {
            warn!(model = %model, error = %e, "Completion failed for Telegram message");
            APOLOGY_TEXT.to_string()
        }
    }
}

fn predict_reply(state: &AppState, args: &str) -> String {
    let Some(predictor) = state.predictor.as_ref() else {
        return "The prediction model is not available right now.".to_string();
    };

    let features: Option<Vec<f64>> = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();

    let features = match features {
        Some(f) if f.len() == predictor.n_features() => f,
        _ => {
            return format!(
                "Usage: /predict <number>{}",
                if predictor.n_features() > 1 {
                    format!(" (exactly {} numbers)", predictor.n_features())
                } else {
                    String::new()
                }
            )
        }
    };

    match predictor.predict(&features) {
        Ok(value) => format!("Prediction: {}", format_number(value)),
        Err(e) => {
            warn!(error = %e, "Prediction failed for Telegram message");
            APOLOGY_TEXT.to_string()
        }
    }
}
