//! Server-rendered HTML pages

/// What a reply page shows under the question
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    /// Text produced by a model
    Answer(&'a str),
    /// Validation message or apology, styled as a notice
    Notice(&'a str),
}

/// Form description for prompt pages
pub struct PromptForm<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub field: &'a str,
    pub placeholder: &'a str,
    pub multiline: bool,
}

const STYLE: &str = "*{box-sizing:border-box}\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;max-width:720px;margin:40px auto;padding:0 20px;color:#1d1d1f;background:#fafafa}\
h1{font-size:1.6rem}\
nav a,.links a{margin-right:16px}\
form{display:flex;flex-direction:column;gap:12px;margin:24px 0}\
input,textarea{font:inherit;padding:10px;border:1px solid #ccc;border-radius:8px}\
textarea{min-height:120px}\
button{font:inherit;padding:10px 18px;border:0;border-radius:8px;background:#2563eb;color:#fff;cursor:pointer;align-self:flex-start}\
.question{color:#555;font-style:italic}\
.answer{white-space:pre-wrap;background:#fff;border:1px solid #e5e5e5;border-radius:8px;padding:16px}\
.notice{background:#fff7ed;border:1px solid #fdba74;border-radius:8px;padding:16px}";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/main">Menu</a></nav>
{body}
</body>
</html>"#,
        title = html_escape(title),
        style = STYLE,
        body = body,
    )
}

pub fn index_page() -> String {
    layout(
        "Prompt Portal",
        r#"<h1>Prompt Portal</h1>
<p>Ask hosted language models, run a regression model or chat with the Telegram bot.</p>
<form action="/main" method="post"><input type="text" name="q" placeholder="Your name (optional)"><button type="submit">Enter</button></form>"#,
    )
}

pub fn main_page() -> String {
    layout(
        "Menu",
        r#"<h1>Choose a tool</h1>
<div class="links">
<a href="/llama">Llama chat</a>
<a href="/deepseek">DeepSeek reasoning</a>
<a href="/dbs">DBS prediction</a>
<a href="/telegram">Telegram bot</a>
</div>"#,
    )
}

pub fn prompt_form_page(form: &PromptForm<'_>) -> String {
    let input = if form.multiline {
        format!(
            r#"<textarea name="{field}" placeholder="{placeholder}" required></textarea>"#,
            field = html_escape(form.field),
            placeholder = html_escape(form.placeholder),
        )
    } else {
        format!(
            r#"<input type="text" name="{field}" placeholder="{placeholder}" required>"#,
            field = html_escape(form.field),
            placeholder = html_escape(form.placeholder),
        )
    };

    layout(
        form.title,
        &format!(
            r#"<h1>{title}</h1>
<form action="{action}" method="post">
{input}
<button type="submit">Submit</button>
</form>"#,
            title = html_escape(form.title),
            action = html_escape(form.action),
            input = input,
        ),
    )
}

pub fn reply_page(title: &str, question: Option<&str>, outcome: Outcome<'_>, back: &str) -> String {
    let question_html = question
        .filter(|q| !q.trim().is_empty())
        .map(|q| format!(r#"<p class="question">{}</p>"#, html_escape(q)))
        .unwrap_or_default();

    let outcome_html = match outcome {
        Outcome::Answer(text) => format!(r#"<div class="answer">{}</div>"#, html_escape(text)),
        Outcome::Notice(text) => format!(r#"<div class="notice">{}</div>"#, html_escape(text)),
    };

    layout(
        title,
        &format!(
            r#"<h1>{title}</h1>
{question_html}
{outcome_html}
<p><a href="{back}">Ask again</a></p>"#,
            title = html_escape(title),
            question_html = question_html,
            outcome_html = outcome_html,
            back = html_escape(back),
        ),
    )
}

pub fn dbs_page() -> String {
    layout(
        "DBS Prediction",
        r#"<h1>DBS Prediction</h1>
<p>Enter the input value for the regression model.</p>
<form action="/prediction" method="post">
<input type="number" step="any" name="q" placeholder="e.g. 1.35" required>
<button type="submit">Predict</button>
</form>"#,
    )
}

pub fn telegram_page(bot_link: &str) -> String {
    layout(
        "Telegram Bot",
        &format!(
            r#"<h1>Telegram Bot</h1>
<p>Chat with the bot on Telegram. Send <code>/help</code> to see what it can do.</p>
<p><a href="{link}" target="_blank" rel="noopener">{link}</a></p>"#,
            link = html_escape(bot_link),
        ),
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
