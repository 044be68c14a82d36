//! Bare HTML forms for the login, register and upload steps.
//! Charts are rendered client-side from the JSON reports.

use serde::Deserialize;
use warp::reply::{html, Html};

/// `?flash=<code>` carried across a redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    pub flash: Option<String>,
}

impl FlashQuery {
    /// Fixed text for a known flash code; unknown codes show nothing.
    fn message(&self) -> Option<(&'static str, &'static str)> {
        let msg = match self.flash.as_deref()? {
            "invalid_login" => ("danger", "Invalid username or password"),
            "user_exists" => ("danger", "Username already exists. Try a different one."),
            "registered" => ("success", "Account created! Please log in."),
            "uploaded" => ("success", "File uploaded and added to the dataset successfully!"),
            "not_csv" => ("danger", "Only CSV files are allowed."),
            "no_file" => ("danger", "No file was attached."),
            "upload_failed" => ("danger", "The file could not be read as a CSV table."),
            _ => return None,
        };
        Some(msg)
    }
}

pub fn login(q: FlashQuery) -> Html<String> {
    page(
        "Login",
        &q,
        r#"<form method="post" action="/login">
  <input name="username" placeholder="Username" required>
  <input name="password" type="password" placeholder="Password" required>
  <button type="submit">Log in</button>
</form>
<p><a href="/register">Create an account</a></p>"#,
    )
}

pub fn register(q: FlashQuery) -> Html<String> {
    page(
        "Register",
        &q,
        r#"<form method="post" action="/register">
  <input name="username" placeholder="Username" required>
  <input name="password" type="password" placeholder="Password" required>
  <button type="submit">Register</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
    )
}

pub fn home(user: &str, q: FlashQuery) -> Html<String> {
    let body = format!(
        r#"<p>Welcome, {}</p>
<form method="post" action="/upload" enctype="multipart/form-data">
  <input type="file" name="file" accept=".csv" required>
  <button type="submit">Upload</button>
</form>
<nav><a href="/dashboard">Dashboard</a> | <a href="/predict">Prediction</a> | <a href="/logout">Logout</a></nav>"#,
        escape(user)
    );
    page("Upload", &q, &body)
}

fn page(title: &str, q: &FlashQuery, body: &str) -> Html<String> {
    let flash = q
        .message()
        .map(|(kind, text)| format!(r#"<div class="alert alert-{}">{}</div>"#, kind, text))
        .unwrap_or_default();
    html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Coursecast - {title}</title></head>\n<body>\n<h1>{title}</h1>\n{flash}\n{body}\n</body>\n</html>\n",
        title = title,
        flash = flash,
        body = body
    ))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
