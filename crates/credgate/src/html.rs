//! The single HTML page served for browser clients.

use std::fmt::Write;

use axum::response::Html;
use credgate_core::PublicUser;

/// Banner shown above the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Green banner.
    Success,
    /// Red banner.
    Error,
}

impl Tone {
    const fn class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Render the page with an optional banner and user detail table.
#[must_use]
pub fn page(notice: Option<(Tone, &str)>, user: Option<&PublicUser>) -> Html<String> {
    let mut out = String::with_capacity(2048);
    out.push_str(HEAD);

    if let Some((tone, message)) = notice {
        let _ = writeln!(
            out,
            "<p class=\"notice {}\">{}</p>",
            tone.class(),
            escape(message)
        );
    }

    if let Some(user) = user {
        out.push_str("<table class=\"user\">\n");
        row(&mut out, "ID", &user.id.to_string());
        row(&mut out, "Username", &user.username);
        if let Some(email) = &user.email {
            row(&mut out, "Email", email);
        }
        if let Some(phone) = &user.phone {
            row(&mut out, "Phone", phone);
        }
        if let Some(role) = &user.role {
            row(&mut out, "Role", role);
        }
        row(&mut out, "Registered", &user.created_at.to_rfc3339());
        out.push_str("</table>\n");
    }

    out.push_str(FORMS);
    Html(out)
}

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "<tr><th>{label}</th><td>{}</td></tr>", escape(value));
}

/// Escape text for an HTML body or attribute.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>credgate</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.notice { padding: .5rem; border-radius: 4px; }
.success { background: #d4edda; }
.error { background: #f8d7da; }
form { margin: 1rem 0; }
label { display: block; margin: .25rem 0; }
</style>
</head>
<body>
<h1>credgate</h1>
"#;

const FORMS: &str = r#"<h2>Register</h2>
<form method="post" action="/register">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<label>Email <input name="email" type="email"></label>
<label>Phone <input name="phone"></label>
<label>Role <input name="role"></label>
<button type="submit">Register</button>
</form>
<h2>Login</h2>
<form method="post" action="/login">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<label>Email <input name="email" type="email"></label>
<label>Phone <input name="phone"></label>
<label>Role <input name="role"></label>
<button type="submit">Login</button>
</form>
</body>
</html>
"#;
