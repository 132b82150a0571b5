//! Page templates and the shared layout.
//!
//! Views receive the page data as an already-escaped JSON object, so they
//! interpolate strings as-is. `csrf_input` is the only markup field.

use std::collections::HashMap;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    HomeIndex,
    LoginIndex,
    MypageIndex,
}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::HomeIndex => "home/index",
            View::LoginIndex => "login/index",
            View::MypageIndex => "mypage/index",
        }
    }
}

pub type PageData = Map<String, Value>;
pub type ViewFn = fn(&PageData) -> String;

pub struct ViewRegistry {
    views: HashMap<View, ViewFn>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(View::HomeIndex, home_index)
            .register(View::LoginIndex, login_index)
            .register(View::MypageIndex, mypage_index);
        registry
    }
}

impl ViewRegistry {
    pub fn empty() -> Self {
        Self {
            views: HashMap::new(),
        }
    }

    pub fn register(&mut self, view: View, render: ViewFn) -> &mut Self {
        self.views.insert(view, render);
        self
    }

    /// Full page for `view` wrapped in the layout, or `None` if unregistered.
    pub fn render(&self, view: View, data: &PageData) -> Option<String> {
        let render = self.views.get(&view)?;
        Some(layout(text(data, "title"), &render(data)))
    }
}

fn text<'a>(data: &'a PageData, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

fn layout(title: &str, body: &str) -> String {
    let title = if title.is_empty() { "MVC App" } else { title };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body>
    <header><a href="/">MVC Login Demo</a></header>
    <main>
{body}
    </main>
</body>
</html>
"#
    )
}

fn home_index(data: &PageData) -> String {
    format!(
        r#"<div class="home-container">
    <h1>{title}</h1>
    <p>{message}</p>
    <p><a href="/login">Go to the login page</a></p>
</div>"#,
        title = text(data, "title"),
        message = text(data, "message"),
    )
}

fn login_index(data: &PageData) -> String {
    let error = match text(data, "error") {
        "" => String::new(),
        e => format!(r#"    <div class="error-message">{e}</div>"#),
    };
    format!(
        r#"<div class="login-container">
    <h1>{title}</h1>
{error}
    <form action="/login/authenticate" method="POST">
        {csrf_input}
        <label for="username">Username</label>
        <input type="text" id="username" name="username" value="{username}" required autofocus>
        <label for="password">Password</label>
        <input type="password" id="password" name="password" required>
        <button type="submit">Log in</button>
    </form>
</div>"#,
        title = text(data, "title"),
        csrf_input = text(data, "csrf_input"),
        username = text(data, "username"),
    )
}

fn mypage_index(data: &PageData) -> String {
    format!(
        r#"<div class="mypage-container">
    <h1>Hello, {username}</h1>
    <p>{email}</p>
    <form action="/login/logout" method="POST">
        {csrf_input}
        <button type="submit">Log out</button>
    </form>
</div>"#,
        username = text(data, "username"),
        email = text(data, "email"),
        csrf_input = text(data, "csrf_input"),
    )
}
