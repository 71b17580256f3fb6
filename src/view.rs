//! HTML rendering.
//!
//! Pages are plain `format!` output. Every value that came from a client or
//! from the database goes through [`escape`].

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    entity::{role, user},
    form::{FieldError, NameForm, RoleChoice},
};

/// Everything the index page shows.
pub struct IndexPage<'a> {
    /// Last name submitted in this session.
    pub name: Option<&'a str>,
    pub known: bool,
    /// Values to put back into the form.
    pub form: &'a NameForm,
    pub errors: &'a [FieldError],
    pub users: &'a [user::Model],
    pub user_count: u64,
    /// Each role with the users that reference it.
    pub roles: &'a [(role::Model, Vec<user::Model>)],
    pub role_count: u64,
}

pub fn index(page: &IndexPage<'_>) -> Html<String> {
    let greeting = match page.name {
        Some(name) => {
            let note = if page.known {
                "Happy to see you again!"
            } else {
                "Pleased to meet you!"
            };
            format!("<h1>Hello, {}!</h1>\n<p>{note}</p>", escape(name))
        }
        None => "<h1>Hello, Stranger!</h1>".to_string(),
    };

    let options: String = RoleChoice::ALL
        .into_iter()
        .map(|choice| {
            let selected = if page.form.role == choice.value() {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                choice.value(),
                choice.label()
            )
        })
        .collect();

    let users: String = page
        .users
        .iter()
        .map(|user| {
            let role_name = user
                .role_id
                .and_then(|id| page.roles.iter().find(|(role, _)| role.id == id))
                .map(|(role, _)| escape(&role.name))
                .unwrap_or_else(|| "-".to_string());
            format!("<li>{} ({role_name})</li>", escape(&user.username))
        })
        .collect();

    let roles: String = page
        .roles
        .iter()
        .map(|(role, members)| {
            let names = members
                .iter()
                .map(|user| escape(&user.username))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "<li>{}: {} user(s) {names}</li>",
                escape(&role.name),
                members.len()
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
    <head><title>Roster</title></head>
    <body>
        <div class="page-header">
            {greeting}
        </div>
        <form method="post" action="/">
            <label for="name">What is your name?</label>
            <input id="name" name="name" type="text" value="{name_value}">
            {name_error}
            <label for="role">Role</label>
            <select id="role" name="role">{options}</select>
            {role_error}
            <input name="submit" type="submit" value="Submit">
        </form>
        <h2>Users (<span id="user-count">{user_count}</span>)</h2>
        <ul id="users">{users}</ul>
        <h2>Roles (<span id="role-count">{role_count}</span>)</h2>
        <ul id="roles">{roles}</ul>
        <p>The local date and time is {now}.</p>
    </body>
</html>
"#,
        name_value = escape(&page.form.name),
        name_error = field_error(page.errors, "name"),
        role_error = field_error(page.errors, "role"),
        user_count = page.user_count,
        role_count = page.role_count,
        now = chrono::Utc::now().format("%B %-d, %Y %H:%M UTC"),
    ))
}

pub fn not_found_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
    <head><title>Page Not Found</title></head>
    <body>
        <h1>Not Found</h1>
        <p>The page you asked for does not exist.</p>
        <p><a href="/">Back to home</a></p>
    </body>
</html>
"#,
    )
}

pub fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(
            r#"<!DOCTYPE html>
<html>
    <head><title>Internal Server Error</title></head>
    <body>
        <h1>Internal Server Error</h1>
        <p>Something went wrong on our side.</p>
        <p><a href="/">Back to home</a></p>
    </body>
</html>
"#,
        ),
    )
        .into_response()
}

fn field_error(errors: &[FieldError], field: &str) -> String {
    errors
        .iter()
        .filter(|error| error.field == field)
        .map(|error| format!(r#"<span class="help-block">{}</span>"#, error.message))
        .collect()
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
