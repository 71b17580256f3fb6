//! The name/role form and its validation.

use serde::Deserialize;

/// Raw form submission. Absent fields arrive as empty strings so that a
/// missing `name` is reported as a field error instead of a rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// The fixed set of roles the select box offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChoice {
    User,
    Mod,
    Admin,
}

impl RoleChoice {
    pub const ALL: [RoleChoice; 3] = [RoleChoice::User, RoleChoice::Mod, RoleChoice::Admin];

    /// Value posted by the select box.
    pub fn value(self) -> &'static str {
        match self {
            RoleChoice::User => "user",
            RoleChoice::Mod => "mod",
            RoleChoice::Admin => "admin",
        }
    }

    /// Text shown to the user in the select box.
    pub fn label(self) -> &'static str {
        match self {
            RoleChoice::User => "User",
            RoleChoice::Mod => "Moderator",
            RoleChoice::Admin => "Administrator",
        }
    }

    /// Name under which the role is stored in the `roles` table.
    pub fn role_name(self) -> String {
        capitalize(self.value())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.value() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNameForm {
    pub name: String,
    pub role: RoleChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Checks a submission, collecting one error per offending field.
///
/// `name` must contain something other than whitespace; the accepted value is
/// kept exactly as submitted. `role` has to be one of the [`RoleChoice`]
/// values.
pub fn validate(form: &NameForm) -> Result<ValidNameForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "This field is required.",
        });
    }

    let role = RoleChoice::parse(&form.role);
    if role.is_none() {
        errors.push(FieldError {
            field: "role",
            message: "Not a valid choice.",
        });
    }

    match role {
        Some(role) if errors.is_empty() => Ok(ValidNameForm {
            name: form.name.clone(),
            role,
        }),
        _ => Err(errors),
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
