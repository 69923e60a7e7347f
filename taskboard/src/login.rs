//! Login form validation and captcha challenge.
//!
//! Validation is a synchronous one-shot check with no persistent state. A
//! successful validation yields a [`Session`] that the caller hands to the
//! board explicitly; logging out drops it.

use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use uuid::Uuid;

/// Default captcha length.
pub const DEFAULT_CAPTCHA_LENGTH: usize = 6;

/// Minimum username length in characters.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Reasons a login attempt is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// No username or e-mail given.
    #[error("Username or Email is required")]
    IdentifierRequired,
    /// Identifier is neither an e-mail address nor a valid username.
    #[error("Enter a valid email or username")]
    InvalidIdentifier,
    /// No password given.
    #[error("Password is required")]
    PasswordRequired,
    /// No captcha answer given.
    #[error("Captcha is required")]
    CaptchaRequired,
    /// Captcha answer does not match the challenge.
    #[error("Captcha not matched")]
    CaptchaMismatch,
}

/// Form field a [`LoginError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    /// Username or e-mail.
    Identifier,
    /// Password.
    Password,
    /// Captcha answer.
    Captcha,
}

impl LoginField {
    /// Field order on screen.
    pub const ALL: [Self; 3] = [Self::Identifier, Self::Password, Self::Captcha];

    /// The field after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Identifier => Self::Password,
            Self::Password => Self::Captcha,
            Self::Captcha => Self::Identifier,
        }
    }

    /// The field before this one, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Identifier => Self::Captcha,
            Self::Password => Self::Identifier,
            Self::Captcha => Self::Password,
        }
    }

    /// Position in [`LoginField::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Identifier => 0,
            Self::Password => 1,
            Self::Captcha => 2,
        }
    }

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Identifier => "Username or Email",
            Self::Password => "Password",
            Self::Captcha => "Enter Captcha Value",
        }
    }
}

/// Random alphanumeric challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captcha(String);

impl Captcha {
    /// Generates a challenge of `len` characters.
    #[must_use]
    pub fn generate(len: usize) -> Self {
        let text = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self(text)
    }

    /// Wraps a known challenge text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The challenge text to display.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.0 == input
    }
}

impl fmt::Display for Captcha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated context passed to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Username or e-mail the user logged in with.
    pub identifier: String,
    /// Opaque session token.
    pub token: Uuid,
}

/// Login form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Username or e-mail.
    pub identifier: String,
    /// Password (never logged).
    pub password: String,
    /// Captcha answer.
    pub captcha_input: String,
}

impl LoginForm {
    /// Checks every field independently of the captcha value.
    ///
    /// Returns one error per invalid field, in screen order.
    #[must_use]
    pub fn field_errors(&self) -> Vec<(LoginField, LoginError)> {
        let mut errors = Vec::new();
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            errors.push((LoginField::Identifier, LoginError::IdentifierRequired));
        } else if !is_email(identifier) && !is_username(identifier) {
            errors.push((LoginField::Identifier, LoginError::InvalidIdentifier));
        }
        if self.password.is_empty() {
            errors.push((LoginField::Password, LoginError::PasswordRequired));
        }
        if self.captcha_input.trim().is_empty() {
            errors.push((LoginField::Captcha, LoginError::CaptchaRequired));
        }
        errors
    }

    /// Validates the form against `captcha`.
    ///
    /// # Errors
    ///
    /// Returns the first field error in screen order, or
    /// [`LoginError::CaptchaMismatch`] if all fields are filled in but the
    /// answer is wrong.
    pub fn validate(&self, captcha: &Captcha) -> Result<Session, LoginError> {
        if let Some((_, err)) = self.field_errors().into_iter().next() {
            return Err(err);
        }
        if !captcha.matches(&self.captcha_input) {
            return Err(LoginError::CaptchaMismatch);
        }
        Ok(Session {
            identifier: self.identifier.trim().to_string(),
            token: Uuid::now_v7(),
        })
    }
}

/// Structural e-mail check: `local@domain.tld`, no whitespace.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

fn is_username(value: &str) -> bool {
    let len = value.chars().count();
    (MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len)
}
