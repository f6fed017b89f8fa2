use std::fmt::{self, Debug, Formatter};

use zeroize::Zeroize;

/// An optional password that never shows up in debug output and is wiped on drop
#[derive(Default, Clone)]
pub struct Password(Option<String>);

impl Password {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_some() {
            write!(f, "Password(********)")
        } else {
            write!(f, "Password(None)")
        }
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        if let Some(password) = self.0.as_mut() {
            password.zeroize();
        }
    }
}

impl From<Option<String>> for Password {
    fn from(password: Option<String>) -> Self {
        Self(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self(Some(password.to_string()))
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self(Some(password))
    }
}
