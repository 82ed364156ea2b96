//! Cookie-like store for the admin credential.
//!
//! Holds at most one credential under a cookie name. When a file is
//! configured, the credential survives restarts as a single
//! `Set-Cookie`-style line:
//!
//! ```text
//! pawshopToken=eyJhbGciOi...; expires=Tue, 21 Oct 2026 08:00:00 +0000
//! ```
//!
//! Like a browser cookie jar, an expired credential reads as absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use pawshop_core::Credential;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reading or writing the credential file.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// File access failed.
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not contain a cookie line this store understands.
    #[error("Malformed credential cookie: {0}")]
    Malformed(String),
}

/// Shared credential store.
///
/// Cheap to clone; every clone sees the same credential.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<CredentialStoreInner>,
}

struct CredentialStoreInner {
    cookie_name: String,
    file: Option<PathBuf>,
    credential: RwLock<Option<Credential>>,
}

impl CredentialStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn in_memory(cookie_name: impl Into<String>) -> Self {
        Self::build(cookie_name.into(), None)
    }

    /// Create a store backed by `file`, loading any credential already saved there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn with_file(
        cookie_name: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Result<Self, CredentialError> {
        let store = Self::build(cookie_name.into(), Some(file.into()));
        store.load()?;
        Ok(store)
    }

    fn build(cookie_name: String, file: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(CredentialStoreInner {
                cookie_name,
                file,
                credential: RwLock::new(None),
            }),
        }
    }

    /// The cookie name the credential is stored under.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.inner.cookie_name
    }

    /// The current credential, or `None` when absent or expired.
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        self.get_at(Utc::now())
    }

    /// The credential as seen at `now`.
    #[must_use]
    pub fn get_at(&self, now: DateTime<Utc>) -> Option<Credential> {
        self.inner
            .credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|c| c.has_token() && !c.is_expired_at(now))
            .cloned()
    }

    /// Store a credential, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential file cannot be written. The
    /// in-memory credential is updated regardless.
    pub fn set(&self, credential: Credential) -> Result<(), CredentialError> {
        let line = self.cookie_line(&credential);
        *self
            .inner
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);

        if let Some(file) = &self.inner.file {
            write_cookie_file(file, &line)?;
            debug!(file = %file.display(), "Credential saved");
        }
        Ok(())
    }

    /// Forget the credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), CredentialError> {
        *self
            .inner
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        if let Some(file) = &self.inner.file {
            match std::fs::remove_file(file) {
                Ok(()) => debug!(file = %file.display(), "Credential file removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Reload the credential from the backing file, if any.
    ///
    /// A missing file leaves the store empty. A cookie saved under a
    /// different name is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load(&self) -> Result<(), CredentialError> {
        let Some(file) = &self.inner.file else {
            return Ok(());
        };

        let contents = match std::fs::read_to_string(file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let loaded = match parse_cookie_line(contents.trim())? {
            (name, credential) if name == self.inner.cookie_name => Some(credential),
            (name, _) => {
                warn!(cookie = %name, "Ignoring credential saved under another cookie name");
                None
            }
        };

        *self
            .inner
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = loaded;
        Ok(())
    }

    fn cookie_line(&self, credential: &Credential) -> String {
        format!(
            "{}={}; expires={}",
            self.inner.cookie_name,
            credential.token().expose_secret(),
            credential.expires_at().to_rfc2822()
        )
    }
}

fn write_cookie_file(file: &Path, line: &str) -> Result<(), CredentialError> {
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, format!("{line}\n"))?;
    Ok(())
}

/// Parse `name=token; expires=<RFC 2822>`.
fn parse_cookie_line(line: &str) -> Result<(String, Credential), CredentialError> {
    let mut parts = line.split(';').map(str::trim);

    let (name, token) = parts
        .next()
        .and_then(|pair| pair.split_once('='))
        .ok_or_else(|| CredentialError::Malformed("missing name=value pair".to_string()))?;
    if name.is_empty() {
        return Err(CredentialError::Malformed("empty cookie name".to_string()));
    }

    let expires = parts
        .find_map(|attr| {
            attr.split_once('=')
                .filter(|(key, _)| key.eq_ignore_ascii_case("expires"))
                .map(|(_, value)| value)
        })
        .ok_or_else(|| CredentialError::Malformed("missing expires attribute".to_string()))?;

    let expires_at = DateTime::parse_from_rfc2822(expires)
        .map_err(|e| CredentialError::Malformed(format!("bad expires value: {e}")))?
        .with_timezone(&Utc);

    Ok((name.to_owned(), Credential::new(token, expires_at)))
}
