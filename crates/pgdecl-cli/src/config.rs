//! Runtime settings for the pgdecl CLI.
//!
//! Values come from command-line flags, falling back to the environment
//! (`DATABASE_URL`, `PGDECL_POOL_SIZE`). A `.env` file in the working
//! directory is loaded first, so it counts as environment.

use thiserror::Error;

const DEFAULT_POOL_SIZE: usize = 4;

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub pool_size: usize,
}

impl Settings {
    /// Validate what clap collected from flags and environment.
    pub fn resolve(
        database_url: Option<String>,
        pool_size: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let database_url = database_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let pool_size = match pool_size {
            Some(0) => return Err(ConfigError::InvalidPoolSize),
            Some(n) => n,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// The database URL with any password replaced by `***`.
    pub fn redacted_url(&self) -> String {
        mask_password(&self.database_url)
    }
}

/// Errors that can occur when resolving settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no database URL given; pass --database-url or set DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("pool size must be at least 1")]
    InvalidPoolSize,
}

/// Mask passwords in a connection string for display.
///
/// Handles both forms `tokio_postgres` accepts: the password in a URL's
/// userinfo (`postgres://user:pw@host`) and a `password=` parameter, either
/// in a `key=value` string or in a URL query.
fn mask_password(url: &str) -> String {
    mask_password_params(&mask_userinfo(url))
}

fn mask_userinfo(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let authority_end = url[start + 3..]
            .find(['/', '?'])
            .map_or(url.len(), |i| start + 3 + i);
        if let Some(at) = url[..authority_end].rfind('@') {
            if at > start {
                let prefix = &url[..start + 3];
                let suffix = &url[at..];
                if let Some(colon) = url[start + 3..at].find(':') {
                    let user = &url[start + 3..start + 3 + colon];
                    return format!("{}{}:***{}", prefix, user, suffix);
                }
            }
        }
    }
    url.to_string()
}

fn mask_password_params(conn: &str) -> String {
    const KEY: &str = "password";

    let mut out = String::with_capacity(conn.len());
    let mut copied = 0;
    let mut search = 0;
    while let Some(found) = conn[search..].find(KEY) {
        let key_start = search + found;
        search = key_start + KEY.len();

        let at_boundary = conn[..key_start]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || c == '?' || c == '&');
        if !at_boundary {
            continue;
        }

        // `password = value` is allowed in key=value strings
        let after_key = &conn[search..];
        let Some(eq) = after_key.trim_start().strip_prefix('=') else {
            continue;
        };
        let value = eq.trim_start();
        let value_start = conn.len() - value.len();
        let value_end = value_start + param_value_len(value);

        out.push_str(&conn[copied..value_start]);
        out.push_str("***");
        copied = value_end;
        search = value_end;
    }
    out.push_str(&conn[copied..]);
    out
}

/// Length of a parameter value: single-quoted with backslash escapes, or
/// up to the next space or `&`.
fn param_value_len(value: &str) -> usize {
    if value.starts_with('\'') {
        let mut escaped = false;
        for (i, c) in value.char_indices().skip(1) {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '\'' => return i + 1,
                _ => {}
            }
        }
        value.len()
    } else {
        value
            .find(|c: char| c.is_whitespace() || c == '&')
            .unwrap_or(value.len())
    }
}
