//! SQL quoting and DDL rendering for catalog objects.
//!
//! Build extension DDL as a small typed AST, then render it to a string.
//! Every identifier that ends up in SQL text goes through [`Ident`].

mod render;
pub use render::*;

mod stmt;
pub use stmt::*;

/// A PostgreSQL identifier wrapper.
///
/// Display writes the value escaped and quoted with double quotes. Postgres
/// identifiers cannot contain NUL, so the value is cut at the first NUL byte.
///
/// # Example
/// ```
/// use pgdecl_sql::Ident;
/// assert_eq!(format!("{}", Ident("pgcrypto")), "\"pgcrypto\"");
/// assert_eq!(format!("{}", Ident("bla\"h")), "\"bla\"\"h\"");
/// assert_eq!(format!("{}", Ident("ab\0cd")), "\"ab\"");
/// ```
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> std::fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"")?;
        for c in self.0.as_ref().chars() {
            match c {
                '\0' => break,
                '"' => write!(f, "\"\"")?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(f, "\"")
    }
}

/// Quote a PostgreSQL identifier.
///
/// Always quotes, so names keep their case and reserved words like `user`
/// or `order` are safe. Doubles any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("{}", Ident(name))
}
