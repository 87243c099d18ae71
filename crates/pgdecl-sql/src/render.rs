//! Render DDL AST to string.

use std::fmt;

use crate::Ident;
use crate::stmt::*;

/// Wrapper for rendering a value via Display.
pub struct Fmt<'a, T: Render>(&'a T);

impl<T: Render> fmt::Display for Fmt<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f)
    }
}

// ============================================================================
// Render implementations
// ============================================================================

/// Trait for types that can be rendered to SQL.
pub trait Render {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Render for CreateExtension {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Ident(&self.name);
        write!(f, "CREATE EXTENSION IF NOT EXISTS {name}")?;
        if let Some(schema) = &self.schema {
            let schema = Ident(schema);
            write!(f, " SCHEMA {schema}")?;
        }
        if let Some(version) = &self.version {
            let version = Ident(version);
            write!(f, " VERSION {version}")?;
        }
        Ok(())
    }
}

impl Render for SetExtensionSchema {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Ident(&self.name);
        let schema = Ident(&self.schema);
        write!(f, "ALTER EXTENSION {name} SET SCHEMA {schema}")
    }
}

impl Render for UpdateExtension {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Ident(&self.name);
        write!(f, "ALTER EXTENSION {name} UPDATE")?;
        if let Some(version) = &self.version {
            let version = Ident(version);
            write!(f, " TO {version}")?;
        }
        Ok(())
    }
}

impl Render for DropExtension {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Ident(&self.name);
        write!(f, "DROP EXTENSION {name}")
    }
}

impl Render for ExtensionStmt {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionStmt::Create(s) => s.render(f),
            ExtensionStmt::SetSchema(s) => s.render(f),
            ExtensionStmt::Update(s) => s.render(f),
            ExtensionStmt::Drop(s) => s.render(f),
        }
    }
}

impl fmt::Display for ExtensionStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

/// Render a statement to SQL text.
pub fn render(stmt: &impl Render) -> String {
    format!("{}", Fmt(stmt))
}
