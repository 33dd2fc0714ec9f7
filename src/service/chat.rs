//! Chatbot prompt assembly. The model sees the question plus a JSON dump of
//! every collection, rendered the same way for each one.

use serde::Serialize;

use crate::db::snapshot::Snapshot;
use crate::error::{ErrorMessage, ServiceError};

pub const EMPTY_DATABASE: &str = "No hay información disponible en la base de datos.";

/// Pretty-printed documents of one collection
pub struct Collection {
    pub name: &'static str,
    pub documents: Vec<String>,
}

fn collection<T: Serialize>(
    name: &'static str,
    rows: &[T],
) -> Result<Collection, serde_json::Error> {
    let documents = rows
        .iter()
        .map(serde_json::to_string_pretty)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Collection { name, documents })
}

impl Snapshot {
    pub fn collections(&self) -> Result<Vec<Collection>, serde_json::Error> {
        Ok(vec![
            collection("users", &self.users)?,
            collection("publicaciones", &self.posts)?,
            collection("comentarios", &self.comments)?,
        ])
    }
}

/// Render non-empty collections as `Colección: <name>` blocks
pub fn render_context(collections: &[Collection]) -> String {
    let mut info = String::new();

    for collection in collections.iter().filter(|c| !c.documents.is_empty()) {
        info.push_str(&format!("\nColección: {}\n", collection.name));
        info.push_str(&collection.documents.join("\n"));
    }

    if info.is_empty() {
        EMPTY_DATABASE.to_string()
    } else {
        info
    }
}

pub fn build_prompt(prompt: &str, context: &str) -> String {
    format!(
        "El usuario pregunta: \"{}\"\n\
         Aquí está la información relevante de nuestra base de datos:\n\
         {}\n\
         Usa esta información para responder con precisión.",
        prompt, context
    )
}

/// Trimmed question; blank is `InvalidInput`
pub fn validate_prompt(prompt: &str) -> Result<&str, ServiceError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ServiceError::InvalidInput(ErrorMessage::EmptyPrompt));
    }
    Ok(prompt)
}
