//! View rendering shim.
//!
//! A view is a text file with `{{ name }}` placeholders filled from a
//! named-variable data mapping. Output is assembled in a buffer and only
//! returned whole: a failure mid-render discards everything produced so
//! far, so the error channel never interleaves with partial page output.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core::{plain_str, Error, Params, Result};

/// Render a view file with the given data mapping.
///
/// Fails when the file does not exist or a placeholder names an undefined
/// variable.
pub fn render(path: impl AsRef<Path>, data: &Params) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::View(format!(
            "view \"{}\" does not exist",
            path.display()
        )));
    }

    let template = fs::read_to_string(path)?;
    debug!(view = %path.display(), bytes = template.len(), "rendering view");
    interpolate(&template, data)
}

/// Fill `{{ name }}` placeholders from the data mapping.
fn interpolate(template: &str, data: &Params) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after
            .find("}}")
            .ok_or_else(|| Error::View("unterminated placeholder".to_string()))?;
        let name = after[..end].trim();

        let value = data.get(name).ok_or_else(|| {
            Error::View(format!("undefined view variable \"{}\"", name))
        })?;
        out.push_str(&plain_str(value));

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
