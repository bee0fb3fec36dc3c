//! Minimal HTML templates with `{{ key }}` placeholders
//!
//! Templates are compiled into the binaries with `include_str!`. Every
//! substituted value is HTML-escaped. A placeholder without a value, or an
//! unterminated `{{`, is a render error rather than silent output.

use std::collections::BTreeMap;

/// Values available to a template during rendering
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A named HTML template
#[derive(Debug, Clone)]
pub struct Template {
    name: &'static str,
    source: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render the template against `context`
    pub fn render(&self, context: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or(TemplateError::Unterminated {
                template: self.name,
                offset: self.source.len() - rest.len() + start,
            })?;

            let key = after[..end].trim();
            let value = context.get(key).ok_or_else(|| TemplateError::MissingValue {
                template: self.name,
                key: key.to_string(),
            })?;
            escape_html_into(value, &mut out);

            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn escape_html_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Template rendering errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template '{template}' references '{key}' but no value was supplied")]
    MissingValue { template: &'static str, key: String },

    #[error("Template '{template}' has an unterminated placeholder at byte {offset}")]
    Unterminated {
        template: &'static str,
        offset: usize,
    },
}
