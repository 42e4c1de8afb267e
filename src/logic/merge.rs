use serde_json::Value;

use crate::error::{ResolveError, ResolveResult};
use crate::model::{Template, TemplateRef};

/// Recursively copy `source` onto `target`.
///
/// Objects merge key by key; arrays and scalars from `source` replace.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Apply request overrides onto the stored template, or use the request
/// verbatim when nothing was stored. `content` falls back to an empty string.
pub fn merge_template(found: Option<Template>, template_ref: &TemplateRef) -> ResolveResult<Template> {
    let overrides = to_value(template_ref)?;
    let merged = match found {
        Some(found) => {
            let mut base = to_value(&found)?;
            deep_merge(&mut base, overrides);
            base
        }
        None => overrides,
    };

    let mut template: Template = serde_json::from_value(merged)
        .map_err(|e| ResolveError::Validation(format!("invalid template: {}", e)))?;
    if template.content.is_none() {
        template.content = Some(String::new());
    }
    Ok(template)
}

fn to_value<T: serde::Serialize>(value: &T) -> ResolveResult<Value> {
    serde_json::to_value(value).map_err(|e| ResolveError::Store(e.into()))
}
