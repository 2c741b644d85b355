use serde::Serialize;
use serde_json::{Map, Value};
use shared::{domain::Section, error::ValidationError};
use tracing::debug;

/// Nested key-value input model shared by every section of a screen.
///
/// Paths are dot-delimited (`paymentPreferences.emiOptions`). Unknown paths
/// create fields on demand, mirroring permissive form binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormModel {
    fields: Map<String, Value>,
}

impl FormModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from a JSON object; any other value yields an empty model.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = split_path(path);
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Writes `value` at `path`, keeping every sibling key at each level.
    pub fn update_field(&mut self, path: &str, value: impl Into<Value>) {
        match slot_mut(&mut self.fields, path) {
            Some(slot) => *slot = value.into(),
            None => debug!(path, "ignoring update for empty field path"),
        }
    }

    /// Adds `id` to the set at `category`, or removes it when already present.
    /// Returns whether `id` is a member afterwards.
    pub fn toggle_set_member(&mut self, category: &str, id: &str) -> bool {
        let Some(slot) = slot_mut(&mut self.fields, category) else {
            debug!(category, "ignoring toggle for empty set path");
            return false;
        };
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        let Value::Array(members) = slot else {
            return false;
        };

        if let Some(position) = members.iter().position(|m| m.as_str() == Some(id)) {
            members.remove(position);
            false
        } else {
            members.push(Value::String(id.to_string()));
            true
        }
    }

    pub fn set_members(&self, category: &str) -> Vec<&str> {
        self.get(category)
            .and_then(Value::as_array)
            .map(|members| members.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Flips a boolean field; absent or non-boolean values count as `false`.
    pub fn toggle_flag(&mut self, path: &str) -> bool {
        let next = !self.get(path).and_then(Value::as_bool).unwrap_or(false);
        self.update_field(path, next);
        next
    }

    /// Reports every listed field that is absent, null, blank, or an empty set.
    pub fn validate_required(&self, fields: &[&str]) -> Vec<ValidationError> {
        fields
            .iter()
            .filter(|field| is_missing(self.get(field)))
            .map(|field| ValidationError::missing(*field))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Top-level keys only; missing keys are skipped.
    pub fn subset(&self, keys: &[&str]) -> Value {
        let picked = keys
            .iter()
            .filter_map(|key| {
                self.fields
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect();
        Value::Object(picked)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

fn slot_mut<'a>(fields: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut segments = split_path(path).peekable();
    let mut current = fields;
    loop {
        let segment = segments.next()?;
        if segments.peek().is_none() {
            return Some(current.entry(segment.to_string()).or_insert(Value::Null));
        }
        let child = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        current = child.as_object_mut()?;
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// A form model plus the discriminator naming which section is on screen.
#[derive(Debug, Clone)]
pub struct FormController<S: Section> {
    model: FormModel,
    defaults: FormModel,
    active: S,
}

impl<S: Section> FormController<S> {
    pub fn new(defaults: FormModel) -> Self {
        Self {
            model: defaults.clone(),
            defaults,
            active: S::default(),
        }
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn active_section(&self) -> S {
        self.active
    }

    pub fn set_active_section(&mut self, section: S) {
        debug!(from = self.active.key(), to = section.key(), "switching form section");
        self.active = section;
    }

    pub fn update_field(&mut self, path: &str, value: impl Into<Value>) {
        self.model.update_field(path, value);
    }

    pub fn toggle_set_member(&mut self, category: &str, id: &str) -> bool {
        self.model.toggle_set_member(category, id)
    }

    pub fn toggle_flag(&mut self, path: &str) -> bool {
        self.model.toggle_flag(path)
    }

    pub fn validate_required(&self, fields: &[&str]) -> Vec<ValidationError> {
        self.model.validate_required(fields)
    }

    /// Restores the default model and the first section.
    pub fn reset(&mut self) {
        self.model = self.defaults.clone();
        self.active = S::default();
    }
}
