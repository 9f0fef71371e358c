//! A minimal form: an ordered set of named fields.
//!
//! The combobox attaches to a text field of a [`Form`] by id. Attaching adds
//! a hidden companion field next to it, and [`Form::submission`] collects
//! every field's value in order, the way an HTML form would be posted.

use std::collections::BTreeMap;
use std::fmt;

/// Attribute on the companion field holding the selected item's name.
pub const ITEM_NAME_ATTR: &str = "data-item-name";

/// The type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; the only kind a combobox accepts.
    Text,
    /// Masked text.
    Password,
    /// Numeric input.
    Number,
    /// Not rendered; carries values for submission.
    Hidden,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Hidden => "hidden",
        };
        f.write_str(name)
    }
}

/// A single named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    id: String,
    kind: FieldKind,
    value: String,
    attrs: BTreeMap<String, String>,
}

impl Field {
    /// Create an empty field.
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            value: String::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an auxiliary attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Field id (also its submission name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Look up an auxiliary attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Set an auxiliary attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }
}

/// Ordered collection of fields, unique by id.
#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: Vec<Field>,
}

impl Form {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field (builder style).
    pub fn with_text_field(mut self, id: impl Into<String>) -> Self {
        self.push(Field::new(id, FieldKind::Text));
        self
    }

    /// Append a field. A field with the same id is replaced in place.
    pub fn push(&mut self, field: Field) {
        match self.position(field.id()) {
            Some(pos) => self.fields[pos] = field,
            None => self.fields.push(field),
        }
    }

    /// Insert `field` right before the field with id `anchor`, or append it
    /// when `anchor` is missing. An existing field with the same id is
    /// replaced in place instead.
    pub fn insert_before(&mut self, anchor: &str, field: Field) {
        if let Some(pos) = self.position(field.id()) {
            self.fields[pos] = field;
            return;
        }
        match self.position(anchor) {
            Some(pos) => self.fields.insert(pos, field),
            None => self.fields.push(field),
        }
    }

    /// Look up a field by id.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by id, mutably.
    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// All fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// `(name, value)` pairs in field order, as submitted.
    pub fn submission(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.id.clone(), f.value.clone()))
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }
}
