//! Interpreter for a single config field descriptor.
//!
//! A [`FieldInterpreter`] owns the widget state of one slot (text buffer,
//! chosen option, checkbox flags) and turns user input into the normalized
//! [`ConfigFieldResponse`] the aggregating form stores. The form owns the
//! authoritative responses; the interpreter only emits them.

use area_types::{CheckEntry, ConfigFieldDescriptor, ConfigFieldKind, ConfigFieldResponse, ConfigValue};

/// A user change aimed at one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// Replace the text of an `input` field.
    Text(String),
    /// Pick an option of a `select` field.
    Select(String),
    /// Flip one label of a `check_list` field.
    Toggle(String),
}

/// Local widget state backing a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldWidget {
    Text(String),
    Select { options: Vec<String>, selected: String },
    CheckList(Vec<CheckEntry>),
    /// Unsupported descriptor types render nothing.
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInterpreter {
    descriptor: ConfigFieldDescriptor,
    widget: FieldWidget,
}

impl FieldInterpreter {
    pub fn new(descriptor: ConfigFieldDescriptor) -> Self {
        let widget = match &descriptor.kind {
            ConfigFieldKind::Input => FieldWidget::Text(String::new()),
            ConfigFieldKind::Select { options } => FieldWidget::Select {
                options: options.clone(),
                selected: options.first().cloned().unwrap_or_default(),
            },
            ConfigFieldKind::CheckList { labels } => {
                FieldWidget::CheckList(labels.iter().map(|label| CheckEntry::new(label.clone(), false)).collect())
            }
            ConfigFieldKind::Unsupported { .. } => FieldWidget::Hidden,
        };
        Self { descriptor, widget }
    }

    /// Build an interpreter whose widget reflects a previously saved response.
    ///
    /// Responses with a different name or type are ignored. A saved select
    /// option that is no longer offered falls back to the default selection.
    pub fn restored(descriptor: ConfigFieldDescriptor, response: &ConfigFieldResponse) -> Self {
        let mut interpreter = Self::new(descriptor);
        if !response.matches_descriptor(&interpreter.descriptor) {
            return interpreter;
        }

        match (&mut interpreter.widget, &response.value) {
            (FieldWidget::Text(text), ConfigValue::Input(saved)) => *text = saved.clone(),
            (FieldWidget::Select { options, selected }, ConfigValue::Select(saved)) if options.contains(saved) => {
                *selected = saved.clone();
            }
            (FieldWidget::CheckList(entries), ConfigValue::CheckList(saved)) => {
                for entry in entries.iter_mut() {
                    entry.checked = saved.iter().any(|prior| prior.label == entry.label && prior.checked);
                }
            }
            _ => {}
        }
        interpreter
    }

    pub fn descriptor(&self) -> &ConfigFieldDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn widget(&self) -> &FieldWidget {
        &self.widget
    }

    pub fn is_renderable(&self) -> bool {
        !matches!(self.widget, FieldWidget::Hidden)
    }

    /// Apply `input` and return the field's new full response.
    ///
    /// Returns `None` when the input does not apply to this field: a different
    /// input kind, an option outside the list, an unknown label, or any input
    /// on an unsupported field.
    pub fn handle(&mut self, input: FieldInput) -> Option<ConfigFieldResponse> {
        let name = self.descriptor.name.clone();
        match (&mut self.widget, input) {
            (FieldWidget::Text(text), FieldInput::Text(new_text)) => {
                *text = new_text;
                Some(ConfigFieldResponse::input(name, text.clone()))
            }
            (FieldWidget::Select { options, selected }, FieldInput::Select(option)) => {
                if !options.contains(&option) {
                    return None;
                }
                *selected = option;
                Some(ConfigFieldResponse::select(name, selected.clone()))
            }
            (FieldWidget::CheckList(entries), FieldInput::Toggle(label)) => {
                let entry = entries.iter_mut().find(|entry| entry.label == label)?;
                entry.checked = !entry.checked;
                Some(ConfigFieldResponse::check_list(name, entries.clone()))
            }
            _ => None,
        }
    }
}
