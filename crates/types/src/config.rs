//! Config schema descriptors and the responses users fill in for them.
//!
//! On the wire both documents carry `{name, type, values}` where the shape of
//! `values` depends on `type`. In memory the shape is a sum type keyed by the
//! field type so consumers never have to inspect untyped JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire name of free-text fields.
pub const INPUT_TYPE: &str = "input";
/// Wire name of single-choice fields.
pub const SELECT_TYPE: &str = "select";
/// Wire name of multi-checkbox fields.
pub const CHECK_LIST_TYPE: &str = "check_list";

/// Field shape declared by an act schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFieldKind {
    /// Free text; no values on the wire.
    Input,
    /// Single choice among ordered options.
    Select { options: Vec<String> },
    /// One independent boolean per ordered label.
    CheckList { labels: Vec<String> },
    /// A type the wizard does not know how to render. Kept so schemas survive a round trip.
    Unsupported { type_name: String, values: Option<Value> },
}

/// One configurable parameter of an act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldWire", into = "FieldWire")]
pub struct ConfigFieldDescriptor {
    pub name: String,
    pub kind: ConfigFieldKind,
}

impl ConfigFieldDescriptor {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConfigFieldKind::Input,
        }
    }

    pub fn select<S: Into<String>>(name: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            kind: ConfigFieldKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn check_list<S: Into<String>>(name: impl Into<String>, labels: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            kind: ConfigFieldKind::CheckList {
                labels: labels.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Wire name of the field type.
    pub fn type_name(&self) -> &str {
        match &self.kind {
            ConfigFieldKind::Input => INPUT_TYPE,
            ConfigFieldKind::Select { .. } => SELECT_TYPE,
            ConfigFieldKind::CheckList { .. } => CHECK_LIST_TYPE,
            ConfigFieldKind::Unsupported { type_name, .. } => type_name,
        }
    }

    /// Whether the wizard can render an input slot for this field.
    pub fn is_supported(&self) -> bool {
        !matches!(self.kind, ConfigFieldKind::Unsupported { .. })
    }

    /// Response a freshly opened form starts with for this field.
    ///
    /// `input` starts empty, `select` starts on its first option and `check_list`
    /// starts as an empty list. Unsupported fields have no default.
    pub fn default_response(&self) -> Option<ConfigFieldResponse> {
        let value = match &self.kind {
            ConfigFieldKind::Input => ConfigValue::Input(String::new()),
            ConfigFieldKind::Select { options } => ConfigValue::Select(options.first().cloned().unwrap_or_default()),
            ConfigFieldKind::CheckList { .. } => ConfigValue::CheckList(Vec::new()),
            ConfigFieldKind::Unsupported { .. } => return None,
        };
        Some(ConfigFieldResponse {
            name: self.name.clone(),
            value,
        })
    }
}

/// One labelled checkbox state; serialized as `{"<label>": <checked>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    pub label: String,
    pub checked: bool,
}

impl CheckEntry {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }
}

/// The value a user filled for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Input(String),
    Select(String),
    CheckList(Vec<CheckEntry>),
    /// A response of a type this client does not model, preserved verbatim.
    Raw { type_name: String, values: Value },
}

impl ConfigValue {
    /// Wire name of the response type.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Input(_) => INPUT_TYPE,
            Self::Select(_) => SELECT_TYPE,
            Self::CheckList(_) => CHECK_LIST_TYPE,
            Self::Raw { type_name, .. } => type_name,
        }
    }

    /// Non-emptiness rule used to gate confirmation.
    ///
    /// Strings must be non-empty after trimming. A check list only has to be a
    /// non-empty list: entries that are all `false` still count as filled.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Input(text) | Self::Select(text) => !text.trim().is_empty(),
            Self::CheckList(entries) => !entries.is_empty(),
            Self::Raw { values, .. } => match values {
                Value::String(text) => !text.trim().is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(map) => !map.is_empty(),
                Value::Null => false,
                Value::Bool(_) | Value::Number(_) => true,
            },
        }
    }

    fn to_wire_values(&self) -> Value {
        match self {
            Self::Input(text) | Self::Select(text) => Value::String(text.clone()),
            Self::CheckList(entries) => Value::Array(
                entries
                    .iter()
                    .map(|entry| {
                        let mut object = Map::new();
                        object.insert(entry.label.clone(), Value::Bool(entry.checked));
                        Value::Object(object)
                    })
                    .collect(),
            ),
            Self::Raw { values, .. } => values.clone(),
        }
    }
}

/// The user-filled value for one descriptor, keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldWire", into = "FieldWire")]
pub struct ConfigFieldResponse {
    pub name: String,
    pub value: ConfigValue,
}

impl ConfigFieldResponse {
    pub fn input(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ConfigValue::Input(text.into()),
        }
    }

    pub fn select(name: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ConfigValue::Select(option.into()),
        }
    }

    pub fn check_list(name: impl Into<String>, entries: Vec<CheckEntry>) -> Self {
        Self {
            name: name.into(),
            value: ConfigValue::CheckList(entries),
        }
    }

    /// True when this response fits the shape declared by `descriptor`.
    pub fn matches_descriptor(&self, descriptor: &ConfigFieldDescriptor) -> bool {
        self.name == descriptor.name && self.value.type_name() == descriptor.type_name()
    }
}

/// Shared `{name, type, values}` wire envelope.
#[derive(Serialize, Deserialize)]
struct FieldWire {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Value>,
}

impl From<FieldWire> for ConfigFieldDescriptor {
    fn from(wire: FieldWire) -> Self {
        let kind = match wire.field_type.as_str() {
            INPUT_TYPE => ConfigFieldKind::Input,
            SELECT_TYPE => ConfigFieldKind::Select {
                options: string_list(wire.values.as_ref()),
            },
            CHECK_LIST_TYPE => ConfigFieldKind::CheckList {
                labels: string_list(wire.values.as_ref()),
            },
            _ => ConfigFieldKind::Unsupported {
                type_name: wire.field_type,
                values: wire.values,
            },
        };
        Self { name: wire.name, kind }
    }
}

impl From<ConfigFieldDescriptor> for FieldWire {
    fn from(descriptor: ConfigFieldDescriptor) -> Self {
        let field_type = descriptor.type_name().to_string();
        let values = match descriptor.kind {
            ConfigFieldKind::Input => None,
            ConfigFieldKind::Select { options: items } | ConfigFieldKind::CheckList { labels: items } => {
                Some(Value::Array(items.into_iter().map(Value::String).collect()))
            }
            ConfigFieldKind::Unsupported { values, .. } => values,
        };
        Self {
            name: descriptor.name,
            field_type,
            values,
        }
    }
}

impl From<FieldWire> for ConfigFieldResponse {
    fn from(wire: FieldWire) -> Self {
        let values = wire.values.unwrap_or(Value::Null);
        let value = match (wire.field_type.as_str(), values) {
            (INPUT_TYPE, Value::String(text)) => ConfigValue::Input(text),
            (SELECT_TYPE, Value::String(text)) => ConfigValue::Select(text),
            (CHECK_LIST_TYPE, Value::Array(items)) => match check_entries(&items) {
                Some(entries) => ConfigValue::CheckList(entries),
                None => ConfigValue::Raw {
                    type_name: wire.field_type,
                    values: Value::Array(items),
                },
            },
            (_, values) => ConfigValue::Raw {
                type_name: wire.field_type,
                values,
            },
        };
        Self { name: wire.name, value }
    }
}

impl From<ConfigFieldResponse> for FieldWire {
    fn from(response: ConfigFieldResponse) -> Self {
        Self {
            field_type: response.value.type_name().to_string(),
            values: Some(response.value.to_wire_values()),
            name: response.name,
        }
    }
}

/// Reads `values` that may be a list of strings or a single string.
fn string_list(values: Option<&Value>) -> Vec<String> {
    match values {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(text)) => vec![text.clone()],
        _ => Vec::new(),
    }
}

/// Parses `[{"Mon": false}, {"Tue": true}]`. Returns `None` when any entry is not a label-to-bool object.
fn check_entries(items: &[Value]) -> Option<Vec<CheckEntry>> {
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let object = item.as_object()?;
        for (label, checked) in object {
            entries.push(CheckEntry::new(label.clone(), checked.as_bool()?));
        }
    }
    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_reads_single_string_values_as_one_option() {
        let descriptor: ConfigFieldDescriptor = serde_json::from_value(json!({"name": "mode", "type": "select", "values": "only"})).unwrap();
        assert_eq!(
            descriptor.kind,
            ConfigFieldKind::Select {
                options: vec!["only".into()]
            }
        );
    }

    #[test]
    fn unknown_descriptor_type_is_kept_unsupported() {
        let raw = json!({"name": "when", "type": "date_picker", "values": ["x"]});
        let descriptor: ConfigFieldDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert!(!descriptor.is_supported());
        assert!(descriptor.default_response().is_none());
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), raw);
    }

    #[test]
    fn input_descriptor_omits_values_on_the_wire() {
        let value = serde_json::to_value(ConfigFieldDescriptor::input("message")).unwrap();
        assert_eq!(value, json!({"name": "message", "type": "input"}));
    }

    #[test]
    fn defaults_follow_field_shape() {
        let select = ConfigFieldDescriptor::select("Hour", ["00", "01"]);
        assert_eq!(select.default_response(), Some(ConfigFieldResponse::select("Hour", "00")));

        let empty_select = ConfigFieldDescriptor::select("Hour", Vec::<String>::new());
        assert_eq!(empty_select.default_response(), Some(ConfigFieldResponse::select("Hour", "")));

        let days = ConfigFieldDescriptor::check_list("days", ["Mon", "Tue"]);
        assert_eq!(days.default_response(), Some(ConfigFieldResponse::check_list("days", Vec::new())));
    }

    #[test]
    fn check_list_response_encodes_label_objects() {
        let response = ConfigFieldResponse::check_list("days", vec![CheckEntry::new("Mon", true), CheckEntry::new("Tue", false)]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"name": "days", "type": "check_list", "values": [{"Mon": true}, {"Tue": false}]})
        );
        let decoded: ConfigFieldResponse = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn malformed_check_list_response_is_preserved_raw() {
        let raw = json!({"name": "days", "type": "check_list", "values": ["Mon"]});
        let decoded: ConfigFieldResponse = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(decoded.value, ConfigValue::Raw { .. }));
        assert_eq!(serde_json::to_value(&decoded).unwrap(), raw);
    }

    #[test]
    fn filled_rule_trims_strings_and_only_counts_list_entries() {
        assert!(!ConfigValue::Input("   ".into()).is_filled());
        assert!(ConfigValue::Select("01".into()).is_filled());
        assert!(!ConfigValue::CheckList(Vec::new()).is_filled());
        assert!(ConfigValue::CheckList(vec![CheckEntry::new("Mon", false)]).is_filled());
    }
}
