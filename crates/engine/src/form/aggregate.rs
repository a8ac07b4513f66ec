//! The config form of one act: every field interpreter plus the merged
//! responses they emitted.

use area_types::{ConfigFieldDescriptor, ConfigFieldResponse};
use tracing::debug;

use super::field::{FieldInput, FieldInterpreter};

/// Config form backing the "fill config" step of the selector.
///
/// `descriptors` is `None` until the act schema arrives; such a form is never
/// valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigForm {
    descriptors: Option<Vec<ConfigFieldDescriptor>>,
    fields: Vec<FieldInterpreter>,
    responses: Vec<ConfigFieldResponse>,
}

impl ConfigForm {
    /// A form still waiting for its schema.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Seed one default response per renderable descriptor.
    pub fn seeded(descriptors: Vec<ConfigFieldDescriptor>) -> Self {
        Self::seeded_with(descriptors, &[])
    }

    /// Seed from the schema, preferring `prior` responses whose name and type
    /// still match a descriptor. Widget state is restored from the same
    /// responses.
    pub fn seeded_with(descriptors: Vec<ConfigFieldDescriptor>, prior: &[ConfigFieldResponse]) -> Self {
        let mut fields = Vec::with_capacity(descriptors.len());
        let mut responses = Vec::with_capacity(descriptors.len());

        for descriptor in &descriptors {
            let saved = prior.iter().find(|response| response.matches_descriptor(descriptor));
            match saved {
                Some(saved) => {
                    fields.push(FieldInterpreter::restored(descriptor.clone(), saved));
                    responses.push(saved.clone());
                }
                None => {
                    fields.push(FieldInterpreter::new(descriptor.clone()));
                    responses.extend(descriptor.default_response());
                }
            }
        }

        Self {
            descriptors: Some(descriptors),
            fields,
            responses,
        }
    }

    pub fn descriptors(&self) -> Option<&[ConfigFieldDescriptor]> {
        self.descriptors.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.descriptors.is_some()
    }

    pub fn fields(&self) -> &[FieldInterpreter] {
        &self.fields
    }

    pub fn responses(&self) -> &[ConfigFieldResponse] {
        &self.responses
    }

    pub fn response(&self, name: &str) -> Option<&ConfigFieldResponse> {
        self.responses.iter().find(|response| response.name == name)
    }

    /// Route `input` to the field called `name` and merge what it emits.
    ///
    /// Returns `false` when no field has that name or the field ignored the input.
    pub fn update(&mut self, name: &str, input: FieldInput) -> bool {
        let Some(field) = self.fields.iter_mut().find(|field| field.name() == name) else {
            debug!(field = name, "config input for unknown field ignored");
            return false;
        };
        match field.handle(input) {
            Some(response) => {
                self.record(response);
                true
            }
            None => false,
        }
    }

    /// Replace the response with the same name, or append it.
    pub fn record(&mut self, response: ConfigFieldResponse) {
        match self.responses.iter_mut().find(|existing| existing.name == response.name) {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }
    }

    pub fn is_valid(&self) -> bool {
        config_responses_valid(self.descriptors(), &self.responses)
    }

    /// Renderable fields that still lack a usable value.
    pub fn missing_fields(&self) -> Vec<&str> {
        let Some(descriptors) = self.descriptors() else {
            return Vec::new();
        };
        descriptors
            .iter()
            .filter(|descriptor| descriptor.is_supported())
            .filter(|descriptor| !self.response(&descriptor.name).is_some_and(|response| response.value.is_filled()))
            .map(|descriptor| descriptor.name.as_str())
            .collect()
    }

    pub fn into_responses(self) -> Vec<ConfigFieldResponse> {
        self.responses
    }
}

/// Whether `responses` fully configure an act described by `descriptors`.
///
/// * no descriptors yet: invalid
/// * empty schema: valid
/// * otherwise every supported descriptor has exactly one response and every
///   response carries a value (trimmed text non-empty, check list non-empty)
///
/// Unsupported descriptors cannot be filled in and are not required. Saved
/// responses for them pass through unchecked, even when empty.
pub fn config_responses_valid(descriptors: Option<&[ConfigFieldDescriptor]>, responses: &[ConfigFieldResponse]) -> bool {
    let Some(descriptors) = descriptors else {
        return false;
    };
    if descriptors.is_empty() {
        return true;
    }

    let every_field_answered_once = descriptors
        .iter()
        .filter(|descriptor| descriptor.is_supported())
        .all(|descriptor| responses.iter().filter(|response| response.name == descriptor.name).count() == 1);

    let unfillable = |response: &ConfigFieldResponse| {
        descriptors
            .iter()
            .any(|descriptor| !descriptor.is_supported() && response.matches_descriptor(descriptor))
    };
    every_field_answered_once
        && responses
            .iter()
            .filter(|response| !unfillable(response))
            .all(|response| response.value.is_filled())
}
