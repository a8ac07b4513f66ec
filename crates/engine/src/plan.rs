//! Composition plans: a scripted answer to every wizard prompt.
//!
//! ```yaml
//! title: Issue alerts
//! action:
//!   service: GitHub
//!   act: new_issue
//! reactions:
//!   - service: Discord
//!     act: send_message
//!     config:
//!       message: Hello
//! ```
//!
//! Config values are strings for `input` and `select` fields and a list of
//! labels to check for `check_list` fields.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use area_types::{ConfigFieldKind, ConfigFieldResponse, ConfigValue, LocalId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composer::WizardEvent;
use crate::error::WizardError;
use crate::form::{ConfigForm, FieldInput, FieldWidget};
use crate::gateway::AreaGateway;
use crate::selector::{ActSelector, LoadState};
use crate::session::{SessionExit, WizardSession};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Trigger to set. In edit mode an absent action keeps the stored one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActPlan>,
    /// Reactions to set. In edit mode a non-empty list replaces the stored ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<ActPlan>,
}

/// One act and its config, addressed by service and act name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActPlan {
    pub service: String,
    pub act: String,
    #[serde(default)]
    pub config: IndexMap<String, PlanValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanValue {
    Text(String),
    Integer(i64),
    Labels(Vec<String>),
}

impl PlanValue {
    fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(number) => Some(number.to_string()),
            Self::Labels(_) => None,
        }
    }
}

/// Load a plan from YAML or JSON.
pub fn parse_plan_file(file_path: impl AsRef<Path>) -> Result<CompositionPlan> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read plan file: {}", file_path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Invalid composition plan: {}", file_path.display()))
}

/// Drive `session` through `plan` and stop in review, ready to finish.
pub async fn apply_plan<G: AreaGateway>(session: &mut WizardSession<G>, plan: &CompositionPlan) -> Result<(), WizardError> {
    if let Some(action) = &plan.action {
        session.dispatch(WizardEvent::OpenAction).await?;
        fill_slot(session, action).await?;
    }

    if !plan.reactions.is_empty() {
        let stored: Vec<LocalId> = session
            .composer()
            .draft()
            .reactions
            .iter()
            .flatten()
            .map(|reaction| reaction.id)
            .collect();
        for id in stored {
            session.dispatch(WizardEvent::DeleteReaction(id)).await?;
        }
        for reaction in &plan.reactions {
            session.dispatch(WizardEvent::AddReaction).await?;
            fill_slot(session, reaction).await?;
        }
    }

    session.dispatch(WizardEvent::Review).await?;
    if let Some(title) = &plan.title {
        session.dispatch(WizardEvent::SetTitle(title.clone())).await?;
    }
    if let Some(description) = &plan.description {
        session.dispatch(WizardEvent::SetDescription(description.clone())).await?;
    }
    Ok(())
}

async fn fill_slot<G: AreaGateway>(session: &mut WizardSession<G>, plan: &ActPlan) -> Result<(), WizardError> {
    let service_id = {
        let selector = ready_selector(session, "services")?;
        selector
            .visible_services()
            .into_iter()
            .find(|service| service.name.eq_ignore_ascii_case(&plan.service))
            .map(|service| service.id)
            .ok_or_else(|| WizardError::Plan(format!("service '{}' not found", plan.service)))?
    };
    session.dispatch(WizardEvent::ChooseService(service_id)).await?;
    if let Some(SessionExit::Redirected(path)) = session.exit() {
        return Err(WizardError::Plan(format!(
            "service '{}' is not connected; connect it at {path} first",
            plan.service
        )));
    }

    let act_id = {
        let selector = ready_selector(session, "acts")?;
        match selector.acts().iter().find(|act| act.name.eq_ignore_ascii_case(&plan.act)) {
            Some(act) => act.id,
            None => {
                let reason = selector.empty_message().unwrap_or_else(|| format!("act '{}' not found", plan.act));
                return Err(WizardError::Plan(format!("{}: {reason}", plan.service)));
            }
        }
    };
    session.dispatch(WizardEvent::ChooseAct(act_id)).await?;

    let inputs = plan_inputs(ready_selector(session, "config schema")?.form(), plan)?;
    for (name, input) in inputs {
        session.dispatch(WizardEvent::EditField { name, input }).await?;
    }

    let selector = ready_selector(session, "config schema")?;
    if !selector.can_confirm() {
        let missing = selector.form().missing_fields().join(", ");
        return Err(WizardError::Plan(format!("{}: missing config for {missing}", plan.act)));
    }
    debug!(service = %plan.service, act = %plan.act, "plan slot configured");
    session.dispatch(WizardEvent::Confirm).await
}

fn ready_selector<'a, G: AreaGateway>(session: &'a WizardSession<G>, what: &str) -> Result<&'a ActSelector, WizardError> {
    let selector = session
        .composer()
        .selector()
        .ok_or_else(|| WizardError::Plan(format!("no selector open while loading {what}")))?;
    match selector.status() {
        LoadState::Ready => Ok(selector),
        LoadState::Failed(message) => Err(WizardError::Plan(format!("could not load {what}: {message}"))),
        LoadState::Loading => Err(WizardError::Plan(format!("{what} did not finish loading"))),
    }
}

/// Translate the plan's config map into field inputs against the loaded form.
fn plan_inputs(form: &ConfigForm, plan: &ActPlan) -> Result<Vec<(String, FieldInput)>, WizardError> {
    let mut inputs = Vec::new();
    for (name, value) in &plan.config {
        let field = form
            .fields()
            .iter()
            .find(|field| field.name() == name && field.is_renderable())
            .ok_or_else(|| WizardError::Plan(format!("{}: unknown config field '{name}'", plan.act)))?;
        let mismatch = || WizardError::Plan(format!("{}: value for '{name}' does not fit a {} field", plan.act, field.descriptor().type_name()));

        match (&field.descriptor().kind, field.widget()) {
            (ConfigFieldKind::Input, _) => {
                inputs.push((name.clone(), FieldInput::Text(value.as_text().ok_or_else(mismatch)?)));
            }
            (ConfigFieldKind::Select { options }, _) => {
                let wanted = value.as_text().ok_or_else(mismatch)?;
                let option = options
                    .iter()
                    .find(|option| **option == wanted || same_number(option, value))
                    .ok_or_else(|| WizardError::Plan(format!("{}: '{wanted}' is not an option of '{name}'", plan.act)))?;
                inputs.push((name.clone(), FieldInput::Select(option.clone())));
            }
            (ConfigFieldKind::CheckList { labels }, FieldWidget::CheckList(entries)) => {
                let PlanValue::Labels(wanted) = value else {
                    return Err(mismatch());
                };
                if let Some(unknown) = wanted.iter().find(|label| !labels.contains(label)) {
                    return Err(WizardError::Plan(format!("{}: '{unknown}' is not a label of '{name}'", plan.act)));
                }
                let toggles: Vec<_> = entries
                    .iter()
                    .filter(|entry| entry.checked != wanted.contains(&entry.label))
                    .map(|entry| (name.clone(), FieldInput::Toggle(entry.label.clone())))
                    .collect();
                if toggles.is_empty() && !form.response(name).is_some_and(response_is_filled) {
                    // Nothing changes, but the field still has to emit its list once.
                    if let Some(first) = labels.first() {
                        inputs.push((name.clone(), FieldInput::Toggle(first.clone())));
                        inputs.push((name.clone(), FieldInput::Toggle(first.clone())));
                    }
                }
                inputs.extend(toggles);
            }
            _ => return Err(mismatch()),
        }
    }
    Ok(inputs)
}

fn same_number(option: &str, value: &PlanValue) -> bool {
    matches!(value, PlanValue::Integer(number) if option.trim().parse::<i64>().ok() == Some(*number))
}

fn response_is_filled(response: &ConfigFieldResponse) -> bool {
    matches!(response.value, ConfigValue::CheckList(_)) && response.value.is_filled()
}
