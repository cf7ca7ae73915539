//! Azure resource types returned by the backend and passed through the wizard

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Azure subscription as listed by `az account list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
}

impl Subscription {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Canonical ARM scope path, `/subscriptions/<id>`
    pub fn scope(&self) -> String {
        if self.id.starts_with('/') {
            self.id.clone()
        } else {
            format!("/subscriptions/{}", self.id)
        }
    }

    /// Bare subscription GUID, as `--subscription` expects it
    pub fn short_id(&self) -> &str {
        if !self.id.starts_with("/subscriptions/") {
            return &self.id;
        }
        last_segment(&self.id)
    }
}

/// Resource group, or the synthetic whole-subscription entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
}

impl ResourceGroup {
    pub const ENTIRE_SUBSCRIPTION: &'static str = "Entire Subscription";

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Scope entry that targets the subscription itself rather than a group
    pub fn entire_subscription(subscription: &Subscription) -> Self {
        Self {
            id: subscription.scope(),
            name: Self::ENTIRE_SUBSCRIPTION.to_string(),
        }
    }
}

/// Policy assignment projected from the ARM policyAssignments API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAssignment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scope: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub policy_definition_id: String,
}

impl PolicyAssignment {
    /// Display name when set, otherwise the internal name
    pub fn display_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display) if !display.is_empty() => display,
            _ => &self.name,
        }
    }

    pub fn short_id(&self) -> &str {
        if self.id.is_empty() {
            return "";
        }
        last_segment(&self.id)
    }

    /// Whether the assignment points at a policy set (initiative)
    pub fn is_policy_set(&self) -> bool {
        self.policy_definition_id
            .to_lowercase()
            .contains("policysetdefinitions")
    }
}

/// Member of a policy set definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefinitionRef {
    pub policy_definition_id: String,
    /// Unique within the containing set
    pub reference_id: String,
    pub display_name: String,
}

/// Components extracted from an ARM policy (set) definition id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyResourceId {
    pub name: String,
    pub subscription: Option<String>,
    pub management_group: Option<String>,
}

impl PolicyResourceId {
    /// Parse `/providers/Microsoft.Management/managementGroups/<mg>/providers/Microsoft.Authorization/policySetDefinitions/<name>`
    /// and the subscription and built-in variants. Returns `None` without a name segment.
    pub fn parse(id: &str) -> Option<Self> {
        let parts: Vec<&str> = id.split('/').collect();
        let mut parsed = PolicyResourceId::default();

        for (i, part) in parts.iter().enumerate() {
            let Some(next) = parts.get(i + 1).filter(|n| !n.is_empty()) else {
                continue;
            };
            if part.eq_ignore_ascii_case("subscriptions") {
                parsed.subscription = Some(next.to_string());
            } else if part.eq_ignore_ascii_case("managementGroups") {
                parsed.management_group = Some(next.to_string());
            } else if part.eq_ignore_ascii_case("policySetDefinitions")
                || part.eq_ignore_ascii_case("policyDefinitions")
            {
                parsed.name = next.to_string();
            }
        }

        if parsed.name.is_empty() {
            None
        } else {
            Some(parsed)
        }
    }

    /// `--management-group` wins over `--subscription`, matching how az resolves definitions
    pub fn location_args(&self) -> Vec<String> {
        if let Some(mg) = &self.management_group {
            vec!["--management-group".to_string(), mg.clone()]
        } else if let Some(sub) = &self.subscription {
            vec!["--subscription".to_string(), sub.clone()]
        } else {
            Vec::new()
        }
    }
}

/// Exemption category accepted by `az policy exemption create`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionCategory {
    #[default]
    Waiver,
    Mitigated,
}

impl ExemptionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExemptionCategory::Waiver => "Waiver",
            ExemptionCategory::Mitigated => "Mitigated",
        }
    }
}

impl std::str::FromStr for ExemptionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "waiver" => Ok(ExemptionCategory::Waiver),
            "mitigated" => Ok(ExemptionCategory::Mitigated),
            other => Err(format!("Unknown exemption category: {}", other)),
        }
    }
}

/// Everything the create operation needs, collected by the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptionRequest {
    pub scope: String,
    pub assignment: PolicyAssignment,
    /// Empty means the whole assignment is exempted
    pub reference_ids: Vec<String>,
    pub ticket: String,
    pub requesters: String,
    pub expires_on: Option<NaiveDate>,
    pub category: ExemptionCategory,
}

fn last_segment(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
