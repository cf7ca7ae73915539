//! `az` CLI backed implementation of [`Backend`]
//!
//! Every call spawns `az` directly (no shell) with `-o json`, captures stdout
//! and stderr and applies the configured per-command timeout. A non-zero exit
//! status is reported with the trimmed stderr so the wizard can show it as-is.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::types::*;
use super::Backend;
use crate::{ExemptError, Result};

const POLICY_ASSIGNMENTS_API_VERSION: &str = "2021-06-01";

const ASSIGNMENT_QUERY: &str = "{value:value[].{id:id,name:name,displayName:properties.displayName,scope:properties.scope,policyDefinitionId:properties.policyDefinitionId},nextLink:nextLink}";

/// How an `az` call behaves once the caller stops waiting for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    /// Read-only; bounded by the command timeout and killed when abandoned
    Query,
    /// Changes Azure state; no timeout, and the child outlives the caller
    Commit,
}

/// Client that shells out to the Azure CLI
#[derive(Debug, Clone)]
pub struct AzCliClient {
    program: String,
    timeout: Duration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentPage {
    #[serde(default)]
    value: Vec<PolicyAssignment>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicySetDefinition {
    #[serde(default)]
    policy_definitions: Vec<PolicySetMember>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicySetMember {
    policy_definition_id: String,
    #[serde(rename = "policyDefinitionReferenceId")]
    reference_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDefinitionNames {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl AzCliClient {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Make sure an authenticated `az` session exists, launching `az login` if not
    pub async fn ensure_login(&self) -> Result<()> {
        match self.run(&["account", "show"]).await {
            Ok(_) => {
                debug!("Existing Azure CLI session found");
                return Ok(());
            }
            Err(ExemptError::AzNotFound(e)) => return Err(ExemptError::AzNotFound(e)),
            Err(e) => debug!("az account show failed: {}", e),
        }

        println!("No active Azure CLI session detected. Launching 'az login'...");
        let status = Command::new(&self.program)
            .arg("login")
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExemptError::Login(e.to_string()))?;

        if !status.success() {
            return Err(ExemptError::Login(format!("az login exited with {}", status)));
        }
        info!("Azure CLI login completed");
        Ok(())
    }

    /// Run a read-only `az` query and return stdout
    async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<u8>> {
        self.invoke(args, Call::Query).await
    }

    async fn invoke<S: AsRef<str>>(&self, args: &[S], call: Call) -> Result<Vec<u8>> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let command_line = shell_words::join(&args);
        debug!("Running az {}", command_line);

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(call == Call::Query);

        let output = match call {
            Call::Query => tokio::time::timeout(self.timeout, command.output())
                .await
                .map_err(|_| ExemptError::AzTimeout {
                    command: command_line.clone(),
                    seconds: self.timeout.as_secs(),
                })?,
            Call::Commit => command.output().await,
        }
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExemptError::AzNotFound(self.program.clone()),
            _ => ExemptError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("az {} exited with {}", command_line, output.status);
            return Err(ExemptError::AzCommand {
                command: command_line,
                stderr: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned, S: AsRef<str>>(
        &self,
        what: &'static str,
        args: &[S],
    ) -> Result<T> {
        let data = self.run(args).await?;
        serde_json::from_slice(&data).map_err(|source| ExemptError::AzOutput { what, source })
    }

    /// Resolve a policy definition id to its display name
    async fn policy_display_name(&self, definition_id: &str) -> Result<String> {
        let parsed = PolicyResourceId::parse(definition_id)
            .ok_or_else(|| ExemptError::PolicyId(definition_id.to_string()))?;

        let mut args = vec![
            "policy".to_string(),
            "definition".to_string(),
            "show".to_string(),
            "--name".to_string(),
            parsed.name.clone(),
        ];
        args.extend(parsed.location_args());
        args.extend(
            ["--query", "{displayName:displayName,name:name}", "-o", "json"]
                .map(String::from),
        );

        let names: PolicyDefinitionNames = self.run_json("policy definition", &args).await?;
        Ok(names
            .display_name
            .filter(|d| !d.is_empty())
            .or(names.name)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Backend for AzCliClient {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .run_json(
                "subscription data",
                &["account", "list", "--query", "[].{name:name,id:id}", "-o", "json"],
            )
            .await?;
        subs.sort_by_key(|s| s.name.to_lowercase());
        debug!("Loaded {} subscriptions", subs.len());
        Ok(subs)
    }

    async fn list_assignments(&self, subscription_id: &str) -> Result<Vec<PolicyAssignment>> {
        let mut assignments = Vec::new();
        let mut uri = Some(assignments_uri(subscription_id));

        while let Some(current) = uri.take() {
            let page: AssignmentPage = self
                .run_json(
                    "assignment data",
                    &[
                        "rest",
                        "--method",
                        "get",
                        "--uri",
                        current.as_str(),
                        "--subscription",
                        subscription_id,
                        "--query",
                        ASSIGNMENT_QUERY,
                        "-o",
                        "json",
                    ],
                )
                .await?;
            assignments.extend(page.value);
            uri = page.next_link.filter(|link| !link.is_empty());
        }

        assignments.sort_by_key(|a| a.display_label().to_lowercase());
        debug!(
            "Loaded {} policy assignments for subscription {}",
            assignments.len(),
            subscription_id
        );
        Ok(assignments)
    }

    async fn list_assignment_definitions(
        &self,
        assignment: &PolicyAssignment,
    ) -> Result<Vec<PolicyDefinitionRef>> {
        if assignment.policy_definition_id.is_empty() || !assignment.is_policy_set() {
            return Ok(Vec::new());
        }

        let set_id = &assignment.policy_definition_id;
        let parsed =
            PolicyResourceId::parse(set_id).ok_or_else(|| ExemptError::PolicyId(set_id.clone()))?;

        let mut args = vec![
            "policy".to_string(),
            "set-definition".to_string(),
            "show".to_string(),
            "--name".to_string(),
            parsed.name.clone(),
        ];
        args.extend(parsed.location_args());
        args.extend(["--query", "{policyDefinitions:policyDefinitions}", "-o", "json"].map(String::from));

        let set: PolicySetDefinition = self.run_json("policy set definition", &args).await?;

        let mut refs = Vec::with_capacity(set.policy_definitions.len());
        for member in set.policy_definitions {
            let display_name = match self.policy_display_name(&member.policy_definition_id).await {
                Ok(name) if !name.is_empty() => name,
                Ok(_) => member.policy_definition_id.clone(),
                Err(e) => {
                    debug!(
                        "Falling back to id for {}: {}",
                        member.policy_definition_id, e
                    );
                    member.policy_definition_id.clone()
                }
            };
            refs.push(PolicyDefinitionRef {
                policy_definition_id: member.policy_definition_id,
                reference_id: member.reference_id,
                display_name,
            });
        }

        refs.sort_by_key(|r| r.display_name.to_lowercase());
        Ok(refs)
    }

    async fn list_resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>> {
        let mut groups: Vec<ResourceGroup> = self
            .run_json(
                "resource group data",
                &[
                    "group",
                    "list",
                    "--subscription",
                    subscription_id,
                    "--query",
                    "[].{name:name,id:id}",
                    "-o",
                    "json",
                ],
            )
            .await?;
        groups.sort_by_key(|g| g.name.to_lowercase());
        Ok(groups)
    }

    async fn create_exemption(&self, request: &ExemptionRequest) -> Result<String> {
        let raised_at = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let args = create_exemption_args(request, &raised_at);
        let output = self.invoke(&args, Call::Commit).await?;
        info!(
            "Created policy exemption {} at scope {}",
            request.ticket, request.scope
        );
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

fn assignments_uri(subscription_id: &str) -> String {
    format!(
        "/subscriptions/{}/providers/Microsoft.Authorization/policyAssignments?api-version={}",
        subscription_id, POLICY_ASSIGNMENTS_API_VERSION
    )
}

/// Build the `az policy exemption create` argument list
pub fn create_exemption_args(request: &ExemptionRequest, raised_at: &str) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "policy".into(),
        "exemption".into(),
        "create".into(),
        "--name".into(),
        request.ticket.clone(),
        "--scope".into(),
        request.scope.clone(),
        "--policy-assignment".into(),
        request.assignment.id.clone(),
        "--display-name".into(),
        format!(
            "{}/{} {}",
            request.scope,
            request.assignment.display_label(),
            request.ticket
        ),
        "--description".into(),
        format!(
            "Ticket {} raised by {} on {}",
            request.ticket, request.requesters, raised_at
        ),
        "--exemption-category".into(),
        request.category.as_str().into(),
        "-o".into(),
        "json".into(),
    ];

    if let Some(date) = request.expires_on {
        args.push("--expires-on".into());
        // Exemption stays valid for the whole of its last day
        args.push(format!("{}T23:59:59Z", date.format("%Y-%m-%d")));
    }

    if !request.reference_ids.is_empty() {
        args.push("--policy-definition-reference-ids".into());
        args.extend(request.reference_ids.iter().cloned());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn request() -> ExemptionRequest {
        ExemptionRequest {
            scope: "/subscriptions/a/resourceGroups/rg1".into(),
            assignment: PolicyAssignment {
                id: "/subscriptions/a/providers/Microsoft.Authorization/policyAssignments/sec".into(),
                name: "sec".into(),
                display_name: Some("Security".into()),
                ..Default::default()
            },
            reference_ids: Vec::new(),
            ticket: "INC1".into(),
            requesters: "alice, bob".into(),
            expires_on: None,
            category: ExemptionCategory::Waiver,
        }
    }

    #[test]
    fn test_create_args_whole_assignment_without_expiry() {
        let args = create_exemption_args(&request(), "2024-06-01T10:00:00+00:00");
        assert_eq!(
            args,
            vec![
                "policy",
                "exemption",
                "create",
                "--name",
                "INC1",
                "--scope",
                "/subscriptions/a/resourceGroups/rg1",
                "--policy-assignment",
                "/subscriptions/a/providers/Microsoft.Authorization/policyAssignments/sec",
                "--display-name",
                "/subscriptions/a/resourceGroups/rg1/Security INC1",
                "--description",
                "Ticket INC1 raised by alice, bob on 2024-06-01T10:00:00+00:00",
                "--exemption-category",
                "Waiver",
                "-o",
                "json",
            ]
        );
    }

    #[test]
    fn test_create_args_with_expiry_and_references() {
        let mut req = request();
        req.expires_on = NaiveDate::from_ymd_opt(2024, 6, 15);
        req.reference_ids = vec!["ref-a".into(), "ref-b".into()];
        req.category = ExemptionCategory::Mitigated;

        let args = create_exemption_args(&req, "now");
        let expires = args.iter().position(|a| a == "--expires-on").unwrap();
        assert_eq!(args[expires + 1], "2024-06-15T23:59:59Z");

        let refs = args
            .iter()
            .position(|a| a == "--policy-definition-reference-ids")
            .unwrap();
        assert_eq!(&args[refs + 1..], &["ref-a".to_string(), "ref-b".to_string()]);
        assert!(args.contains(&"Mitigated".to_string()));
    }

    #[test]
    fn test_assignments_uri() {
        assert_eq!(
            assignments_uri("abc"),
            "/subscriptions/abc/providers/Microsoft.Authorization/policyAssignments?api-version=2021-06-01"
        );
    }

    #[test]
    fn test_assignment_page_parsing() {
        let json = r#"{"value":[{"id":"/x/a","name":"a","displayName":"A","scope":"/x","policyDefinitionId":"/p"}],"nextLink":null}"#;
        let page: AssignmentPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_link, None);
    }

    #[test]
    fn test_policy_set_parsing() {
        let json = r#"{"policyDefinitions":[{"policyDefinitionId":"/p/1","policyDefinitionReferenceId":"r1"}]}"#;
        let set: PolicySetDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(set.policy_definitions[0].reference_id, "r1");
    }

    #[tokio::test]
    async fn test_missing_program_reports_not_found() {
        let client = AzCliClient::new("azexempt-no-such-binary", Duration::from_secs(5));
        let err = client.list_subscriptions().await.unwrap_err();
        assert!(matches!(err, ExemptError::AzNotFound(_)));
    }

    #[tokio::test]
    async fn test_non_policy_set_has_no_definitions() {
        let client = AzCliClient::new("azexempt-no-such-binary", Duration::from_secs(5));
        let assignment = PolicyAssignment {
            policy_definition_id: "/providers/Microsoft.Authorization/policyDefinitions/x".into(),
            ..Default::default()
        };
        let refs = client.list_assignment_definitions(&assignment).await.unwrap();
        assert!(refs.is_empty());
    }

    /// Write an executable stand-in for `az` that runs `body`
    #[cfg(unix)]
    fn fake_az(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("az");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_bounded_by_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let az = fake_az(dir.path(), "sleep 5\necho '[]'");
        let client = AzCliClient::new(az.to_string_lossy(), Duration::from_millis(200));

        let err = client.list_subscriptions().await.unwrap_err();
        assert!(matches!(err, ExemptError::AzTimeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_create_not_bounded_by_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let az = fake_az(dir.path(), "sleep 1\necho '{\"name\": \"INC1\"}'");
        let client = AzCliClient::new(az.to_string_lossy(), Duration::from_millis(200));

        let output = client.create_exemption(&request()).await.unwrap();
        assert_eq!(output.trim(), "{\"name\": \"INC1\"}");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_survives_runtime_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("created");
        let az = fake_az(
            dir.path(),
            &format!("sleep 1\ntouch '{}'\necho '{{}}'", marker.display()),
        );
        let client = AzCliClient::new(az.to_string_lossy(), Duration::from_secs(30));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.spawn(async move { client.create_exemption(&request()).await });

        // Quit while the create is in flight
        std::thread::sleep(Duration::from_millis(300));
        drop(runtime);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !marker.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(marker.exists(), "az exemption create was killed on shutdown");
    }
}
