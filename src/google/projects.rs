//! Project enumeration
//!
//! Lists the projects the configured credentials can see. Used by the
//! `--list-projects` discovery aid.

use super::client::GoogleClient;
use crate::core::DiscoveryError;
use serde_json::Value;

/// Project information
#[derive(Debug, Clone)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub lifecycle_state: String,
}

impl From<&Value> for Project {
    fn from(value: &Value) -> Self {
        Self {
            project_id: value
                .get("projectId")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            lifecycle_state: value
                .get("lifecycleState")
                .and_then(|v| v.as_str())
                .unwrap_or("UNKNOWN")
                .to_string(),
        }
    }
}

/// List all accessible, active projects.
pub async fn list_projects(client: &GoogleClient) -> Result<Vec<Project>, DiscoveryError> {
    let url = client.resourcemanager_url("projects");
    let response = client.get(&url).await?;

    let projects = response
        .get("projects")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter(|p| {
                    p.get("lifecycleState")
                        .and_then(|v| v.as_str())
                        .map(|s| s == "ACTIVE")
                        .unwrap_or(false)
                })
                .map(Project::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_from_value_tolerates_missing_fields() {
        let project = Project::from(&json!({"projectId": "my-project"}));
        assert_eq!(project.project_id, "my-project");
        assert_eq!(project.name, "-");
        assert_eq!(project.lifecycle_state, "UNKNOWN");
    }
}
