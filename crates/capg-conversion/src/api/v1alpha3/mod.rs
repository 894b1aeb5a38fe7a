//! The `v1alpha3` spoke version of the [`GCPCluster`] resource.
//!
//! Compared to the hub ([`v1alpha4`][hub]), subnets have no `purpose` and keep
//! their secondary IP ranges in a map keyed by range name. Conversions live in
//! the private `conversion` (hand-written) and `field_mapping` (1:1 copies)
//! modules.
//!
//! [hub]: crate::api::v1alpha4

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod conversion;
mod field_mapping;

pub use conversion::*;

/// GCPCluster is the infrastructure of a workload cluster running on Google
/// Cloud Platform.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha3",
    kind = "GCPCluster",
    plural = "gcpclusters",
    namespaced,
    status = "GCPClusterStatus",
    derive = "Default",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct GCPClusterSpec {
    pub project: String,

    pub region: String,

    #[serde(default)]
    pub control_plane_endpoint: ApiEndpoint,

    #[serde(default)]
    pub network: NetworkSpec,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_domains: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct ApiEndpoint {
    pub host: String,
    pub port: i32,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    pub name: Option<String>,

    pub auto_create_subnetworks: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<SubnetSpec>,

    pub load_balancer_backend_port: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub name: String,

    pub cidr_block: String,

    pub description: Option<String>,

    /// Secondary IP ranges, keyed by range name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secondary_cidr_blocks: BTreeMap<String, String>,

    pub region: String,

    pub private_google_access: Option<bool>,

    pub enable_flow_logs: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GCPClusterStatus {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failure_domains: BTreeMap<String, FailureDomainSpec>,

    #[serde(default)]
    pub network: Network,

    #[serde(default)]
    pub ready: bool,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDomainSpec {
    #[serde(default)]
    pub control_plane: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub firewall_rules: BTreeMap<String, String>,

    pub router: Option<String>,

    pub api_server_address: Option<String>,

    pub api_server_health_check: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_server_instance_groups: BTreeMap<String, String>,

    pub api_server_backend_service: Option<String>,

    pub api_server_target_proxy: Option<String>,

    pub api_server_forwarding_rule: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GCPClusterList {
    #[serde(default)]
    pub metadata: ListMeta,

    #[serde(default)]
    pub items: Vec<GCPCluster>,
}
