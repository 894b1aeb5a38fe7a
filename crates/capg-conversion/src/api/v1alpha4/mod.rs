//! The hub version of the [`GCPCluster`] resource.
//!
//! Every other version converts to and from the types in this module. They
//! must therefore be able to express everything any spoke can.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::adapter::Hub;

/// GCPCluster is the infrastructure of a workload cluster running on Google
/// Cloud Platform.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha4",
    kind = "GCPCluster",
    plural = "gcpclusters",
    namespaced,
    status = "GCPClusterStatus",
    derive = "Default",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct GCPClusterSpec {
    /// The name of the GCP project to provision the cluster in.
    pub project: String,

    /// The GCP region to provision the cluster in.
    pub region: String,

    /// The endpoint used to communicate with the control plane.
    #[serde(default)]
    pub control_plane_endpoint: ApiEndpoint,

    /// Configuration of the cluster network.
    #[serde(default)]
    pub network: NetworkSpec,

    /// Zones the control plane machines may be placed in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_domains: Vec<String>,

    /// Labels applied to all GCP resources created for this cluster, in
    /// addition to the ones added by default.
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
    /// The name of the network. Defaults to `default` when unset.
    pub name: Option<String>,

    /// Whether GCP creates a subnet per region automatically.
    pub auto_create_subnetworks: Option<bool>,

    /// The subnets of the network, in the order they were declared.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<SubnetSpec>,

    /// The backend port of the control plane load balancer.
    pub load_balancer_backend_port: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub name: String,

    /// The primary IP range of the subnet, in CIDR notation.
    pub cidr_block: String,

    pub description: Option<String>,

    /// Secondary IP ranges of the subnet, in the order they were declared.
    /// Range names must be unique within a subnet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_cidr_blocks: Vec<SecondaryIpRange>,

    pub region: String,

    pub private_google_access: Option<bool>,

    pub enable_flow_logs: Option<bool>,

    /// What the subnet is used for, for example `PRIVATE` or
    /// `INTERNAL_HTTPS_LOAD_BALANCER`.
    pub purpose: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryIpRange {
    pub range_name: String,
    pub ip_cidr_range: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GCPClusterStatus {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failure_domains: BTreeMap<String, FailureDomainSpec>,

    #[serde(default)]
    pub network: Network,

    /// Whether the cluster infrastructure is ready to host machines.
    #[serde(default)]
    pub ready: bool,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDomainSpec {
    /// Whether the failure domain is suitable for control plane machines.
    #[serde(default)]
    pub control_plane: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// The observed state of the GCP network resources.
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

impl Hub for GCPCluster {}

impl Hub for GCPClusterList {}
