//! Field-by-field copies between `v1alpha3` and the hub for types whose shape
//! is identical in both versions.
//!
//! Nothing in here may drop or reshape data. Types which differ between the
//! versions are converted by hand in the `conversion` module instead.

use crate::api::{
    v1alpha3::{ApiEndpoint, FailureDomainSpec, Network},
    v1alpha4 as hub,
};

impl From<&ApiEndpoint> for hub::ApiEndpoint {
    fn from(endpoint: &ApiEndpoint) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
        }
    }
}

impl From<&hub::ApiEndpoint> for ApiEndpoint {
    fn from(endpoint: &hub::ApiEndpoint) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
        }
    }
}

impl From<&FailureDomainSpec> for hub::FailureDomainSpec {
    fn from(domain: &FailureDomainSpec) -> Self {
        Self {
            control_plane: domain.control_plane,
            attributes: domain.attributes.clone(),
        }
    }
}

impl From<&hub::FailureDomainSpec> for FailureDomainSpec {
    fn from(domain: &hub::FailureDomainSpec) -> Self {
        Self {
            control_plane: domain.control_plane,
            attributes: domain.attributes.clone(),
        }
    }
}

impl From<&Network> for hub::Network {
    fn from(network: &Network) -> Self {
        Self {
            firewall_rules: network.firewall_rules.clone(),
            router: network.router.clone(),
            api_server_address: network.api_server_address.clone(),
            api_server_health_check: network.api_server_health_check.clone(),
            api_server_instance_groups: network.api_server_instance_groups.clone(),
            api_server_backend_service: network.api_server_backend_service.clone(),
            api_server_target_proxy: network.api_server_target_proxy.clone(),
            api_server_forwarding_rule: network.api_server_forwarding_rule.clone(),
        }
    }
}

impl From<&hub::Network> for Network {
    fn from(network: &hub::Network) -> Self {
        Self {
            firewall_rules: network.firewall_rules.clone(),
            router: network.router.clone(),
            api_server_address: network.api_server_address.clone(),
            api_server_health_check: network.api_server_health_check.clone(),
            api_server_instance_groups: network.api_server_instance_groups.clone(),
            api_server_backend_service: network.api_server_backend_service.clone(),
            api_server_target_proxy: network.api_server_target_proxy.clone(),
            api_server_forwarding_rule: network.api_server_forwarding_rule.clone(),
        }
    }
}
