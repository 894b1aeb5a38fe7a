//! Hand-written conversions between `v1alpha3` and the hub for the types
//! whose shape differs between both versions.

use crate::{
    adapter::Convertible,
    api::{
        v1alpha3::{
            GCPCluster, GCPClusterList, GCPClusterSpec, GCPClusterStatus, NetworkSpec, SubnetSpec,
        },
        v1alpha4 as hub,
    },
    collection,
    error::Result,
    field,
};

pub fn convert_cluster_spec_to_hub(spec: &GCPClusterSpec) -> Result<hub::GCPClusterSpec> {
    Ok(hub::GCPClusterSpec {
        project: spec.project.clone(),
        region: spec.region.clone(),
        control_plane_endpoint: (&spec.control_plane_endpoint).into(),
        network: convert_network_spec_to_hub(&spec.network)?,
        failure_domains: spec.failure_domains.clone(),
        additional_labels: spec.additional_labels.clone(),
    })
}

pub fn convert_cluster_spec_from_hub(spec: &hub::GCPClusterSpec) -> Result<GCPClusterSpec> {
    Ok(GCPClusterSpec {
        project: spec.project.clone(),
        region: spec.region.clone(),
        control_plane_endpoint: (&spec.control_plane_endpoint).into(),
        network: convert_network_spec_from_hub(&spec.network)?,
        failure_domains: spec.failure_domains.clone(),
        additional_labels: spec.additional_labels.clone(),
    })
}

pub fn convert_cluster_status_to_hub(status: &GCPClusterStatus) -> Result<hub::GCPClusterStatus> {
    Ok(hub::GCPClusterStatus {
        failure_domains: collection::convert_map("failureDomains", &status.failure_domains, |domain| {
            Ok(domain.into())
        })?,
        network: (&status.network).into(),
        ready: status.ready,
    })
}

pub fn convert_cluster_status_from_hub(
    status: &hub::GCPClusterStatus,
) -> Result<GCPClusterStatus> {
    Ok(GCPClusterStatus {
        failure_domains: collection::convert_map("failureDomains", &status.failure_domains, |domain| {
            Ok(domain.into())
        })?,
        network: (&status.network).into(),
        ready: status.ready,
    })
}

pub fn convert_network_spec_to_hub(network: &NetworkSpec) -> Result<hub::NetworkSpec> {
    Ok(hub::NetworkSpec {
        name: network.name.clone(),
        auto_create_subnetworks: network.auto_create_subnetworks,
        subnets: collection::convert_all("subnets", &network.subnets, convert_subnet_spec_to_hub)?,
        load_balancer_backend_port: network.load_balancer_backend_port,
    })
}

pub fn convert_network_spec_from_hub(network: &hub::NetworkSpec) -> Result<NetworkSpec> {
    Ok(NetworkSpec {
        name: network.name.clone(),
        auto_create_subnetworks: network.auto_create_subnetworks,
        subnets: collection::convert_all(
            "subnets",
            &network.subnets,
            convert_subnet_spec_from_hub,
        )?,
        load_balancer_backend_port: network.load_balancer_backend_port,
    })
}

/// Secondary ranges come out sorted by range name. The hub-only `purpose`
/// stays unset.
pub fn convert_subnet_spec_to_hub(subnet: &SubnetSpec) -> Result<hub::SubnetSpec> {
    Ok(hub::SubnetSpec {
        name: subnet.name.clone(),
        cidr_block: subnet.cidr_block.clone(),
        description: subnet.description.clone(),
        secondary_cidr_blocks: field::map_to_keyed_list(
            &subnet.secondary_cidr_blocks,
            |range_name, ip_cidr_range| hub::SecondaryIpRange {
                range_name: range_name.clone(),
                ip_cidr_range: ip_cidr_range.clone(),
            },
        ),
        region: subnet.region.clone(),
        private_google_access: subnet.private_google_access,
        enable_flow_logs: subnet.enable_flow_logs,
        purpose: None,
    })
}

/// Drops the `purpose` and fails if two secondary ranges share a name.
pub fn convert_subnet_spec_from_hub(subnet: &hub::SubnetSpec) -> Result<SubnetSpec> {
    Ok(SubnetSpec {
        name: subnet.name.clone(),
        cidr_block: subnet.cidr_block.clone(),
        description: subnet.description.clone(),
        secondary_cidr_blocks: field::keyed_list_to_map(
            "SubnetSpec",
            &subnet.secondary_cidr_blocks,
            |range| (range.range_name.clone(), range.ip_cidr_range.clone()),
        )?,
        region: subnet.region.clone(),
        private_google_access: subnet.private_google_access,
        enable_flow_logs: subnet.enable_flow_logs,
    })
}

impl Convertible<hub::GCPCluster> for GCPCluster {
    fn to_hub(&self) -> Result<hub::GCPCluster> {
        let mut cluster = hub::GCPCluster::new("", convert_cluster_spec_to_hub(&self.spec)?);
        cluster.metadata = self.metadata.clone();
        cluster.status = self
            .status
            .as_ref()
            .map(convert_cluster_status_to_hub)
            .transpose()?;

        Ok(cluster)
    }

    fn from_hub(hub: &hub::GCPCluster) -> Result<Self> {
        let mut cluster = Self::new("", convert_cluster_spec_from_hub(&hub.spec)?);
        cluster.metadata = hub.metadata.clone();
        cluster.status = hub
            .status
            .as_ref()
            .map(convert_cluster_status_from_hub)
            .transpose()?;

        Ok(cluster)
    }

    fn restore(hub: &mut hub::GCPCluster, preserved: hub::GCPCluster) {
        let subnets = hub.spec.network.subnets.iter_mut();

        // Subnets are only matched by position if they still carry the same name
        for (subnet, preserved) in subnets.zip(preserved.spec.network.subnets) {
            if subnet.name != preserved.name {
                continue;
            }

            subnet.purpose = preserved.purpose;
            field::restore_order(
                &mut subnet.secondary_cidr_blocks,
                preserved.secondary_cidr_blocks,
            );
        }
    }
}

impl Convertible<hub::GCPClusterList> for GCPClusterList {
    fn to_hub(&self) -> Result<hub::GCPClusterList> {
        Ok(hub::GCPClusterList {
            metadata: self.metadata.clone(),
            items: collection::convert_all("items", &self.items, |item| item.to_hub())?,
        })
    }

    fn from_hub(hub: &hub::GCPClusterList) -> Result<Self> {
        Ok(Self {
            metadata: hub.metadata.clone(),
            items: collection::convert_all("items", &hub.items, GCPCluster::from_hub)?,
        })
    }
}
