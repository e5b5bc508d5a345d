use crate::{Ec2Mediator, SnapshotDetails};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusoto_ec2::{
    AssociateIamInstanceProfileRequest, AttributeValue, AuthorizeSecurityGroupIngressRequest,
    CopySnapshotRequest, CreateSecurityGroupRequest, CreateSnapshotRequest,
    DeleteSecurityGroupRequest, DeleteSnapshotRequest, DescribeIamInstanceProfileAssociationsRequest,
    DescribeSecurityGroupsRequest, DescribeSubnetsRequest, DescribeVolumesRequest,
    DetachVolumeRequest, Ec2, Ec2Client, Filter, IamInstanceProfileSpecification,
    IpPermission, IpRange, ModifyInstanceAttributeRequest,
};
use snafu::{OptionExt, ResultExt, Snafu};

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Failed to associate instance profile to {}: {}", instance_id, source))]
    AssociateProfile {
        instance_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::AssociateIamInstanceProfileError>,
    },

    #[snafu(display("Failed to authorize ingress on group {}: {}", group_id, source))]
    AuthorizeIngress {
        group_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::AuthorizeSecurityGroupIngressError>,
    },

    #[snafu(display("Failed to copy snapshot {}: {}", snapshot_id, source))]
    CopySnapshot {
        snapshot_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::CopySnapshotError>,
    },

    #[snafu(display("Failed to create security group {}: {}", group_name, source))]
    CreateSecurityGroup {
        group_name: String,
        source: rusoto_core::RusotoError<rusoto_ec2::CreateSecurityGroupError>,
    },

    #[snafu(display("Failed to create snapshot of volume {}: {}", volume_id, source))]
    CreateSnapshot {
        volume_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::CreateSnapshotError>,
    },

    #[snafu(display("Failed to delete security group {}: {}", group_id, source))]
    DeleteSecurityGroup {
        group_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DeleteSecurityGroupError>,
    },

    #[snafu(display("Failed to delete snapshot {}: {}", snapshot_id, source))]
    DeleteSnapshot {
        snapshot_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DeleteSnapshotError>,
    },

    #[snafu(display("Failed to describe profile associations for {}: {}", instance_id, source))]
    DescribeAssociations {
        instance_id: String,
        source:
            rusoto_core::RusotoError<rusoto_ec2::DescribeIamInstanceProfileAssociationsError>,
    },

    #[snafu(display("Failed to describe security groups: {}", source))]
    DescribeSecurityGroups {
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeSecurityGroupsError>,
    },

    #[snafu(display("Failed to describe subnets of vpc {}: {}", vpc_id, source))]
    DescribeSubnets {
        vpc_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeSubnetsError>,
    },

    #[snafu(display("Failed to describe volume {}: {}", volume_id, source))]
    DescribeVolumes {
        volume_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DescribeVolumesError>,
    },

    #[snafu(display("Failed to detach volume {}: {}", volume_id, source))]
    DetachVolume {
        volume_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::DetachVolumeError>,
    },

    #[snafu(display("Failed to disassociate instance profile {}: {}", association_id, source))]
    DisassociateProfile {
        association_id: String,
        source:
            rusoto_core::RusotoError<rusoto_ec2::DisassociateIamInstanceProfileError>,
    },

    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    Ec2MissingField {
        api: &'static str,
        field: &'static str,
    },

    #[snafu(display("Failed to modify instance type of {}: {}", instance_id, source))]
    ModifyInstanceType {
        instance_id: String,
        source: rusoto_core::RusotoError<rusoto_ec2::ModifyInstanceAttributeError>,
    },

    #[snafu(display("Failed to parse snapshot start time `{}`: {}", value, source))]
    ParseStartTime {
        value: String,
        source: chrono::ParseError,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) struct AwsEc2Mediator {
    ec2_client: Ec2Client,
}

impl AwsEc2Mediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        let ec2_client = super::build_client::<Ec2Client>(region_name)?;
        Ok(AwsEc2Mediator { ec2_client })
    }
}

fn name_filter(name: &str, value: &str) -> Filter {
    Filter {
        name: Some(name.to_string()),
        values: Some(vec![value.to_string()]),
    }
}

#[async_trait]
impl Ec2Mediator for AwsEc2Mediator {
    async fn create_snapshot(
        &self,
        volume_id: &str,
        description: &str,
    ) -> crate::Result<SnapshotDetails> {
        let resp = self
            .ec2_client
            .create_snapshot(CreateSnapshotRequest {
                volume_id: volume_id.to_string(),
                description: Some(description.to_string()),
                ..CreateSnapshotRequest::default()
            })
            .await
            .context(CreateSnapshot { volume_id })?;
        let snapshot_id = resp.snapshot_id.context(Ec2MissingField {
            api: "create_snapshot",
            field: "snapshot_id",
        })?;
        let start_time = match resp.start_time {
            Some(value) => Some(
                DateTime::parse_from_rfc3339(&value)
                    .context(ParseStartTime { value })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        Ok(SnapshotDetails {
            snapshot_id,
            start_time,
        })
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> crate::Result<()> {
        self.ec2_client
            .delete_snapshot(DeleteSnapshotRequest {
                snapshot_id: snapshot_id.to_string(),
                ..DeleteSnapshotRequest::default()
            })
            .await
            .context(DeleteSnapshot { snapshot_id })?;
        Ok(())
    }

    async fn copy_snapshot(
        &self,
        snapshot_id: &str,
        source_region: &str,
        description: &str,
    ) -> crate::Result<String> {
        let resp = self
            .ec2_client
            .copy_snapshot(CopySnapshotRequest {
                source_snapshot_id: snapshot_id.to_string(),
                source_region: source_region.to_string(),
                description: Some(description.to_string()),
                ..CopySnapshotRequest::default()
            })
            .await
            .context(CopySnapshot { snapshot_id })?;
        Ok(resp.snapshot_id.context(Ec2MissingField {
            api: "copy_snapshot",
            field: "snapshot_id",
        })?)
    }

    async fn modify_instance_type(
        &self,
        instance_id: &str,
        instance_type: &str,
    ) -> crate::Result<()> {
        self.ec2_client
            .modify_instance_attribute(ModifyInstanceAttributeRequest {
                instance_id: instance_id.to_string(),
                instance_type: Some(AttributeValue {
                    value: Some(instance_type.to_string()),
                }),
                ..ModifyInstanceAttributeRequest::default()
            })
            .await
            .context(ModifyInstanceType { instance_id })?;
        Ok(())
    }

    async fn detach_volume(&self, volume_id: &str) -> crate::Result<()> {
        self.ec2_client
            .detach_volume(DetachVolumeRequest {
                volume_id: volume_id.to_string(),
                ..DetachVolumeRequest::default()
            })
            .await
            .context(DetachVolume { volume_id })?;
        Ok(())
    }

    async fn volume_attachment_state(&self, volume_id: &str) -> crate::Result<Option<String>> {
        let resp = self
            .ec2_client
            .describe_volumes(DescribeVolumesRequest {
                volume_ids: Some(vec![volume_id.to_string()]),
                ..DescribeVolumesRequest::default()
            })
            .await
            .context(DescribeVolumes { volume_id })?;
        let volume = resp
            .volumes
            .and_then(|mut volumes| volumes.pop())
            .context(Ec2MissingField {
                api: "describe_volumes",
                field: "volumes",
            })?;
        match volume.attachments.unwrap_or_default().first() {
            None => Ok(None),
            Some(attachment) => Ok(Some(
                attachment
                    .state
                    .clone()
                    .context(Ec2MissingField {
                        api: "describe_volumes",
                        field: "attachments[].state",
                    })?,
            )),
        }
    }

    async fn instance_profile_association(
        &self,
        instance_id: &str,
    ) -> crate::Result<Option<String>> {
        let resp = self
            .ec2_client
            .describe_iam_instance_profile_associations(
                DescribeIamInstanceProfileAssociationsRequest {
                    filters: Some(vec![name_filter("instance-id", instance_id)]),
                    ..DescribeIamInstanceProfileAssociationsRequest::default()
                },
            )
            .await
            .context(DescribeAssociations { instance_id })?;
        match resp
            .iam_instance_profile_associations
            .unwrap_or_default()
            .first()
        {
            None => Ok(None),
            Some(association) => Ok(Some(association.association_id.clone().context(
                Ec2MissingField {
                    api: "describe_iam_instance_profile_associations",
                    field: "association_id",
                },
            )?)),
        }
    }

    async fn disassociate_instance_profile(&self, association_id: &str) -> crate::Result<()> {
        self.ec2_client
            .disassociate_iam_instance_profile(
                rusoto_ec2::DisassociateIamInstanceProfileRequest {
                    association_id: association_id.to_string(),
                },
            )
            .await
            .context(DisassociateProfile { association_id })?;
        Ok(())
    }

    async fn associate_instance_profile(
        &self,
        profile_name: &str,
        profile_arn: &str,
        instance_id: &str,
    ) -> crate::Result<String> {
        let resp = self
            .ec2_client
            .associate_iam_instance_profile(AssociateIamInstanceProfileRequest {
                iam_instance_profile: IamInstanceProfileSpecification {
                    arn: Some(profile_arn.to_string()),
                    name: Some(profile_name.to_string()),
                },
                instance_id: instance_id.to_string(),
            })
            .await
            .context(AssociateProfile { instance_id })?;
        Ok(resp
            .iam_instance_profile_association
            .and_then(|association| association.association_id)
            .context(Ec2MissingField {
                api: "associate_iam_instance_profile",
                field: "association_id",
            })?)
    }

    async fn find_security_group(
        &self,
        vpc_id: &str,
        group_name: &str,
    ) -> crate::Result<Option<String>> {
        let resp = self
            .ec2_client
            .describe_security_groups(DescribeSecurityGroupsRequest {
                filters: Some(vec![
                    name_filter("group-name", group_name),
                    name_filter("vpc-id", vpc_id),
                ]),
                ..DescribeSecurityGroupsRequest::default()
            })
            .await
            .context(DescribeSecurityGroups)?;
        for group in resp.security_groups.unwrap_or_default() {
            // the filters are case-insensitive and honor wildcards, so double-check
            // for an exact match
            if group.group_name.as_deref() == Some(group_name)
                && group.vpc_id.as_deref() == Some(vpc_id)
            {
                return Ok(Some(group.group_id.context(Ec2MissingField {
                    api: "describe_security_groups",
                    field: "group_id",
                })?));
            }
        }
        Ok(None)
    }

    async fn create_security_group(
        &self,
        vpc_id: &str,
        group_name: &str,
    ) -> crate::Result<String> {
        let resp = self
            .ec2_client
            .create_security_group(CreateSecurityGroupRequest {
                group_name: group_name.to_string(),
                description: "Security group created by automation".to_string(),
                vpc_id: Some(vpc_id.to_string()),
                ..CreateSecurityGroupRequest::default()
            })
            .await
            .context(CreateSecurityGroup { group_name })?;
        Ok(resp.group_id.context(Ec2MissingField {
            api: "create_security_group",
            field: "group_id",
        })?)
    }

    async fn authorize_ingress(&self, group_id: &str, port: i64, cidr: &str) -> crate::Result<()> {
        self.ec2_client
            .authorize_security_group_ingress(AuthorizeSecurityGroupIngressRequest {
                group_id: Some(group_id.to_string()),
                ip_permissions: Some(vec![IpPermission {
                    ip_protocol: Some("tcp".to_string()),
                    from_port: Some(port),
                    to_port: Some(port),
                    ip_ranges: Some(vec![IpRange {
                        cidr_ip: Some(cidr.to_string()),
                        ..IpRange::default()
                    }]),
                    ..IpPermission::default()
                }]),
                ..AuthorizeSecurityGroupIngressRequest::default()
            })
            .await
            .context(AuthorizeIngress { group_id })?;
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> crate::Result<()> {
        self.ec2_client
            .delete_security_group(DeleteSecurityGroupRequest {
                group_id: Some(group_id.to_string()),
                ..DeleteSecurityGroupRequest::default()
            })
            .await
            .context(DeleteSecurityGroup { group_id })?;
        Ok(())
    }

    async fn default_subnet_for_vpc(&self, vpc_id: &str) -> crate::Result<Option<String>> {
        let resp = self
            .ec2_client
            .describe_subnets(DescribeSubnetsRequest {
                filters: Some(vec![name_filter("vpc-id", vpc_id)]),
                ..DescribeSubnetsRequest::default()
            })
            .await
            .context(DescribeSubnets { vpc_id })?;
        for subnet in resp.subnets.unwrap_or_default() {
            if subnet.default_for_az.unwrap_or(false) && subnet.vpc_id.as_deref() == Some(vpc_id)
            {
                return Ok(Some(subnet.subnet_id.context(Ec2MissingField {
                    api: "describe_subnets",
                    field: "subnet_id",
                })?));
            }
        }
        Ok(None)
    }
}
