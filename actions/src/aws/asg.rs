use crate::AsgMediator;
use async_trait::async_trait;
use rusoto_autoscaling::{
    Autoscaling, AutoscalingClient, DescribeAutoScalingInstancesType, EnterStandbyQuery,
    ExitStandbyQuery,
};
use snafu::{ResultExt, Snafu};

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Failed to describe auto scaling instance {}: {}", instance_id, source))]
    DescribeInstance {
        instance_id: String,
        source: rusoto_core::RusotoError<rusoto_autoscaling::DescribeAutoScalingInstancesError>,
    },

    #[snafu(display("Failed to enter standby for {} in {}: {}", instance_id, group_name, source))]
    EnterStandby {
        instance_id: String,
        group_name: String,
        source: rusoto_core::RusotoError<rusoto_autoscaling::EnterStandbyError>,
    },

    #[snafu(display("Failed to exit standby for {} in {}: {}", instance_id, group_name, source))]
    ExitStandby {
        instance_id: String,
        group_name: String,
        source: rusoto_core::RusotoError<rusoto_autoscaling::ExitStandbyError>,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) struct AwsAsgMediator {
    asg_client: AutoscalingClient,
}

impl AwsAsgMediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        let asg_client = super::build_client::<AutoscalingClient>(region_name)?;
        Ok(AwsAsgMediator { asg_client })
    }
}

#[async_trait]
impl AsgMediator for AwsAsgMediator {
    async fn auto_scaling_group_for(&self, instance_id: &str) -> crate::Result<Option<String>> {
        let resp = self
            .asg_client
            .describe_auto_scaling_instances(DescribeAutoScalingInstancesType {
                instance_ids: Some(vec![instance_id.to_string()]),
                ..DescribeAutoScalingInstancesType::default()
            })
            .await
            .context(DescribeInstance { instance_id })?;
        Ok(resp
            .auto_scaling_instances
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|details| details.auto_scaling_group_name))
    }

    async fn enter_standby(
        &self,
        instance_id: &str,
        group_name: &str,
        decrement: bool,
    ) -> crate::Result<()> {
        self.asg_client
            .enter_standby(EnterStandbyQuery {
                auto_scaling_group_name: group_name.to_string(),
                instance_ids: Some(vec![instance_id.to_string()]),
                should_decrement_desired_capacity: decrement,
            })
            .await
            .context(EnterStandby {
                instance_id,
                group_name,
            })?;
        Ok(())
    }

    async fn exit_standby(&self, instance_id: &str, group_name: &str) -> crate::Result<()> {
        self.asg_client
            .exit_standby(ExitStandbyQuery {
                auto_scaling_group_name: group_name.to_string(),
                instance_ids: Some(vec![instance_id.to_string()]),
            })
            .await
            .context(ExitStandby {
                instance_id,
                group_name,
            })?;
        Ok(())
    }
}
