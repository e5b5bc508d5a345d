use crate::RdsMediator;
use async_trait::async_trait;
use rusoto_rds::{DescribeDBInstancesMessage, RebootDBInstanceMessage, Rds, RdsClient};
use snafu::{OptionExt, ResultExt, Snafu};

/// The error type for this module.
#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("Failed to describe DB instance {}: {}", instance_id, source))]
    DescribeDbInstance {
        instance_id: String,
        source: rusoto_core::RusotoError<rusoto_rds::DescribeDBInstancesError>,
    },

    #[snafu(display("Missing field in `{}` response: {}", api, field))]
    RdsMissingField {
        api: &'static str,
        field: &'static str,
    },

    #[snafu(display("Failed to reboot DB instance {}: {}", instance_id, source))]
    RebootDbInstance {
        instance_id: String,
        source: rusoto_core::RusotoError<rusoto_rds::RebootDBInstanceError>,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) struct AwsRdsMediator {
    rds_client: RdsClient,
}

impl AwsRdsMediator {
    pub(crate) fn new(region_name: &str) -> crate::Result<Self> {
        let rds_client = super::build_client::<RdsClient>(region_name)?;
        Ok(AwsRdsMediator { rds_client })
    }
}

#[async_trait]
impl RdsMediator for AwsRdsMediator {
    async fn db_instance_status(&self, instance_id: &str) -> crate::Result<String> {
        let resp = self
            .rds_client
            .describe_db_instances(DescribeDBInstancesMessage {
                db_instance_identifier: Some(instance_id.to_string()),
                ..DescribeDBInstancesMessage::default()
            })
            .await
            .context(DescribeDbInstance { instance_id })?;
        Ok(resp
            .db_instances
            .and_then(|mut instances| {
                if instances.is_empty() {
                    None
                } else {
                    instances.remove(0).db_instance_status
                }
            })
            .context(RdsMissingField {
                api: "describe_db_instances",
                field: "db_instances[].db_instance_status",
            })?)
    }

    async fn reboot_db_instance(&self, instance_id: &str) -> crate::Result<()> {
        self.rds_client
            .reboot_db_instance(RebootDBInstanceMessage {
                db_instance_identifier: instance_id.to_string(),
                ..RebootDBInstanceMessage::default()
            })
            .await
            .context(RebootDbInstance { instance_id })?;
        Ok(())
    }
}
