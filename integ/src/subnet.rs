//! Finds subnets of the region's default VPC that test instances can launch into.

use crate::Mediator;
use snafu::{ResultExt, Snafu};

const STATE_AVAILABLE: &str = "available";

/// Ids of all available subnets in the default VPC(s) of the region.
pub async fn find_default_subnets(aws: &dyn Mediator) -> Result<Vec<String>> {
    let mut subnet_ids = Vec::new();
    for vpc_id in aws.default_vpc_ids().await.context(DescribeVpcs)? {
        let subnets = aws
            .subnets_for_vpc(&vpc_id)
            .await
            .context(DescribeSubnets { vpc_id })?;
        subnet_ids.extend(
            subnets
                .into_iter()
                .filter(|subnet| subnet.state == STATE_AVAILABLE)
                .map(|subnet| subnet.subnet_id),
        );
    }
    Ok(subnet_ids)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for this module.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to describe subnets of {}: {}", vpc_id, source))]
    DescribeSubnets {
        vpc_id: String,
        source: crate::Error,
    },

    #[snafu(display("Failed to describe default VPCs: {}", source))]
    DescribeVpcs { source: crate::Error },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}
