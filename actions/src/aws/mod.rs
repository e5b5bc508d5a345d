/*!
The `aws` module implements the crate's mediator traits with `rusoto` clients
and maps raw responses into small owned structs containing only the fields the
handlers need.
*/

use rusoto_autoscaling::AutoscalingClient;
use rusoto_cloudformation::CloudFormationClient;
use rusoto_core::{DispatchSignedRequest, Region};
use rusoto_credential::{DefaultCredentialsProvider, ProvideAwsCredentials};
use rusoto_ec2::Ec2Client;
use rusoto_iam::IamClient;
use rusoto_rds::RdsClient;
use snafu::{ResultExt, Snafu};
use std::str::FromStr;

mod asg;
mod cfn;
mod ec2;
mod iam;
mod rds;

pub(crate) use asg::AwsAsgMediator;
pub(crate) use cfn::AwsCfnMediator;
pub(crate) use ec2::AwsEc2Mediator;
pub(crate) use iam::AwsIamMediator;
pub(crate) use rds::AwsRdsMediator;

type Result<T> = std::result::Result<T, Error>;

/// Errors shared by all mediators when constructing their `rusoto` client.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub(crate) enum Error {
    #[snafu(display("Failed to create the default AWS credentials provider: {}", source))]
    DefaultProvider {
        source: rusoto_credential::CredentialsError,
    },

    #[snafu(display("Failed to create HTTP client: {}", source))]
    HttpClient {
        source: rusoto_core::request::TlsError,
    },

    #[snafu(display("Failed to parse region `{}`: {}", name, source))]
    ParseRegion {
        name: String,
        source: rusoto_signature::region::ParseRegionError,
    },
}

impl From<Error> for crate::Error {
    fn from(e: Error) -> Self {
        crate::Error::new(e)
    }
}

pub(crate) trait NewWith {
    fn new_with<P, D>(request_dispatcher: D, credentials_provider: P, region: Region) -> Self
    where
        P: ProvideAwsCredentials + Send + Sync + 'static,
        D: DispatchSignedRequest + Send + Sync + 'static;
}

macro_rules! impl_new_with {
    ($client:ty) => {
        impl NewWith for $client {
            fn new_with<P, D>(
                request_dispatcher: D,
                credentials_provider: P,
                region: Region,
            ) -> Self
            where
                P: ProvideAwsCredentials + Send + Sync + 'static,
                D: DispatchSignedRequest + Send + Sync + 'static,
            {
                Self::new_with(request_dispatcher, credentials_provider, region)
            }
        }
    };
}

impl_new_with!(AutoscalingClient);
impl_new_with!(CloudFormationClient);
impl_new_with!(Ec2Client);
impl_new_with!(IamClient);
impl_new_with!(RdsClient);

/// Create a rusoto client of the given type for the given region name.
fn build_client<T: NewWith>(region_name: &str) -> Result<T> {
    let region =
        Region::from_str(region_name).context(self::ParseRegion { name: region_name })?;
    let provider = DefaultCredentialsProvider::new().context(self::DefaultProvider)?;
    Ok(T::new_with(
        rusoto_core::HttpClient::new().context(self::HttpClient)?,
        provider,
        region,
    ))
}
