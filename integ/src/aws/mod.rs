//! Wires the [`Mediator`](crate::Mediator) trait to `rusoto` clients.

use rusoto_cloudformation::CloudFormationClient;
use rusoto_core::{DispatchSignedRequest, Region};
use rusoto_credential::{DefaultCredentialsProvider, ProvideAwsCredentials};
use rusoto_ec2::Ec2Client;
use rusoto_iam::IamClient;
use rusoto_sns::SnsClient;
use rusoto_ssm::SsmClient;
use rusoto_sts::StsClient;
use snafu::{ResultExt, Snafu};
use std::str::FromStr;

mod api;

pub(crate) use api::AwsMediator;

type Result<T> = std::result::Result<T, Error>;

/// Errors creating the `rusoto` clients.
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

impl_new_with!(CloudFormationClient);
impl_new_with!(Ec2Client);
impl_new_with!(IamClient);
impl_new_with!(SnsClient);
impl_new_with!(SsmClient);
impl_new_with!(StsClient);

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
