use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, SdkConfig};
use aws_types::region::Region;
use log::debug;

const FALLBACK_REGION: &str = "us-east-1";

/// Loads the shared SDK configuration every client in a function is built from.
///
/// The region is the configured one if any, otherwise whatever the default
/// provider chain finds (the Lambda environment sets `AWS_REGION`), otherwise
/// `us-east-1`.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    debug!("Loading AWS config, configured region: {:?}", region);
    let region_provider = RegionProviderChain::first_try(region.map(|r| Region::new(r.to_owned())))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}
