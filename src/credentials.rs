//! Credential broker: trades the configured frontend role for temporary credentials.

use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::SdkConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, info};
use serde_json::json;

use crate::config::{self, EnvKey};
use crate::error::{Error, Result};
use crate::response::HttpResponse;

pub const SESSION_NAME: &str = "frontendSession";

#[derive(Debug, Clone, PartialEq)]
pub struct RoleCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl RoleCredentials {
    /// ISO-8601 expiration with an explicit UTC offset, e.g. `2025-01-01T12:00:00+00:00`.
    pub fn expiration_iso8601(&self) -> String {
        self.expiration.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrokerConfig {
    pub role_arn: Option<String>,
    pub region: Option<String>,
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        BrokerConfig {
            role_arn: config::get(EnvKey::FrontendRoleArn),
            region: config::get(EnvKey::Region),
        }
    }
}

#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<RoleCredentials>;
}

pub struct StsRoleAssumer {
    client: aws_sdk_sts::Client,
}

impl StsRoleAssumer {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        StsRoleAssumer {
            client: aws_sdk_sts::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<RoleCredentials> {
        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|err| Error::from_sdk("AssumeRole", err))?;

        let credentials = output
            .credentials()
            .ok_or_else(|| anyhow!("AssumeRole returned no credentials"))?;

        let expiration = credentials.expiration();
        let expiration = DateTime::<Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos())
            .ok_or_else(|| anyhow!("credential expiration is out of range"))?;

        Ok(RoleCredentials {
            access_key_id: credentials.access_key_id().to_owned(),
            secret_access_key: credentials.secret_access_key().to_owned(),
            session_token: credentials.session_token().to_owned(),
            expiration,
        })
    }
}

/// Assumes the frontend role once and renders the outcome for the browser.
pub async fn issue_frontend_credentials<A: RoleAssumer>(
    assumer: &A,
    config: &BrokerConfig,
) -> HttpResponse {
    match assume_frontend_role(assumer, config).await {
        Ok(credentials) => {
            info!(
                "Issued frontend credentials expiring at {}",
                credentials.expiration_iso8601()
            );
            HttpResponse::ok(&json!({
                "AccessKeyId": credentials.access_key_id,
                "SecretAccessKey": credentials.secret_access_key,
                "SessionToken": credentials.session_token,
                "Expiration": credentials.expiration_iso8601(),
            }))
            .with_cors()
        }
        Err(err) => {
            error!("Error assuming role: {}", err);
            HttpResponse::error(500, err.message()).with_cors()
        }
    }
}

async fn assume_frontend_role<A: RoleAssumer>(
    assumer: &A,
    config: &BrokerConfig,
) -> Result<RoleCredentials> {
    let role_arn = config.role_arn.as_deref().ok_or_else(|| {
        Error::Config(format!("{} is not configured", EnvKey::FrontendRoleArn.as_str()))
    })?;
    assumer.assume_role(role_arn, SESSION_NAME).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;

    #[derive(Default)]
    struct FakeSts {
        fail_with: Option<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl RoleAssumer for FakeSts {
        async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<RoleCredentials> {
            self.calls
                .lock()
                .unwrap()
                .push((role_arn.to_owned(), session_name.to_owned()));
            if let Some(message) = &self.fail_with {
                return Err(Error::Service {
                    operation: "AssumeRole",
                    code: Some("AccessDenied".to_owned()),
                    message: message.clone(),
                });
            }
            Ok(RoleCredentials {
                access_key_id: "ASIAEXAMPLE".to_owned(),
                secret_access_key: "secret".to_owned(),
                session_token: "token".to_owned(),
                expiration: Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap(),
            })
        }
    }

    fn configured() -> BrokerConfig {
        BrokerConfig {
            role_arn: Some("arn:aws:iam::123456789012:role/frontend".to_owned()),
            region: Some("us-west-2".to_owned()),
        }
    }

    #[tokio::test]
    async fn returns_all_credential_fields() {
        let sts = FakeSts::default();
        let response = issue_frontend_credentials(&sts, &configured()).await;

        assert_eq!(response.status_code, 200);
        let body = response.payload();
        assert_eq!(body["AccessKeyId"], "ASIAEXAMPLE");
        assert_eq!(body["SecretAccessKey"], "secret");
        assert_eq!(body["SessionToken"], "token");
        assert_eq!(body["Expiration"], "2025-03-14T15:09:26+00:00");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");

        let calls = sts.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            [(
                "arn:aws:iam::123456789012:role/frontend".to_owned(),
                SESSION_NAME.to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn reports_the_service_message_on_failure() {
        let sts = FakeSts {
            fail_with: Some("not authorized to perform sts:AssumeRole".to_owned()),
            ..Default::default()
        };
        let response = issue_frontend_credentials(&sts, &configured()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.payload()["error"],
            "not authorized to perform sts:AssumeRole"
        );
        assert_eq!(response.headers["Access-Control-Allow-Credentials"], "true");
    }

    #[tokio::test]
    async fn missing_role_is_reported_without_calling_sts() {
        let sts = FakeSts::default();
        let response = issue_frontend_credentials(&sts, &BrokerConfig::default()).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.payload()["error"],
            "FRONTEND_ROLE_ARN is not configured"
        );
        assert!(sts.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn keeps_sub_second_precision_when_present() {
        let credentials = RoleCredentials {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            expiration: DateTime::<Utc>::from_timestamp(1_700_000_000, 250_000_000).unwrap(),
        };
        assert_eq!(
            credentials.expiration_iso8601(),
            "2023-11-14T22:13:20.250+00:00"
        );
    }
}
