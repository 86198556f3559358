//! ARM pager and token exchange against a mock HTTP server

use async_trait::async_trait;
use mockito::Matcher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zombiedisk::azure::{
    AccessToken, ArmClient, DefaultCredentialChain, EnvironmentCredential,
    ManagedIdentityCredential, TokenCredential,
};
use zombiedisk::config::AzureConfig;
use zombiedisk::error::{CollaboratorStage, ZombieError};
use zombiedisk::hunt;
use zombiedisk::provider::DiskSource;
use zombiedisk::Outcome;

const SUBSCRIPTION: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

/// Hands out a fixed token and counts how often it was asked
struct CountingCredential {
    calls: AtomicUsize,
}

impl CountingCredential {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TokenCredential for CountingCredential {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn get_token(
        &self,
        _http: &reqwest::Client,
        _resource: &str,
    ) -> zombiedisk::Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("test-token", None))
    }
}

fn client_for(server_url: &str, credential: Arc<dyn TokenCredential>) -> ArmClient {
    let config = AzureConfig {
        management_endpoint: server_url.to_string(),
        ..AzureConfig::default()
    };
    ArmClient::new(&config, credential).unwrap()
}

fn disks_path() -> String {
    format!("/subscriptions/{}/providers/Microsoft.Compute/disks", SUBSCRIPTION)
}

fn disk_json(rg: &str, name: &str, size: i64, state: &str) -> String {
    format!(
        r#"{{"id": "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/disks/{}", "name": "{}", "properties": {{"diskSizeGB": {}, "diskState": "{}"}}}}"#,
        SUBSCRIPTION, rg, name, name, size, state
    )
}

#[tokio::test]
async fn test_pager_follows_next_link() {
    let mut server = mockito::Server::new_async().await;
    let page1 = format!(
        r#"{{"value": [{}, {}], "nextLink": "{}/page2?skiptoken=abc"}}"#,
        disk_json("rg1", "d1", 100, "Unattached"),
        disk_json("rg1", "d2", 50, "Attached"),
        server.url()
    );
    let page2 = format!(r#"{{"value": [{}]}}"#, disk_json("rg2", "d3", 200, "Unattached"));

    let first = server
        .mock("GET", disks_path().as_str())
        .match_query(Matcher::UrlEncoded("api-version".into(), "2023-04-02".into()))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page1)
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/page2")
        .match_query(Matcher::UrlEncoded("skiptoken".into(), "abc".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page2)
        .expect(1)
        .create_async()
        .await;

    let credential = CountingCredential::new();
    let client = client_for(&server.url(), credential.clone());
    let mut pager = client.list_disks(SUBSCRIPTION);

    let mut names = Vec::new();
    while let Some(disk) = pager.next_disk().await.unwrap() {
        names.push(disk.name.unwrap());
    }

    assert_eq!(names, vec!["d1", "d2", "d3"]);
    assert_eq!(pager.pages_fetched(), 2);
    // One token for the whole run
    assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_pager_fetches_second_page_only_when_needed() {
    let mut server = mockito::Server::new_async().await;
    let page1 = format!(
        r#"{{"value": [{}], "nextLink": "{}/page2"}}"#,
        disk_json("rg1", "d1", 10, "Unattached"),
        server.url()
    );
    server
        .mock("GET", disks_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(page1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/page2")
        .with_status(200)
        .with_body(r#"{"value": []}"#)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url(), CountingCredential::new());
    let mut pager = client.list_disks(SUBSCRIPTION);
    assert!(pager.next_disk().await.unwrap().is_some());
    assert_eq!(pager.pages_fetched(), 1);
    second.assert_async().await;
}

#[tokio::test]
async fn test_hunt_over_arm_listing() {
    let mut server = mockito::Server::new_async().await;
    let body = format!(
        r#"{{"value": [{}, {}, {}]}}"#,
        disk_json("rg1", "d1", 100, "Unattached"),
        disk_json("rg1", "d2", 50, "Attached"),
        disk_json("rg2", "d3", 200, "Unattached"),
    );
    server
        .mock("GET", disks_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server.url(), CountingCredential::new());
    let mut pager = client.list_disks(SUBSCRIPTION);
    match hunt(&mut pager, 1.5).await.unwrap() {
        Outcome::Report(report) => {
            let names: Vec<&str> = report.disks().iter().map(|d| d.disk().name()).collect();
            assert_eq!(names, vec!["d3", "d1"]);
            assert_eq!(report.disks()[0].disk().resource_group(), "rg2");
            assert_eq!(report.total(), 450.0);
        }
        Outcome::NoZombies { .. } => panic!("expected zombies"),
    }
}

#[tokio::test]
async fn test_forbidden_listing_is_enumeration_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", disks_path().as_str())
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(
            r#"{"error": {"code": "AuthorizationFailed", "message": "The client does not have authorization to perform action 'Microsoft.Compute/disks/read'"}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server.url(), CountingCredential::new());
    let mut pager = client.list_disks(SUBSCRIPTION);
    let err = pager.next_disk().await.unwrap_err();
    match &err {
        ZombieError::Collaborator { stage, message, .. } => {
            assert_eq!(*stage, CollaboratorStage::Enumerate);
            assert!(message.contains("AuthorizationFailed"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_page_is_enumeration_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", disks_path().as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let client = client_for(&server.url(), CountingCredential::new());
    let mut pager = client.list_disks(SUBSCRIPTION);
    let err = pager.next_disk().await.unwrap_err();
    assert!(err.to_string().contains("Malformed disk listing page"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_failure() {
    // Nothing listens on port 1
    let client = client_for("http://127.0.0.1:1", CountingCredential::new());
    let mut pager = client.list_disks(SUBSCRIPTION);
    match pager.next_disk().await.unwrap_err() {
        ZombieError::Collaborator { stage, .. } => assert_eq!(stage, CollaboratorStage::Connect),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_environment_credential_client_credentials_grant() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/my-tenant/oauth2/v2.0/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            Matcher::UrlEncoded("client_id".into(), "app-id".into()),
            Matcher::UrlEncoded("client_secret".into(), "s3cret".into()),
            Matcher::UrlEncoded(
                "scope".into(),
                "https://management.azure.com/.default".into(),
            ),
        ]))
        .with_status(200)
        .with_body(r#"{"token_type": "Bearer", "expires_in": 3599, "access_token": "aad-token"}"#)
        .create_async()
        .await;

    let credential = EnvironmentCredential::new("my-tenant", "app-id", "s3cret", server.url());
    let access = credential
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap();

    assert_eq!(access.secret, "aad-token");
    assert!(!access.is_expired());
    token.assert_async().await;
}

#[tokio::test]
async fn test_environment_credential_rejected_secret() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/my-tenant/oauth2/v2.0/token")
        .with_status(401)
        .with_body(
            r#"{"error": "invalid_client", "error_description": "AADSTS7000215: Invalid client secret provided."}"#,
        )
        .create_async()
        .await;

    let credential = EnvironmentCredential::new("my-tenant", "app-id", "wrong", server.url());
    let err = credential
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 401"));
    assert!(msg.contains("invalid_client: AADSTS7000215"));
}

#[tokio::test]
async fn test_environment_credential_out_of_range_expiry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/my-tenant/oauth2/v2.0/token")
        .with_status(200)
        .with_body(r#"{"access_token": "x", "expires_in": 9223372036854775807}"#)
        .create_async()
        .await;

    let credential = EnvironmentCredential::new("my-tenant", "app-id", "s3cret", server.url());
    let err = credential
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap_err();
    match &err {
        ZombieError::Collaborator { stage, message, .. } => {
            assert_eq!(*stage, CollaboratorStage::Authenticate);
            assert!(message.contains("expires_in"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_chain_stops_when_service_principal_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/my-tenant/oauth2/v2.0/token")
        .with_status(401)
        .with_body(r#"{"error": "invalid_client", "error_description": "AADSTS7000215: Invalid client secret provided."}"#)
        .expect(1)
        .create_async()
        .await;
    let managed_identity = server
        .mock("GET", "/msi/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"access_token": "mi-token"}"#)
        .expect(0)
        .create_async()
        .await;

    let chain = DefaultCredentialChain::new(vec![
        Box::new(EnvironmentCredential::new("my-tenant", "app-id", "wrong", server.url())),
        Box::new(ManagedIdentityCredential::app_service(
            format!("{}/msi/token", server.url()),
            "header-secret",
            None,
            Duration::from_secs(2),
        )),
    ]);
    let err = chain
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("AADSTS7000215"));
    assert!(!err.to_string().contains("default chain"));
    managed_identity.assert_async().await;
}

#[tokio::test]
async fn test_app_service_managed_identity() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("GET", "/msi/token")
        .match_header("x-identity-header", "header-secret")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("resource".into(), "https://management.azure.com/".into()),
            Matcher::UrlEncoded("api-version".into(), "2019-08-01".into()),
            Matcher::UrlEncoded("client_id".into(), "user-assigned".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token": "mi-token", "expires_on": "4102444800", "token_type": "Bearer"}"#)
        .create_async()
        .await;

    let credential = ManagedIdentityCredential::app_service(
        format!("{}/msi/token", server.url()),
        "header-secret",
        Some("user-assigned".to_string()),
        Duration::from_secs(2),
    );
    let access = credential
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap();

    assert_eq!(access.secret, "mi-token");
    assert_eq!(access.expires_on.map(|t| t.timestamp()), Some(4_102_444_800));
    token.assert_async().await;
}

#[tokio::test]
async fn test_imds_unavailable_fails_authentication() {
    let credential =
        ManagedIdentityCredential::imds("http://127.0.0.1:1/metadata/identity/oauth2/token", None, Duration::from_millis(200));
    let err = credential
        .get_token(&reqwest::Client::new(), "https://management.azure.com")
        .await
        .unwrap_err();
    match err {
        ZombieError::Collaborator { stage, .. } => assert_eq!(stage, CollaboratorStage::Authenticate),
        other => panic!("unexpected error: {:?}", other),
    }
}
