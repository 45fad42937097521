//! Client facade bundling one synchronizer per resource kind.

use crate::config::ClientConfig;
use crate::connectivity::Connectivity;
use crate::error::Result;
use crate::gateway::ApiClient;
use crate::mirror::MirrorStore;
use crate::records::{Crop, FarmType, Farmer, User};
use crate::session::{AuthSession, Session};
use crate::sync::Synchronizer;

/// Entry point for front-ends.
///
/// All synchronizers share the same gateway, mirror, connectivity flag, and
/// session.
#[derive(Clone)]
pub struct FarmClient {
    gateway: ApiClient,
    mirror: MirrorStore,
    connectivity: Connectivity,
    session: Session,
    farm_types: Synchronizer<FarmType>,
    crops: Synchronizer<Crop>,
    farmers: Synchronizer<Farmer>,
    users: Synchronizer<User>,
}

impl FarmClient {
    /// Open the mirror at the configured path and restore any saved session.
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let gateway = ApiClient::new(config.api_base_url.clone())?;
        let mirror = MirrorStore::open(&config.db_path)?;
        let session = Session::restore(mirror.clone()).await?;
        let connectivity = Connectivity::new(!config.start_offline);
        Ok(Self::assemble(gateway, mirror, connectivity, session))
    }

    /// Client over an in-memory mirror, starting online and signed out.
    pub fn in_memory(base_url: impl Into<String>) -> Result<Self> {
        let gateway = ApiClient::new(base_url)?;
        let mirror = MirrorStore::open_in_memory()?;
        let session = Session::signed_out(mirror.clone());
        Ok(Self::assemble(gateway, mirror, Connectivity::default(), session))
    }

    fn assemble(
        gateway: ApiClient,
        mirror: MirrorStore,
        connectivity: Connectivity,
        session: Session,
    ) -> Self {
        let farm_types = Synchronizer::new(
            gateway.clone(),
            mirror.clone(),
            connectivity.clone(),
            session.clone(),
        );
        let crops = Synchronizer::new(
            gateway.clone(),
            mirror.clone(),
            connectivity.clone(),
            session.clone(),
        );
        let farmers = Synchronizer::new(
            gateway.clone(),
            mirror.clone(),
            connectivity.clone(),
            session.clone(),
        );
        let users = Synchronizer::new(
            gateway.clone(),
            mirror.clone(),
            connectivity.clone(),
            session.clone(),
        );

        Self {
            gateway,
            mirror,
            connectivity,
            session,
            farm_types,
            crops,
            farmers,
            users,
        }
    }

    pub const fn farm_types(&self) -> &Synchronizer<FarmType> {
        &self.farm_types
    }

    pub const fn crops(&self) -> &Synchronizer<Crop> {
        &self.crops
    }

    pub const fn farmers(&self) -> &Synchronizer<Farmer> {
        &self.farmers
    }

    pub const fn users(&self) -> &Synchronizer<User> {
        &self.users
    }

    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn mirror(&self) -> &MirrorStore {
        &self.mirror
    }

    pub const fn gateway(&self) -> &ApiClient {
        &self.gateway
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        self.session.login(&self.gateway, username, password).await
    }

    pub async fn refresh_session(&self) -> Result<AuthSession> {
        self.session.refresh(&self.gateway).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::SyncStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "current_thread")]
    async fn login_then_fetch_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "tok1",
                "refresh": "tok2",
                "user": {"username": "alice", "role": "admin"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/crops/"))
            .and(header("authorization", "Bearer tok1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Maize"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = FarmClient::in_memory(server.uri()).unwrap();
        let session = client.login("alice", "secret").await.unwrap();
        assert_eq!(session.access, "tok1");

        let crops = client.crops().fetch_all().await.unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(client.crops().slice().status(), SyncStatus::Succeeded);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn refreshed_token_is_used_by_synchronizers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "tok1",
                "refresh": "tok2",
                "user": {"username": "alice"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "tok3"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/farmers/"))
            .and(header("authorization", "Bearer tok3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = FarmClient::in_memory(server.uri()).unwrap();
        client.login("alice", "secret").await.unwrap();
        let renewed = client.refresh_session().await.unwrap();
        assert_eq!(renewed.access, "tok3");
        assert_eq!(renewed.refresh, "tok2");

        assert!(client.farmers().fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn synchronizers_share_connectivity() {
        let client = FarmClient::in_memory("http://127.0.0.1:9").unwrap();
        client.connectivity().set_online(false);

        let error = client.farmers().fetch_all().await.unwrap_err();
        assert_eq!(error.to_string(), "No farmers data available offline");
        let error = client.users().fetch_all().await.unwrap_err();
        assert_eq!(error.to_string(), "No users data available offline");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn session_and_snapshots_survive_reopen() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "tok1",
                "refresh": "tok2",
                "user": {"username": "alice"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/farm-types/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Dairy"}])),
            )
            .mount(&server)
            .await;

        let tmp = tempdir().unwrap();
        let config = ClientConfig {
            api_base_url: server.uri(),
            db_path: tmp.path().join("farmsync.db"),
            start_offline: false,
        };

        {
            let client = FarmClient::open(&config).await.unwrap();
            client.login("alice", "secret").await.unwrap();
            client.farm_types().fetch_all().await.unwrap();
        }

        let offline = ClientConfig {
            start_offline: true,
            ..config
        };
        let reopened = FarmClient::open(&offline).await.unwrap();
        assert!(!reopened.connectivity().is_online());
        assert_eq!(reopened.session().access_token().as_deref(), Some("tok1"));
        let farm_types = reopened.farm_types().fetch_all().await.unwrap();
        assert_eq!(farm_types[0].name, "Dairy");

        reopened.logout().await.unwrap();
        let after_logout = FarmClient::open(&offline).await.unwrap();
        assert!(after_logout.session().current().is_none());
    }
}
