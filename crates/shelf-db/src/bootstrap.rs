//! Default-data seeding.
//!
//! On first startup the repository synthesizes the records a fresh install
//! needs: a root administrator account (with a freshly minted access token
//! and an empty password hash) and the default server settings. Seeding is
//! idempotent; it inspects the loaded mirrors and inserts nothing when the
//! defaults already exist.

use shelf_types::{ServerSettings, User};

use crate::{Database, DbError, DbResult};

impl Database {
    /// Inserts the default root user and server settings when absent.
    ///
    /// Expects the mirrors to be loaded. Fails with [`DbError::Auth`] if the
    /// root token cannot be minted and [`DbError::Seed`] if inserting a
    /// synthesized record fails.
    pub(crate) async fn seed_defaults(&self) -> DbResult<()> {
        self.seed_root_user().await?;
        self.seed_server_settings().await
    }

    async fn seed_root_user(&self) -> DbResult<()> {
        let has_root = self.mirrors.users.read().await.iter().any(User::is_root);
        if has_root {
            tracing::debug!("Root user already present");
            return Ok(());
        }

        let token = shelf_auth::issue_token(&self.token_secret, "root")?;
        tracing::debug!("Generated default root token");

        let root = User::root(token);
        let record = root.to_record()?;
        self.stores
            .users
            .insert_many(vec![record])
            .await
            .map_err(|source| DbError::Seed { entity: "root user", source })?;
        self.mirrors.users.write().await.push(root);

        tracing::info!("Seeded root user");
        Ok(())
    }

    async fn seed_server_settings(&self) -> DbResult<()> {
        if !self.mirrors.settings.read().await.is_empty() {
            return Ok(());
        }

        let record = ServerSettings::default().to_record()?;
        self.stores
            .settings
            .insert_many(vec![record.clone()])
            .await
            .map_err(|source| DbError::Seed { entity: "server settings", source })?;
        self.mirrors.settings.write().await.push(record);

        tracing::info!("Seeded default server settings");
        Ok(())
    }
}
