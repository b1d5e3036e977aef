//! Core ModelHaus functionality
//!
//! This module contains the main ModelHaus struct, which owns the connection
//! pool and hands out entity models bound to it.

use entity_model::{EntityDefinition, EntityModel, PgExecutor};
use sqlx::PgPool;
use std::time::Duration;

use crate::errors::ModelHausError;
use config::{AppConfig, DatabaseConfig};

/// Main ModelHaus coordinator that manages the database connection
#[derive(Debug, Clone)]
pub struct ModelHaus {
    pool: PgPool,
}

impl ModelHaus {
    /// Create new ModelHaus with database connection
    pub async fn new(config: DatabaseConfig) -> Result<Self, ModelHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::debug!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "connection pool ready"
        );

        Ok(Self { pool })
    }

    /// Connect using [`AppConfig::load`]
    pub async fn from_env() -> Result<Self, ModelHausError> {
        let config = AppConfig::load()?;
        Self::new(config.database).await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executor sharing this pool
    pub fn executor(&self) -> PgExecutor {
        PgExecutor::new(self.pool.clone())
    }

    /// Model for a declared entity, backed by this pool
    pub fn model<E: EntityDefinition>(&self) -> Result<EntityModel<PgExecutor>, ModelHausError> {
        Ok(EntityModel::for_entity::<E>(self.executor())?)
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), ModelHausError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
