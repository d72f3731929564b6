use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::{AppConfig, StoreKind},
    db::{create_orm_conn, run_migrations},
    repository::{
        BookingRepository, ListingRepository, MemoryStore, OrmStore, ReviewRepository,
        UserRepository,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl AppState {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + ListingRepository + BookingRepository + ReviewRepository + 'static,
    {
        Self {
            users: store.clone(),
            listings: store.clone(),
            bookings: store.clone(),
            reviews: store,
        }
    }

    pub fn from_orm(conn: DatabaseConnection) -> Self {
        Self::from_store(Arc::new(OrmStore::new(conn)))
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Builds the configured store, applying migrations for Postgres.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        match config.store {
            StoreKind::Postgres => {
                let conn = create_orm_conn(config.database_url()?).await?;
                run_migrations(&conn).await?;
                Ok(Self::from_orm(conn))
            }
            StoreKind::Memory => {
                tracing::warn!("using the in-memory store; data is lost on exit");
                Ok(Self::in_memory())
            }
        }
    }
}
