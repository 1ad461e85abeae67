use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{Session, Store, StoreError, StoreResult};
use crate::{
    bookings::{
        self,
        repo_types::{Booking, BookingSummary, UserBooking},
    },
    flights::{
        self,
        repo_types::{Flight, FlightSchedule, Passenger},
    },
    users::{self, repo_types::User},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn Session>> {
        let tx = self.pool.begin().await?;
        debug!("session opened");
        Ok(Box::new(PgSession { tx: Some(tx) }))
    }
}

/// One request's transaction. Rolled back on drop unless committed.
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(StoreError::Backend(anyhow::anyhow!("session already closed"))),
        }
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        // sqlx rolls the transaction back when it is dropped
        if self.tx.take().is_some() {
            debug!("session released without commit; rolled back");
        }
    }
}

#[async_trait]
impl Session for PgSession {
    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(users::repo::list(self.conn()?).await?)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(users::repo::find_by_id(self.conn()?, id).await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(users::repo::find_by_email(self.conn()?, email).await?)
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        Ok(users::repo::insert(self.conn()?, user).await?)
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        Ok(users::repo::update(self.conn()?, user).await?)
    }

    async fn set_user_verified(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(users::repo::set_verified(self.conn()?, id).await?)
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<()> {
        Ok(users::repo::delete(self.conn()?, id).await?)
    }

    async fn list_flights(&mut self) -> StoreResult<Vec<Flight>> {
        Ok(flights::repo::list(self.conn()?).await?)
    }

    async fn find_flight(&mut self, flight_number: &str) -> StoreResult<Option<Flight>> {
        Ok(flights::repo::find_by_number(self.conn()?, flight_number).await?)
    }

    async fn find_flight_by_schedule(
        &mut self,
        schedule: &FlightSchedule<'_>,
    ) -> StoreResult<Option<Flight>> {
        Ok(flights::repo::find_by_schedule(self.conn()?, schedule).await?)
    }

    async fn insert_flight(&mut self, flight: &Flight) -> StoreResult<()> {
        Ok(flights::repo::insert(self.conn()?, flight).await?)
    }

    async fn update_flight(&mut self, flight: &Flight) -> StoreResult<()> {
        Ok(flights::repo::update(self.conn()?, flight).await?)
    }

    async fn delete_flight(&mut self, flight_number: &str) -> StoreResult<()> {
        Ok(flights::repo::delete(self.conn()?, flight_number).await?)
    }

    async fn list_passengers(&mut self, flight_number: &str) -> StoreResult<Vec<Passenger>> {
        Ok(flights::repo::list_passengers(self.conn()?, flight_number).await?)
    }

    async fn list_bookings(&mut self) -> StoreResult<Vec<BookingSummary>> {
        Ok(bookings::repo::list_summaries(self.conn()?).await?)
    }

    async fn find_booking(&mut self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(bookings::repo::find_by_id(self.conn()?, booking_id).await?)
    }

    async fn find_booking_for(
        &mut self,
        user_id: Uuid,
        flight_number: &str,
    ) -> StoreResult<Option<Booking>> {
        Ok(bookings::repo::find_for_pair(self.conn()?, user_id, flight_number).await?)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> StoreResult<()> {
        Ok(bookings::repo::insert(self.conn()?, booking).await?)
    }

    async fn delete_booking(&mut self, booking_id: Uuid) -> StoreResult<()> {
        Ok(bookings::repo::delete(self.conn()?, booking_id).await?)
    }

    async fn list_user_bookings(&mut self, user_id: Uuid) -> StoreResult<Vec<UserBooking>> {
        Ok(bookings::repo::list_for_user(self.conn()?, user_id).await?)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("session already closed")))?;
        tx.commit().await?;
        debug!("session committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_session_refuses_work() {
        let mut session = PgSession { tx: None };
        let err = session.find_user(Uuid::new_v4()).await.unwrap_err();
        assert!(err.to_string().contains("session already closed"));
        assert!(session.commit().await.is_err());
    }
}
