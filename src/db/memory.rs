//! In-memory store for tests. Each session works on a snapshot of the tables
//! and publishes it on commit, so an uncommitted session leaves no trace.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{conflict_message, Session, Store, StoreError, StoreResult};
use crate::{
    bookings::repo_types::{Booking, BookingSummary, UserBooking},
    flights::repo_types::{Flight, FlightSchedule, Passenger},
    users::repo_types::User,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    flights: BTreeMap<String, Flight>,
    bookings: Vec<Booking>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    open_sessions: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions begun but not yet dropped.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Number of delete calls issued against any table.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.snapshot().users.len()
    }

    pub fn flight_count(&self) -> usize {
        self.snapshot().flights.len()
    }

    pub fn booking_count(&self) -> usize {
        self.snapshot().bookings.len()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.snapshot().users.get(&id).cloned()
    }

    pub fn seed_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    pub fn seed_flight(&self, flight: Flight) {
        self.lock().flights.insert(flight.flight_number.clone(), flight);
    }

    pub fn seed_booking(&self, booking: Booking) {
        self.lock().bookings.push(booking);
    }

    fn snapshot(&self) -> Tables {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn Session>> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            staged: Some(self.snapshot()),
            shared: self.tables.clone(),
            open_sessions: self.open_sessions.clone(),
            delete_calls: self.delete_calls.clone(),
        }))
    }
}

struct MemorySession {
    staged: Option<Tables>,
    shared: Arc<Mutex<Tables>>,
    open_sessions: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MemorySession {
    fn tables(&mut self) -> StoreResult<&mut Tables> {
        self.staged
            .as_mut()
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("session already closed")))
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

fn user_booking(t: &Tables, b: &Booking) -> Option<UserBooking> {
    let user = t.users.get(&b.user_id)?;
    let flight = t.flights.get(&b.flight_number)?;
    Some(UserBooking {
        booking_id: b.booking_id,
        flight_number: flight.flight_number.clone(),
        start_destination: flight.start_destination.clone(),
        end_destination: flight.end_destination.clone(),
        takeoff_time: flight.takeoff_time.clone(),
        landing_time: flight.landing_time.clone(),
        price: flight.price,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    })
}

#[async_trait]
impl Session for MemorySession {
    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(self.tables()?.users.values().cloned().collect())
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        let t = self.tables()?;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(conflict_message(Some("users_email_key")).into()));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> StoreResult<()> {
        let t = self.tables()?;
        if t.users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(StoreError::Conflict(conflict_message(Some("users_email_key")).into()));
        }
        if let Some(existing) = t.users.get_mut(&user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn set_user_verified(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(match self.tables()?.users.get_mut(&id) {
            Some(user) => {
                user.verified = true;
                true
            }
            None => false,
        })
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let t = self.tables()?;
        t.users.remove(&id);
        t.bookings.retain(|b| b.user_id != id);
        Ok(())
    }

    async fn list_flights(&mut self) -> StoreResult<Vec<Flight>> {
        Ok(self.tables()?.flights.values().cloned().collect())
    }

    async fn find_flight(&mut self, flight_number: &str) -> StoreResult<Option<Flight>> {
        Ok(self.tables()?.flights.get(flight_number).cloned())
    }

    async fn find_flight_by_schedule(
        &mut self,
        schedule: &FlightSchedule<'_>,
    ) -> StoreResult<Option<Flight>> {
        Ok(self
            .tables()?
            .flights
            .values()
            .find(|f| f.schedule() == *schedule)
            .cloned())
    }

    async fn insert_flight(&mut self, flight: &Flight) -> StoreResult<()> {
        let t = self.tables()?;
        if t.flights.contains_key(&flight.flight_number) {
            return Err(StoreError::Conflict(conflict_message(Some("flights_pkey")).into()));
        }
        t.flights.insert(flight.flight_number.clone(), flight.clone());
        Ok(())
    }

    async fn update_flight(&mut self, flight: &Flight) -> StoreResult<()> {
        if let Some(existing) = self.tables()?.flights.get_mut(&flight.flight_number) {
            *existing = flight.clone();
        }
        Ok(())
    }

    async fn delete_flight(&mut self, flight_number: &str) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let t = self.tables()?;
        t.flights.remove(flight_number);
        t.bookings.retain(|b| b.flight_number != flight_number);
        Ok(())
    }

    async fn list_passengers(&mut self, flight_number: &str) -> StoreResult<Vec<Passenger>> {
        let t: &Tables = self.tables()?;
        Ok(t.bookings
            .iter()
            .filter(|b| b.flight_number == flight_number)
            .filter_map(|b| {
                t.users.get(&b.user_id).map(|u| Passenger {
                    booking_id: b.booking_id,
                    id: u.id,
                    email: u.email.clone(),
                    first_name: u.first_name.clone(),
                    last_name: u.last_name.clone(),
                })
            })
            .collect())
    }

    async fn list_bookings(&mut self) -> StoreResult<Vec<BookingSummary>> {
        let t: &Tables = self.tables()?;
        Ok(t.bookings
            .iter()
            .filter_map(|b| user_booking(t, b))
            .map(|ub| BookingSummary {
                booking_id: ub.booking_id,
                flight_number: ub.flight_number,
                price: ub.price,
                email: ub.email,
                first_name: ub.first_name,
                last_name: ub.last_name,
            })
            .collect())
    }

    async fn find_booking(&mut self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self
            .tables()?
            .bookings
            .iter()
            .find(|b| b.booking_id == booking_id)
            .cloned())
    }

    async fn find_booking_for(
        &mut self,
        user_id: Uuid,
        flight_number: &str,
    ) -> StoreResult<Option<Booking>> {
        Ok(self
            .tables()?
            .bookings
            .iter()
            .find(|b| b.user_id == user_id && b.flight_number == flight_number)
            .cloned())
    }

    async fn insert_booking(&mut self, booking: &Booking) -> StoreResult<()> {
        let t = self.tables()?;
        if t.bookings
            .iter()
            .any(|b| b.user_id == booking.user_id && b.flight_number == booking.flight_number)
        {
            return Err(StoreError::Conflict(
                conflict_message(Some("bookings_user_flight_key")).into(),
            ));
        }
        t.bookings.push(booking.clone());
        Ok(())
    }

    async fn delete_booking(&mut self, booking_id: Uuid) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.tables()?.bookings.retain(|b| b.booking_id != booking_id);
        Ok(())
    }

    async fn list_user_bookings(&mut self, user_id: Uuid) -> StoreResult<Vec<UserBooking>> {
        let t: &Tables = self.tables()?;
        Ok(t.bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| user_booking(t, b))
            .collect())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("session already closed")))?;
        *self.shared.lock().expect("memory store poisoned") = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            email: email.into(),
            password: "hash".into(),
            verified: false,
        }
    }

    #[tokio::test]
    async fn dropped_session_rolls_back_and_is_released() {
        let store = MemoryStore::new();
        {
            let mut session = store.begin().await.unwrap();
            session.insert_user(&user("a@example.com")).await.unwrap();
            assert_eq!(store.open_sessions(), 1);
        }
        assert_eq!(store.open_sessions(), 0);
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn committed_session_is_visible() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        session.insert_user(&user("a@example.com")).await.unwrap();
        session.commit().await.unwrap();
        drop(session);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.seed_user(user("a@example.com"));
        let mut session = store.begin().await.unwrap();
        let err = session.insert_user(&user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
