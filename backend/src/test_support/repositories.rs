//! Mutex-guarded in-memory repositories sharing one store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    MessageRepository, MessageRepositoryError, RatingRepository, RatingRepositoryError,
    RideRepository, RideRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    EmailAddress, Message, MessageId, Rating, Ride, RideId, RideStatus, User, UserId,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    rides: HashMap<RideId, Ride>,
    ratings: Vec<Rating>,
    messages: Vec<Message>,
}

/// Shared backing store; each repository holds an `Arc` to it.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Snapshot of stored ratings.
    #[must_use]
    pub fn ratings(&self) -> Vec<Rating> {
        self.lock().ratings.clone()
    }

    /// Snapshot of a stored ride.
    #[must_use]
    pub fn ride(&self, id: RideId) -> Option<Ride> {
        self.lock().rides.get(&id).cloned()
    }
}

/// In-memory [`UserRepository`].
#[derive(Clone)]
pub struct InMemoryUserRepository(Arc<InMemoryStore>);

impl InMemoryUserRepository {
    /// Repository over `store`.
    #[must_use]
    pub const fn new(store: Arc<InMemoryStore>) -> Self {
        Self(store)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.0.lock();
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_ref()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.0.lock().users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .0
            .lock()
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.0.lock();
        let slot = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| UserRepositoryError::not_found(user.id.to_string()))?;
        *slot = user.clone();
        Ok(())
    }
}

/// In-memory [`RideRepository`] with revision compare-and-set.
#[derive(Clone)]
pub struct InMemoryRideRepository(Arc<InMemoryStore>);

impl InMemoryRideRepository {
    /// Repository over `store`.
    #[must_use]
    pub const fn new(store: Arc<InMemoryStore>) -> Self {
        Self(store)
    }
}

#[async_trait]
impl RideRepository for InMemoryRideRepository {
    async fn insert(&self, ride: &Ride) -> Result<(), RideRepositoryError> {
        self.0.lock().rides.insert(ride.id(), ride.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RideId) -> Result<Option<Ride>, RideRepositoryError> {
        Ok(self.0.lock().rides.get(id).cloned())
    }

    async fn list_for_participant(&self, user: &UserId) -> Result<Vec<Ride>, RideRepositoryError> {
        let mut rides: Vec<Ride> = self
            .0
            .lock()
            .rides
            .values()
            .filter(|ride| ride.is_participant(*user))
            .cloned()
            .collect();
        rides.sort_by_key(|ride| (ride.scheduled_time(), ride.created_at()));
        Ok(rides)
    }

    async fn update(&self, ride: &Ride, expected_revision: i64) -> Result<(), RideRepositoryError> {
        let mut state = self.0.lock();
        match state.rides.get_mut(&ride.id()) {
            Some(stored) if stored.revision() == expected_revision => {
                *stored = ride.clone();
                Ok(())
            }
            _ => Err(RideRepositoryError::stale_revision(
                ride.id().to_string(),
                expected_revision,
            )),
        }
    }
}

/// In-memory [`RatingRepository`].
#[derive(Clone)]
pub struct InMemoryRatingRepository(Arc<InMemoryStore>);

impl InMemoryRatingRepository {
    /// Repository over `store`.
    #[must_use]
    pub const fn new(store: Arc<InMemoryStore>) -> Self {
        Self(store)
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn insert(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        let mut state = self.0.lock();
        let completed = state
            .rides
            .get(&rating.ride_id)
            .is_some_and(|ride| ride.status() == RideStatus::Completed);
        if !completed {
            return Err(RatingRepositoryError::ride_not_completed(
                rating.ride_id.to_string(),
            ));
        }
        state.ratings.push(rating.clone());
        Ok(())
    }
}

/// In-memory [`MessageRepository`].
#[derive(Clone)]
pub struct InMemoryMessageRepository(Arc<InMemoryStore>);

impl InMemoryMessageRepository {
    /// Repository over `store`.
    #[must_use]
    pub const fn new(store: Arc<InMemoryStore>) -> Self {
        Self(store)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        self.0.lock().messages.push(message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self
            .0
            .lock()
            .messages
            .iter()
            .find(|message| &message.id == id)
            .cloned())
    }

    async fn list_for_ride(&self, ride: &RideId) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(self
            .0
            .lock()
            .messages
            .iter()
            .filter(|message| &message.ride_id == ride)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessageRepositoryError> {
        let mut state = self.0.lock();
        Ok(state
            .messages
            .iter_mut()
            .find(|message| &message.id == id)
            .map(|message| message.is_read = true)
            .is_some())
    }
}
