use thiserror::Error;
use uuid::Uuid;

use crate::db_types::Payment;

#[derive(Debug, Clone, Error)]
pub enum PaymentApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Payment already exists with that ID")]
    PaymentAlreadyExists(Uuid),
    #[error("Resource not found")]
    PaymentNotFound(Uuid),
    #[error("Mismatching IDs")]
    IdMismatch { path: Uuid, body: Uuid },
}

impl From<sqlx::Error> for PaymentApiError {
    fn from(e: sqlx::Error) -> Self {
        PaymentApiError::DatabaseError(e.to_string())
    }
}

/// The `PaymentManagement` trait defines the aggregate contract for payments.
///
/// A payment and its sub-records (parties, charges, fx details) are always read and written together. Backends must
/// make each write atomic as seen by readers, and must remove sub-records when their payment is deleted.
#[allow(async_fn_in_trait)]
pub trait PaymentManagement {
    /// Returns `true` if a payment with the given id is stored.
    async fn payment_exists(&self, id: &Uuid) -> Result<bool, PaymentApiError>;

    /// Fetches the full payment aggregate for the given id, or `None` if it does not exist.
    async fn fetch_payment(&self, id: &Uuid) -> Result<Option<Payment>, PaymentApiError>;

    /// Fetches every stored payment aggregate, ordered by creation time.
    async fn fetch_all_payments(&self) -> Result<Vec<Payment>, PaymentApiError>;

    /// Stores a new payment aggregate. If the id is already taken, the backend must return
    /// [`PaymentApiError::PaymentAlreadyExists`].
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PaymentApiError>;

    /// Overwrites the stored aggregate that has the same id as `payment`. Returns `false` if there was nothing to
    /// replace.
    async fn replace_payment(&self, payment: &Payment) -> Result<bool, PaymentApiError>;

    /// Deletes the payment and all of its sub-records. Returns `false` if there was nothing to delete.
    async fn delete_payment(&self, id: &Uuid) -> Result<bool, PaymentApiError>;
}
