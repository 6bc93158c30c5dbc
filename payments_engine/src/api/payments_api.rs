//! Lifecycle management for payment aggregates: `absent → present → absent`.
use std::fmt::Debug;

use log::{debug, warn};
use uuid::Uuid;

use crate::{
    db_types::Payment,
    traits::{PaymentApiError, PaymentManagement},
};

pub struct PaymentApi<B> {
    db: B,
}

impl<B: Debug> Debug for PaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi ({:?})", self.db)
    }
}

impl<B> PaymentApi<B>
where B: PaymentManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Stores a new payment and returns its resource location.
    ///
    /// The existence probe and the insert are separate steps. Only a clean "not found" from the probe lets the insert
    /// go ahead; a probe that fails for any other reason is treated as a conflict. Two creates racing on the same id
    /// can both pass the probe, in which case the backend's primary key lets the first write win and the second
    /// receives [`PaymentApiError::PaymentAlreadyExists`].
    pub async fn create_payment(&self, payment: Payment) -> Result<String, PaymentApiError> {
        match self.db.payment_exists(&payment.id).await {
            Ok(false) => {},
            Ok(true) => {
                debug!("💳️ Payment {} already exists", payment.id);
                return Err(PaymentApiError::PaymentAlreadyExists(payment.id));
            },
            Err(e) => {
                warn!("💳️ Existence check for payment {} failed. Refusing to create it. {e}", payment.id);
                return Err(PaymentApiError::PaymentAlreadyExists(payment.id));
            },
        }
        self.db.insert_payment(&payment).await?;
        debug!("💳️ Created {payment}");
        Ok(payment.location())
    }

    pub async fn payments(&self) -> Result<Vec<Payment>, PaymentApiError> {
        self.db.fetch_all_payments().await
    }

    pub async fn payment_by_id(&self, id: &Uuid) -> Result<Payment, PaymentApiError> {
        self.db.fetch_payment(id).await?.ok_or(PaymentApiError::PaymentNotFound(*id))
    }

    /// Replaces the stored payment at `path_id` with `payment`, sub-records included. This is a whole-document
    /// overwrite: anything missing from `payment` is gone afterwards.
    ///
    /// The id in the document must equal `path_id`. This is checked before the database is consulted, so a mismatch
    /// is reported whether or not `path_id` exists.
    pub async fn update_payment(&self, path_id: &Uuid, payment: Payment) -> Result<String, PaymentApiError> {
        if payment.id != *path_id {
            debug!("💳️ Refusing update. Path id {path_id} does not match document id {}", payment.id);
            return Err(PaymentApiError::IdMismatch { path: *path_id, body: payment.id });
        }
        if !self.db.replace_payment(&payment).await? {
            return Err(PaymentApiError::PaymentNotFound(*path_id));
        }
        debug!("💳️ Replaced {payment}");
        Ok(payment.location())
    }

    pub async fn delete_payment(&self, id: &Uuid) -> Result<(), PaymentApiError> {
        if self.db.delete_payment(id).await? {
            Ok(())
        } else {
            Err(PaymentApiError::PaymentNotFound(*id))
        }
    }
}
