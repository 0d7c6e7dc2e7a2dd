//! Collaborator interfaces consumed by the challenge core.
//!
//! Implementations talk to whatever backend holds users, registrations and
//! progress. Every method reports transport or storage faults as a
//! [`RetrievalError`]; an absent record is a successful `None` or empty `Vec`.

use std::sync::Arc;

use async_trait::async_trait;

use super::access::AccessGrant;
use super::eligibility::Registration;
use super::progress::DayProgress;
use crate::error::RetrievalError;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn get_registration(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Registration>, RetrievalError>;
}

#[async_trait]
pub trait AccessChecker: Send + Sync {
    async fn check_access(&self, user_id: &str) -> Result<AccessGrant, RetrievalError>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Rows for one user and challenge, in store order.
    async fn get_progress(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Vec<DayProgress>, RetrievalError>;
}

#[async_trait]
impl<T: RegistrationStore + ?Sized> RegistrationStore for Arc<T> {
    async fn get_registration(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Registration>, RetrievalError> {
        (**self).get_registration(user_id, challenge_id).await
    }
}

#[async_trait]
impl<T: AccessChecker + ?Sized> AccessChecker for Arc<T> {
    async fn check_access(&self, user_id: &str) -> Result<AccessGrant, RetrievalError> {
        (**self).check_access(user_id).await
    }
}

#[async_trait]
impl<T: ProgressStore + ?Sized> ProgressStore for Arc<T> {
    async fn get_progress(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Vec<DayProgress>, RetrievalError> {
        (**self).get_progress(user_id, challenge_id).await
    }
}
