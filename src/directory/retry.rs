//! Retry wrapper for transient directory failures.
//!
//! Only errors classified as retryable by
//! [`DirectoryError::is_retryable`] are retried. Not-found and access-denied
//! answers are authoritative and return immediately.

use super::{DirectoryMember, DirectorySource};
use crate::config::RetryConfig;
use crate::core::GroupId;
use crate::errors::DirectoryError;
use std::time::Instant;

/// Any [`DirectorySource`] with retry on transient failures.
#[derive(Debug)]
pub struct RetryingDirectory<D> {
    inner: D,
    config: RetryConfig,
}

impl<D: DirectorySource> RetryingDirectory<D> {
    pub fn new(inner: D, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn with_retry<T>(
        &self,
        operation_name: &'static str,
        group: Option<&GroupId>,
        mut operation: impl FnMut() -> Result<T, DirectoryError>,
    ) -> Result<T, DirectoryError> {
        let started = Instant::now();
        let mut retries = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error)
                    if error.is_retryable()
                        && self.config.should_retry(retries, started.elapsed()) =>
                {
                    retries += 1;
                    let delay = self.config.delay_for_attempt(retries);
                    tracing::debug!(
                        target: "groupnest::directory",
                        operation = operation_name,
                        group = group.map(GroupId::as_str).unwrap_or("-"),
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying directory lookup"
                    );
                    std::thread::sleep(delay);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl<D: DirectorySource> DirectorySource for RetryingDirectory<D> {
    fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError> {
        self.with_retry("list_all_groups", None, || self.inner.list_all_groups())
    }

    fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError> {
        self.with_retry("list_members", Some(group), || {
            self.inner.list_members(group)
        })
    }

    fn list_child_groups(&self, group: &GroupId) -> Result<Vec<GroupId>, DirectoryError> {
        self.with_retry("list_child_groups", Some(group), || {
            self.inner.list_child_groups(group)
        })
    }
}
