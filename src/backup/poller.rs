// aurora-backup/src/backup/poller.rs
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::errors::{BackupError, Result};

/// How a poll treats the resource disappearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The resource being gone is what we were waiting for.
    Success,
    Fatal,
}

/// What a particular poll is waiting for.
#[derive(Debug, Clone)]
pub struct Expectation<S> {
    pub resource: &'static str,
    pub in_progress: Vec<S>,
    pub success: S,
    pub not_found: NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<S> {
    Reached(S),
    Gone,
}

/// Outcome of a successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult<S> {
    pub settled: Settled<S>,
    pub attempts: u32,
}

/// Fixed-interval, bounded-attempt status poller.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
    max_attempts: u32,
}

impl StatusPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        StatusPoller {
            interval,
            max_attempts,
        }
    }

    /// Sleeps one interval, then checks; repeats until the status leaves the
    /// in-progress set or the attempt budget runs out.
    ///
    /// `fetch_status` returns `Ok(None)` when the resource does not exist.
    /// A fetch error aborts the poll immediately. A settled status other than
    /// the expected one is not retried.
    pub async fn poll_until_settled<S, F, Fut>(
        &self,
        identifier: &str,
        expectation: &Expectation<S>,
        mut fetch_status: F,
    ) -> Result<PollResult<S>>
    where
        S: PartialEq + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<S>>>,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            let status = match fetch_status().await? {
                Some(status) => status,
                None => {
                    return match expectation.not_found {
                        NotFound::Success => Ok(PollResult {
                            settled: Settled::Gone,
                            attempts: attempt,
                        }),
                        NotFound::Fatal => Err(BackupError::Gone {
                            resource: expectation.resource,
                            identifier: identifier.to_string(),
                        }),
                    };
                }
            };

            if expectation.in_progress.contains(&status) {
                debug!(
                    identifier,
                    attempt,
                    max_attempts = self.max_attempts,
                    status = %status,
                    "Still in progress"
                );
                continue;
            }

            if status == expectation.success {
                return Ok(PollResult {
                    settled: Settled::Reached(status),
                    attempts: attempt,
                });
            }

            return Err(BackupError::UnexpectedStatus {
                resource: expectation.resource,
                identifier: identifier.to_string(),
                status: status.to_string(),
            });
        }

        Err(BackupError::PollTimeout {
            resource: expectation.resource,
            identifier: identifier.to_string(),
            attempts: self.max_attempts,
        })
    }
}
