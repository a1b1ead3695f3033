//! Wall-clock access pinned to the deployment's configured timezone.

use chrono::DateTime;
use chrono_tz::Tz;
use mockable::Clock;
use std::sync::Arc;

/// Timestamp layout used for `created_at` and `completed_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Date layout used to decide whether a task is stale.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads the current time in a fixed timezone.
#[derive(Debug)]
pub struct ZonedClock<C> {
    clock: Arc<C>,
    zone: Tz,
}

impl<C> Clone for ZonedClock<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            zone: self.zone,
        }
    }
}

impl<C: Clock> ZonedClock<C> {
    /// Creates a zoned clock over the given time source.
    #[must_use]
    pub const fn new(clock: Arc<C>, zone: Tz) -> Self {
        Self { clock, zone }
    }

    /// Returns the configured timezone.
    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    /// Returns the current instant in the configured timezone.
    #[must_use]
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.utc().with_timezone(&self.zone)
    }

    /// Returns the current instant rendered as a stored timestamp.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Returns the current date as `YYYY-MM-DD`.
    #[must_use]
    pub fn today(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }
}
