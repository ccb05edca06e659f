// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fmt, time::Duration};

use jiff::{SignedDuration, Timestamp};

pub type TimestampMillis = i64;

pub const MILLIS_PER_DAY: TimestampMillis = 24 * 60 * 60 * 1_000;

/// An _UTC_ timestamp with truncated millisecond precision.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct UtcDateTimeMs {
    unix_timestamp_millis: TimestampMillis,
}

impl UtcDateTimeMs {
    #[must_use]
    pub const fn from_unix_timestamp_millis(unix_timestamp_millis: TimestampMillis) -> Self {
        Self {
            unix_timestamp_millis,
        }
    }

    #[must_use]
    pub const fn unix_timestamp_millis(&self) -> TimestampMillis {
        self.unix_timestamp_millis
    }

    #[must_use]
    pub fn from_timestamp(timestamp: &Timestamp) -> Self {
        Self::from_unix_timestamp_millis(timestamp.as_millisecond())
    }

    /// Convert into a [`Timestamp`].
    ///
    /// Values outside of the range supported by [`Timestamp`] are clamped.
    #[must_use]
    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_millisecond(self.unix_timestamp_millis).unwrap_or_else(|_| {
            if self.unix_timestamp_millis < 0 {
                Timestamp::MIN
            } else {
                Timestamp::MAX
            }
        })
    }

    #[must_use]
    pub fn now() -> Self {
        Self::from_unix_timestamp_millis(Timestamp::now().as_millisecond())
    }

    #[must_use]
    pub const fn saturating_add_millis(self, millis: TimestampMillis) -> Self {
        Self::from_unix_timestamp_millis(self.unix_timestamp_millis.saturating_add(millis))
    }

    #[must_use]
    pub const fn saturating_add_days(self, days: u32) -> Self {
        self.saturating_add_millis((days as TimestampMillis).saturating_mul(MILLIS_PER_DAY))
    }

    #[must_use]
    pub fn saturating_add_duration(self, duration: Duration) -> Self {
        let millis = TimestampMillis::try_from(duration.as_millis()).unwrap_or(TimestampMillis::MAX);
        self.saturating_add_millis(millis)
    }

    /// The non-negative duration from `earlier` until `self`.
    #[must_use]
    pub fn duration_since(self, earlier: Self) -> Duration {
        SignedDuration::from_millis(
            self.unix_timestamp_millis
                .saturating_sub(earlier.unix_timestamp_millis),
        )
        .try_into()
        .unwrap_or(Duration::ZERO)
    }
}

impl From<Timestamp> for UtcDateTimeMs {
    fn from(from: Timestamp) -> Self {
        Self::from_timestamp(&from)
    }
}

impl From<UtcDateTimeMs> for Timestamp {
    fn from(from: UtcDateTimeMs) -> Self {
        from.to_timestamp()
    }
}

impl fmt::Display for UtcDateTimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_timestamp().fmt(f)
    }
}
