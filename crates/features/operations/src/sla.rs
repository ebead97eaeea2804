//! SLA countdowns for tickets and traffic fines.

use crate::error::OperationsError;
use chrono::{DateTime, TimeDelta, Utc};

/// Share of the SLA left at which a countdown turns at-risk.
pub const DEFAULT_AT_RISK_RATIO: f64 = 0.25;

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    OnTrack { remaining: TimeDelta },
    AtRisk { remaining: TimeDelta },
    Breached { overdue: TimeDelta },
}

impl SlaStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OnTrack { .. } => "on-track",
            Self::AtRisk { .. } => "at-risk",
            Self::Breached { .. } => "breached",
        }
    }

    #[must_use]
    pub const fn is_breached(&self) -> bool {
        matches!(self, Self::Breached { .. })
    }
}

/// Time left on an item opened at `opened_at` with a fixed SLA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaCountdown {
    opened_at: DateTime<Utc>,
    sla: TimeDelta,
    deadline: DateTime<Utc>,
    at_risk_ratio: f64,
    at_risk_window: TimeDelta,
}

impl SlaCountdown {
    /// # Errors
    ///
    /// [`OperationsError::InvalidSla`] when `sla` is not positive or the deadline falls
    /// outside the representable range.
    pub fn new(opened_at: DateTime<Utc>, sla: TimeDelta) -> Result<Self, OperationsError> {
        if sla <= TimeDelta::zero() {
            return Err(OperationsError::InvalidSla {
                message: format!("SLA must be positive, got {sla}").into(),
                context: None,
            });
        }
        let deadline = opened_at.checked_add_signed(sla).ok_or_else(|| OperationsError::InvalidSla {
            message: format!("deadline out of range for {opened_at} + {sla}").into(),
            context: None,
        })?;

        Ok(Self {
            opened_at,
            sla,
            deadline,
            at_risk_ratio: DEFAULT_AT_RISK_RATIO,
            at_risk_window: scale(sla, DEFAULT_AT_RISK_RATIO),
        })
    }

    /// Replaces the at-risk share.
    ///
    /// # Errors
    ///
    /// [`OperationsError::InvalidSla`] unless `0.0 <= ratio <= 1.0`.
    pub fn with_at_risk_ratio(mut self, ratio: f64) -> Result<Self, OperationsError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(OperationsError::InvalidSla {
                message: format!("at-risk ratio must be within 0..=1, got {ratio}").into(),
                context: None,
            });
        }
        self.at_risk_ratio = ratio;
        self.at_risk_window = scale(self.sla, ratio);
        Ok(self)
    }

    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    #[must_use]
    pub const fn sla(&self) -> TimeDelta {
        self.sla
    }

    #[must_use]
    pub const fn at_risk_ratio(&self) -> f64 {
        self.at_risk_ratio
    }

    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time until the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.deadline - now).max(TimeDelta::zero())
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> SlaStatus {
        if now >= self.deadline {
            return SlaStatus::Breached { overdue: now - self.deadline };
        }
        let remaining = self.deadline - now;
        if remaining <= self.at_risk_window {
            SlaStatus::AtRisk { remaining }
        } else {
            SlaStatus::OnTrack { remaining }
        }
    }

    /// Short countdown text: `1d 02h 05m`, `02h 05m`, `05m` or `overdue 12m`.
    #[must_use]
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        match self.status(now) {
            SlaStatus::OnTrack { remaining } | SlaStatus::AtRisk { remaining } => {
                format_span(remaining)
            },
            SlaStatus::Breached { overdue } => format!("overdue {}", format_span(overdue)),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scale(span: TimeDelta, ratio: f64) -> TimeDelta {
    TimeDelta::milliseconds((span.num_milliseconds() as f64 * ratio).round() as i64)
}

fn format_span(span: TimeDelta) -> String {
    let minutes = span.num_minutes();
    let (days, hours, mins) = (minutes / MINUTES_PER_DAY, (minutes % MINUTES_PER_DAY) / 60, minutes % 60);

    if days > 0 {
        format!("{days}d {hours:02}h {mins:02}m")
    } else if hours > 0 {
        format!("{hours:02}h {mins:02}m")
    } else {
        format!("{mins:02}m")
    }
}
