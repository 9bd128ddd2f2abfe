//! Offboarding schedule planning
//!
//! Transition times start from nominal day offsets, get bounded jitter from
//! the caller's RNG, and are then re-clamped so each transition still falls
//! at least `min_gap_days` after its predecessor. Ordering therefore holds
//! by construction, never by luck of the draw.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::types::ScheduleConfig;

/// Nominal anchor hour for HR process steps
const BUSINESS_HOUR: i64 = 10;

/// Planned transition moments for one employee's offboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffboardingSchedule {
    /// When the resignation is submitted
    pub submit: DateTime<Utc>,
    /// When the handover phase opens
    pub handover_start: DateTime<Utc>,
    /// When account revocation fires
    pub revoke: DateTime<Utc>,
    /// When the handover phase completes
    pub handover_complete: DateTime<Utc>,
}

impl OffboardingSchedule {
    /// Draw a jittered schedule anchored at `base_day` (midnight of day 0)
    pub fn draw<R: Rng>(config: &ScheduleConfig, base_day: DateTime<Utc>, rng: &mut R) -> Self {
        let offsets = [
            config.submit_offset_days,
            config.handover_start_offset_days,
            config.revocation_offset_days,
            config.handover_complete_offset_days,
        ];

        let mut points = offsets.map(|days| {
            let jitter = Duration::hours(rng.gen_range(-config.jitter_hours..=config.jitter_hours));
            base_day + Duration::days(days) + Duration::hours(BUSINESS_HOUR) + jitter
        });

        let min_gap = Duration::days(config.min_gap_days);
        for i in 1..points.len() {
            if points[i] < points[i - 1] + min_gap {
                points[i] = points[i - 1] + min_gap;
            }
        }

        Self {
            submit: points[0],
            handover_start: points[1],
            revoke: points[2],
            handover_complete: points[3],
        }
    }

    /// The planned transition moments in process order
    pub fn points(&self) -> [DateTime<Utc>; 4] {
        [self.submit, self.handover_start, self.revoke, self.handover_complete]
    }
}
