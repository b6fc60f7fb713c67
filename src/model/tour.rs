//! Tour templates and their per-day instance expansion.

use serde::{Deserialize, Serialize};

/// A forecasted delivery tour template: one row of the weekly forecast.
///
/// `duration_min` allows `end < start` (the tour crosses midnight); the
/// template still belongs to `day`, its *start* day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: crate::Id,
    pub tenant: String,
    pub site: String,
    /// 1..=7, ISO weekday.
    pub day: u8,
    /// Minute of day, [0, 1440).
    pub start: u32,
    /// Minute of day, [0, 1440).
    pub end: u32,
    pub depot: String,
    pub skill: String,
    /// Number of identical physical tours this template expands into.
    pub count: u32,
}

impl Tour {
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Duration in minutes, correctly handling midnight crossing.
    pub fn duration_min(&self) -> u32 {
        if self.crosses_midnight() {
            (1440 - self.start) + self.end
        } else {
            self.end - self.start
        }
    }

    /// `hex(SHA-256(day|start|end|depot|skill))` — the template fingerprint
    /// from spec.md §3. Equality of this fingerprint implies structural
    /// identity of the template, independent of its assigned id.
    pub fn template_fingerprint(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}",
            self.day, self.start, self.end, self.depot, self.skill
        );
        crate::sha256_hex(canonical)
    }

    /// Expands this template into `count` identical physical instances.
    pub fn expand(&self) -> Vec<TourInstance> {
        (0..self.count)
            .map(|instance_no| TourInstance {
                template_id: self.id.clone(),
                instance_no,
                day: self.day,
                start: self.start,
                end: self.end,
                crosses_midnight: self.crosses_midnight(),
                duration_min: self.duration_min(),
                depot: self.depot.clone(),
                skill: self.skill.clone(),
            })
            .collect()
    }
}

/// One physical, schedulable tour: the atomic unit every downstream component
/// (blocks, columns, assignments, audits) references. Unique by
/// `(template_id, instance_no)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourInstance {
    pub template_id: crate::Id,
    pub instance_no: u32,
    pub day: u8,
    pub start: u32,
    pub end: u32,
    pub crosses_midnight: bool,
    pub duration_min: u32,
    pub depot: String,
    pub skill: String,
}

impl TourInstance {
    /// Stable identifier used everywhere a tour instance must be named:
    /// `"{template_id}#{instance_no}"`.
    pub fn instance_id(&self) -> String {
        format!("{}#{}", self.template_id, self.instance_no)
    }

    /// Absolute minute-of-week start, used by the Overlap audit to normalize
    /// cross-midnight tours onto a single timeline.
    pub fn absolute_start(&self) -> u32 {
        (self.day as u32 - 1) * 1440 + self.start
    }

    /// Absolute minute-of-week end; greater than `absolute_start` even when
    /// the tour crosses midnight.
    pub fn absolute_end(&self) -> u32 {
        self.absolute_start() + self.duration_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour(day: u8, start: u32, end: u32) -> Tour {
        Tour {
            id: "t1".into(),
            tenant: "acme".into(),
            site: "site-1".into(),
            day,
            start,
            end,
            depot: "D1".into(),
            skill: "van".into(),
            count: 2,
        }
    }

    #[test]
    fn duration_handles_midnight_crossing() {
        let t = tour(1, 23 * 60, 1 * 60);
        assert!(t.crosses_midnight());
        assert_eq!(t.duration_min(), 120);
    }

    #[test]
    fn duration_same_day() {
        let t = tour(1, 8 * 60, 16 * 60);
        assert!(!t.crosses_midnight());
        assert_eq!(t.duration_min(), 8 * 60);
    }

    #[test]
    fn fingerprint_is_stable_and_field_sensitive() {
        let a = tour(1, 480, 960);
        let b = tour(1, 480, 960);
        assert_eq!(a.template_fingerprint(), b.template_fingerprint());

        let mut c = b.clone();
        c.depot = "D2".into();
        assert_ne!(a.template_fingerprint(), c.template_fingerprint());
    }

    #[test]
    fn expand_produces_count_distinct_instances() {
        let t = tour(2, 480, 960);
        let instances = t.expand();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].instance_id(), format!("{}#0", t.id));
        assert_eq!(instances[1].instance_id(), format!("{}#1", t.id));
    }

    #[test]
    fn absolute_minute_of_week_orders_by_day() {
        let mut t = tour(2, 0, 60);
        t.count = 1;
        let inst = &t.expand()[0];
        assert_eq!(inst.absolute_start(), 1440);
        assert_eq!(inst.absolute_end(), 1500);
    }
}
