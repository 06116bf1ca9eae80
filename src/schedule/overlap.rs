use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::ScheduleError;

use super::{
    availability::{WeeklyAvailability, WeeklyPayload},
    codec::{DaySlotSet, SlotSetCodec},
    scoring::overlap_score,
    slots::{Day, MAX_SLOTS_PER_DAY},
};

/// Per-day bitwise AND.
pub fn intersect(a: &WeeklyPayload, b: &WeeklyPayload) -> WeeklyPayload {
    a.zip_with(b, |x, y| x & y)
}

/// Per-day bitwise OR. The empty payload is the identity.
pub fn union(a: &WeeklyPayload, b: &WeeklyPayload) -> WeeklyPayload {
    a.zip_with(b, |x, y| x | y)
}

pub fn intersect_maps<K: AsRef<str>>(
    a: &HashMap<K, u64>,
    b: &HashMap<K, u64>,
) -> Result<WeeklyPayload, ScheduleError> {
    Ok(intersect(
        &WeeklyPayload::from_map(a)?,
        &WeeklyPayload::from_map(b)?,
    ))
}

pub fn union_maps<K: AsRef<str>>(
    a: &HashMap<K, u64>,
    b: &HashMap<K, u64>,
) -> Result<WeeklyPayload, ScheduleError> {
    Ok(union(
        &WeeklyPayload::from_map(a)?,
        &WeeklyPayload::from_map(b)?,
    ))
}

/// How a cell is shown when two schedules are laid over each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Highlight {
    None,
    OnlyA,
    OnlyB,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapResult {
    pub a: WeeklyPayload,
    pub b: WeeklyPayload,
    pub both: WeeklyPayload,
    pub either: WeeklyPayload,
}

impl OverlapResult {
    /// Overlay two payloads exactly as given; see [`OverlapResult::between`]
    /// for weeks that have been through a codec.
    pub fn compute(a: WeeklyPayload, b: WeeklyPayload) -> Self {
        Self {
            both: intersect(&a, &b),
            either: union(&a, &b),
            a,
            b,
        }
    }

    /// Overlay two decoded weeks. Neither can hold a bit outside its catalog,
    /// so neither can the score.
    pub fn between(a: &WeeklyAvailability, b: &WeeklyAvailability) -> Self {
        Self {
            a: week_of(|day| a.day(day)),
            b: week_of(|day| b.day(day)),
            both: week_of(|day| a.day(day).intersection(b.day(day))),
            either: week_of(|day| a.day(day).union(b.day(day))),
        }
    }

    pub fn highlight(&self, day: Day, index: usize) -> Highlight {
        if index >= MAX_SLOTS_PER_DAY {
            return Highlight::None;
        }
        let bit = 1u64 << index;
        let in_a = self.a.get(day) & bit != 0;
        let in_b = self.b.get(day) & bit != 0;
        match (in_a, in_b) {
            (true, true) => Highlight::Both,
            (true, false) => Highlight::OnlyA,
            (false, true) => Highlight::OnlyB,
            (false, false) => Highlight::None,
        }
    }

    /// Slot labels both parties chose, per day.
    pub fn shared_labels(
        &self,
        codec: &SlotSetCodec,
    ) -> Result<BTreeMap<Day, Vec<String>>, ScheduleError> {
        self.both
            .iter()
            .map(|(day, value)| Ok((day, codec.decode_labels(value)?)))
            .collect()
    }

    pub fn score(&self) -> u32 {
        overlap_score(&self.a, &self.b)
    }
}

fn week_of(set_for: impl Fn(Day) -> DaySlotSet) -> WeeklyPayload {
    WeeklyPayload::from_days(Day::ALL.map(|day| u64::from(set_for(day).bits())))
}
