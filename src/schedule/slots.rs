use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// A day's selections are encoded in a `u32`, so a catalog may not exceed this.
pub const MAX_SLOTS_PER_DAY: usize = 32;

pub const DEFAULT_FIRST_HOUR: u32 = 9;
pub const DEFAULT_END_HOUR: u32 = 24;
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

const HOURS_PER_DAY: u32 = 24;

/// Days of the week, numbered from zero for Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sun,
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Day> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Sun => "Sun",
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ScheduleError;

    /// Accepts the three-letter names in any case (`Mon`, `mon`, `MON`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ScheduleError::UnknownDay(value.to_string()))
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }
}

/// The start of one interval within a day. Which day it belongs to is carried
/// alongside, never inside, so the same `Slot` addresses every column of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    start: NaiveTime,
}

impl Slot {
    pub fn new(start: NaiveTime) -> Self {
        Self { start }
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self::new)
    }

    fn from_minutes(minutes: u32) -> Option<Self> {
        Self::from_hm(minutes / 60, minutes % 60)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Compact 24-hour label used in cell attributes: `900`, `1330`.
    pub fn label(&self) -> String {
        format!("{}{:02}", self.start.hour(), self.start.minute())
    }

    pub fn parse_label(label: &str) -> Result<Self, ScheduleError> {
        let trimmed = label.trim();
        let unknown = || ScheduleError::UnknownSlot(label.to_string());

        if !(3..=4).contains(&trimmed.len()) || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown());
        }
        let value: u32 = trimmed.parse().map_err(|_| unknown())?;
        Self::from_hm(value / 100, value % 100).ok_or_else(unknown)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The ordered slots of one day. A slot's position here is its bit in the
/// day encoding, so the order must never change once schedules are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
}

impl SlotCatalog {
    /// Slots every `slot_minutes` from `first_hour:00` up to, not including, `end_hour:00`.
    pub fn new(first_hour: u32, end_hour: u32, slot_minutes: u32) -> Result<Self, ScheduleError> {
        if slot_minutes == 0 || first_hour >= end_hour || end_hour > HOURS_PER_DAY {
            return Err(ScheduleError::InvalidCatalog(format!(
                "window {first_hour}:00-{end_hour}:00 every {slot_minutes} minutes"
            )));
        }

        let slots = window(first_hour * 60, end_hour * 60, slot_minutes);
        let catalog = Self::from_slots(slots)?;
        log_info!(
            "Slot catalog {}:00-{}:00 every {} min ({} slots/day)",
            first_hour,
            end_hour,
            slot_minutes,
            catalog.len()
        );
        Ok(catalog)
    }

    /// Half-hour slots starting 9:00 through 23:30.
    pub fn standard() -> Self {
        Self {
            slots: window(
                DEFAULT_FIRST_HOUR * 60,
                DEFAULT_END_HOUR * 60,
                DEFAULT_SLOT_MINUTES,
            ),
        }
    }

    pub fn from_slots(slots: Vec<Slot>) -> Result<Self, ScheduleError> {
        if slots.is_empty() {
            return Err(ScheduleError::InvalidCatalog("no slots".into()));
        }
        if slots.len() > MAX_SLOTS_PER_DAY {
            return Err(ScheduleError::CatalogTooWide {
                slots: slots.len(),
                max: MAX_SLOTS_PER_DAY,
            });
        }
        if let Some(pair) = slots.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ScheduleError::InvalidCatalog(format!(
                "slot {} does not follow {}",
                pair[1], pair[0]
            )));
        }
        Ok(Self { slots })
    }

    pub fn from_labels(labels: &[&str]) -> Result<Self, ScheduleError> {
        let slots = labels
            .iter()
            .map(|label| Slot::parse_label(label))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slots(slots)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots_for_day(&self) -> &[Slot] {
        &self.slots
    }

    pub fn index_of(&self, slot: &Slot) -> Result<usize, ScheduleError> {
        self.slots
            .binary_search(slot)
            .map_err(|_| ScheduleError::UnknownSlot(slot.label()))
    }

    pub fn index_of_label(&self, label: &str) -> Result<usize, ScheduleError> {
        self.index_of(&Slot::parse_label(label)?)
    }

    pub fn slot_at(&self, index: usize) -> Result<Slot, ScheduleError> {
        self.slots
            .get(index)
            .copied()
            .ok_or(ScheduleError::OutOfRange {
                index,
                len: self.slots.len(),
            })
    }

    pub fn check_index(&self, index: usize) -> Result<(), ScheduleError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(ScheduleError::OutOfRange {
                index,
                len: self.slots.len(),
            })
        }
    }

    /// Every valid bit set: `2^N - 1`.
    pub fn full_mask(&self) -> u32 {
        if self.slots.len() >= MAX_SLOTS_PER_DAY {
            u32::MAX
        } else {
            (1u32 << self.slots.len()) - 1
        }
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn window(start_minute: u32, end_minute: u32, step: u32) -> Vec<Slot> {
    (start_minute..end_minute)
        .step_by(step as usize)
        .filter_map(Slot::from_minutes)
        .collect()
}
