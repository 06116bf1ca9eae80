use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

use super::{
    codec::{DaySlotSet, SlotSetCodec},
    slots::{Day, Slot, SlotCatalog},
};

/// The transport record: one encoded integer per day, keyed `Sun`..`Sat`.
/// Deserialising a record that lacks any day fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyPayload {
    #[serde(rename = "Sun")]
    pub sun: u64,
    #[serde(rename = "Mon")]
    pub mon: u64,
    #[serde(rename = "Tue")]
    pub tue: u64,
    #[serde(rename = "Wed")]
    pub wed: u64,
    #[serde(rename = "Thu")]
    pub thu: u64,
    #[serde(rename = "Fri")]
    pub fri: u64,
    #[serde(rename = "Sat")]
    pub sat: u64,
}

impl WeeklyPayload {
    pub fn from_days(values: [u64; 7]) -> Self {
        let [sun, mon, tue, wed, thu, fri, sat] = values;
        Self {
            sun,
            mon,
            tue,
            wed,
            thu,
            fri,
            sat,
        }
    }

    pub fn to_days(&self) -> [u64; 7] {
        [
            self.sun, self.mon, self.tue, self.wed, self.thu, self.fri, self.sat,
        ]
    }

    pub fn get(&self, day: Day) -> u64 {
        self.to_days()[day.index()]
    }

    pub fn set(&mut self, day: Day, value: u64) {
        let mut days = self.to_days();
        days[day.index()] = value;
        *self = Self::from_days(days);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, u64)> {
        Day::ALL.into_iter().zip(self.to_days())
    }

    /// Applies `op` day by day to two payloads.
    pub fn zip_with(&self, other: &WeeklyPayload, op: impl Fn(u64, u64) -> u64) -> Self {
        let (a, b) = (self.to_days(), other.to_days());
        Self::from_days(std::array::from_fn(|i| op(a[i], b[i])))
    }

    pub fn is_empty(&self) -> bool {
        self.to_days().iter().all(|&value| value == 0)
    }

    /// Builds a payload from a loosely keyed map, e.g. submitted form fields.
    /// Day keys are matched case-insensitively and every day must be present.
    pub fn from_map<K: AsRef<str>>(map: &HashMap<K, u64>) -> Result<Self, ScheduleError> {
        let mut days: [Option<u64>; 7] = [None; 7];
        for (key, &value) in map {
            let day: Day = key.as_ref().parse()?;
            days[day.index()] = Some(value);
        }

        let mut values = [0u64; 7];
        for day in Day::ALL {
            values[day.index()] = days[day.index()].ok_or(ScheduleError::MissingDay(day))?;
        }
        Ok(Self::from_days(values))
    }
}

/// One person's selected slots for each of the seven days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyAvailability {
    catalog: Arc<SlotCatalog>,
    days: [DaySlotSet; 7],
}

impl WeeklyAvailability {
    pub fn new(catalog: Arc<SlotCatalog>) -> Self {
        Self {
            catalog,
            days: [DaySlotSet::EMPTY; 7],
        }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn day(&self, day: Day) -> DaySlotSet {
        self.days[day.index()]
    }

    /// Returns whether the selection changed.
    pub fn select(&mut self, day: Day, slot: &Slot) -> Result<bool, ScheduleError> {
        let index = self.catalog.index_of(slot)?;
        Ok(self.days[day.index()].insert(index))
    }

    /// Returns whether the selection changed.
    pub fn deselect(&mut self, day: Day, slot: &Slot) -> Result<bool, ScheduleError> {
        let index = self.catalog.index_of(slot)?;
        Ok(self.days[day.index()].remove(index))
    }

    pub fn select_index(&mut self, day: Day, index: usize) -> Result<bool, ScheduleError> {
        self.catalog.check_index(index)?;
        Ok(self.days[day.index()].insert(index))
    }

    pub fn deselect_index(&mut self, day: Day, index: usize) -> Result<bool, ScheduleError> {
        self.catalog.check_index(index)?;
        Ok(self.days[day.index()].remove(index))
    }

    /// Same as [`select`](Self::select) but addressed the way grid cells are
    /// labelled: `("Mon", "930")`.
    pub fn select_named(&mut self, day: &str, time: &str) -> Result<bool, ScheduleError> {
        let day: Day = day.parse()?;
        let index = self.catalog.index_of_label(time)?;
        self.select_index(day, index)
    }

    pub fn deselect_named(&mut self, day: &str, time: &str) -> Result<bool, ScheduleError> {
        let day: Day = day.parse()?;
        let index = self.catalog.index_of_label(time)?;
        self.deselect_index(day, index)
    }

    pub fn is_selected(&self, day: Day, slot: &Slot) -> bool {
        self.catalog
            .index_of(slot)
            .map(|index| self.is_selected_index(day, index))
            .unwrap_or(false)
    }

    pub fn is_selected_index(&self, day: Day, index: usize) -> bool {
        self.days[day.index()].contains(index)
    }

    pub fn is_selected_named(&self, day: &str, time: &str) -> Result<bool, ScheduleError> {
        let day: Day = day.parse()?;
        let index = self.catalog.index_of_label(time)?;
        Ok(self.is_selected_index(day, index))
    }

    pub fn clear(&mut self) {
        self.days = [DaySlotSet::EMPTY; 7];
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|set| set.is_empty())
    }

    /// Number of selected slots across the week.
    pub fn total_free_slots(&self) -> usize {
        self.days.iter().map(|set| set.len()).sum()
    }

    pub fn selected_labels(&self, day: Day) -> Vec<String> {
        self.day(day)
            .iter()
            .filter_map(|index| self.catalog.slot_at(index).ok())
            .map(|slot| slot.label())
            .collect()
    }

    /// Selected slot labels for every day, for highlighting.
    pub fn snapshot(&self) -> BTreeMap<Day, Vec<String>> {
        Day::ALL
            .into_iter()
            .map(|day| (day, self.selected_labels(day)))
            .collect()
    }

    pub fn to_payload(&self, codec: &SlotSetCodec) -> WeeklyPayload {
        WeeklyPayload::from_days(self.days.map(|set| u64::from(codec.encode(&set))))
    }

    pub fn from_payload(
        codec: &SlotSetCodec,
        payload: &WeeklyPayload,
    ) -> Result<Self, ScheduleError> {
        let mut availability = Self::new(codec.shared_catalog());
        for (day, value) in payload.iter() {
            availability.days[day.index()] = codec.decode(value)?;
        }
        Ok(availability)
    }

    pub fn from_payload_map<K: AsRef<str>>(
        codec: &SlotSetCodec,
        map: &HashMap<K, u64>,
    ) -> Result<Self, ScheduleError> {
        Self::from_payload(codec, &WeeklyPayload::from_map(map)?)
    }

    /// Uniformly random selections, for demo rosters.
    pub fn random<R: Rng>(catalog: Arc<SlotCatalog>, rng: &mut R) -> Self {
        let mask = catalog.full_mask();
        let mut availability = Self::new(catalog);
        for set in availability.days.iter_mut() {
            *set = DaySlotSet::from_bits(rng.gen_range(0..=mask));
        }
        availability
    }
}
