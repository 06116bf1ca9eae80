use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::log_warn;

use super::slots::{Slot, SlotCatalog, MAX_SLOTS_PER_DAY};

const ENABLE_LOGS: bool = true;

/// The selected slots of one day, as bit positions into a [`SlotCatalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySlotSet(u32);

impl DaySlotSet {
    pub const EMPTY: DaySlotSet = DaySlotSet(0);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, index: usize) -> bool {
        index < MAX_SLOTS_PER_DAY && self.0 & (1 << index) != 0
    }

    /// Returns whether the set changed.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= MAX_SLOTS_PER_DAY || self.contains(index) {
            return false;
        }
        self.0 |= 1 << index;
        true
    }

    /// Returns whether the set changed.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.0 &= !(1 << index);
        true
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set bit positions in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_SLOTS_PER_DAY).filter(move |&index| self.contains(index))
    }

    pub fn intersection(self, other: DaySlotSet) -> DaySlotSet {
        DaySlotSet(self.0 & other.0)
    }

    pub fn union(self, other: DaySlotSet) -> DaySlotSet {
        DaySlotSet(self.0 | other.0)
    }
}

impl FromIterator<usize> for DaySlotSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = DaySlotSet::EMPTY;
        for index in iter {
            set.insert(index);
        }
        set
    }
}

/// What `decode` does with bits at or above the catalog length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Drop them. Previously stored values decode exactly as they always have.
    #[default]
    Lenient,
    /// Fail with [`ScheduleError::InvalidEncoding`].
    Strict,
}

/// Converts a day's slot set to and from its stored integer.
#[derive(Debug, Clone)]
pub struct SlotSetCodec {
    catalog: Arc<SlotCatalog>,
    policy: DecodePolicy,
}

impl SlotSetCodec {
    pub fn new(catalog: Arc<SlotCatalog>, policy: DecodePolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<SlotCatalog> {
        self.catalog.clone()
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Always within `[0, 2^N - 1]`.
    pub fn encode(&self, set: &DaySlotSet) -> u32 {
        set.iter()
            .take_while(|&index| index < self.catalog.len())
            .fold(0u32, |acc, index| acc | (1 << index))
    }

    pub fn decode(&self, value: u64) -> Result<DaySlotSet, ScheduleError> {
        let mask = u64::from(self.catalog.full_mask());
        let extra = value & !mask;
        if extra != 0 {
            match self.policy {
                DecodePolicy::Strict => {
                    return Err(ScheduleError::InvalidEncoding {
                        value,
                        width: self.catalog.len(),
                    });
                }
                DecodePolicy::Lenient => {
                    log_warn!(
                        "Ignoring bits {:#x} beyond the {} slots of a day in {:#x}",
                        extra,
                        self.catalog.len(),
                        value
                    );
                }
            }
        }
        Ok(DaySlotSet((value & mask) as u32))
    }

    pub fn encode_slots<'a, I>(&self, slots: I) -> Result<u32, ScheduleError>
    where
        I: IntoIterator<Item = &'a Slot>,
    {
        let mut set = DaySlotSet::EMPTY;
        for slot in slots {
            set.insert(self.catalog.index_of(slot)?);
        }
        Ok(self.encode(&set))
    }

    pub fn encode_labels(&self, labels: &[&str]) -> Result<u32, ScheduleError> {
        let slots = labels
            .iter()
            .map(|label| Slot::parse_label(label))
            .collect::<Result<Vec<_>, _>>()?;
        self.encode_slots(&slots)
    }

    pub fn decode_slots(&self, value: u64) -> Result<Vec<Slot>, ScheduleError> {
        self.decode(value)?
            .iter()
            .map(|index| self.catalog.slot_at(index))
            .collect()
    }

    pub fn decode_labels(&self, value: u64) -> Result<Vec<String>, ScheduleError> {
        Ok(self
            .decode_slots(value)?
            .iter()
            .map(Slot::label)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn four_slot_codec(policy: DecodePolicy) -> SlotSetCodec {
        let catalog = SlotCatalog::from_labels(&["900", "930", "1000", "1030"]).unwrap();
        SlotSetCodec::new(Arc::new(catalog), policy)
    }

    #[test]
    fn encodes_selected_positions() {
        let codec = four_slot_codec(DecodePolicy::Lenient);
        assert_eq!(codec.encode_labels(&["900", "1000"]).unwrap(), 0b0101);
        assert_eq!(codec.decode_labels(5).unwrap(), vec!["900", "1000"]);
    }

    #[test]
    fn every_integer_round_trips_on_small_catalog() {
        let codec = four_slot_codec(DecodePolicy::Strict);
        for value in 0..16u32 {
            let set = codec.decode(u64::from(value)).unwrap();
            assert_eq!(codec.encode(&set), value);
        }
    }

    #[test]
    fn every_subset_round_trips_on_eight_slots() {
        let catalog = Arc::new(SlotCatalog::new(9, 13, 30).unwrap());
        assert_eq!(catalog.len(), 8);
        let codec = SlotSetCodec::new(catalog, DecodePolicy::Strict);
        for bits in 0..256u32 {
            let set: DaySlotSet = (0..8usize).filter(|&i| bits & (1u32 << i) != 0).collect();
            assert_eq!(codec.decode(u64::from(codec.encode(&set))).unwrap(), set);
        }
    }

    #[test]
    fn sampled_round_trip_on_standard_catalog() {
        let codec = SlotSetCodec::new(Arc::new(SlotCatalog::standard()), DecodePolicy::Strict);
        let mut rng = StdRng::seed_from_u64(304);
        for _ in 0..1000 {
            let value: u32 = rng.gen_range(0..=codec.catalog().full_mask());
            let set = codec.decode(u64::from(value)).unwrap();
            assert_eq!(codec.encode(&set), value);
            assert_eq!(codec.decode(u64::from(codec.encode(&set))).unwrap(), set);
        }
    }

    #[test]
    fn lenient_decode_masks_high_bits() {
        let codec = four_slot_codec(DecodePolicy::Lenient);
        let set = codec.decode(0b1_0000_0101).unwrap();
        assert_eq!(codec.encode(&set), 0b0101);

        let huge = codec.decode(u64::MAX).unwrap();
        assert_eq!(codec.encode(&huge), 0b1111);
    }

    #[test]
    fn strict_decode_rejects_high_bits() {
        let codec = four_slot_codec(DecodePolicy::Strict);
        assert_eq!(
            codec.decode(0b1_0000),
            Err(ScheduleError::InvalidEncoding {
                value: 0b1_0000,
                width: 4
            })
        );
    }

    #[test]
    fn encode_ignores_positions_beyond_catalog() {
        let codec = four_slot_codec(DecodePolicy::Lenient);
        let set = DaySlotSet::from_bits(0b1_0010);
        assert_eq!(codec.encode(&set), 0b0010);
    }

    #[test]
    fn unknown_label_fails_encode() {
        let codec = four_slot_codec(DecodePolicy::Lenient);
        assert!(matches!(
            codec.encode_labels(&["900", "1100"]),
            Err(ScheduleError::UnknownSlot(_))
        ));
    }

    #[test]
    fn set_operations() {
        let mut set = DaySlotSet::EMPTY;
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(0));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(set.len(), 2);
        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert!(!set.insert(32));
        assert_eq!(set.bits(), 1);
    }
}
