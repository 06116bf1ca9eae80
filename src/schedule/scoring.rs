use super::availability::WeeklyPayload;

/// Score the overlap of two schedules for the same day.
///
/// Each shared slot adds one and each separate shared run subtracts one, so
/// a single 2-hour block scores 3, two 1-hour blocks score 2 and four
/// isolated half-hours score 0.
///
/// Every bit counts, including any beyond the catalog. Values read from
/// storage should be decoded through a `SlotSetCodec` first.
pub fn day_score(a: u64, b: u64) -> u32 {
    let both = a & b;
    // a run starts wherever a bit is set and the bit below it is not
    let runs = (both & !(both << 1)).count_ones();
    both.count_ones() - runs
}

/// Sum of [`day_score`] over the week.
pub fn overlap_score(a: &WeeklyPayload, b: &WeeklyPayload) -> u32 {
    a.to_days()
        .iter()
        .zip(b.to_days().iter())
        .map(|(&x, &y)| day_score(x, y))
        .sum()
}

/// Selected slots across the week.
pub fn free_slots(payload: &WeeklyPayload) -> u32 {
    payload.to_days().iter().map(|value| value.count_ones()).sum()
}
