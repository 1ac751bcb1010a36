#![no_main]

//! Fuzz target for virtual track equivalence.
//!
//! Any resource list must be equivalent to itself and comparison must be
//! symmetric.

use arbitrary::Arbitrary;
use imf_core::Rational;
use imf_cpl::EditResource;
use imf_cpl::sequencer::compare;
use libfuzzer_sys::fuzz_target;
use uuid::Uuid;

#[derive(Arbitrary, Debug)]
struct Resource {
    file: u8,
    rate_num: u16,
    rate_den: u16,
    entry_point: u32,
    duration: u32,
    repeat_count: u8,
}

fn build(resources: &[Resource]) -> Vec<EditResource> {
    resources
        .iter()
        .filter_map(|r| {
            let rate = Rational::edit_rate(r.rate_num as i64, r.rate_den as i64).ok()?;
            EditResource::new(
                Uuid::from_u128(r.file as u128 % 4),
                Uuid::nil(),
                rate,
                r.entry_point as u64,
                r.duration as u64,
            )
            .ok()?
            .with_repeat_count(r.repeat_count as u64 % 8)
            .ok()
        })
        .collect()
}

fuzz_target!(|input: (Vec<Resource>, Vec<Resource>)| {
    let (left, right) = (build(&input.0), build(&input.1));
    assert!(compare(&left, &left).equivalent);
    assert_eq!(compare(&left, &right).equivalent, compare(&right, &left).equivalent);
});
