#![no_main]

use avl_sum::model::RangeSumInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: RangeSumInput| {
    avl_sum::model::run_range_sums(input.keys, input.probes);
});
