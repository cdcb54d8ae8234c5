use mark_flaky_tests::flaky;
use millrace::{
    CombineFn, CountCombineFn, MeanCombineFn, SampleCombineFn, ToDictCombineFn, ToListCombineFn,
    TopCombineFn,
};
use std::collections::HashMap;

#[test]
fn mean_of_empty_input_is_nan() {
    let mean = MeanCombineFn;
    let out: f64 = mean.apply(Vec::<f64>::new());
    assert!(out.is_nan());
}

#[test]
fn mean_basic_and_partial_merge() {
    let mean = MeanCombineFn;
    assert_eq!(mean.apply(vec![2.0, 4.0, 6.0]), 4.0);

    // Merging a partial of [2, 4] with a partial of [6] equals the mean of
    // the full list.
    let mut left = mean.create_accumulator();
    mean.add_inputs(&mut left, vec![2.0, 4.0]);
    let mut right = mean.create_accumulator();
    mean.add_input(&mut right, 6.0);
    let merged = mean.merge_accumulators(vec![left, right]);
    assert_eq!(mean.extract_output(merged), 4.0);
}

#[test]
fn count_folds_batches_in_constant_time() {
    let count = CountCombineFn::<&str>::new();
    let mut acc = count.create_accumulator();
    count.add_inputs(&mut acc, vec!["a", "b", "c"]);
    count.add_input(&mut acc, "d");
    let other = {
        let mut acc = count.create_accumulator();
        count.add_inputs(&mut acc, vec!["e", "f"]);
        acc
    };
    let merged = count.merge_accumulators(vec![acc, other]);
    assert_eq!(count.extract_output(merged), 6);
}

#[test]
fn top_k_keeps_the_compare_most_elements() {
    let largest: TopCombineFn<i64> = TopCombineFn::largest(2);
    assert_eq!(largest.apply(vec![5, 1, 9, 3, 9]), vec![9, 9]);

    let smallest: TopCombineFn<i64> = TopCombineFn::smallest(2);
    assert_eq!(smallest.apply(vec![5, 1, 9, 3, 9]), vec![1, 3]);
}

#[test]
fn top_k_of_zero_or_short_input() {
    let top: TopCombineFn<i64> = TopCombineFn::largest(0);
    assert!(top.apply(vec![1, 2, 3]).is_empty());

    let top: TopCombineFn<i64> = TopCombineFn::largest(5);
    assert_eq!(top.apply(vec![2, 1]), vec![2, 1]);
}

#[test]
fn top_k_merge_equals_whole_stream_for_any_split() {
    let input = vec![5i64, 1, 9, 3];
    let top: TopCombineFn<i64> = TopCombineFn::largest(2);
    let whole = {
        let mut acc = top.create_accumulator();
        top.add_inputs(&mut acc, input.clone());
        top.extract_output(acc)
    };

    for split in 0..=input.len() {
        let mut left = top.create_accumulator();
        top.add_inputs(&mut left, input[..split].to_vec());
        let mut right = top.create_accumulator();
        top.add_inputs(&mut right, input[split..].to_vec());
        let merged = top.merge_accumulators(vec![left, right]);
        assert_eq!(top.extract_output(merged), whole, "split at {split}");
    }
}

#[test]
fn top_k_with_a_bound_comparator_argument() {
    // "Greatest" here means closest to a pivot captured by the comparator.
    let pivot = 10i64;
    let closest = TopCombineFn::new(3, move |a: &i64, b: &i64| {
        (a - pivot).abs() > (b - pivot).abs()
    });
    assert_eq!(closest.apply(vec![1, 8, 20, 11, 2]), vec![11, 8, 2]);
}

#[test]
fn sample_is_bounded_and_exhaustive_on_short_input() {
    let sample: SampleCombineFn<i64> = SampleCombineFn::new(5);
    let mut out = sample.apply(vec![1, 2, 3]);
    out.sort_unstable();
    assert_eq!(out, vec![1, 2, 3]);

    let sample: SampleCombineFn<i64> = SampleCombineFn::new(2);
    assert_eq!(sample.apply((0..100).collect()).len(), 2);
}

#[flaky]
#[test]
fn sample_selects_elements_roughly_uniformly() {
    // Statistical property: over many independent draws, each of the ten
    // elements should be picked with roughly equal frequency.
    let sample: SampleCombineFn<i64> = SampleCombineFn::new(2);
    let mut hits = [0u32; 10];
    for _ in 0..2000 {
        for v in sample.apply((0..10).collect()) {
            hits[v as usize] += 1;
        }
    }
    // Expected 400 hits each; allow a wide band.
    for (v, &n) in hits.iter().enumerate() {
        assert!((300..=500).contains(&n), "element {v} sampled {n} times");
    }
}

#[test]
fn sample_merge_respects_the_size_bound() {
    let sample: SampleCombineFn<i64> = SampleCombineFn::new(3);
    let mut left = sample.create_accumulator();
    sample.add_inputs(&mut left, (0..10).collect());
    let mut right = sample.create_accumulator();
    sample.add_inputs(&mut right, (10..20).collect());
    let merged = sample.merge_accumulators(vec![left, right]);
    assert_eq!(sample.extract_output(merged).len(), 3);
}

#[test]
fn to_list_preserves_arrival_order() {
    let to_list: ToListCombineFn<&str> = ToListCombineFn::new();
    assert_eq!(to_list.apply(vec!["x", "y", "x"]), vec!["x", "y", "x"]);

    let mut left = to_list.create_accumulator();
    to_list.add_inputs(&mut left, vec!["a", "b"]);
    let mut right = to_list.create_accumulator();
    to_list.add_input(&mut right, "c");
    let merged = to_list.merge_accumulators(vec![left, right]);
    assert_eq!(to_list.extract_output(merged), vec!["a", "b", "c"]);
}

#[test]
fn to_dict_is_lossy_on_duplicate_keys() {
    let to_dict: ToDictCombineFn<&str, i64> = ToDictCombineFn::new();

    // Last write per partial wins.
    let out = to_dict.apply(vec![("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(out, HashMap::from([("a", 3), ("b", 2)]));

    // Across merged partials, the later partial wins on collision.
    let mut first = to_dict.create_accumulator();
    to_dict.add_input(&mut first, ("k", 1));
    let mut second = to_dict.create_accumulator();
    to_dict.add_input(&mut second, ("k", 9));
    let merged = to_dict.merge_accumulators(vec![first, second]);
    assert_eq!(to_dict.extract_output(merged), HashMap::from([("k", 9)]));
}
