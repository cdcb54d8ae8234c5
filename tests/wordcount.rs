//! End-to-end count-per-element pipeline: create, pair, group, combine,
//! write, and report an aggregator.

use anyhow::Result;
use millrace::testing::CollectSink;
use millrace::{
    AggregationKind, Aggregator, CombineFn, CountCombineFn, CounterValue, DirectRunner, Element,
    FnDoFn, JsonCoder, Pipeline, PipelineState, ProcessContext, WindowedValue,
};
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn count_per_element_over_a_small_input() -> Result<()> {
    let sink = CollectSink::new();
    let mut p = Pipeline::new();

    let words = p.create("words", vec!["a".into(), "b".into(), "a".into()]);

    let pairs_seen = Aggregator::new("pairs", AggregationKind::Sum);
    let paired = p.par_do(
        "pair-with-one",
        Arc::new(FnDoFn::new(
            move |ctx: &mut ProcessContext, wv: &WindowedValue| {
                ctx.update_aggregator(&pairs_seen, 1);
                ctx.output(Element::pair(wv.value.clone(), 1));
                Ok(())
            },
        )),
        words,
    );

    let grouped = p.group_by_key_only("group", paired, Arc::new(JsonCoder));

    // The grouped reduction: fold each key's value list through a combiner.
    let counted = p.par_do(
        "count-values",
        Arc::new(FnDoFn::new(
            |ctx: &mut ProcessContext, wv: &WindowedValue| {
                let (key, values) = wv
                    .value
                    .as_pair()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .expect("grouped output is key/value pairs");
                let count = CountCombineFn::<Element>::new();
                let mut acc = count.create_accumulator();
                count.add_inputs(&mut acc, values.as_list().unwrap().to_vec());
                ctx.output(Element::pair(key, count.extract_output(acc) as i64));
                Ok(())
            },
        )),
        grouped,
    );

    p.write("write-counts", counted, Arc::new(sink.clone()));

    let mut runner = DirectRunner::new();
    let result = runner.run(&p)?;
    assert_eq!(result.state(), PipelineState::Done);

    let mut counts: HashMap<String, i64> = HashMap::new();
    for element in sink.written() {
        let (k, n) = element.as_pair().unwrap();
        counts.insert(k.as_str().unwrap().to_string(), n.as_i64().unwrap());
    }
    assert_eq!(counts, HashMap::from([("a".to_string(), 2), ("b".to_string(), 1)]));

    // The user aggregator is reported per step.
    let aggregated = result.aggregated_values("pairs");
    assert_eq!(aggregated.len(), 1);
    assert_eq!(aggregated["pair-with-one"], CounterValue::Int(3));
    Ok(())
}
