use std::hint::black_box;

use codspeed_criterion_compat::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tilia_fixtures::{SpyInput, grammars};
use tilia_text::InputCursor;
use tilia_tree::NodeArena;

fn json_document(values: usize) -> String {
    let mut text = String::from("[");
    for index in 0..values {
        if index != 0 {
            text.push_str(", ");
        }
        text.push_str(r#"{"id": 12345, "flag": true, "tags": [1, 2, 3]}"#);
    }
    text.push(']');
    text
}

fn benchmark_parser(c: &mut Criterion) {
    let language = grammars::json();
    let mut group = c.benchmark_group("parse");

    for values in [16usize, 256, 1024] {
        let text = json_document(values);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("json", values), &text, |b, text| {
            b.iter(|| {
                let spy = SpyInput::new(text.as_str(), 4096);
                let mut arena = NodeArena::new();
                let cursor = InputCursor::new(spy.input());
                let (parsed, _) =
                    tilia_parser::parse(&language, &mut arena, cursor).expect("valid tables");
                black_box(parsed);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
