use criterion::{criterion_group, criterion_main, Criterion};
use ezasm::simulator::Simulator;

const TESTCASES: &[&str] = &["fib.ez", "stack.ez"];

fn criterion_benchmark(c: &mut Criterion) {
    for testcase in TESTCASES {
        let mut simulator = Simulator::default();
        simulator
            .load_file(format!("./benches/samples/{testcase}"))
            .unwrap_or_else(|e| panic!("Couldn't parse {testcase}: {e}"));

        c.bench_function(testcase, |b| {
            b.iter(|| {
                simulator.reset();
                simulator.run().unwrap()
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
