use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ucd_predicates::emit::cpp::{CppEmitter, CppOptions};
use ucd_predicates::{CodeUnit, Compiler, Config, Domain, SparseSet};

// A letter-like set: dense runs with scattered gaps, spread over the BMP.
fn letters() -> SparseSet {
    let mut set = SparseSet::new();
    let mut first = 0x41u32;
    while first < 0xFFFF {
        let len = (first * 7 + 3) % 29;
        set.add((first, (first + len).min(0xFFFF))).unwrap();
        first += len + 2 + (first % 13);
    }
    set.finish().unwrap();
    set
}

fn compile_bench(c: &mut Criterion) {
    let set = letters();
    let compiler = Compiler::new(Config::default()).unwrap();
    let domain = Domain::for_code_unit(&CodeUnit::CHAR16);

    c.bench_function("Compile BMP letters", |b| {
        b.iter(|| compiler.compile(black_box(&set), domain).unwrap())
    });

    let predicate = compiler.compile(&set, domain).unwrap();
    let options = CppOptions::default();
    let emitter = CppEmitter::new(CodeUnit::CHAR16, &options);
    c.bench_function("Emit BMP letters", |b| {
        b.iter(|| emitter.body(black_box(&predicate)))
    });
}

fn finish_bench(c: &mut Criterion) {
    let values: Vec<u32> = (0..0x10000u32).filter(|v| v % 3 != 0).rev().collect();
    c.bench_function("Finish 40k values", |b| {
        b.iter(|| {
            let mut set = SparseSet::from_elements(black_box(values.iter().copied())).unwrap();
            set.finish().unwrap();
            set
        })
    });
}

criterion_group!(benches, compile_bench, finish_bench);
criterion_main!(benches);
