use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parsers::{build_catalog, parse_file, parse_java};
use std::{fs, path::PathBuf};

use engine::{build_cfg, build_pdg, build_pdg_with_config, EngineConfig};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures/java/Account.java")
}

fn bench_parser(c: &mut Criterion) {
    let content = fs::read_to_string(fixture()).expect("read fixture");
    c.bench_function("parse_java", |b| {
        b.iter(|| parse_java(black_box(&content), "Account.java").unwrap())
    });
}

fn bench_catalog(c: &mut Criterion) {
    let unit = parse_file(&fixture(), None).expect("parse fixture");
    c.bench_function("build_catalog", |b| b.iter(|| build_catalog(black_box(&unit))));
}

fn bench_cfg(c: &mut Criterion) {
    let unit = parse_file(&fixture(), None).expect("parse fixture");
    c.bench_function("build_cfg", |b| b.iter(|| build_cfg(black_box(&unit))));
}

fn bench_pdg(c: &mut Criterion) {
    let unit = parse_file(&fixture(), None).expect("parse fixture");
    c.bench_function("build_pdg", |b| b.iter(|| build_pdg(black_box(&unit)).unwrap()));
}

// A synthetic unit with many chained statements stresses propagation.
fn bench_pdg_long_method(c: &mut Criterion) {
    let mut body = String::from("int v0 = seed;\n");
    for i in 1..200 {
        body.push_str(&format!("int v{i} = v{} + {i};\n", i - 1));
        if i % 10 == 0 {
            body.push_str(&format!("if (v{i} > 100) {{ v{i} = 0; }}\n"));
        }
    }
    let source = format!("class Long {{ int run(int seed) {{\n{body}return v199;\n}} }}");
    let unit = parse_java(&source, "Long.java").unwrap();
    let config = EngineConfig::default();
    c.bench_function("build_pdg_long_method", |b| {
        b.iter(|| build_pdg_with_config(black_box(&unit), &config).unwrap())
    });
}

criterion_group!(
    benches,
    bench_parser,
    bench_catalog,
    bench_cfg,
    bench_pdg,
    bench_pdg_long_method
);
criterion_main!(benches);
