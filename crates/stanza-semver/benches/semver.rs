use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stanza_semver::{Semver, Version, VersionConstraint, VersionParser};

fn bench_parse_versions(c: &mut Criterion) {
    let versions = [
        "v1.2.3",
        "1.2.3-beta.1",
        "2.4.0+build.5",
        "1.0.0-alpha.beta",
        "10.20.30",
        "1.2.3-rc.1+linux",
    ];

    c.bench_function("parse_versions", |b| {
        b.iter(|| {
            for version in versions {
                black_box(Version::parse(black_box(version)).ok());
            }
        })
    });
}

fn bench_parse_constraints(c: &mut Criterion) {
    let parser = VersionParser::new();
    let constraints = [
        ">=1.2.3 <2.0.0",
        "^1.2.3 || ~2.4",
        "1.2.* || 2.*",
        "1.2.3 - 2.0.0",
        "~1.2.1 >=1.2.3",
        "!=1.5.0, !=1.5.1",
        ">1.0 <3.0 || >=4.0",
        "~=1.4",
    ];

    c.bench_function("parse_constraints", |b| {
        b.iter(|| {
            for constraint in constraints {
                black_box(parser.parse_constraints(black_box(constraint)).ok());
            }
        })
    });
}

fn bench_satisfies(c: &mut Criterion) {
    let cases = [
        ("1.2.3", "^1.2.0"),
        ("1.2.3-beta", "^1.2.3"),
        ("2.4.5", "~2.4"),
        ("1.2.3", ">=1.2.3 <2.0.0"),
        ("1.9999.9999", "<2.0.0"),
        ("1.2.3", "1.2.* || 2.*"),
    ];

    c.bench_function("semver_satisfies", |b| {
        b.iter(|| {
            for (version, constraint) in cases {
                black_box(Semver::satisfies(black_box(version), black_box(constraint)));
            }
        })
    });
}

fn bench_satisfies_parsed(c: &mut Criterion) {
    let versions: Vec<Version> = ["1.2.3", "1.2.3-beta", "2.4.5", "1.9999.9999", "1.9.0", "2.0.0"]
        .iter()
        .map(|v| Version::parse(v).expect("valid version"))
        .collect();

    let parsed = VersionConstraint::parse("^1.2").expect("parse constraints");

    c.bench_function("version_constraint_satisfies", |b| {
        b.iter(|| {
            for version in &versions {
                black_box(parsed.satisfies(black_box(version)));
            }
        })
    });
}

fn bench_sort(c: &mut Criterion) {
    let versions = vec![
        "1.0.0",
        "0.1.0",
        "0.1.1",
        "3.2.1",
        "2.4.0-alpha",
        "2.4.0",
        "50.2.0",
        "1.2.3",
        "2.4.5",
        "2.4.5-rc.1",
    ];

    c.bench_function("semver_sort", |b| {
        b.iter(|| {
            black_box(Semver::sort(black_box(&versions)));
        })
    });
}

criterion_group!(
    benches,
    bench_parse_versions,
    bench_parse_constraints,
    bench_satisfies,
    bench_satisfies_parsed,
    bench_sort
);
criterion_main!(benches);
