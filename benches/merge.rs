use std::fmt::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prpolicy::rules::{merge, validate, DefaultRule, Mode, UserConfig};

/// A configuration with `n` branch patterns, none of which match `main`
/// except the catch-all at the end.
fn config_with_branches(n: usize) -> UserConfig {
    let mut text = String::from(
        "rules:\n  default:\n    disabling_label: hold\n    protection:\n      enforce_admins: true\n  branches:\n",
    );
    for i in 0..n {
        let _ = writeln!(
            text,
            "    release-{i}\\..*:\n      protection:\n        required_pull_request_reviews:\n          required_approving_review_count: 2"
        );
    }
    text.push_str("    .*:\n      disabling_label: catch-all\n");
    UserConfig::from_yaml(&text).unwrap()
}

fn bench_merge(c: &mut Criterion) {
    let default = DefaultRule::builtin();
    let overlay: serde_yaml::Value = serde_yaml::from_str(
        "protection: {required_status_checks: {contexts: [ci/build, ci/test]}, enforce_admins: true}\ndisabling_label: wip\n",
    )
    .unwrap();

    let mut group = c.benchmark_group("merge");
    group.bench_function("overlay", |b| {
        b.iter(|| merge(black_box(default.as_value()), black_box(&overlay)));
    });

    let merged = merge(default.as_value(), &overlay);
    group.bench_function("validate_strict", |b| {
        b.iter(|| validate(black_box(&merged), Mode::Strict));
    });
    group.finish();
}

fn bench_branch_selection(c: &mut Criterion) {
    let default = DefaultRule::builtin();
    let mut group = c.benchmark_group("rule_for_branch");

    for &n in &[1, 10, 50] {
        let config = config_with_branches(n);
        group.bench_function(format!("{n}_patterns_first_match"), |b| {
            b.iter(|| config.rule_for_branch(&default, black_box("release-0.1")));
        });
        group.bench_function(format!("{n}_patterns_catch_all"), |b| {
            b.iter(|| config.rule_for_branch(&default, black_box("main")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_branch_selection);
criterion_main!(benches);
