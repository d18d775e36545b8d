use std::hint::black_box;

use authplug::{
    matches_filter, Access, AclEvaluator, AclOrder, Backend, BackendChain, TopicTemplate,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Бэкенд без I/O, всегда отказывает.
struct DenyAll;

impl Backend for DenyAll {
    fn name(&self) -> &str {
        "deny-all"
    }

    fn get_user(
        &self,
        _: &str,
    ) -> Option<String> {
        None
    }

    fn is_superuser(
        &self,
        _: &str,
    ) -> bool {
        false
    }

    fn acl_check(
        &self,
        _: &str,
        _: &str,
        _: Access,
    ) -> bool {
        false
    }
}

fn bench_matches_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("matches_filter");
    let cases = [
        ("exact", "site/floor1/room2/temp", "site/floor1/room2/temp"),
        ("plus", "site/+/+/temp", "site/floor1/room2/temp"),
        ("hash", "site/#", "site/floor1/room2/temp"),
        ("miss", "site/floor2/#", "site/floor1/room2/temp"),
    ];
    for (name, filter, topic) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(filter, topic), |b, (f, t)| {
            b.iter(|| matches_filter(black_box(f), black_box(t)))
        });
    }
    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    let template = TopicTemplate::new("tenants/%/devices/%/#");
    c.bench_function("template_expand", |b| {
        b.iter(|| template.expand(black_box("sensor-000042")))
    });
}

fn bench_acl_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("acl_check");
    for backends in 1..=4 {
        let chain = BackendChain::new(
            (0..backends)
                .map(|_| Box::new(DenyAll) as Box<dyn Backend>)
                .collect(),
        )
        .expect("chain");

        for order in [AclOrder::BackendsFirst, AclOrder::TemplateFirst] {
            let acl = AclEvaluator::new()
                .with_superusers("admin-*")
                .expect("glob")
                .with_template(TopicTemplate::new("u/%/#"))
                .with_order(order);

            group.bench_function(BenchmarkId::new(order.to_string(), backends), |b| {
                b.iter(|| {
                    acl.check(
                        &chain,
                        "client",
                        black_box("alice"),
                        black_box("u/alice/telemetry"),
                        Access::Write,
                    )
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_matches_filter, bench_expand, bench_acl_check);
criterion_main!(benches);
