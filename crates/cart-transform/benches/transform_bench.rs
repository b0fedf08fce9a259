use cart_transform::{PurchaseOrderLine, TransformInput, consolidate, run_json};
use common::{Money, keys};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn make_bundle(n: usize) -> [PurchaseOrderLine; 2] {
    let bundle_id = format!("golf-{n}");
    let parent = format!("variant-{n}");
    [
        PurchaseOrderLine::new(format!("main-{n}"), 1, Money::from_cents(88500))
            .with_property(keys::BUNDLE_ID, bundle_id.as_str())
            .with_property(keys::PARENT_VARIANT_ID, parent.as_str())
            .with_property(keys::COMPONENT_TYPE, "main")
            .with_property(keys::HAND, "Right")
            .with_property(keys::SET_SIZE, "5-PW")
            .with_property(keys::GRIP, "Golf Pride Tour Velvet (Standard)")
            .with_property(keys::LIE, "Standard"),
        PurchaseOrderLine::new(format!("shaft-{n}"), 6, Money::from_cents(15400))
            .with_property(keys::BUNDLE_ID, bundle_id.as_str())
            .with_property(keys::PARENT_VARIANT_ID, parent.as_str())
            .with_property(keys::COMPONENT_TYPE, "shaft")
            .with_property(keys::SHAFT_BRAND, "KBS Tour")
            .with_property(keys::SHAFT_FLEX, "Stiff")
            .with_property(keys::SHAFT_LENGTH, "+1/2\""),
    ]
}

fn make_lines(bundles: usize) -> Vec<PurchaseOrderLine> {
    (0..bundles).flat_map(make_bundle).collect()
}

fn bench_consolidate(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform/consolidate");

    for bundles in [1, 10, 100] {
        let lines = make_lines(bundles);
        group.bench_with_input(BenchmarkId::from_parameter(bundles), &lines, |b, lines| {
            b.iter(|| consolidate(lines).unwrap());
        });
    }

    group.finish();
}

fn bench_run_json(c: &mut Criterion) {
    let document = serde_json::to_string(&TransformInput::new(make_lines(10))).unwrap();

    c.bench_function("transform/run_json_10_bundles", |b| {
        b.iter(|| run_json(&document).unwrap());
    });
}

criterion_group!(benches, bench_consolidate, bench_run_json);
criterion_main!(benches);
