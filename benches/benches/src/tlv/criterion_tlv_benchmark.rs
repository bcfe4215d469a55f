use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tlv_codec::{TagMap, TlvNode, TlvOptions, ValueKind};

fn tag_map() -> TagMap {
    TagMap::new()
        .with(0x01, "NUM_POINTS", ValueKind::Int32)
        .with(0x03, "NAME", ValueKind::Utf8)
        .with(0x06, "DATA", ValueKind::Bytes)
        .with_nested(
            0x07,
            "RELATED",
            TagMap::new().with(0x01, "LEAF", ValueKind::Int64),
        )
}

fn sample_node(payload_len: usize) -> TlvNode {
    let mut node = TlvNode::with_options(TlvOptions::default())
        .unwrap()
        .with_default_tag_map(tag_map())
        .unwrap();
    let mut related = TlvNode::new();
    related.set(0x01, 7u64).unwrap();
    node.set(0x07, related).unwrap();
    node.set(0x01, 10u32).unwrap();
    node.set(0x03, "benchmark").unwrap();
    node.set(0x06, vec![0xA5u8; payload_len]).unwrap();
    node
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for len in [16usize, 1024, 65536] {
        let node = sample_node(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &node, |b, node| {
            b.iter(|| black_box(node.encode().unwrap()));
        });
    }
    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for len in [16usize, 1024, 65536] {
        let node = sample_node(len);
        let bytes = node.encode().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| {
                let mut decoded = node.new_equivalent();
                decoded.set_local_tag_map(tag_map()).unwrap();
                decoded.decode(black_box(bytes)).unwrap();
                decoded
            });
        });
    }
    group.finish();
}

fn tree_benchmark(c: &mut Criterion) {
    let node = sample_node(64);
    c.bench_function("render_tree", |b| {
        b.iter(|| black_box(node.render_tree(0, true, true).unwrap()));
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark, tree_benchmark);
criterion_main!(benches);
