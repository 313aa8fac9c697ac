use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markdown_inspect_engine::MarkdownParser;
use markdown_inspect_engine::config::DirectivePolicy;
mod common;

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    let parser = MarkdownParser::new();
    for size in [10, 100] {
        let content = common::generate_markdown_content(size);
        group.bench_with_input(BenchmarkId::new("repeated", size), &content, |b, content| {
            b.iter(|| {
                let doc = parser.parse_str(std::hint::black_box(content), None).unwrap();
                std::hint::black_box(doc);
            });
        });
    }

    let large = common::generate_large_document();
    group.bench_function("large_document", |b| {
        b.iter(|| {
            let doc = parser.parse_str(std::hint::black_box(&large), None).unwrap();
            std::hint::black_box(doc);
        });
    });

    let removing = MarkdownParser::new().with_directive_policy(DirectivePolicy::Remove);
    group.bench_function("large_document_removed_directives", |b| {
        b.iter(|| {
            let doc = removing.parse_str(std::hint::black_box(&large), None).unwrap();
            std::hint::black_box(doc);
        });
    });

    let long = common::generate_long_paragraph(2_000);
    group.bench_function("long_paragraph", |b| {
        b.iter(|| {
            let doc = parser.parse_str(std::hint::black_box(&long), None).unwrap();
            std::hint::black_box(doc);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
