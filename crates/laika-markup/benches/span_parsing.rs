use criterion::{criterion_group, criterion_main, Criterion};
use laika_markup::{parse, Format};

fn generate_markdown_paragraph(spans: usize) -> String {
    let mut out = String::new();
    for i in 0..spans {
        out.push_str(&format!(
            "word{i} **bold{i}** *em{i}* `code{i}` [link{i}](https://example.com/{i}) "
        ));
    }
    out.push('\n');
    out
}

fn generate_rst_paragraph(spans: usize) -> String {
    let mut out = String::new();
    for i in 0..spans {
        out.push_str(&format!(
            "word{i} **bold{i}** *em{i}* ``code{i}`` `link{i} <https://example.com/{i}>`_ "
        ));
    }
    out.push('\n');
    out
}

fn bench_span_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_parsing");
    group.sample_size(10);

    let content = generate_markdown_paragraph(200);
    group.bench_function("markdown", |b| {
        b.iter(|| {
            let root = parse(Format::Markdown, std::hint::black_box(&content));
            std::hint::black_box(root);
        });
    });

    let rst_content = generate_rst_paragraph(200);
    group.bench_function("rst", |b| {
        b.iter(|| {
            let root = parse(Format::Rst, std::hint::black_box(&rst_content));
            std::hint::black_box(root);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_span_parsing);
criterion_main!(benches);
