use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mathfonts_core::face::font_faces;
use mathfonts_core::template::render_font_css;

fn bench_render(c: &mut Criterion) {
    c.bench_function("render_font_css", |b| {
        b.iter(|| render_font_css(black_box("https://cdn.example.com/katex/")))
    });

    c.bench_function("parse_font_faces", |b| b.iter(|| font_faces().unwrap()));
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
