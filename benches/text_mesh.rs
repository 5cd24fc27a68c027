//! Benchmarks for outline flattening and text extrusion.
//!
//! Run with: `cargo bench --bench text_mesh`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use heartfield::font::outline::{flatten, parse_outline};
use heartfield::font::{TextMesh, TextStyle, Typeface};

/// A rounded `O`-like glyph: two quadratic contours, the inner one reversed.
const RING: &str = "m 500 0 q 1000 500 1000 0 q 500 1000 1000 1000 q 0 500 0 1000 q 500 0 0 0 \
                    m 500 250 q 250 500 250 250 q 500 750 250 750 q 750 500 750 750 q 500 250 750 250";

fn typeface() -> Typeface {
    let mut glyphs = String::new();
    for (i, ch) in ('A'..='Z').chain('a'..='z').enumerate() {
        if i > 0 {
            glyphs.push(',');
        }
        glyphs.push_str(&format!(r#""{ch}": {{ "ha": 1100, "o": "{RING}" }}"#));
    }
    let json = format!(
        r#"{{
            "familyName": "Bench",
            "resolution": 1000,
            "underlineThickness": 50,
            "boundingBox": {{ "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 800 }},
            "glyphs": {{ {glyphs}, " ": {{ "ha": 300 }}, "?": {{ "ha": 1100, "o": "{RING}" }} }}
        }}"#
    );
    Typeface::from_json(&json).expect("bench typeface parses")
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");

    group.bench_function("parse", |b| {
        b.iter(|| black_box(parse_outline(black_box(RING))))
    });

    let commands = parse_outline(RING).expect("ring outline parses");
    for segments in [4, 12, 32] {
        group.bench_with_input(BenchmarkId::new("flatten", segments), &segments, |b, &segments| {
            b.iter(|| black_box(flatten(&commands, 0.003, [0.0, 0.0], segments).is_ok()))
        });
    }

    group.finish();
}

fn bench_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude");
    let typeface = typeface();
    let style = TextStyle::default();

    for text in ["I Love Kim Chi", "The quick brown fox\njumps over the lazy dog"] {
        group.bench_with_input(BenchmarkId::new("chars", text.len()), &text, |b, text| {
            b.iter(|| black_box(TextMesh::build(&typeface, text, &style)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_outline, bench_extrude);
criterion_main!(benches);
