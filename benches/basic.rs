use criterion::{criterion_group, criterion_main, Criterion};
use serial_tap::logging::hex_dump;
use serial_tap::LinkSettings;
use std::hint::black_box;
use std::time::Duration;

pub fn bench_hex_dump(c: &mut Criterion) {
    let chunk: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    c.bench_function("hex_dump_4k", |b| {
        b.iter(|| black_box(hex_dump(black_box(&chunk))))
    });

    let line = b"ATZ\r\n";
    c.bench_function("hex_dump_short", |b| {
        b.iter(|| black_box(hex_dump(black_box(line))))
    });
}

pub fn bench_definition_parsing(c: &mut Criterion) {
    c.bench_function("parse_port_definition", |b| {
        b.iter(|| {
            let settings: LinkSettings = black_box("/dev/ttyUSB0,115200,E,7,2").parse().unwrap();
            black_box(settings);
        })
    });
}

criterion_group!{
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_hex_dump, bench_definition_parsing
}
criterion_main!(benches);
