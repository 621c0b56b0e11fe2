use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ssim_processor::{SsimReader, compress_flights, expand_slots};

/// SIR message with `rows` combined rows valid for the whole W17 season
fn season_message(rows: usize) -> String {
    let mut message = String::from("SCR\n/BENCH\nW17\n18OCT\nLHR\n");
    for row in 0..rows {
        message.push_str(&format!(
            "NBA{:03} BA{:03} 00XXX00XXX 1234567 180320 AMS1200 1300CDG JJ\n",
            row * 2 % 1000,
            (row * 2 + 1) % 1000
        ));
    }
    message
}

fn bench_expansion(c: &mut Criterion) {
    let reader = SsimReader::with_defaults().unwrap();
    let text = season_message(200);

    c.bench_function("read_sir_200_rows", |b| {
        b.iter(|| reader.read_text(black_box(&text), "bench.sir", None).unwrap())
    });

    let slot_file = reader.read_text(&text, "bench.sir", None).unwrap();
    let season = slot_file.header.season;

    c.bench_function("expand_400_slots", |b| {
        b.iter(|| expand_slots(black_box(&slot_file.slots), season.as_ref()).unwrap())
    });

    let expansion = expand_slots(&slot_file.slots, season.as_ref()).unwrap();
    c.bench_function("compress_flights", |b| {
        b.iter(|| compress_flights(black_box(&expansion.flights)))
    });
}

criterion_group!(benches, bench_expansion);
criterion_main!(benches);
