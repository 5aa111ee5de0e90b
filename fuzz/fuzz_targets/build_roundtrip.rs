#![no_main]
use libfuzzer_sys::fuzz_target;
use tablebuf::{Builder, Table};

// Jeder Eingabe-Chunk wird zu (slot, i32-Wert); gebaut, gelesen, verglichen.
fuzz_target!(|data: &[u8]| {
    let fields: Vec<(usize, i32)> = data
        .chunks_exact(5)
        .take(32)
        .map(|c| ((c[0] % 16) as usize, i32::from_le_bytes([c[1], c[2], c[3], c[4]])))
        .collect();

    let mut b = Builder::new();
    b.start_object(16).unwrap();
    for &(slot, value) in &fields {
        b.add_field::<i32>(slot, value, 0).unwrap();
    }
    let root = b.end_object().unwrap();
    b.finish(root).unwrap();

    let table = Table::open(b.finished_data().unwrap(), 0).unwrap();
    let mut expected = [0i32; 16];
    for &(slot, value) in &fields {
        if value != 0 {
            expected[slot] = value;
        }
    }
    for (slot, &value) in expected.iter().enumerate() {
        assert_eq!(table.get_field::<i32>(slot, 0).unwrap(), value);
    }
});
