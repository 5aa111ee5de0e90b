#![no_main]
use libfuzzer_sys::fuzz_target;
use tablebuf::Table;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = Table::open(data, 0) {
        let vtable = table.vtable();
        for slot in 0..vtable.num_fields().min(64) {
            let _ = table.get_field::<u64>(slot, 0);
            let _ = table.get_str(slot);
            let _ = table.get_vector::<u8>(slot);
            if let Ok(Some(nested)) = table.get_table(slot) {
                let _ = nested.get_field::<f64>(0, 0.0);
            }
            if let Ok(Some(strings)) = table.get_vector::<&str>(slot) {
                for s in strings.iter().take(64) {
                    let _ = s;
                }
            }
        }
    }
});
