#![no_main]

use gmao_console::views::{build_dashboard, build_maintenance, build_stock};
use gmao_sync::{decode_snapshot, Snapshot, StateStore};
use libfuzzer_sys::fuzz_target;

const MAX_DOCUMENT_BYTES: usize = 8192;

fn decode_text(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_DOCUMENT_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fn run_queries(snapshot: &Snapshot) {
    let _ = snapshot.technicians();
    for machine in &snapshot.machines {
        let _ = machine.tone();
    }

    let dashboard = build_dashboard(snapshot);
    for index in 0..dashboard.row_count() {
        let _ = dashboard.row(index);
        let _ = dashboard.add_target(index);
    }
    let maintenance = build_maintenance(snapshot);
    let _ = maintenance.row(0);
    let _ = build_stock(snapshot);

    let mut store = StateStore::new();
    let observer = store.subscribe(|_| {});
    store.replace(snapshot.clone());
    store.unsubscribe(observer);
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Raw bytes straight into the decoder.
    if let Ok(snapshot) = decode_snapshot(&decode_text(data)) {
        run_queries(&snapshot);
    }

    // The same bytes embedded as field values in a five-collection scaffold,
    // so mostly well-formed documents with hostile contents get coverage too.
    let lo = usize::from(data[0]) % (data.len() + 1);
    let hi = usize::from(*data.get(1).unwrap_or(&0)) % (data.len() + 1);
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let name = decode_text(&data[..lo]);
    let status = decode_text(&data[lo..hi]);
    let technician = decode_text(&data[hi..]);
    let seed = data.len() % 97;

    let document = format!(
        r#"{{
  "seq": {seed},
  "chains": [{{"id_chain": {seed}, "name_chain": "{name}"}}, {{"id_chain": 2}}],
  "machines": [{{"id_machine": "M-{seed}", "name_machine": "{name}", "status_machine": "{status}", "id_chain": {seed}}}],
  "equipment": [{{}}],
  "maintenance": [{{"id_maintenance": 1, "id_machine": "M-{seed}", "type": "{status}", "technician": " {technician} "}}],
  "stock": [{{"quantity": {seed}}}]
}}"#
    );
    if let Ok(snapshot) = decode_snapshot(&document) {
        run_queries(&snapshot);
    }
});
