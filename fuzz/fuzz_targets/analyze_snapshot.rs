#![no_main]

use iocgraph_core::{EndpointResolver, Snapshot, analyze};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json(text) else {
        return;
    };
    // Keep inputs small enough that nested hierarchy output stays bounded.
    if snapshot.records.len() > 64 || snapshot.edges.len() > 256 {
        return;
    }
    if let Ok(analysis) = analyze(&snapshot, &EndpointResolver::default()) {
        let layered = analysis.layers.layered_ids().count();
        assert_eq!(
            layered + analysis.layers.isolated.len(),
            snapshot.records.len()
        );
    }
});
