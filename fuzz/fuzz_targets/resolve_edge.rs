#![no_main]

use iocgraph_core::{EndpointResolver, RawEdge};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Some(edge) = EndpointResolver::default().resolve(&RawEdge(value)) {
        assert!(!edge.from.trim().is_empty());
        assert!(!edge.to.trim().is_empty());
    }
});
