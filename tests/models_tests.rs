// Model serialization tests (snake_case wire shape, nulls kept)

mod common;

use hostprobe::models::*;
use serde_json::Value;

#[test]
fn test_full_snapshot_serializes_every_field() {
    let json = serde_json::to_value(common::full_snapshot(1_700_000_000)).unwrap();
    common::assert_schema(&json);
    assert_eq!(json["timestamp"], 1_700_000_000);
    assert_eq!(json["cpu"]["stats"]["ctx_switches"], 100);
    assert_eq!(json["cpu"]["times"]["iowait"], 0.5);
    assert_eq!(json["cpu"]["frequencies"][0]["max"], 3600.0);
    assert_eq!(json["memory"]["percent"], 75.0);
}

#[test]
fn test_load_avg_serializes_as_three_element_array() {
    let json = serde_json::to_value(common::full_snapshot(1)).unwrap();
    let load = json["cpu"]["load_avg"].as_array().expect("array");
    assert_eq!(load.len(), 3);
    assert!(load.iter().all(|v| v.as_f64().is_some_and(|f| f >= 0.0)));
}

#[test]
fn test_unsupported_fields_are_null_not_omitted() {
    let mut snapshot = common::full_snapshot(1);
    snapshot.cpu.load_avg = None;
    snapshot.cpu.count.physical = None;
    snapshot.cpu.times = Some(CpuTimes {
        user: 1.0,
        system: 1.0,
        idle: 1.0,
        iowait: None,
        irq: None,
        softirq: None,
    });
    snapshot.cpu.frequencies = vec![];

    let json = serde_json::to_value(&snapshot).unwrap();
    common::assert_schema(&json);
    assert_eq!(json.pointer("/cpu/load_avg"), Some(&Value::Null));
    assert_eq!(json.pointer("/cpu/count/physical"), Some(&Value::Null));
    assert_eq!(json.pointer("/cpu/times/iowait"), Some(&Value::Null));
    assert_eq!(json.pointer("/cpu/times/irq"), Some(&Value::Null));
    assert_eq!(json.pointer("/cpu/times/softirq"), Some(&Value::Null));
    assert_eq!(json["cpu"]["frequencies"], Value::Array(vec![]));
}

#[test]
fn test_shape_is_identical_with_and_without_load_average() {
    fn keys(v: &Value) -> Vec<String> {
        let mut out = Vec::new();
        if let Value::Object(map) = v {
            for (k, child) in map {
                out.push(k.clone());
                out.extend(keys(child).into_iter().map(|c| format!("{}.{}", k, c)));
            }
        }
        out.sort();
        out
    }
    let with = serde_json::to_value(common::full_snapshot(1)).unwrap();
    let mut snapshot = common::full_snapshot(1);
    snapshot.cpu.load_avg = None;
    let without = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(keys(&with), keys(&without));
}

#[test]
fn test_unavailable_metrics_serialize_snake_case() {
    let mut snapshot = common::full_snapshot(1);
    snapshot.cpu.stats = None;
    snapshot.unavailable = vec![Metric::CpuStats, Metric::CpuTimes];
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["cpu"]["stats"], Value::Null);
    assert_eq!(
        json["unavailable"],
        serde_json::json!(["cpu_stats", "cpu_times"])
    );
}

#[test]
fn test_metric_names_match_display() {
    for metric in Metric::ALL {
        let json = serde_json::to_value(metric).unwrap();
        assert_eq!(json, Value::String(metric.to_string()));
    }
}

#[test]
fn test_memory_percent_is_used_share_rounded() {
    let mem = MemoryStats::from_totals(3, 2);
    assert_eq!(mem.percent, 33.3);
    assert_eq!(MemoryStats::from_totals(0, 0).percent, 0.0);
    assert_eq!(MemoryStats::from_totals(100, 100).percent, 0.0);
    assert_eq!(MemoryStats::from_totals(100, 0).percent, 100.0);
}

#[test]
fn test_memory_percent_saturates_when_available_exceeds_total() {
    let mem = MemoryStats::from_totals(100, 150);
    assert_eq!(mem.percent, 0.0);
}

#[test]
fn test_round_percent_clamps_and_rounds() {
    assert_eq!(round_percent(12.345), 12.3);
    assert_eq!(round_percent(-3.0), 0.0);
    assert_eq!(round_percent(250.0), 100.0);
    assert_eq!(round_percent(f64::NAN), 0.0);
}

#[test]
fn test_snapshot_json_roundtrip_preserves_nulls() {
    let mut snapshot = common::full_snapshot(5);
    snapshot.network = None;
    snapshot.unavailable = vec![Metric::Network];
    let text = serde_json::to_string(&snapshot).unwrap();
    assert!(text.contains("\"network\":null"));
    let back: Snapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(back, snapshot);
}
