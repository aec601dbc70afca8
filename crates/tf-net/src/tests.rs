//! Integration tests for tf-net.

use tf_agent::{AgentDelta, DeltaBatch};
use tf_core::{EntityId, Tick};

fn batch(tick: u64, ids: &[u32], removed: &[u32]) -> DeltaBatch {
    DeltaBatch {
        tick:    Tick(tick),
        deltas:  ids
            .iter()
            .map(|&id| AgentDelta { id: EntityId(id), health: Some(50.0), ..AgentDelta::default() })
            .collect(),
        removed: removed.iter().map(|&id| EntityId(id)).collect(),
    }
}

// ── JSON Lines ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod json_tests {
    use tf_agent::DeltaBatch;
    use tf_core::Tick;

    use super::batch;
    use crate::{DeltaSink, JsonLinesSink};

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec()).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn one_line_per_batch() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.publish(&batch(1, &[1000], &[])).unwrap();
        sink.publish(&batch(2, &[], &[1000])).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.lines(), 2);

        let out = lines(&sink.into_inner());
        assert_eq!(out[0], r#"{"tick":1,"deltas":[{"id":1000,"health":50.0}],"removed":[]}"#);
        assert_eq!(out[1], r#"{"tick":2,"deltas":[],"removed":[1000]}"#);
    }

    #[test]
    fn empty_batches_are_skipped() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.publish(&DeltaBatch::new(Tick(4))).unwrap();
        assert_eq!(sink.lines(), 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn lines_decode_back_to_batches() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let sent = batch(9, &[1000, 1001], &[1002]);
        sink.publish(&sent).unwrap();
        let out = lines(&sink.into_inner());
        let back: DeltaBatch = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(back, sent);
    }

    #[test]
    fn snapshot_line_is_keyed() {
        use tf_agent::{AgentSnapshot, AnimationState};
        use tf_core::{EntityId, Vec2};

        let snap = AgentSnapshot {
            id:         EntityId(1000),
            kind:       "grunt".into(),
            level:      2,
            health:     110.0,
            max_health: 110.0,
            position:   Vec2::new(1.0, 2.0),
            velocity:   Vec2::ZERO,
            target:     None,
            animation:  AnimationState::Idle,
        };
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_snapshot(Tick(3), &[snap]).unwrap();
        let out = lines(&sink.into_inner());
        let value: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(value["tick"], 3);
        assert_eq!(value["snapshot"][0]["kind"], "grunt");
        assert_eq!(value["snapshot"][0]["level"], 2);
    }

    #[test]
    fn file_sink_writes_to_disk() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("deltas.jsonl");
        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.publish(&batch(1, &[1000], &[])).unwrap();
        sink.publish(&batch(2, &[1001], &[])).unwrap();
        sink.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}

// ── Memory sink ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod memory_tests {
    use tf_agent::DeltaBatch;
    use tf_core::Tick;

    use super::batch;
    use crate::{DeltaSink, MemorySink};

    #[test]
    fn keeps_non_empty_batches_in_order() {
        let mut sink = MemorySink::new();
        sink.publish(&batch(1, &[1000, 1001], &[])).unwrap();
        sink.publish(&DeltaBatch::new(Tick(2))).unwrap();
        sink.publish(&batch(3, &[], &[1001])).unwrap();

        let ticks: Vec<u64> = sink.batches().iter().map(|b| b.tick.0).collect();
        assert_eq!(ticks, vec![1, 3]);
        assert_eq!(sink.total_deltas(), 2);

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut sink: Box<dyn DeltaSink> = Box::new(MemorySink::new());
        sink.publish(&batch(1, &[1000], &[])).unwrap();
        sink.flush().unwrap();
    }
}

// ── CSV diagnostics ───────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tf_core::Tick;
    use tf_sim::TickStats;

    use crate::{TickCsvWriter, TickSummaryRow};

    fn stats(tick: Tick) -> TickStats {
        TickStats {
            tick,
            commands: 2,
            decided: 5,
            faults: 1,
            published: 4,
            agents: 5,
            holding: 3,
            elapsed_us: 180,
            ..TickStats::default()
        }
    }

    #[test]
    fn header_and_rows() {
        let mut w = TickCsvWriter::from_writer(Vec::new()).unwrap();
        w.write_row(&TickSummaryRow::from(&stats(Tick(1)))).unwrap();
        w.write_row(&TickSummaryRow::from(&stats(Tick(2)))).unwrap();
        assert_eq!(w.rows(), 2);

        let bytes = w.into_inner().unwrap();
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, TickSummaryRow::HEADERS);

        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "2"); // tick
        assert_eq!(&rows[1][5], "1"); // faults
        assert_eq!(&rows[1][9], "3"); // holding
        assert_eq!(&rows[1][10], "180"); // elapsed_us
    }

    #[test]
    fn file_created_with_header() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut w = TickCsvWriter::create(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.headers().unwrap().len(), TickSummaryRow::HEADERS.len());
        assert_eq!(rdr.records().count(), 0);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use std::io::{self, Write};

    use tf_agent::{AgentTemplate, TemplateSet};
    use tf_core::{SimConfig, Vec2};
    use tf_sim::{Sim, SimBuilder, SimObserver};

    use super::batch;
    use crate::{JsonLinesSink, MemorySink, NetError, PublishObserver};

    fn sim(total_ticks: u64) -> Sim {
        let mut templates = TemplateSet::new();
        templates.insert(AgentTemplate {
            kind:                  "grunt".into(),
            behavior:              "melee".into(),
            max_health:            100.0,
            speed:                 100.0,
            attack_range:          40.0,
            detection_range:       600.0,
            attack_damage:         10.0,
            attack_cooldown_ticks: 4,
            armor:                 0.0,
            width:                 32.0,
            height:                32.0,
            base_priority:         10.0,
            abilities:             vec![],
        });
        let config = SimConfig { total_ticks: Some(total_ticks), ..SimConfig::default() };
        SimBuilder::new(config, templates).build().unwrap()
    }

    /// Writer that fails every call.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("wire down"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("wire down"))
        }
    }

    #[test]
    fn forwards_batches_from_a_run() {
        let mut sim = sim(6);
        let a = sim.world.spawn("grunt", 1, Vec2::ZERO).unwrap();
        let b = sim.world.spawn("grunt", 1, Vec2::new(300.0, 300.0)).unwrap();

        let mut obs = PublishObserver::new(MemorySink::new());
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        let sink = obs.into_sink();
        assert_eq!(sink.flushes(), 1);
        // Every agent's first publish carries its full state.
        for id in [a, b] {
            let first = sink
                .batches()
                .iter()
                .flat_map(|batch| batch.deltas.iter())
                .find(|d| d.id == id)
                .unwrap();
            assert_eq!(first.field_count(), tf_agent::AgentField::ALL.len());
        }
    }

    #[test]
    fn diagnostics_row_per_tick() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ticks.csv");
        let file = std::fs::File::create(&path).unwrap();

        let mut sim = sim(4);
        sim.world.spawn("grunt", 1, Vec2::ZERO).unwrap();
        let mut obs = PublishObserver::new(MemorySink::new()).with_diagnostics(file).unwrap();
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let ticks: Vec<String> = rdr.records().map(|r| r.unwrap()[0].to_owned()).collect();
        assert_eq!(ticks, ["1", "2", "3", "4"]);
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = PublishObserver::new(JsonLinesSink::new(Broken));
        obs.on_publish(&batch(1, &[1000], &[]));
        obs.on_publish(&batch(2, &[1000], &[]));
        assert_eq!(obs.published(), 0);
        assert!(matches!(obs.take_error(), Some(NetError::Json(_))));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn empty_batches_are_not_counted() {
        let mut obs = PublishObserver::new(MemorySink::new());
        obs.on_publish(&tf_agent::DeltaBatch::new(tf_core::Tick(1)));
        obs.on_publish(&batch(2, &[1000], &[]));
        assert_eq!(obs.published(), 1);
        assert_eq!(obs.sink().batches().len(), 1);
    }
}
