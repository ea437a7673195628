#[cfg(test)]
mod telemetry_snapshot_tests {
    use std::time::Duration;

    use pgpmime_core::telemetry::{Stage, StageTimes, TelemetrySnapshot, TelemetryTimer};

    fn make_timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        std::thread::sleep(Duration::from_millis(20)); // ensure elapsed > stage times
        let mut times = StageTimes::default();
        times.add(Stage::Canonicalize, Duration::from_millis(2));
        times.add(Stage::Encrypt, Duration::from_millis(10));
        times.add(Stage::Envelope, Duration::from_millis(3));
        timer.stage_times = times;
        timer.finish();
        timer
    }

    #[test]
    fn snapshot_carries_byte_counts() {
        let timer = make_timer();
        let snapshot = TelemetrySnapshot::from(&timer, 100, 250, true);

        assert_eq!(snapshot.bytes_plaintext, 100);
        assert_eq!(snapshot.bytes_ciphertext, 250);
        assert!(snapshot.signed);
        assert!((snapshot.expansion_ratio() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn expansion_ratio_of_empty_plaintext_is_zero() {
        let snapshot = TelemetrySnapshot::from(&make_timer(), 0, 10, false);
        assert_eq!(snapshot.expansion_ratio(), 0.0);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Encrypt, Duration::from_millis(4));
        times.add(Stage::Encrypt, Duration::from_millis(6));

        assert_eq!(times.get(Stage::Encrypt), Duration::from_millis(10));
        assert_eq!(times.get(Stage::Envelope), Duration::ZERO);
        assert!((times.get_us(Stage::Encrypt) - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn total_stage_time_is_sum_of_stage_durations() {
        let snapshot = TelemetrySnapshot::from(&make_timer(), 1, 1, false);
        assert_eq!(snapshot.stage_times.total(), Duration::from_millis(15));
    }

    #[test]
    fn has_all_stages_detects_missing_stage() {
        let mut timer = TelemetryTimer::new();
        timer.time(Stage::Canonicalize, || ());
        timer.time(Stage::Encrypt, || ());
        timer.finish();

        let snapshot = TelemetrySnapshot::from(&timer, 1, 1, false);
        assert!(!snapshot.has_all_stages());

        assert!(TelemetrySnapshot::from(&make_timer(), 1, 1, false).has_all_stages());
    }

    #[test]
    fn sanity_check_passes_for_valid_snapshot() {
        assert!(TelemetrySnapshot::from(&make_timer(), 1, 1, false).sanity_check());
    }

    #[test]
    fn sanity_check_fails_if_stage_time_exceeds_elapsed() {
        let mut timer = make_timer();
        let elapsed = timer.elapsed();
        timer.stage_times.add(Stage::Encrypt, elapsed + Duration::from_millis(1));
        let snapshot = TelemetrySnapshot::from(&timer, 1, 1, false);

        assert!(!snapshot.sanity_check());
    }

    #[test]
    fn time_returns_closure_output() {
        let mut timer = TelemetryTimer::new();
        let out = timer.time(Stage::Envelope, || 42);
        assert_eq!(out, 42);
        assert!(timer.stage_times.has_all(&[Stage::Envelope]));
    }

    #[test]
    fn snapshot_exports_as_json() {
        let snapshot = TelemetrySnapshot::from(&make_timer(), 100, 250, true);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"bytes_ciphertext\":250"));
        assert!(json.contains("Encrypt"));

        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn stage_display_names() {
        let names: Vec<String> = Stage::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["canonicalize", "encrypt", "envelope"]);
    }
}
