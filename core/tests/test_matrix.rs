#[cfg(test)]
mod matrix_tests {
    use roundtrip_core::harness::{enumerate_cases, PipelineHandle};
    use roundtrip_core::prelude::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn quick_matrix_passes_for_standard_fixtures() {
        init_logger();
        let runner = ParameterMatrixRunner::new(Fixture::standard_set(), &HarnessConfig::default())
            .expect("runner");
        assert_eq!(runner.case_count(), 3 * TransformPair::ALL.len());

        let report = runner.run().expect("matrix");

        assert_eq!(report.launched, 18);
        assert_eq!(report.results.len(), 18);
        assert!(report.passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.telemetry.cases_total, 18);
        assert_eq!(report.telemetry.cases_passed, 18);
        assert!(report.telemetry.sanity_check());
        assert!(report.telemetry.ticks > 0);
    }

    #[test]
    fn small_waves_still_cover_every_case() {
        let config = HarnessConfig::new(MatrixMode::Quick, 4).expect("config");
        let dims = Dimensions::for_mode(MatrixMode::Quick);
        let dims = Dimensions { window_sizes: vec![8, 12, 15], trickle_rates: vec![128, 4096], ..dims };
        let runner = ParameterMatrixRunner::new(vec![Fixture::text("t", 9000, 3)], &config)
            .expect("runner")
            .with_dimensions(dims)
            .expect("valid dimensions");

        let report = runner.run().expect("matrix");

        assert_eq!(report.launched, 3 * 2 * TransformPair::ALL.len());
        assert!(report.passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
        let mut ids: Vec<usize> = report.results.iter().map(|r| r.test_case_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..report.launched).collect::<Vec<_>>(), "each case reports once");
    }

    #[test]
    fn enumeration_is_nested_outer_to_inner() {
        let fixtures = vec![Fixture::empty("a"), Fixture::empty("b")];
        let dims = Dimensions::for_mode(MatrixMode::Quick)
            .with_pairs(&[TransformPair::DeflateInflate, TransformPair::ZstdZstd]);
        let dims = Dimensions { levels: vec![1, 9], ..dims };

        let cases = enumerate_cases(&fixtures, &dims).expect("cases");
        let coords: Vec<(&str, i8, TransformPair)> =
            cases.iter().map(|c| (c.fixture.id(), c.config.level(), c.pair)).collect();

        assert_eq!(
            coords,
            vec![
                ("a", 1, TransformPair::DeflateInflate),
                ("a", 1, TransformPair::ZstdZstd),
                ("a", 9, TransformPair::DeflateInflate),
                ("a", 9, TransformPair::ZstdZstd),
                ("b", 1, TransformPair::DeflateInflate),
                ("b", 1, TransformPair::ZstdZstd),
                ("b", 9, TransformPair::DeflateInflate),
                ("b", 9, TransformPair::ZstdZstd),
            ]
        );
        assert!(cases.iter().enumerate().all(|(i, c)| c.id == i));
        assert_eq!(enumerate_cases(&fixtures, &dims).expect("cases").len(), cases.len());
    }

    #[test]
    fn full_mode_is_enumerated_lazily() {
        let config = HarnessConfig::new(MatrixMode::Full, 256).expect("config");
        let runner = ParameterMatrixRunner::new(Fixture::standard_set(), &config).expect("runner");
        let per_fixture = 4 * 3 * 8 * 11 * 9 * 5 * 6;

        assert_eq!(runner.dimensions().combinations(), per_fixture);
        assert_eq!(runner.cases().len(), 3 * per_fixture);

        let last = runner.cases().nth(3 * per_fixture - 1).expect("last case").expect("valid");
        assert_eq!(last.fixture.id(), "empty.txt");
        assert_eq!(last.config.chunk_size(), 1024 * 1024);
        assert_eq!(last.config.trickle_rate(), 1024 * 1024);
        assert_eq!(last.config.window_size(), 15);
        assert_eq!(last.config.level(), 9);
        assert_eq!(last.config.memory_level(), 9);
        assert_eq!(last.config.strategy(), Strategy::Fixed);
        assert_eq!(last.pair, TransformPair::ZstdZstd);
        assert!(runner.cases().nth(3 * per_fixture).is_none());
    }

    #[test]
    fn one_failing_case_does_not_stop_its_siblings() {
        init_logger();
        let mut rt = CooperativeRuntime::new();
        let fixture = Fixture::text("elipses.txt", 16 * 1024, 8);
        let good = Configuration::default();
        let bad_decode = good.with_window_size(9).expect("valid window");

        let mut handles: Vec<PipelineHandle> = Vec::new();
        for (id, pair) in TransformPair::ALL.into_iter().enumerate() {
            let runner = PipelineRunner::new(TestCase::new(id, fixture.clone(), good, pair), rt.scheduler());
            // Case 0 decodes with a window too small for its stream.
            let runner = if id == 0 { runner.with_decode_config(bad_decode) } else { runner };
            handles.push(runner.run().expect("start"));
        }
        rt.run_until_stalled();

        let results: Vec<VerificationResult> = handles.into_iter().map(PipelineHandle::settle).collect();
        assert!(!results[0].passed);
        assert!(results[1..].iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn out_of_range_dimensions_are_rejected() {
        let runner = ParameterMatrixRunner::new(Fixture::standard_set(), &HarnessConfig::default())
            .expect("runner");
        let dims = Dimensions { window_sizes: vec![7], ..Dimensions::for_mode(MatrixMode::Quick) };
        assert!(matches!(runner.with_dimensions(dims), Err(HarnessError::InvalidConfig(_))));
    }

    #[test]
    fn report_serializes_to_json() {
        let runner = ParameterMatrixRunner::new(vec![Fixture::empty("empty.txt")], &HarnessConfig::default())
            .expect("runner");
        let report = runner.run().expect("matrix");

        let json = serde_json::to_string(&report).expect("json");
        assert!(json.contains("\"launched\":6"));
        let snapshot = report.telemetry.to_json().expect("snapshot json");
        assert!(snapshot.contains("cases_total"));
    }
}
