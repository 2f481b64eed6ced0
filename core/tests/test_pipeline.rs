#[cfg(test)]
mod pipeline_tests {
    use bytes::Bytes;
    use futures::channel::oneshot;
    use roundtrip_core::harness::PipelineTelemetry;
    use roundtrip_core::prelude::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Holds everything back and releases only the first half on finish.
    struct KeepFirstHalf {
        held: Vec<u8>,
    }

    impl Transform for KeepFirstHalf {
        fn name(&self) -> &'static str {
            "keep-first-half"
        }

        fn push(&mut self, input: &[u8], _out: &mut Vec<Bytes>) -> Result<(), TransformError> {
            self.held.extend_from_slice(input);
            Ok(())
        }

        fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
            let half = self.held.len() / 2;
            if half > 0 {
                out.push(Bytes::copy_from_slice(&self.held[..half]));
            }
            Ok(())
        }
    }

    fn cut() -> TransformStage {
        TransformStage::new(Box::new(KeepFirstHalf { held: Vec::new() }))
    }

    /// Wire source -> encoder -> [cut] -> decoder -> [cut] -> sink and run to a result.
    fn run_with_cut(case: TestCase, cut_encoded: bool) -> VerificationResult {
        let mut rt = CooperativeRuntime::new();
        let reference = case.fixture.data().clone();
        let source = TrickleSource::new(case.config.trickle_rate(), rt.scheduler()).expect("source");
        let encoder = TransformStage::new(case.pair.create_encoder(&case.config).expect("encoder"));
        let decoder = TransformStage::new(case.pair.create_decoder(&case.config).expect("decoder"));
        let sink = Sink::expecting(reference.len());
        let cutter = cut();

        if cut_encoded {
            pipe(&source, &encoder);
            pipe(&encoder, &cutter);
            pipe(&cutter, &decoder);
            pipe(&decoder, &sink);
        } else {
            pipe(&source, &encoder);
            pipe(&encoder, &decoder);
            pipe(&decoder, &cutter);
            pipe(&cutter, &sink);
        }

        let (done, mut completion) = oneshot::channel();
        VerificationCallback::new(&case, reference.clone()).attach(&sink, done);
        source.end(reference).expect("arm");
        rt.run_until_stalled();
        completion.try_recv().expect("sender alive").expect("settled")
    }

    fn scenario_config() -> Configuration {
        // { level: 6, windowSize: 15, memLevel: 8, strategy: 0, chunkSize: 16384 }, trickle 1024
        Configuration::new(6, 15, 8, 0, 16_384, 1024).expect("valid config")
    }

    #[test]
    fn empty_buffer_roundtrips_to_empty_output() {
        init_logger();
        for pair in TransformPair::ALL {
            let case = TestCase::new(0, Fixture::empty("empty.txt"), scenario_config(), pair);
            let result = PipelineRunner::run_to_completion(case).expect("pipeline");
            assert!(result.passed, "{pair}: {}", result.message);
            assert_eq!(result.actual_crc32, Some(crc32fast::hash(&[])));
        }
    }

    #[test]
    fn image_roundtrips_in_raw_mode() {
        init_logger();
        let image = Fixture::random("person.jpg", 45 * 1024, 0x5eed);
        let case = TestCase::new(7, image.clone(), scenario_config(), TransformPair::DeflateRawInflateRaw);

        let result = PipelineRunner::run_to_completion(case).expect("pipeline");

        assert!(result.passed, "{}", result.message);
        assert_eq!(result.test_case_id, 7);
        assert_eq!(result.mismatch_index, None);
        assert_eq!(result.actual_crc32, Some(result.expected_crc32));
        assert_eq!(result.expected_crc32, crc32fast::hash(image.data()));
    }

    #[test]
    fn telemetry_taps_count_every_byte() {
        let mut rt = CooperativeRuntime::new();
        let telemetry = PipelineTelemetry::default();
        let text = Fixture::text("elipses.txt", 64 * 1024, 0x7e87);
        let cfg = Configuration::new(6, 15, 8, 0, 1024, 300).expect("valid config");
        let case = TestCase::new(1, text.clone(), cfg, TransformPair::GzipUnzip);

        let handle = PipelineRunner::new(case, rt.scheduler())
            .with_telemetry(telemetry.clone())
            .run()
            .expect("start");
        rt.run_until_stalled();
        let result = handle.settle();

        assert!(result.passed, "{}", result.message);
        let counters = telemetry.counters.borrow();
        assert_eq!(counters.bytes_source, text.len() as u64);
        assert_eq!(counters.bytes_decoded, text.len() as u64);
        assert!(counters.bytes_encoded > 0 && counters.bytes_encoded < counters.bytes_source);
        assert!(counters.max_slice_len <= 300);
        assert_eq!(counters.slices_emitted, (text.len() as u64).div_ceil(300));
    }

    #[test]
    fn nothing_runs_until_the_runtime_is_driven() {
        let mut rt = CooperativeRuntime::new();
        let case = TestCase::new(3, Fixture::text("t", 4096, 1), scenario_config(), TransformPair::ZstdZstd);
        let mut handle = PipelineRunner::new(case, rt.scheduler()).run().expect("start");

        assert_eq!(handle.poll_result(), None);
        rt.run_until_stalled();
        let result = handle.poll_result().expect("settled after the runtime stalls");
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn undecodable_stream_fails_the_case_not_the_harness() {
        let text = Fixture::text("elipses.txt", 8 * 1024, 2);
        let encode = scenario_config();
        let decode = encode.with_window_size(9).expect("valid window");
        let mut rt = CooperativeRuntime::new();
        let case = TestCase::new(11, text, encode, TransformPair::DeflateInflate);

        // zlib rejects a stream whose header asks for a larger window.
        let handle = PipelineRunner::new(case, rt.scheduler())
            .with_decode_config(decode)
            .run()
            .expect("start");
        rt.run_until_stalled();
        let result = handle.settle();

        assert!(!result.passed);
        assert_eq!(result.test_case_id, 11);
        assert!(result.message.contains("pipeline error"), "{}", result.message);
        assert!(result.message.contains("fixture=elipses.txt"), "{}", result.message);
    }

    #[test]
    fn verification_reports_first_mismatch_with_case_coordinates() {
        let reference = Bytes::from_static(b"abcdefgh");
        let case = TestCase::new(
            5,
            Fixture::new("sample.bin", reference.clone()),
            scenario_config(),
            TransformPair::GzipGunzip,
        );
        let verifier = VerificationCallback::new(&case, reference);

        let ok = verifier.verify(b"abcdefgh");
        assert!(ok.passed);

        let diff = verifier.verify(b"abcXefgh");
        assert!(!diff.passed);
        assert_eq!(diff.mismatch_index, Some(3));
        for needle in ["fixture=sample.bin", "chunkSize=16384", "windowSize: 15", "gzip->gunzip", "0x64", "0x58"] {
            assert!(diff.message.contains(needle), "missing {needle}: {}", diff.message);
        }

        let short = verifier.verify(b"abcde");
        assert_eq!(short.mismatch_index, Some(5));
        assert!(short.message.contains("<end>"), "{}", short.message);

        let long = verifier.verify(b"abcdefghij");
        assert_eq!(long.mismatch_index, Some(8));
    }

    #[test]
    fn decoder_starved_mid_stream_reports_truncation() {
        init_logger();
        let text = Fixture::text("elipses.txt", 20_000, 12);
        for pair in [TransformPair::DeflateInflate, TransformPair::GzipUnzip, TransformPair::ZstdZstd] {
            let case = TestCase::new(21, text.clone(), scenario_config(), pair);
            let result = run_with_cut(case, true);

            assert!(!result.passed, "{pair}");
            assert_eq!(result.test_case_id, 21);
            assert!(result.message.contains("pipeline error"), "{pair}: {}", result.message);
            assert!(
                result.message.contains("unexpected end of compressed stream"),
                "{pair}: {}",
                result.message
            );
        }
    }

    #[test]
    fn short_delivery_to_the_sink_is_a_premature_end() {
        let text = Fixture::text("elipses.txt", 10_000, 13);
        let case = TestCase::new(22, text, scenario_config(), TransformPair::DeflateRawInflateRaw);
        let result = run_with_cut(case, false);

        assert!(!result.passed);
        assert!(
            result.message.contains("premature end: expected 10000 bytes, received 5000"),
            "{}",
            result.message
        );
        assert_eq!(result.mismatch_index, None);
    }
}
