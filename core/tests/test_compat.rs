#[cfg(test)]
mod compat_tests {
    use roundtrip_core::prelude::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn executable_encoded_with_window_9_decodes_with_window_8() {
        init_logger();
        let check = CompatibilityCheck::current_executable().expect("read test binary");
        assert!(!check.fixture().is_empty());

        let result = check.run().expect("compat run");

        assert!(result.passed, "{}", result.message);
        assert_eq!(result.actual_crc32, Some(crc32fast::hash(check.fixture().data())));
    }

    #[test]
    fn fixture_loader_reads_the_same_bytes() {
        let fixture = Fixture::current_executable().expect("read test binary");
        let check = CompatibilityCheck::current_executable().expect("read test binary");
        assert_eq!(fixture.data(), check.fixture().data());
    }

    #[test]
    fn asymmetric_windows_hold_for_the_zlib_wrapper_too() {
        let image = Fixture::random("person.jpg", 45 * 1024, 0x5eed);
        let result = CompatibilityCheck::new(image)
            .with_pair(TransformPair::DeflateInflate)
            .run()
            .expect("compat run");
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn symmetric_minimum_window_roundtrips() {
        let text = Fixture::text("elipses.txt", 64 * 1024, 0x7e87);
        let result = CompatibilityCheck::new(text).with_windows(8, 8).run().expect("compat run");
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn window_below_range_is_rejected_before_running() {
        let check = CompatibilityCheck::new(Fixture::empty("empty.txt")).with_windows(9, 7);
        assert!(matches!(check.run(), Err(HarnessError::InvalidConfig(_))));
    }
}
