#[cfg(test)]
mod config_tests {
    use roundtrip_core::constants::DEFAULT_MAX_IN_FLIGHT;
    use roundtrip_core::prelude::*;

    #[test]
    fn configuration_accepts_full_ranges() {
        for level in -1..=9 {
            for window in 8..=15 {
                assert!(Configuration::new(level, window, 8, 0, 16_384, 1024).is_ok());
            }
        }
        for mem in 1..=9 {
            for strategy in 0..=4 {
                assert!(Configuration::new(6, 15, mem, strategy, 64, 1).is_ok());
            }
        }
    }

    #[test]
    fn configuration_rejects_out_of_range_values() {
        let bad = [
            Configuration::new(-2, 15, 8, 0, 16_384, 1024),
            Configuration::new(10, 15, 8, 0, 16_384, 1024),
            Configuration::new(6, 7, 8, 0, 16_384, 1024),
            Configuration::new(6, 16, 8, 0, 16_384, 1024),
            Configuration::new(6, 15, 0, 0, 16_384, 1024),
            Configuration::new(6, 15, 10, 0, 16_384, 1024),
            Configuration::new(6, 15, 8, 5, 16_384, 1024),
            Configuration::new(6, 15, 8, 0, 63, 1024),
            Configuration::new(6, 15, 8, 0, 16_384, 0),
        ];
        for result in bad {
            assert!(matches!(result, Err(HarnessError::InvalidConfig(_))), "{result:?}");
        }

        let err = Configuration::new(6, 15, 8, 5, 16_384, 1024).unwrap_err();
        assert!(err.to_string().contains("strategy 5 outside 0..=4"), "{err}");
    }

    #[test]
    fn default_configuration_and_display() {
        let cfg = Configuration::default();
        assert_eq!(cfg, Configuration::new(6, 15, 8, 0, 16_384, 1024).expect("valid"));
        assert_eq!(cfg.strategy(), Strategy::Default);
        assert_eq!(
            cfg.to_string(),
            "{ level: 6, windowSize: 15, memLevel: 8, strategy: Default, chunkSize: 16384, trickle: 1024 }"
        );
    }

    #[test]
    fn with_window_size_keeps_other_fields() {
        let cfg = Configuration::new(3, 15, 5, 2, 1024, 128).expect("valid");
        let narrowed = cfg.with_window_size(8).expect("valid");
        assert_eq!(narrowed.window_size(), 8);
        assert_eq!(narrowed.level(), 3);
        assert_eq!(narrowed.memory_level(), 5);
        assert_eq!(narrowed.strategy(), Strategy::HuffmanOnly);
        assert!(cfg.with_window_size(16).is_err());
    }

    #[test]
    fn mode_builds_dimension_lists() {
        assert_eq!(MatrixMode::from_flag(true), MatrixMode::Full);
        assert_eq!(MatrixMode::from_flag(false), MatrixMode::Quick);

        let quick = Dimensions::for_mode(MatrixMode::Quick);
        assert_eq!(quick.chunk_sizes, vec![16 * 1024]);
        assert_eq!(quick.trickle_rates, vec![1024]);
        assert_eq!(quick.combinations(), TransformPair::ALL.len());

        let full = Dimensions::for_mode(MatrixMode::Full);
        assert_eq!(full.window_sizes, (8..=15).collect::<Vec<u8>>());
        assert_eq!(full.levels, (-1..=9).collect::<Vec<i8>>());
        assert!(full.validate().is_ok());
        assert_eq!(Dimensions::for_mode(MatrixMode::Full), full, "pure function of the mode");
    }

    #[test]
    fn harness_config_from_json() {
        let cfg = HarnessConfig::from_json(r#"{ "mode": "full", "max_in_flight": 32 }"#).expect("json");
        assert_eq!(cfg, HarnessConfig { mode: MatrixMode::Full, max_in_flight: 32 });

        let defaults = HarnessConfig::from_json("{}").expect("json");
        assert_eq!(defaults.mode, MatrixMode::Quick);
        assert_eq!(defaults.max_in_flight, DEFAULT_MAX_IN_FLIGHT);

        assert!(matches!(
            HarnessConfig::from_json(r#"{ "max_in_flight": 0 }"#),
            Err(HarnessError::InvalidConfig(_))
        ));
        assert!(HarnessConfig::from_json(r#"{ "mode": "exhaustive" }"#).is_err());
    }
}
