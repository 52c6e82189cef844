mod common;

mod tests {
    use alchemy_prop::config::MAX_PULSE_DURATION;
    use alchemy_prop::{ConfigError, Duration, PinConfig, PropConfig, PropController, StripId};

    use crate::common::{CORRECT, MockDelay, MockInput, MockOutput, MockReader, Rig};

    #[test]
    fn test_default_is_valid() {
        assert_eq!(PropConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(PropConfig::default(), PropConfig::DEFAULT);
        assert_eq!(PropConfig::DEFAULT.strip(StripId::BluePipe).length, 8);
    }

    #[test]
    fn test_rejects_empty_strip() {
        let mut config = PropConfig::DEFAULT;
        config.strips[1].length = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyStrip(StripId::RedPipe)));
    }

    #[test]
    fn test_rejects_duplicate_pins() {
        let mut config = PropConfig::DEFAULT;
        config.pins.pulse_lock = PinConfig::active_high(32);
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(32)));

        let mut config = PropConfig::DEFAULT;
        config.strips[3].pin = 14;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(14)));
    }

    #[test]
    fn test_rejects_reset_token_on_a_reader() {
        let mut config = PropConfig::DEFAULT;
        config.tokens.reset = CORRECT[1];
        assert_eq!(
            config.validate(),
            Err(ConfigError::ResetTokenIsCorrectToken { reader: 1 })
        );
    }

    #[test]
    fn test_rejects_bad_timings() {
        let zero = Duration::from_millis(0);

        let mut config = PropConfig::DEFAULT;
        config.timings.flash_interval = zero;
        assert_eq!(config.validate(), Err(ConfigError::ZeroFlashInterval));

        let mut config = PropConfig::DEFAULT;
        config.timings.sequence_duration = zero;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSequenceDuration));

        let mut config = PropConfig::DEFAULT;
        config.timings.pulse_duration = zero;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPulseDuration));

        let mut config = PropConfig::DEFAULT;
        config.timings.pulse_duration = MAX_PULSE_DURATION + Duration::from_millis(1);
        assert_eq!(config.validate(), Err(ConfigError::PulseTooLong));

        let mut config = PropConfig::DEFAULT;
        config.timings.solve_dwell = zero;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDwell));

        let mut config = PropConfig::DEFAULT;
        config.timings.tick_period = zero;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickPeriod));
    }

    #[test]
    fn test_rejects_dwell_ending_before_unlock() {
        let mut config = PropConfig::DEFAULT;
        config.timings.solve_dwell = config.timings.sequence_duration;
        assert_eq!(config.validate(), Err(ConfigError::DwellShorterThanSequence));

        // the latch opens up to two ticks after the animation
        config.timings.solve_dwell = Duration::from_millis(5_100);
        assert_eq!(config.validate(), Err(ConfigError::DwellShorterThanSequence));

        config.timings.solve_dwell = Duration::from_millis(5_101);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_lamp_test_can_be_skipped() {
        let mut config = PropConfig::DEFAULT;
        assert_eq!(config.timings.lamp_test_step, Duration::from_millis(1_000));
        config.timings.lamp_test_step = Duration::from_millis(0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::DuplicatePin(25).to_string(),
            "GPIO 25 is assigned twice"
        );
        assert_eq!(
            ConfigError::PulseTooLong.to_string(),
            "lock pulse must not exceed 100 ms"
        );
        assert_eq!(
            ConfigError::DwellShorterThanSequence.to_string(),
            "solve dwell must outlast the solve sequence"
        );
        assert_eq!(
            ConfigError::StripTooLong {
                strip: StripId::Beaker,
                length: 27,
                max: 16
            }
            .to_string(),
            "strip Beaker has 27 pixels, at most 16 supported"
        );
    }

    #[test]
    fn test_controller_rejects_invalid_config() {
        let rig = Rig::new();
        let channel = alchemy_prop::CommandChannel::<4>::new();
        let mut config = PropConfig::DEFAULT;
        config.timings.solve_dwell = Duration::from_millis(0);

        let result = PropController::<MockInput, MockReader, MockOutput, MockDelay, 32, 4>::new(
            &config,
            rig.peripherals(),
            channel.receiver(),
        );
        assert_eq!(result.err(), Some(ConfigError::ZeroDwell));
        assert!(rig.hold.history().is_empty());
        assert!(rig.pulse.history().is_empty());
    }

    #[test]
    fn test_controller_rejects_strips_longer_than_buffer() {
        let rig = Rig::new();
        let channel = alchemy_prop::CommandChannel::<4>::new();

        let result = PropController::<MockInput, MockReader, MockOutput, MockDelay, 16, 4>::new(
            &PropConfig::DEFAULT,
            rig.peripherals(),
            channel.receiver(),
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::StripTooLong {
                strip: StripId::Beaker,
                length: 27,
                max: 16,
            })
        );
    }
}
