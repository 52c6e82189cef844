mod tests {
    use alchemy_prop::color::{BLACK, PURPLE, Rgb, dim, is_dark, rgb_from_u32};
    use alchemy_prop::math8::{progress8, scale8};
    use embassy_time::Duration;

    #[test]
    fn test_scale8() {
        assert_eq!(scale8(255, 255), 255);
        assert_eq!(scale8(255, 120), 120);
        assert_eq!(scale8(128, 128), 64);
        assert_eq!(scale8(200, 0), 0);
    }

    #[test]
    fn test_progress8() {
        let total = Duration::from_millis(5000);
        assert_eq!(progress8(Duration::from_millis(0), total), 0);
        assert_eq!(progress8(Duration::from_millis(2500), total), 127);
        assert_eq!(progress8(Duration::from_millis(5000), total), 255);
        assert_eq!(progress8(Duration::from_millis(9000), total), 255);
        assert_eq!(
            progress8(Duration::from_millis(10), Duration::from_millis(0)),
            255
        );
    }

    #[test]
    fn test_rgb_from_u32() {
        assert_eq!(rgb_from_u32(0x80_00_80), PURPLE);
        assert_eq!(
            rgb_from_u32(0x12_34_56),
            Rgb {
                r: 0x12,
                g: 0x34,
                b: 0x56
            }
        );
    }

    #[test]
    fn test_dim() {
        assert_eq!(dim(PURPLE, 255), PURPLE);
        assert_eq!(dim(PURPLE, 0), BLACK);
        assert_eq!(
            dim(Rgb { r: 255, g: 0, b: 0 }, 40),
            Rgb { r: 40, g: 0, b: 0 }
        );
    }

    #[test]
    fn test_is_dark() {
        assert!(is_dark(&[BLACK; 8]));
        assert!(is_dark(&[]));
        assert!(!is_dark(&[BLACK, PURPLE]));
    }
}
