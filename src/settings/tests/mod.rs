use validator::Validate;

use super::{InputSettings, MaskSettings, Settings};
use crate::mask::{MaskConfig, MAX_MASK_MAGNITUDE};

#[test]
fn test_settings_new() {
    let settings = Settings::new("configs/config.toml").unwrap();
    assert_eq!(settings.mask, MaskSettings::default());
    assert_eq!(settings.input, InputSettings::default());
    assert!(Settings::new("").is_err());
}

#[test]
fn test_validate_mask() {
    assert!(MaskSettings::default().validate().is_ok());
    assert!(MaskSettings {
        low: 1.,
        high: 2.
    }
    .validate()
    .is_ok());

    // empty or inverted ranges
    assert!(MaskSettings { low: 1., high: 1. }.validate().is_err());
    assert!(MaskSettings { low: 2., high: 1. }.validate().is_err());

    // unbounded ranges
    assert!(MaskSettings {
        low: f64::NEG_INFINITY,
        high: 1.
    }
    .validate()
    .is_err());
    assert!(MaskSettings {
        low: 0.,
        high: f64::NAN
    }
    .validate()
    .is_err());
}

#[test]
fn test_validate_mask_magnitude() {
    assert!(MaskSettings {
        low: -MAX_MASK_MAGNITUDE,
        high: MAX_MASK_MAGNITUDE
    }
    .validate()
    .is_ok());
    assert!(MaskSettings {
        low: 0.,
        high: 2. * MAX_MASK_MAGNITUDE
    }
    .validate()
    .is_err());

    // the width of this range overflows
    assert!(MaskSettings {
        low: -1e308,
        high: 1e308
    }
    .validate()
    .is_err());
}

#[test]
fn test_mask_config_from_settings() {
    let config = MaskConfig::from(MaskSettings {
        low: -1.,
        high: 1.,
    });
    assert_eq!(config, MaskConfig::new(-1., 1.).unwrap());
}
