use bevy_starfield::asset::versioning::{
    FormatVersion, VersionStatus, check_version, current_format_version,
};
use bevy_starfield::asset::*;

fn roundtrip_ron<T: serde::Serialize + serde::de::DeserializeOwned>(value: &T) -> T {
    let serialized = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).unwrap();
    ron::from_str(&serialized).unwrap()
}

#[test]
fn galaxy_parameters_default_to_the_reference_scene() {
    let params = GalaxyParameters::default();
    assert_eq!(params.count, 100_000);
    assert_eq!(params.arms, 6);
    assert_eq!(params.radius, 100.0);
    assert_eq!(params.spin, 0.5);
    assert_eq!(params.randomness, 0.2);
    assert_eq!(params.randomness_power, 20.0);
    assert_eq!(params.inside_color, [0.839, 0.243, 0.839]);
    assert_eq!(params.outside_color, [0.282, 0.722, 0.722]);
}

#[test]
fn effect_settings_default_to_the_reference_scene() {
    let effects = EffectSettings::default();
    assert_eq!(effects.point_size, 50.0);
    assert_eq!(effects.ripple_speed, 40.0);
    assert_eq!(effects.ripple_width, 20.0);
    assert_eq!(effects.shooting_star.trail_length, 100);
    assert_eq!(effects.shooting_star.max_life, 300);
    assert_eq!(effects.shooting_star.speed, Range::new(0.001, 0.002));
}

#[test]
fn density_settings_defaults() {
    let density = DensitySettings::default();
    assert_eq!(density.max_density, 50_000);
    assert_eq!(density.min_density, 2_000);
    assert_eq!(density.saturation, 14);
}

#[test]
fn galaxy_parameters_roundtrip() {
    let params = GalaxyParameters {
        count: 1234,
        arms: 3,
        radius: 42.0,
        spin: 1.5,
        randomness: 0.4,
        randomness_power: 3.0,
        inside_color: [1.0, 0.0, 0.0],
        outside_color: [0.0, 0.0, 1.0],
    };
    assert_eq!(roundtrip_ron(&params), params);
}

#[test]
fn default_galaxy_fields_are_not_written() {
    let params = GalaxyParameters {
        arms: 4,
        ..Default::default()
    };
    let serialized = ron::ser::to_string(&params).unwrap();
    assert!(serialized.contains("arms:4"), "got {serialized}");
    assert!(!serialized.contains("count"), "got {serialized}");
    assert!(!serialized.contains("radius"), "got {serialized}");
}

#[test]
fn partial_sections_fill_in_defaults() {
    let effects: EffectSettings =
        ron::from_str("(ripple_speed: 12.0, shooting_star: (max_life: 60))").unwrap();
    assert_eq!(effects.ripple_speed, 12.0);
    assert_eq!(effects.ripple_width, 20.0);
    assert_eq!(effects.shooting_star.max_life, 60);
    assert_eq!(effects.shooting_star.trail_length, 100);
}

#[test]
fn starfield_asset_roundtrip_keeps_every_section() {
    let mut asset = StarfieldAsset::new("Roundtrip", vec!["a.png".into(), "b.jpg".into()]);
    asset.galaxy.arms = 2;
    asset.density.saturation = 6;
    asset.backdrop.nebula_count = 0;
    asset.effects.shooting_star.head_radius = 3.0;

    let restored = roundtrip_ron(&asset);
    assert_eq!(restored.name, "Roundtrip");
    assert_eq!(restored.version(), current_format_version());
    assert_eq!(restored.images, asset.images);
    assert_eq!(restored.galaxy, asset.galaxy);
    assert_eq!(restored.density, asset.density);
    assert_eq!(restored.backdrop, asset.backdrop);
    assert_eq!(restored.effects, asset.effects);
    assert_eq!(restored.constellations, asset.constellations);
}

#[test]
fn new_asset_is_valid() {
    assert_eq!(StarfieldAsset::new("Valid", vec![]).validate(), Ok(()));
}

#[test]
fn validation_rejects_unusable_parameters() {
    let mut asset = StarfieldAsset::new("Invalid", vec![]);
    asset.galaxy.arms = 0;
    assert_eq!(asset.validate(), Err(ParameterError::NoArms));

    asset.galaxy.arms = 2;
    asset.galaxy.radius = -1.0;
    assert_eq!(asset.validate(), Err(ParameterError::NonPositiveRadius(-1.0)));

    asset.galaxy.radius = 10.0;
    asset.effects.shooting_star.trail_length = 1;
    assert_eq!(asset.validate(), Err(ParameterError::TrailTooShort(1)));
}

#[test]
fn texture_size_must_be_bakeable() {
    let mut asset = StarfieldAsset::new("Texture", vec![]);
    asset.constellations.texture_size = 0;
    assert_eq!(
        asset.validate(),
        Err(ParameterError::TextureSizeOutOfRange(0))
    );

    asset.constellations.texture_size = 40_000;
    assert_eq!(
        asset.validate(),
        Err(ParameterError::TextureSizeOutOfRange(40_000))
    );

    asset.constellations.texture_size = 4096;
    assert_eq!(asset.validate(), Ok(()));
}

#[test]
fn shooting_star_speed_must_be_finite_and_non_negative() {
    let mut asset = StarfieldAsset::new("Speed", vec![]);
    asset.effects.shooting_star.speed = Range::new(-0.1, 0.1);
    assert!(matches!(
        asset.validate(),
        Err(ParameterError::InvalidSpeed { .. })
    ));

    asset.effects.shooting_star.speed = Range::new(0.001, f32::INFINITY);
    assert!(matches!(
        asset.validate(),
        Err(ParameterError::InvalidSpeed { .. })
    ));

    asset.effects.shooting_star.speed = Range::new(f32::NAN, 0.002);
    assert!(matches!(
        asset.validate(),
        Err(ParameterError::InvalidSpeed { .. })
    ));
}

#[test]
fn nan_radius_is_rejected() {
    let params = GalaxyParameters {
        radius: f32::NAN,
        ..Default::default()
    };
    assert!(matches!(
        params.validate(),
        Err(ParameterError::NonPositiveRadius(_))
    ));
}

#[test]
fn current_version_is_current() {
    assert_eq!(check_version(current_format_version()), VersionStatus::Current);
    assert_eq!(current_format_version(), FormatVersion::CURRENT.as_str());
}

#[test]
fn older_versions_are_upgraded() {
    assert_eq!(
        check_version("0.1"),
        VersionStatus::Outdated {
            found: FormatVersion::V0_1
        }
    );

    let mut asset: StarfieldAsset =
        ron::from_str(r#"(starfield_version: "0.1", name: "Old")"#).unwrap();
    assert_eq!(
        asset.try_upgrade_version(),
        VersionStatus::Outdated {
            found: FormatVersion::V0_1
        }
    );
    assert_eq!(asset.version(), current_format_version());
    assert_eq!(asset.backdrop, BackdropSettings::default());
}

#[test]
fn unknown_versions_are_rejected() {
    assert_eq!(check_version("99.0"), VersionStatus::Unknown);
    assert_eq!(check_version(""), VersionStatus::Unknown);
    assert_eq!(FormatVersion::parse("0.2"), Some(FormatVersion::V0_2));
    assert!(FormatVersion::V0_1 < FormatVersion::CURRENT);
}

#[test]
fn range_sampling_stays_in_bounds() {
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let range = Range::new(2.0, 5.0);
    for _ in 0..1_000 {
        let value = range.sample(&mut rng);
        assert!((2.0..5.0).contains(&value));
    }
    assert_eq!(Range::new(4.0, 1.0).sample(&mut rng), 4.0);
}

#[test]
fn non_finite_ranges_do_not_panic() {
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    assert!(Range::new(f32::NAN, 1.0).sample(&mut rng).is_nan());
    assert_eq!(Range::new(0.0, f32::NAN).sample(&mut rng), 0.0);
    assert_eq!(Range::new(1.0, f32::INFINITY).sample(&mut rng), 1.0);
}
