pub use crate::StarfieldPlugin;

pub use crate::asset::{
    BackdropSettings, ConstellationSettings, DensitySettings, EffectSettings, GalaxyParameters,
    Range as StarfieldRange, ShootingStarSettings, StarfieldAsset,
};

pub use crate::effects::{AnimatorState, SpawnShootingStar, TriggerRipple};

pub use crate::runtime::{AttachedGroup, ParticleGroupBinding, Starfield, StarfieldRuntime};

pub use crate::groups::GroupLoadState;
