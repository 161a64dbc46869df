// Shared visual/audio tuning constants used by both web and native frontends.

// Time
pub const SECONDS_PER_YEAR: f64 = 31_557_600.0; // Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

// Orbital animation
pub const VISUAL_SCALE: f64 = 100_000.0; // makes real periods visible on screen
pub const UI_SPEED_MIN: f64 = 0.1;
pub const UI_SPEED_MAX: f64 = 10.0;
pub const UI_SPEED_STEP: f64 = 0.5; // swipe increment
pub const TIME_MULTIPLIER_MIN: f64 = 1.0;
pub const TIME_MULTIPLIER_MAX: f64 = 10_000.0;
pub const UI_SPEED_TO_TIME_MULTIPLIER: f64 = 1_000.0;

// Scene layout, all expressed as fractions of the container radius
pub const CONTAINER_MARGIN: f32 = 0.06;
pub const SUN_RADIUS_FRACTION: f32 = 0.08;
pub const MARKER_SIZE_FRACTION: f32 = 0.011;
pub const MARKER_MIN_FRACTION: f32 = 0.008;
pub const MARKER_SIZE_EXPONENT: f32 = 0.7; // sub-linear so gas giants don't swamp the scene
pub const LABEL_OFFSET_FRACTION: f32 = 0.025;
pub const PICK_SLOP_FRACTION: f32 = 0.015; // extra hit radius around small markers
pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 3.0;

// Colour adjustments
pub const MUTE_DARKEN: f32 = 0.35;
pub const SELECT_BRIGHTEN: f32 = 1.4;

// Starfield
pub const DEFAULT_STAR_COUNT: usize = 220;
pub const DEFAULT_STAR_SEED: u64 = 0x5EED_0F_57A2;

// Frequency mapping band (Hz) and the distances that pin its ends (AU)
pub const FREQ_MIN_HZ: f64 = 200.0;
pub const FREQ_MAX_HZ: f64 = 800.0;
pub const NEAREST_DISTANCE_AU: f64 = 0.39; // Mercury
pub const FARTHEST_DISTANCE_AU: f64 = 39.48; // outer pin of the band, past Neptune
pub const FREQ_POWER: f64 = 0.5;

// Envelope / modulation
pub const ATTACK_SCALE_SEC: f64 = 0.1;
pub const ATTACK_FLOOR_SEC: f64 = 0.05;
pub const RELEASE_BASE_SEC: f64 = 0.5;
pub const RELEASE_SCALE_SEC: f64 = 0.5;
pub const RELEASE_FLOOR_SEC: f64 = 1.0;
pub const TREMOLO_PER_YEAR_HZ: f64 = 2.0;
pub const TREMOLO_MIN_HZ: f64 = 0.5;
pub const TREMOLO_MAX_HZ: f64 = 8.0;
pub const TONE_SUSTAIN_SEC: f64 = 0.25;
pub const TONE_VELOCITY: f32 = 0.6;

// Scheduling
pub const BASE_INTERVAL_SEC: f64 = 2.0;
pub const REFERENCE_BPM: f64 = 120.0;
pub const TEMPO_MIN_BPM: f64 = 60.0;
pub const TEMPO_MAX_BPM: f64 = 180.0;

// Engine defaults
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
pub const DEFAULT_MASTER_VOLUME: f32 = 0.7;
pub const DEFAULT_PLANET_VOLUME: f32 = 0.8;
pub const MAX_RECOVERY_ATTEMPTS: u32 = 3;
pub const DEBOUNCE_WINDOW_MS: u64 = 50;
pub const RESUME_SETTLE_MS: u64 = 2_000; // async resume must land within this
