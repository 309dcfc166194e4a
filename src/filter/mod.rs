// Filter module - notch design and zero-phase cascade application
//
// - notch: biquad notch coefficient design (FilterSpec)
// - cascade: forward+backward application of FilterSpecs per channel

pub mod cascade;
pub mod notch;

pub use cascade::{apply_cascade, apply_zero_phase, clip_in_place, MIN_FILTER_LEN};
pub use notch::{design_notch, FilterSpec, DEFAULT_QUALITY_FACTOR};
