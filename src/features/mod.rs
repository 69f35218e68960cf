//! Text → fixed-length token features.
//!
//! [`build_feature`] handles one text (or a text pair); [`to_three_features`] adapts a
//! whole triplet by encoding A, B and C separately.

pub mod builder;
pub mod example;


pub use builder::{FeatureTensors, TokenFeature, build_feature, truncate_seq_pair};
pub use example::{TripletFeatures, to_three_features};
