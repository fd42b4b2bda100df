pub mod features;
pub mod seam;

pub use features::{ExtractFeatures, FeatureParams, Polarity};
pub use seam::{PlacePatch, PoissonSeamRemoval, SeamCoupling};
