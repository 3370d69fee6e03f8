// Domain layer - Plain data shared by every other layer
pub mod chart;
pub mod error;
pub mod series;
pub mod time_range;
