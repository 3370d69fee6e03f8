// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod imagemagick_encoder;
pub mod influx_repository;
pub mod native_encoder;
pub mod plotters_painter;
pub mod raster;
