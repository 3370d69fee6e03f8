// Application layer - Fetching, chart layout and the render pipeline
pub mod chart_layout;
pub mod chart_renderer;
pub mod pipeline;
pub mod series_query_client;
pub mod series_repository;

#[cfg(test)]
pub mod test_support;
