pub mod distance_metric;
pub mod matrix_profile;
pub mod profile_stream;
