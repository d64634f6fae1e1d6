pub mod object_store;
pub mod text_detection;
