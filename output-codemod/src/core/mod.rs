pub mod fs_scan;
pub mod manifest;
pub mod normalize;
pub mod select;
pub mod store;
pub mod summary;
pub mod workspace;
