mod asset_index;

pub use asset_index::{AssetIndex, AssetManager, AssetObject, RESOURCES_URL};
