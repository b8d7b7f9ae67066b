pub mod add_assets;

pub use add_assets::{AddAssetsCommand, AddAssetsError, AddAssetsResponse};
