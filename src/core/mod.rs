pub mod archive;
pub mod generator;
pub mod pif;
pub mod props;
pub mod publisher;
pub mod release_check;

pub use crate::domain::model::{PifProfile, ReleaseAsset, RepoType};
pub use crate::domain::ports::{ReleaseApi, Storage};
pub use crate::utils::error::Result;
