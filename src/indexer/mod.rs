//! Discovery of source artifacts and store files in the workspace.

pub mod types;
pub mod workspace;

pub use types::DiscoveryError;
pub use workspace::{
    display_path,
    find_files,
};
