mod auth;
mod community;
mod conversation;
mod embedding;
mod files;
mod media;
mod profile;
mod video;

pub use auth::*;
pub use community::*;
pub use conversation::*;
pub use embedding::*;
pub use files::*;
pub use media::*;
pub use profile::*;
pub use video::*;
