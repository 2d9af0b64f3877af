mod channel;
mod conversation;
mod embedded_file;
mod member;
mod profile;
mod server;
mod user;

pub use channel::*;
pub use conversation::*;
pub use embedded_file::*;
pub use member::*;
pub use profile::*;
pub use server::*;
pub use user::*;
