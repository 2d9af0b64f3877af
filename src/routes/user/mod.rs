use axum_extra::extract::cookie::Cookie;
use time::Duration;

mod account;
mod login;
mod logout;
mod refresh;
mod register;

pub use account::*;
pub use login::*;
pub use logout::*;
pub use refresh::*;
pub use register::*;

/// Tokens ride in http-only cookies so browser scripts cannot read them.
fn auth_cookie(name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(max_age)
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}
