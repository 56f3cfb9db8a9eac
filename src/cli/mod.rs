//! # CLI Module
//!
//! User-facing commands. Each command is a thin layer over the server,
//! session and client modules: it loads configuration and stored tokens,
//! runs the operation and presents the outcome with the shared output
//! macros.
//!
//! ## Commands
//!
//! - [`serve`] - run the local proxy server
//! - [`auth`] - log in: open the authorize URL, wait for the callback and
//!   persist the token pair
//! - [`watch`] - live now-playing view: 1 s poll loop, interpolated position
//!   bar, concerts table on artist change
//! - [`dispatch`] / [`toggle`] - one-shot playback commands
//! - [`concerts`] - concert search by artist name

mod auth;
mod concerts;
mod player;
mod serve;
mod watch;

pub use auth::auth;
pub use concerts::concerts;
pub use player::{dispatch, toggle};
pub use serve::serve;
pub use watch::watch;
