//! # Spotify Integration Module
//!
//! This module implements the Spotify Web API side of the upstream gateway:
//! OAuth token exchange and refresh against the accounts service, and the
//! player endpoints used by the proxy and the session engine.
//!
//! ## Overview
//!
//! Two submodules split the work along the credential boundary:
//!
//! - [`auth`] - Token lifecycle against `accounts.spotify.com`: exchanges an
//!   authorization code for an access/refresh token pair and refreshes an
//!   expired access token. Both requests carry the Basic authorization header
//!   built from the configured client ID and secret.
//! - [`player`] - Bearer-authenticated Web API calls: the raw
//!   [`player::api_request`] primitive plus typed wrappers for the
//!   currently-playing snapshot, artist metadata and playback commands.
//!
//! ## Error Handling
//!
//! Player calls surface [`crate::types::UpstreamError`]: a 401 maps to
//! `Auth` (the trigger for the session's refresh-then-retry-once path), any
//! other non-2xx maps to `Status` with the upstream body, and transport
//! failures map to `Network`. There is no retry, backoff or rate limiting at
//! this layer. A 204 from the player is a valid outcome (nothing playing)
//! and is never treated as an error.
//!
//! Auth calls return [`auth::AuthError`]; a rejected code or refresh token is
//! terminal for the stored session and forces a new login.

pub mod auth;
pub mod player;
