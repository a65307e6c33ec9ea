//! # inboxbell-oauth
//!
//! `OAuth2` authentication for Reddit "script" applications.
//!
//! ## Features
//!
//! - **Password grant**: Resource Owner Password Credentials flow with
//!   client credentials in the basic auth header
//! - **Two-factor**: RFC 6238 TOTP codes appended to the password
//! - **Token management**: Expiration checking with a safety buffer
//! - **Provider configuration**: Pre-configured for Reddit, overridable for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxbell_oauth::{OAuthClient, PasswordFlow, Provider, Totp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OAuthClient::new("client_id", Provider::reddit()?)
//!         .with_client_secret("client_secret")
//!         .with_user_agent("linux:inboxbell:0.0.2 (by /u/someone)");
//!
//!     let flow = PasswordFlow::new(client, "someone", "password")
//!         .with_totp(Totp::from_base32("JBSWY3DPEHPK3PXP")?);
//!
//!     let token = flow.authorize().await?;
//!     println!("Expires at: {:?}", token.expires_at);
//!     Ok(())
//! }
//! ```
//!
//! Script-app grants do not come with a refresh token; when
//! [`Token::is_expired`] reports true, run the flow again.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;
pub mod totp;

pub use error::{Error, Result};
pub use flow::{OAuthClient, PasswordFlow};
pub use provider::Provider;
pub use token::Token;
pub use totp::Totp;
