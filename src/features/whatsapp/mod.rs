//! WhatsApp complaint channel.
//!
//! Citizens without the app file complaints by chatting with the desk's
//! WhatsApp number. Each sender is walked through a short dialogue
//! (complaint text, then location, then a photo). The finished complaint is
//! submitted through the regular complaint service, so it is audited,
//! broadcast and triaged like any other.
//!
//! Senders are matched to profiles by phone number; unknown numbers get a new
//! citizen profile. Dialogue state lives in memory and is lost on restart.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/webhooks/whatsapp` | Verify token | Meta subscription handshake |
//! | POST | `/webhooks/whatsapp` | Signature (optional) | Incoming messages |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use clients::GraphApiClient;
pub use services::{DeskIntake, WhatsAppService};
