//! Gateway: the HTTP surface the messaging platform calls.
//!
//! `GET /` liveness, `GET|POST /webhook` platform verification and event
//! acknowledgment, `POST /whatsapp` message replies.

mod server;

pub use server::{
    router, run_gateway, GatewayState, EVENT_RECEIVED_TEXT, HEALTH_TEXT, VERIFY_REJECTED_TEXT,
};
