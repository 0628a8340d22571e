//! ClaimIQ: turns free-text insurance claim queries and uploaded policy
//! documents into a structured approve/reject decision with evidence.

pub mod claims;
pub mod config;
pub mod docs;
pub mod llm;
