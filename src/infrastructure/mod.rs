//! Infrastructure implementations - persistence, auth, mail, logging

pub mod auth;
pub mod invitation;
pub mod logging;
pub mod mail;
pub mod membership;
pub mod storage;
pub mod team;
pub mod user;
