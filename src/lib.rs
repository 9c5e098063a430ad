//! # Coin Bot
//!
//! A Telegram bot that keeps a coin balance per user in PostgreSQL.
//! The owner can give or take coins from a single user, or credit every
//! registered user at once, through an inline admin panel.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod localization;
pub mod logging;
