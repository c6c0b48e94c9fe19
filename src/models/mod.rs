//! Data models for Libranet entities

pub mod admin;
pub mod book;
pub mod fine;
pub mod loan;
pub mod member;
