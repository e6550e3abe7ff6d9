//! Rubrica Core Library
//!
//! Core domain logic for the rubrica grading-rubric manager: rubric
//! templates and their lifecycle, the grade computation engine, rosters,
//! access rules and the SQLite-backed store.

pub mod access;
pub mod accounts;
pub mod config;
pub mod db;
pub mod error;
pub mod grading;
pub mod id;
pub mod logging;
pub mod mail;
pub mod roster;
pub mod rubric;
pub mod store;
