//! Preference storage contracts and adapters.

pub mod prefs;
