// src/types/mod.rs

pub mod time_slot;

pub use time_slot::TimeSlot;
