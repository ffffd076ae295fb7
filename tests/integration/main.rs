//! Integration tests, run over the in-memory storage backend

mod api_tests;
mod common;
mod rearrangement_flow;
mod smoke;
mod timetable_tests;
