pub mod controller;
pub mod serial;
pub mod web;
