//! Invoice generation pipeline: CSV rows in, one PDF invoice per row out.
//!
//! The CLI (`invoice-cli`) and the local web GUI (`invoice-gui`) are thin
//! front ends over [`services::generate::generate_invoices`].

pub mod config;
pub mod error;
pub mod job_controller;
pub mod services;
