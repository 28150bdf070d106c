//! Core library for the fleet-arrears command line application.
//!
//! The library extracts vehicle-collections records from spreadsheets whose
//! layout is not known in advance. Header recognition lives in
//! [`fleet::arrears::fields`] and [`fleet::arrears::header`], per-row cleaning
//! in [`fleet::arrears::normalize`], and the sheet and workbook drivers in
//! [`fleet::arrears::extract`]. Workbook readers, the result writer, and input
//! staging sit under [`fleet::arrears::io`]; [`fleet::arrears::pipeline`]
//! strings them together for the command line.

pub mod fleet;

pub use fleet::arrears::{
    ExtractError, Result, error, extract, fields, header, io, model, normalize, pipeline,
};
