/*
 * This module provides data aquisition abilites for the application.
 * It doesn't care what it gets, just how: every transport hands the same raw
 * BGP-LS table to the normalizer through `AcquisitionSource`.
 */

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;
