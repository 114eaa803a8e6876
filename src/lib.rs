pub mod api;
pub mod data_aquisition;
pub mod network;
pub mod parsers;
pub mod settings;
pub mod topology;
