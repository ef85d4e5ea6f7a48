pub mod artifacts;
pub mod clients;
pub mod dsp;
pub mod health;
pub mod inputs;
pub mod opportunities;
pub mod proxy;
pub mod public_file;
pub mod responsibles;
