pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod magnify;
pub mod monitor;
pub mod roi;
pub mod session;
pub mod synth;
