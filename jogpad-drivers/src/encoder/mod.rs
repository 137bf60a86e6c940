//! Jog wheel decoding

pub mod quadrature;

pub use quadrature::QuadratureDecoder;
