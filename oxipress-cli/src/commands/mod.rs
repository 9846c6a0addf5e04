//! Command implementations for the oxipress CLI.

pub mod compress;
pub mod decompress;
pub mod demo;
pub mod roundtrip;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use demo::cmd_demo;
pub use roundtrip::cmd_roundtrip;
