//! Building glslang: CMake flag mapping, the CMake adapter and the step
//! driver.

pub mod cmake;
pub mod driver;
pub mod params;

pub use cmake::CMakeBuilder;
pub use driver::{BuildDriver, BuildOutcome, BuildSteps, CMakeSteps, DriverOptions};
pub use params::{CMakeParams, CMakeValue};
