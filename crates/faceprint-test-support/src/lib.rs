//! Test support utilities for faceprint.
//!
//! Provides mocks and synthetic image builders for testing the
//! embedding extraction pipeline.
//!
//! # Example
//!
//! ```
//! use faceprint_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! // Create synthetic test images
//! let black = SyntheticImageBuilder::solid_black(160, 160);
//! let white = SyntheticImageBuilder::solid_white(160, 160);
//!
//! // Create mock image source
//! let source = MockImageSource::new(vec![black, white]);
//! ```

mod builders;
mod mocks;
mod weights;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockImageSource, MockProgressSink, MockRecordOutput};
pub use weights::write_zeroed_weights;
