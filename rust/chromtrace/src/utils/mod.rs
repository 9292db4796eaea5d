pub mod ranges;

pub use ranges::CoordinateRange;
