//! Read entities definitions.

pub mod navigation;
pub mod room;

pub use self::navigation::Navigation;
