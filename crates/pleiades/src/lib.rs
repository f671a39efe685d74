#![doc = include_str!("../README.md")]

#[doc(inline)]
pub use pleiades_image as image;

#[doc(inline)]
pub use pleiades_imgproc as imgproc;

#[doc(inline)]
pub use pleiades_io as io;

#[doc(inline)]
pub use pleiades_starfind as starfind;
