#![forbid(unsafe_code)]

mod lifecycle;
