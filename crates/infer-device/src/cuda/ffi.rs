#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

mod inner {
    // Generated by build.rs from wrapper.h.
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

pub use inner::*;
