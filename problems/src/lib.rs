//! Problem codes for stepgen. The enumeration is generated by the build
//! script from `resources/problem-codes.csv`.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
