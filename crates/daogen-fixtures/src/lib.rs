//! # Daogen Fixtures
//!
//! The `vertx` schema generated by daogen at build time, once per switch
//! combination, and compiled against hand-written records, values and
//! interfaces:
//!
//! | Tree          | Injection annotations | Interface binding | Module |
//! |---------------|-----------------------|-------------------|--------|
//! | `annotated`   | on                    | on                | on     |
//! | `unannotated` | off                   | off               | on     |
//! | `moduleless`  | on                    | on                | off    |

/// Types the generated code maps to; every tree shares them.
pub mod model {
    pub mod records {
        pub struct SomethingRecord;
        pub struct SomethingcompositeRecord;
    }

    pub mod pojos {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Something {
            pub someid: Option<i32>,
            pub somestring: Option<String>,
            pub somehugenumber: Option<i64>,
        }

        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Somethingcomposite {
            pub someid: Option<i32>,
            pub somesecondid: Option<i32>,
            pub somejsonobject: Option<String>,
        }

        impl super::interfaces::ISomething for Something {
            fn someid(&self) -> Option<i32> {
                self.someid
            }

            fn somestring(&self) -> Option<&str> {
                self.somestring.as_deref()
            }
        }

        impl super::interfaces::ISomethingcomposite for Somethingcomposite {
            fn someid(&self) -> Option<i32> {
                self.someid
            }

            fn somesecondid(&self) -> Option<i32> {
                self.somesecondid
            }
        }
    }

    pub mod interfaces {
        pub trait ISomething: Send + Sync {
            fn someid(&self) -> Option<i32>;
            fn somestring(&self) -> Option<&str>;
        }

        pub trait ISomethingcomposite: Send + Sync {
            fn someid(&self) -> Option<i32>;
            fn somesecondid(&self) -> Option<i32>;
        }
    }
}

macro_rules! generated_tree {
    ($tree:ident, $mounts:literal) => {
        pub mod $tree {
            pub mod vertx {
                pub mod tables {
                    pub use crate::model::{interfaces, pojos, records};

                    include!(concat!(env!("OUT_DIR"), "/", $mounts));
                }
            }
        }
    };
}

generated_tree!(annotated, "annotated_tables.rs");
generated_tree!(unannotated, "unannotated_tables.rs");
generated_tree!(moduleless, "moduleless_tables.rs");
