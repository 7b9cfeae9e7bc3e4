#![cfg_attr(docsrs, doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(docsrs, deny(missing_docs))]

pub(crate) mod loom;
#[cfg(test)]
pub(crate) mod util;

mod error;
pub mod scheduler;
pub mod task;
pub mod uid;

pub use self::error::Error;
#[doc(inline)]
pub use self::scheduler::{Context, Schedule, Scheduler};
#[doc(inline)]
pub use self::task::Outcome;
#[doc(inline)]
pub use self::uid::{Uid, UidGenerator};
