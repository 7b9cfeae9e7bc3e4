#![cfg_attr(docsrs, doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, deny(missing_docs))]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[cfg(test)]
extern crate std;

#[macro_use]
pub(crate) mod util;

mod error;
pub mod list;
pub mod priority_queue;
pub mod sorted_list;

pub use error::Full;
#[doc(inline)]
pub use list::{List, NodeId};
#[doc(inline)]
pub use priority_queue::PriorityQueue;
#[doc(inline)]
pub use sorted_list::SortedList;
