#[allow(unused_imports)]
pub(crate) use self::inner::*;

#[cfg(loom)]
mod inner {
    #![allow(dead_code)]

    #[cfg(test)]
    pub(crate) use loom::{model, thread};

    pub(crate) mod sync {
        pub(crate) use loom::sync::*;
    }
}

#[cfg(not(loom))]
mod inner {
    #![allow(dead_code)]

    pub(crate) mod sync {
        pub(crate) use std::sync::*;
    }

    #[cfg(test)]
    pub(crate) use std::thread;

    /// Runs `f` once, so that tests written against the loom model also run
    /// as ordinary tests.
    #[cfg(test)]
    pub(crate) fn model(f: impl Fn() + Sync + Send + 'static) {
        f()
    }
}
