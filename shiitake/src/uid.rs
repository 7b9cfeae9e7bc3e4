//! Unique identifiers for scheduled tasks.
use crate::loom::sync::{
    atomic::{AtomicU64, Ordering::Relaxed},
    Arc,
};
use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A unique identifier for a [task].
///
/// A `Uid` combines the id of the current process, the wall-clock time at
/// which it was created, and a sequence number drawn from the
/// [`UidGenerator`] that created it. Ids produced by the same generator (or
/// any of its clones) never repeat, even if the system clock goes backwards,
/// because the sequence number alone is never reused.
///
/// The all-zero [`Uid::INVALID`] is never returned by a generator, and may be
/// used as a "no task" placeholder.
///
/// [task]: crate::task
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Uid {
    pid: u32,
    secs: u64,
    micros: u32,
    seq: u64,
}

/// Creates [`Uid`]s.
///
/// Cloning a `UidGenerator` returns a handle to the *same* sequence, so
/// several schedulers can share one id space by cloning a generator. The
/// sequence counter is atomic, and generators may be shared across threads.
#[derive(Clone)]
pub struct UidGenerator {
    next_seq: Arc<AtomicU64>,
}

// === impl Uid ===

impl Uid {
    /// The invalid id. Every field is zero.
    pub const INVALID: Self = Self {
        pid: 0,
        secs: 0,
        micros: 0,
        seq: 0,
    };

    /// Returns [`Uid::INVALID`].
    #[must_use]
    #[inline]
    pub const fn invalid() -> Self {
        Self::INVALID
    }

    /// Returns `true` if this is [`Uid::INVALID`].
    #[must_use]
    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }

    /// Returns the id of the process which created this `Uid`.
    #[must_use]
    #[inline]
    pub fn pid(self) -> u32 {
        self.pid
    }

    /// Returns the time at which this `Uid` was created, relative to the Unix
    /// epoch.
    ///
    /// If the clock could not be read when the id was created, this is zero.
    #[must_use]
    pub fn timestamp(self) -> core::time::Duration {
        core::time::Duration::from_secs(self.secs)
            + core::time::Duration::from_micros(u64::from(self.micros))
    }

    /// Returns this `Uid`'s sequence number.
    #[must_use]
    #[inline]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            pid,
            secs,
            micros,
            seq,
        } = self;
        write!(f, "{pid}-{secs}.{micros:06}-{seq}")
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return f.write_str("Uid(INVALID)");
        }
        write!(f, "Uid({self})")
    }
}

impl fmt::LowerHex for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            pid,
            secs,
            micros,
            seq,
        } = self;
        write!(f, "Uid({pid:x}-{secs:x}.{micros:x}-{seq:x})")
    }
}

// === impl UidGenerator ===

impl UidGenerator {
    /// Returns a new generator, with its own sequence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Sequence 0 is reserved, so that no generated id is ever invalid.
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns a fresh [`Uid`].
    ///
    /// If the system clock reads earlier than the Unix epoch, the id's
    /// timestamp is zero. The id is still unique.
    #[must_use = "generating a Uid advances the sequence"]
    pub fn next(&self) -> Uid {
        let seq = self.next_seq.fetch_add(1, Relaxed);
        debug_assert!(seq > 0, "64-bit uid sequence should not overflow!");

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Uid {
            pid: std::process::id(),
            secs: now.as_secs(),
            micros: now.subsec_micros(),
            seq,
        }
    }
}

impl fmt::Debug for UidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UidGenerator")
            .field("next_seq", &self.next_seq.load(Relaxed))
            .finish()
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loom::{self, thread};
    use std::{collections::HashSet, vec::Vec};

    #[test]
    fn invalid() {
        assert!(Uid::INVALID.is_invalid());
        assert_eq!(Uid::invalid(), Uid::INVALID);
        assert_eq!(format!("{:?}", Uid::INVALID), "Uid(INVALID)");
    }

    #[test]
    #[cfg(not(loom))]
    fn unique_and_valid() {
        let uids = UidGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let uid = uids.next();
            assert!(!uid.is_invalid());
            assert_eq!(uid.pid(), std::process::id());
            assert!(seen.insert(uid), "{uid} was generated twice");
        }
    }

    #[test]
    #[cfg(not(loom))]
    fn clones_share_a_sequence() {
        let a = UidGenerator::new();
        let b = a.clone();
        let first = a.next();
        let second = b.next();
        let third = a.next();
        assert_eq!(first.seq() + 1, second.seq());
        assert_eq!(second.seq() + 1, third.seq());

        // a separate generator starts over
        let c = UidGenerator::new();
        assert_eq!(c.next().seq(), 1);
    }

    #[test]
    #[cfg(not(loom))]
    fn formatting() {
        let uid = Uid {
            pid: 42,
            secs: 1_700_000_000,
            micros: 1_234,
            seq: 255,
        };
        assert_eq!(uid.to_string(), "42-1700000000.001234-255");
        assert_eq!(format!("{uid:?}"), "Uid(42-1700000000.001234-255)");
        assert_eq!(format!("{uid:x}"), "Uid(2a-6553f100.4d2-ff)");
        assert_eq!(
            uid.timestamp(),
            core::time::Duration::new(1_700_000_000, 1_234_000)
        );
    }

    #[test]
    fn concurrent_ids_are_unique() {
        loom::model(|| {
            let uids = UidGenerator::new();
            let threads: Vec<_> = (0..2)
                .map(|_| {
                    let uids = uids.clone();
                    thread::spawn(move || uids.next())
                })
                .collect();
            let local = uids.next();

            let mut seqs = HashSet::new();
            assert!(seqs.insert(local.seq()));
            for thread in threads {
                let uid = thread.join().unwrap();
                assert!(!uid.is_invalid());
                assert!(seqs.insert(uid.seq()), "sequence {} repeated", uid.seq());
            }
        })
    }
}
