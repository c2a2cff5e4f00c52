use crate::fault::Fault;
use crate::target::{Target, TargetError};
use rand::Rng;
use thiserror::Error;

/// Errors that can occur during injector operations.
#[derive(Error, Debug)]
pub enum InjectorError {
    /// A random fault was requested against a zero-length target, so no
    /// valid offset exists to draw.
    #[error("target is empty, cannot draw a random fault")]
    EmptyTarget,

    /// Wraps an error from the target backend (offset out of range, or I/O
    /// failure on a file-backed target) encountered during an injector call.
    #[error("target interaction failed: {0}")]
    Target(#[from] TargetError),
}

/// Records every fault it applies so all of them can be undone later.
///
/// An `Injector` owns nothing but its history: targets are borrowed per
/// call and never stored, so one injector can serve a buffer for any number
/// of attack/restore cycles while the caller keeps full ownership of the
/// bytes. Attacks append to the history; [`restore`](Injector::restore)
/// replays the history backwards and drains it, returning the target to the
/// exact bytes it held before the first attack.
///
/// Not synchronized: one injector serves one target from one logical thread
/// at a time. Distinct injectors over distinct targets are independent.
#[derive(Debug, Default)]
pub struct Injector {
    history: Vec<Fault>,
}

impl Injector {
    /// Creates an idle injector with an empty history.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Applies `fault` to `target` and records it.
    ///
    /// # Arguments
    /// * `target`: The byte storage to corrupt, borrowed for this call only.
    /// * `fault`: The corruption to apply.
    ///
    /// # Returns
    /// The rewritten byte value. On error the target and the history are
    /// both unchanged: a fault only enters the history once its flip has
    /// landed.
    pub fn attack<T>(&mut self, target: &mut T, fault: Fault) -> Result<u8, InjectorError>
    where
        T: Target + ?Sized,
    {
        let value = target.flip(&fault)?;
        self.history.push(fault);
        Ok(value)
    }

    /// Applies a default single-bit fault (bit 0) at `offset`.
    ///
    /// Convenience wrapper around [`attack`](Injector::attack) with
    /// [`Fault::new`]; failure and side-effect semantics are identical.
    pub fn attack_at_offset<T>(
        &mut self,
        target: &mut T,
        offset: usize,
    ) -> Result<u8, InjectorError>
    where
        T: Target + ?Sized,
    {
        self.attack(target, Fault::new(offset))
    }

    /// Draws a uniformly random single-bit fault and applies it.
    ///
    /// The offset is uniform over `[0, target.len())` and the pattern is one
    /// of the eight single-bit masks, each equally likely. The generator is
    /// caller-supplied, so tests can seed a `ChaCha8Rng` and replay the
    /// exact same fault sequence.
    ///
    /// # Returns
    /// The rewritten byte value, or `InjectorError::EmptyTarget` when the
    /// target has no bytes to hit (history unchanged).
    pub fn attack_random<T, R>(&mut self, target: &mut T, rng: &mut R) -> Result<u8, InjectorError>
    where
        T: Target + ?Sized,
        R: Rng + ?Sized,
    {
        let len = target.len()?;
        if len == 0 {
            return Err(InjectorError::EmptyTarget);
        }
        self.attack(target, Fault::random(len, rng))
    }

    /// Undoes every recorded fault, newest first, and clears the history.
    ///
    /// Replaying in reverse insertion order keeps the undo correct even if a
    /// future fault kind stops being self-inverse; for the current XOR
    /// faults either order would reproduce the original bytes.
    ///
    /// Calling this on an idle injector is a no-op that succeeds.
    ///
    /// # Errors
    /// Fails with the target's `OutOfRange` if the target shrank below a
    /// recorded offset since the attack. Faults already replayed by this
    /// call are gone from the history; the failing fault and everything not
    /// yet replayed stay in place, so the caller can resize the target and
    /// retry without any undo being applied twice.
    pub fn restore<T>(&mut self, target: &mut T) -> Result<(), InjectorError>
    where
        T: Target + ?Sized,
    {
        while let Some(fault) = self.history.pop() {
            if let Err(err) = target.flip(&fault) {
                self.history.push(fault);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Returns `true` while corruptions are outstanding, waiting to be undone.
    pub fn is_armed(&self) -> bool {
        !self.history.is_empty()
    }

    /// The faults applied since construction or the last successful restore,
    /// in insertion order.
    pub fn history(&self) -> &[Fault] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    const TESTDATA: &[u8] = b"text_text_text_text_text";

    #[test]
    fn attack_flips_the_default_bit_and_records_the_fault() {
        let mut injector = Injector::new();
        let mut buf = b"test_text".to_vec();

        let value = injector
            .attack(&mut buf, Fault::new(0))
            .expect("Attack inside bounds should succeed");

        // 't' (01110100) with bit 0 flipped reads 'u' (01110101).
        assert_eq!(value, b'u');
        assert_eq!(buf, b"uest_text");
        assert_eq!(injector.history(), &[Fault::new(0)]);
        assert!(injector.is_armed());
    }

    #[test]
    fn attack_with_explicit_pattern_flips_exactly_those_bits() {
        let mut injector = Injector::new();
        let mut buf = b"test_text".to_vec();

        injector
            .attack(&mut buf, Fault::with_pattern(0, Fault::BIT2))
            .unwrap();

        // 't' (01110100) with bit 2 flipped reads 'p' (01110000).
        assert_eq!(buf, b"pest_text");
    }

    #[test]
    fn attack_out_of_range_leaves_buffer_and_history_unchanged() {
        let mut injector = Injector::new();
        let mut buf = b"test_text".to_vec();
        let reference = buf.clone();

        let len = buf.len();
        let result = injector.attack_at_offset(&mut buf, len);
        match result {
            Err(InjectorError::Target(TargetError::OutOfRange { offset, len })) => {
                assert_eq!(offset, 9);
                assert_eq!(len, 9);
            }
            other => panic!("Expected OutOfRange for offset == len, got {:?}", other),
        }

        assert_eq!(buf, reference, "Failed attack must not corrupt the buffer");
        assert!(
            !injector.is_armed(),
            "Failed attack must not enter the history"
        );
    }

    #[test]
    fn attack_random_on_empty_target_fails_and_records_nothing() {
        let mut injector = Injector::new();
        let mut rng = ChaCha8Rng::from_seed([3u8; 32]);
        let mut buf: Vec<u8> = Vec::new();

        match injector.attack_random(&mut buf, &mut rng) {
            Err(InjectorError::EmptyTarget) => {}
            other => panic!("Expected EmptyTarget on zero-length buffer, got {:?}", other),
        }
        assert!(!injector.is_armed());
    }

    #[test]
    fn restore_on_an_idle_injector_is_a_successful_noop() {
        let mut injector = Injector::new();
        let mut buf = TESTDATA.to_vec();

        injector
            .restore(&mut buf)
            .expect("Restore with empty history should always succeed");
        assert_eq!(buf, TESTDATA);

        // Immediately after a successful restore the same holds.
        injector.attack_at_offset(&mut buf, 0).unwrap();
        injector.restore(&mut buf).unwrap();
        injector
            .restore(&mut buf)
            .expect("Restore right after restore should also succeed");
        assert_eq!(buf, TESTDATA);
    }

    #[test]
    fn twenty_attacks_at_distinct_offsets_restore_exactly() {
        let mut injector = Injector::new();
        let mut buf = TESTDATA.to_vec();

        for offset in 0..20 {
            injector.attack_at_offset(&mut buf, offset).unwrap();
        }
        assert_ne!(buf, TESTDATA);
        assert_eq!(injector.history().len(), 20);

        injector.restore(&mut buf).unwrap();
        assert_eq!(buf, TESTDATA);
        assert!(!injector.is_armed());
    }

    #[test]
    fn twenty_random_attacks_restore_exactly() {
        let mut injector = Injector::new();
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let mut buf = TESTDATA.to_vec();

        for _ in 0..20 {
            injector.attack_random(&mut buf, &mut rng).unwrap();
        }
        injector.restore(&mut buf).unwrap();
        assert_eq!(
            buf, TESTDATA,
            "Round trip must hold no matter which offsets and bits were drawn"
        );
    }

    #[test]
    fn repeated_offsets_with_overlapping_patterns_restore_exactly() {
        let mut injector = Injector::new();
        let mut buf = TESTDATA.to_vec();

        // Hit the same bytes several times with different masks, interleaved
        // with other offsets, including a recorded no-op.
        for fault in [
            Fault::with_pattern(0, Fault::BIT0),
            Fault::with_pattern(5, Fault::BIT7),
            Fault::with_pattern(0, Fault::BIT3),
            Fault::with_pattern(0, 0xFF),
            Fault::with_pattern(5, Fault::BIT7),
            Fault::with_pattern(11, 0x00),
            Fault::with_pattern(0, Fault::BIT0),
        ] {
            injector.attack(&mut buf, fault).unwrap();
        }

        injector.restore(&mut buf).unwrap();
        assert_eq!(buf, TESTDATA);
    }

    #[test]
    fn injector_is_reusable_across_attack_restore_cycles() {
        let mut injector = Injector::new();
        let mut rng = ChaCha8Rng::from_seed([9u8; 32]);
        let mut buf = TESTDATA.to_vec();

        for cycle in 0..5 {
            for _ in 0..8 {
                injector.attack_random(&mut buf, &mut rng).unwrap();
            }
            injector.restore(&mut buf).unwrap();
            assert_eq!(buf, TESTDATA, "Round trip failed on cycle {}", cycle);
            assert!(!injector.is_armed());
        }
    }

    #[test]
    fn failed_restore_keeps_unreplayed_history_and_is_resumable() {
        let mut injector = Injector::new();
        let mut buf = vec![0u8; 10];

        // Oldest entry targets a high offset, newest a low one, so the
        // reverse replay undoes offset 1 first and then trips over offset 9.
        injector
            .attack(&mut buf, Fault::with_pattern(9, Fault::BIT4))
            .unwrap();
        injector
            .attack(&mut buf, Fault::with_pattern(1, Fault::BIT1))
            .unwrap();

        buf.truncate(5);
        match injector.restore(&mut buf) {
            Err(InjectorError::Target(TargetError::OutOfRange { offset, .. })) => {
                assert_eq!(offset, 9);
            }
            other => panic!("Expected OutOfRange after the target shrank, got {:?}", other),
        }

        assert_eq!(
            buf[1], 0,
            "The newest fault must already be undone by the failed restore"
        );
        assert_eq!(
            injector.history(),
            &[Fault::with_pattern(9, Fault::BIT4)],
            "Only the unreplayed suffix of the history may survive a failed restore"
        );

        // Grow the target back and retry: the retry must not undo offset 1
        // a second time.
        buf.resize(10, 0);
        buf[9] = Fault::BIT4; // what the corrupted byte held before truncation
        injector.restore(&mut buf).unwrap();
        assert_eq!(buf, vec![0u8; 10]);
        assert!(!injector.is_armed());
    }

    #[test]
    fn attack_reports_the_rewritten_byte_value() {
        let mut injector = Injector::new();
        let mut buf = vec![0b1000_0000u8];

        let value = injector
            .attack(&mut buf, Fault::with_pattern(0, Fault::BIT0))
            .unwrap();
        assert_eq!(value, 0b1000_0001);
    }

    #[test]
    fn random_attacks_with_equal_seeds_corrupt_identically() {
        let mut buf_a = TESTDATA.to_vec();
        let mut buf_b = TESTDATA.to_vec();
        let mut injector_a = Injector::new();
        let mut injector_b = Injector::new();
        let mut rng_a = ChaCha8Rng::from_seed([21u8; 32]);
        let mut rng_b = ChaCha8Rng::from_seed([21u8; 32]);

        for _ in 0..20 {
            injector_a.attack_random(&mut buf_a, &mut rng_a).unwrap();
            injector_b.attack_random(&mut buf_b, &mut rng_b).unwrap();
        }

        assert_eq!(buf_a, buf_b);
        assert_eq!(injector_a.history(), injector_b.history());
    }
}
