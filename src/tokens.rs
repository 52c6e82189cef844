//! Beaker token matching
//!
//! Each reader reports the 8-byte identifier of the tag in front of it, or
//! nothing. The matcher decides whether the current combination solves the
//! puzzle, asks for a reset, or neither. Every poll is classified from
//! scratch: there is no memory of a previously correct combination.

use core::fmt;

/// Length of a tag identifier in bytes
pub const UID_LEN: usize = 8;

/// Number of token readers on the prop
pub const READER_COUNT: usize = 2;

/// Tag identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uid(pub [u8; UID_LEN]);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// A token reader
///
/// Implement this trait for the reader hardware driver. A read failure and
/// an empty field are both reported as `None`.
pub trait TokenReader {
    /// Read the identifier currently in range, if any
    fn poll(&mut self) -> Option<Uid>;
}

impl<T: TokenReader + ?Sized> TokenReader for &mut T {
    fn poll(&mut self) -> Option<Uid> {
        (**self).poll()
    }
}

/// Identifiers the prop recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTokens {
    /// The beaker that belongs on each reader
    pub correct: [Uid; READER_COUNT],
    /// Game master tag, recognized on any reader
    pub reset: Uid,
}

/// Result of classifying one poll of all readers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Classification {
    AllCorrect,
    Incorrect,
    ResetRequested,
}

/// What a single reader currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderStatus {
    Absent,
    Correct,
    Incorrect(Uid),
}

/// Classifies reader output against the known tokens
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    known: KnownTokens,
    readings: [Option<Uid>; READER_COUNT],
    previous: [Option<Uid>; READER_COUNT],
}

impl TokenMatcher {
    pub const fn new(known: KnownTokens) -> Self {
        Self {
            known,
            readings: [None; READER_COUNT],
            previous: [None; READER_COUNT],
        }
    }

    /// Classify a set of readings without storing them
    ///
    /// The reset token wins over everything else, whatever the other
    /// readers show.
    pub fn classify(&self, readings: &[Option<Uid>; READER_COUNT]) -> Classification {
        if readings.iter().flatten().any(|uid| *uid == self.known.reset) {
            return Classification::ResetRequested;
        }

        let all_correct = readings
            .iter()
            .zip(self.known.correct.iter())
            .all(|(reading, correct)| *reading == Some(*correct));

        if all_correct {
            Classification::AllCorrect
        } else {
            Classification::Incorrect
        }
    }

    /// Store a new poll and classify it
    pub fn update(&mut self, readings: [Option<Uid>; READER_COUNT]) -> Classification {
        self.previous = self.readings;
        self.readings = readings;

        for reader in 0..READER_COUNT {
            if self.has_changed(reader) {
                self.report(reader);
            }
        }

        self.classify(&self.readings)
    }

    /// Poll every reader once and classify the result
    pub fn poll<R: TokenReader>(&mut self, readers: &mut [R; READER_COUNT]) -> Classification {
        let mut readings = [None; READER_COUNT];
        for (reading, reader) in readings.iter_mut().zip(readers.iter_mut()) {
            *reading = reader.poll();
        }
        self.update(readings)
    }

    /// Check if a reader shows something different than on the previous poll
    ///
    /// Unknown reader indices never change.
    pub fn has_changed(&self, reader: usize) -> bool {
        self.readings.get(reader) != self.previous.get(reader)
    }

    /// Last identifier seen by a reader, `None` for an empty or unknown reader
    pub fn reading(&self, reader: usize) -> Option<Uid> {
        self.readings.get(reader).copied().flatten()
    }

    /// Status of a reader, `None` if there is no such reader
    pub fn status(&self, reader: usize) -> Option<ReaderStatus> {
        let reading = *self.readings.get(reader)?;
        let correct = *self.known.correct.get(reader)?;
        Some(match reading {
            None => ReaderStatus::Absent,
            Some(uid) if uid == correct => ReaderStatus::Correct,
            Some(uid) => ReaderStatus::Incorrect(uid),
        })
    }

    fn report(&self, reader: usize) {
        let (Some(status), reading) = (self.status(reader), self.reading(reader)) else {
            return;
        };
        match (status, reading) {
            (ReaderStatus::Correct, Some(uid)) => {
                log!("[TokenMatcher] reader #{}: {} - CORRECT", reader, uid);
            }
            (ReaderStatus::Incorrect(uid), _) => {
                log!("[TokenMatcher] reader #{}: {} - INCORRECT", reader, uid);
            }
            _ => log!("[TokenMatcher] reader #{}: tag removed", reader),
        }
    }
}
