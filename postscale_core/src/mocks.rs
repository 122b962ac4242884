//! Test and helper mocks for postscale_core

use std::collections::VecDeque;

use crate::error::{Result, ScaleError};
use crate::measurement::Measurement;
use crate::report;
use crate::scaler::Scaler;

/// A scale that replays scripted packets or errors, one per read.
///
/// Once the script runs dry every read fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedScale {
    script: VecDeque<Result<Vec<u8>>>,
    reads: usize,
}

impl ScriptedScale {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packet(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.script.push_back(Ok(bytes.into()));
        self
    }

    pub fn error(mut self, err: ScaleError) -> Self {
        self.script.push_back(Err(err));
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    fn next(&mut self) -> Result<Vec<u8>> {
        self.reads += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(ScaleError::Transport("script exhausted".into())))
    }
}

impl Scaler for ScriptedScale {
    fn read_raw(&mut self) -> Result<Vec<u8>> {
        self.next()
    }

    fn read_measurement(&mut self) -> Result<Measurement> {
        report::decode(&self.next()?)
    }
}
