//! Canonical script construction.

use cjdcoind_consensus::constants::{MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE};

use crate::opcodes;
use crate::scriptnum::encode_script_num;
use crate::ScriptError;

// Enough space for the vast majority of scripts without regrowing.
const DEFAULT_SCRIPT_ALLOC: usize = 500;

/// Number of bytes the canonical push of `data` occupies.
pub fn canonical_data_size(data: &[u8]) -> usize {
    let len = data.len();

    // Single numbers representable by a small-integer opcode take one byte.
    if len == 0 || (len == 1 && (data[0] <= 16 || data[0] == 0x81)) {
        return 1;
    }

    if len < opcodes::OP_PUSHDATA1 as usize {
        1 + len
    } else if len <= 0xff {
        2 + len
    } else if len <= 0xffff {
        3 + len
    } else {
        5 + len
    }
}

/// Builds custom scripts from opcodes, integers, and data while respecting
/// canonical encoding. Pushes that would exceed the script engine limits set
/// a sticky error: every later call is a no-op and [`Self::script`] reports
/// the first failure.
///
/// ```
/// use cjdcoind_script::builder::ScriptBuilder;
/// use cjdcoind_script::opcodes;
///
/// let pubkey_hash = [0u8; 20];
/// let mut builder = ScriptBuilder::new();
/// builder.add_op(opcodes::OP_DUP).add_data(&pubkey_hash);
/// let script = builder.script()?;
/// # Ok::<(), cjdcoind_script::ScriptError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
    error: Option<ScriptError>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            script: Vec::with_capacity(DEFAULT_SCRIPT_ALLOC),
            error: None,
        }
    }

    /// Appends a single opcode.
    pub fn add_op(&mut self, opcode: u8) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.script.len() + 1 > MAX_SCRIPT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "adding an opcode would exceed the maximum script size",
            ));
            return self;
        }
        self.script.push(opcode);
        self
    }

    /// Appends a run of opcodes.
    pub fn add_ops(&mut self, opcodes: &[u8]) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.script.len() + opcodes.len() > MAX_SCRIPT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "adding opcodes would exceed the maximum script size",
            ));
            return self;
        }
        self.script.extend_from_slice(opcodes);
        self
    }

    // The unchecked push shared by add_data and add_full_data. Chooses the
    // canonical opcode for the data length.
    fn push_data(&mut self, data: &[u8]) {
        let len = data.len();

        // Small values become their dedicated opcodes.
        if len == 0 || (len == 1 && data[0] == 0) {
            self.script.push(opcodes::OP_0);
            return;
        }
        if len == 1 && data[0] <= 16 {
            self.script.push(opcodes::OP_1 - 1 + data[0]);
            return;
        }
        if len == 1 && data[0] == 0x81 {
            self.script.push(opcodes::OP_1NEGATE);
            return;
        }

        if len < opcodes::OP_PUSHDATA1 as usize {
            self.script.push(opcodes::OP_DATA_1 - 1 + len as u8);
        } else if len <= 0xff {
            self.script.push(opcodes::OP_PUSHDATA1);
            self.script.push(len as u8);
        } else if len <= 0xffff {
            self.script.push(opcodes::OP_PUSHDATA2);
            self.script.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.script.push(opcodes::OP_PUSHDATA4);
            self.script.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.script.extend_from_slice(data);
    }

    /// Appends the canonical push of `data`, rejecting elements the script
    /// engine could never execute.
    pub fn add_data(&mut self, data: &[u8]) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.script.len() + canonical_data_size(data) > MAX_SCRIPT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "adding data would exceed the maximum script size",
            ));
            return self;
        }
        if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "data element exceeds the maximum element size",
            ));
            return self;
        }
        self.push_data(data);
        self
    }

    /// Like [`Self::add_data`] without the per-element size limit. Intended
    /// for tests that deliberately build unexecutable scripts; use
    /// `add_data` everywhere else. The total script size limit still holds.
    pub fn add_full_data(&mut self, data: &[u8]) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.script.len() + canonical_data_size(data) > MAX_SCRIPT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "adding data would exceed the maximum script size",
            ));
            return self;
        }
        self.push_data(data);
        self
    }

    /// Appends the canonical push of an integer: dedicated opcodes for -1
    /// and 0 through 16, the minimal number encoding otherwise.
    pub fn add_int64(&mut self, value: i64) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if self.script.len() + 1 > MAX_SCRIPT_SIZE {
            self.error = Some(ScriptError::NotCanonical(
                "adding an integer would exceed the maximum script size",
            ));
            return self;
        }

        if value == 0 {
            self.script.push(opcodes::OP_0);
            return self;
        }
        if value == -1 || (1..=16).contains(&value) {
            self.script.push(((opcodes::OP_1 as i64 - 1) + value) as u8);
            return self;
        }
        self.add_data(&encode_script_num(value))
    }

    /// Clears the script and any sticky error.
    pub fn reset(&mut self) -> &mut Self {
        self.script.clear();
        self.error = None;
        self
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// The built script, or the first error recorded while building it.
    pub fn script(&self) -> Result<Vec<u8>, ScriptError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.script.clone()),
        }
    }
}
