//! The data stack scripts execute against.
//!
//! Elements are plain byte vectors; number and boolean views are decoded on
//! demand and never alter the stored bytes.

use crate::scriptnum::{decode_script_num, encode_script_num};
use crate::ScriptError;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack {
    entries: Vec<Vec<u8>>,
}

// An element is false when it is empty or all zeros, allowing the final byte
// to be the negative-zero sign 0x80.
fn as_bool(bytes: &[u8]) -> bool {
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != 0 {
            return !(index == bytes.len() - 1 && *byte == 0x80);
        }
    }
    false
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> i32 {
        self.entries.len() as i32
    }

    // Index of the element `back` positions below the top.
    fn index_from_top(&self, back: i32) -> Result<usize, ScriptError> {
        if back < 0 || back >= self.depth() {
            return Err(ScriptError::InvalidStackOperation);
        }
        Ok(self.entries.len() - back as usize - 1)
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.entries.push(bytes.to_vec());
    }

    pub fn push_byte_vec(&mut self, bytes: Vec<u8>) {
        self.entries.push(bytes);
    }

    pub fn push_int(&mut self, value: i64) {
        self.entries.push(encode_script_num(value));
    }

    pub fn push_bool(&mut self, value: bool) {
        self.entries.push(if value { vec![1] } else { Vec::new() });
    }

    pub fn pop_bytes(&mut self) -> Result<Vec<u8>, ScriptError> {
        self.entries
            .pop()
            .ok_or(ScriptError::InvalidStackOperation)
    }

    pub fn pop_int(&mut self) -> Result<i64, ScriptError> {
        let bytes = self.pop_bytes()?;
        decode_script_num(&bytes)
    }

    pub fn pop_bool(&mut self) -> Result<bool, ScriptError> {
        let bytes = self.pop_bytes()?;
        Ok(as_bool(&bytes))
    }

    pub fn peek_bytes(&self, back: i32) -> Result<&[u8], ScriptError> {
        let index = self.index_from_top(back)?;
        Ok(&self.entries[index])
    }

    pub fn peek_int(&self, back: i32) -> Result<i64, ScriptError> {
        decode_script_num(self.peek_bytes(back)?)
    }

    pub fn peek_bool(&self, back: i32) -> Result<bool, ScriptError> {
        Ok(as_bool(self.peek_bytes(back)?))
    }

    /// Duplicates the top `n` items in order: [... x1 x2] -> [... x1 x2 x1 x2].
    pub fn dup_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 || n > self.depth() {
            return Err(ScriptError::InvalidStackOperation);
        }
        let start = self.entries.len() - n as usize;
        for index in start..self.entries.len() {
            let copy = self.entries[index].clone();
            self.entries.push(copy);
        }
        Ok(())
    }

    /// Removes the top `n` items.
    pub fn drop_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 || n > self.depth() {
            return Err(ScriptError::InvalidStackOperation);
        }
        self.entries.truncate(self.entries.len() - n as usize);
        Ok(())
    }

    /// Removes the item `n` below the top: nip_n(1) on [... x1 x2 x3]
    /// leaves [... x1 x3].
    pub fn nip_n(&mut self, n: i32) -> Result<Vec<u8>, ScriptError> {
        let index = self.index_from_top(n)?;
        Ok(self.entries.remove(index))
    }

    /// Swaps the top `n` items with the `n` beneath them:
    /// swap_n(2) on [... x1 x2 x3 x4] gives [... x3 x4 x1 x2].
    pub fn swap_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 || self.depth() < 2 * n {
            return Err(ScriptError::InvalidStackOperation);
        }
        let n = n as usize;
        let split = self.entries.len() - n;
        let top: Vec<Vec<u8>> = self.entries.split_off(split);
        let mid = self.entries.len() - n;
        let below: Vec<Vec<u8>> = self.entries.split_off(mid);
        self.entries.extend(top);
        self.entries.extend(below);
        Ok(())
    }

    /// Rotates the top `3n` items so the lowest `n` of them end up on top:
    /// rot_n(1) on [... x1 x2 x3] gives [... x2 x3 x1].
    pub fn rot_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 || self.depth() < 3 * n {
            return Err(ScriptError::InvalidStackOperation);
        }
        let n = n as usize;
        let start = self.entries.len() - 3 * n;
        let rotated: Vec<Vec<u8>> = self.entries.drain(start..start + n).collect();
        self.entries.extend(rotated);
        Ok(())
    }

    /// Copies the `n` items sitting `n` below the top onto the top:
    /// over_n(1) on [... x1 x2] gives [... x1 x2 x1].
    pub fn over_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 || self.depth() < 2 * n {
            return Err(ScriptError::InvalidStackOperation);
        }
        let n = n as usize;
        let start = self.entries.len() - 2 * n;
        for index in start..start + n {
            let copy = self.entries[index].clone();
            self.entries.push(copy);
        }
        Ok(())
    }

    /// Copies the item exactly `n` below the top onto the top.
    pub fn pick_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let index = self.index_from_top(n)?;
        let copy = self.entries[index].clone();
        self.entries.push(copy);
        Ok(())
    }

    /// Moves the item exactly `n` below the top onto the top.
    pub fn roll_n(&mut self, n: i32) -> Result<(), ScriptError> {
        if n < 1 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let index = self.index_from_top(n)?;
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        Ok(())
    }

    /// Copies the top item below the second-from-top:
    /// [... x1 x2] -> [... x2 x1 x2].
    pub fn tuck(&mut self) -> Result<(), ScriptError> {
        if self.depth() < 2 {
            return Err(ScriptError::InvalidStackOperation);
        }
        let top = self.entries[self.entries.len() - 1].clone();
        let index = self.entries.len() - 2;
        self.entries.insert(index, top);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Stack;
    use crate::ScriptError;

    fn stack_of(items: &[&[u8]]) -> Stack {
        let mut stack = Stack::new();
        for item in items {
            stack.push_bytes(item);
        }
        stack
    }

    fn contents(stack: &Stack) -> Vec<Vec<u8>> {
        let mut stack = stack.clone();
        let mut out = Vec::new();
        while stack.depth() > 0 {
            out.push(stack.pop_bytes().expect("pop"));
        }
        out.reverse();
        out
    }

    // Table of (name, initial, operation, expected error, expected final)
    // mirroring the stack operation contracts one case per line.
    #[test]
    fn operations() {
        type Op = fn(&mut Stack) -> Result<(), ScriptError>;
        let cases: Vec<(&str, Vec<&[u8]>, Op, Option<ScriptError>, Vec<&[u8]>)> = vec![
            (
                "noop",
                vec![&[1], &[2], &[3], &[4], &[5]],
                |_| Ok(()),
                None,
                vec![&[1], &[2], &[3], &[4], &[5]],
            ),
            (
                "peek underflow (bytes)",
                vec![&[1], &[2], &[3]],
                |s| s.peek_bytes(5).map(|_| ()),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "peek underflow (int)",
                vec![&[1], &[2], &[3]],
                |s| s.peek_int(5).map(|_| ()),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "pop",
                vec![&[1], &[2], &[3]],
                |s| {
                    let value = s.pop_bytes()?;
                    assert_eq!(value, vec![3]);
                    Ok(())
                },
                None,
                vec![&[1], &[2]],
            ),
            (
                "pop underflow",
                vec![&[1]],
                |s| {
                    s.pop_bytes()?;
                    s.pop_bytes().map(|_| ())
                },
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "dup",
                vec![&[1], &[2]],
                |s| s.dup_n(1),
                None,
                vec![&[1], &[2], &[2]],
            ),
            (
                "dup2",
                vec![&[1], &[2]],
                |s| s.dup_n(2),
                None,
                vec![&[1], &[2], &[1], &[2]],
            ),
            (
                "dup zero",
                vec![&[1]],
                |s| s.dup_n(0),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "dup negative",
                vec![&[1]],
                |s| s.dup_n(-1),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "dup too much",
                vec![&[1]],
                |s| s.dup_n(2),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "drop",
                vec![&[1], &[2], &[3]],
                |s| s.drop_n(2),
                None,
                vec![&[1]],
            ),
            (
                "drop underflow",
                vec![&[1]],
                |s| s.drop_n(2),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "nip top",
                vec![&[1], &[2], &[3]],
                |s| s.nip_n(0).map(|_| ()),
                None,
                vec![&[1], &[2]],
            ),
            (
                "nip middle",
                vec![&[1], &[2], &[3]],
                |s| s.nip_n(1).map(|_| ()),
                None,
                vec![&[1], &[3]],
            ),
            (
                "nip out of range",
                vec![&[1], &[2], &[3]],
                |s| s.nip_n(3).map(|_| ()),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "swap",
                vec![&[1], &[2]],
                |s| s.swap_n(1),
                None,
                vec![&[2], &[1]],
            ),
            (
                "swap2",
                vec![&[1], &[2], &[3], &[4]],
                |s| s.swap_n(2),
                None,
                vec![&[3], &[4], &[1], &[2]],
            ),
            (
                "swap underflow",
                vec![&[1], &[2], &[3]],
                |s| s.swap_n(2),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "rot",
                vec![&[1], &[2], &[3]],
                |s| s.rot_n(1),
                None,
                vec![&[2], &[3], &[1]],
            ),
            (
                "rot2",
                vec![&[1], &[2], &[3], &[4], &[5], &[6]],
                |s| s.rot_n(2),
                None,
                vec![&[3], &[4], &[5], &[6], &[1], &[2]],
            ),
            (
                "rot underflow",
                vec![&[1], &[2]],
                |s| s.rot_n(1),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "over",
                vec![&[1], &[2]],
                |s| s.over_n(1),
                None,
                vec![&[1], &[2], &[1]],
            ),
            (
                "over2",
                vec![&[1], &[2], &[3], &[4]],
                |s| s.over_n(2),
                None,
                vec![&[1], &[2], &[3], &[4], &[1], &[2]],
            ),
            (
                "pick",
                vec![&[1], &[2], &[3]],
                |s| s.pick_n(2),
                None,
                vec![&[1], &[2], &[3], &[1]],
            ),
            (
                "pick zero",
                vec![&[1], &[2]],
                |s| s.pick_n(0),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "pick underflow",
                vec![&[1], &[2]],
                |s| s.pick_n(2),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "roll",
                vec![&[1], &[2], &[3]],
                |s| s.roll_n(2),
                None,
                vec![&[2], &[3], &[1]],
            ),
            (
                "roll underflow",
                vec![&[1], &[2]],
                |s| s.roll_n(2),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
            (
                "tuck",
                vec![&[1], &[2]],
                |s| s.tuck(),
                None,
                vec![&[2], &[1], &[2]],
            ),
            (
                "tuck underflow",
                vec![&[1]],
                |s| s.tuck(),
                Some(ScriptError::InvalidStackOperation),
                vec![],
            ),
        ];

        for (name, before, operation, want_err, after) in cases {
            let mut stack = stack_of(&before);
            let result = operation(&mut stack);
            match want_err {
                Some(err) => assert_eq!(result, Err(err), "{name}"),
                None => {
                    result.unwrap_or_else(|err| panic!("{name}: {err}"));
                    let want: Vec<Vec<u8>> =
                        after.iter().map(|item| item.to_vec()).collect();
                    assert_eq!(contents(&stack), want, "{name}");
                }
            }
        }
    }

    #[test]
    fn push_pop_preserves_bytes() {
        let mut stack = Stack::new();
        for bytes in [&[][..], &[0x00], &[0x80], &[0xde, 0xad, 0xbe, 0xef]] {
            stack.push_bytes(bytes);
            assert_eq!(stack.pop_bytes().expect("pop"), bytes.to_vec());
        }
    }

    #[test]
    fn int_roundtrip_through_stack() {
        let mut stack = Stack::new();
        for value in [0i64, 1, -1, 127, 128, -129, 0x1234_5678, i64::MAX, -i64::MAX] {
            stack.push_int(value);
            assert_eq!(stack.pop_int().expect("pop"), value, "value {value}");
        }
    }

    #[test]
    fn bool_interpretation() {
        let mut stack = Stack::new();

        stack.push_bool(true);
        assert_eq!(stack.peek_bytes(0).expect("peek"), &[1]);
        assert!(stack.pop_bool().expect("pop"));

        stack.push_bool(false);
        assert_eq!(stack.peek_bytes(0).expect("peek"), &[] as &[u8]);
        assert!(!stack.pop_bool().expect("pop"));

        // Negative zero in all its paddings is false.
        for bytes in [&[0x80][..], &[0x00, 0x80], &[0x00, 0x00, 0x80]] {
            stack.push_bytes(bytes);
            assert!(!stack.pop_bool().expect("pop"), "bytes {bytes:?}");
        }
        // A 0x80 anywhere but last is significant.
        stack.push_bytes(&[0x80, 0x00]);
        assert!(stack.pop_bool().expect("pop"));
    }

    #[test]
    fn peek_does_not_disturb_storage() {
        let mut stack = Stack::new();
        // Padded encoding is ambiguous as a number but must survive peeks.
        stack.push_bytes(&[0x01, 0x00]);
        assert_eq!(stack.peek_int(0).expect("peek"), 1);
        assert!(stack.peek_bool(0).expect("peek"));
        assert_eq!(stack.pop_bytes().expect("pop"), vec![0x01, 0x00]);
    }
}
